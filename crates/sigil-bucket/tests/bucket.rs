use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use sigil_bucket::{BatchBuffer, RenderBucket, VisibilityResolver};
use sigil_geom::{Angle, ScreenRect, ScreenTransform, Vec2};
use sigil_overlay::{
    AttributeMutator, AttributeSpan, IconHandle, IndexMutator, LabelHandle, OverlayHandle,
    VisibilityFlag, quad_indexes,
};

/// Buffer double that records every mutation and draw call.
#[derive(Default)]
struct RecordingBuffer {
    mutations: Vec<(Vec<u16>, Vec<AttributeSpan>, usize)>,
    draw_calls: usize,
}

impl BatchBuffer for RecordingBuffer {
    fn apply_mutation(&mut self, indexes: &IndexMutator, attributes: &AttributeMutator) {
        self.mutations.push((
            indexes.indexes().to_vec(),
            attributes.spans().to_vec(),
            indexes.capacity(),
        ));
    }

    fn render(&mut self) {
        self.draw_calls += 1;
    }
}

/// Overlay double emitting one quad; attribute data tags the emitter.
struct TestHandle {
    first_vertex: u16,
    dynamic: bool,
    visible: VisibilityFlag,
    updates: Arc<AtomicUsize>,
}

impl TestHandle {
    fn new(first_vertex: u16, dynamic: bool) -> Self {
        Self::with_update_counter(first_vertex, dynamic, Arc::new(AtomicUsize::new(0)))
    }

    fn with_update_counter(first_vertex: u16, dynamic: bool, updates: Arc<AtomicUsize>) -> Self {
        Self {
            first_vertex,
            dynamic,
            visible: VisibilityFlag::default(),
            updates,
        }
    }
}

impl OverlayHandle for TestHandle {
    fn is_visible(&self) -> bool {
        self.visible.get()
    }

    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    fn update(&mut self, _screen: ScreenTransform) {
        self.updates.fetch_add(1, Ordering::SeqCst);
    }

    fn has_dynamic_attributes(&self) -> bool {
        self.dynamic
    }

    fn screen_rect(&self) -> ScreenRect {
        ScreenRect::from_center_size(Vec2::new(f32::from(self.first_vertex), 0.0), Vec2::new(1.0, 1.0))
    }

    fn element_indexes(&self, mutator: &mut IndexMutator) {
        mutator.append(&quad_indexes(self.first_vertex));
    }

    fn attribute_mutation(&self, mutator: &mut AttributeMutator, _screen: ScreenTransform) {
        mutator.push(AttributeSpan {
            first_vertex: u32::from(self.first_vertex),
            data: vec![f32::from(self.first_vertex)],
        });
    }
}

/// Resolver double: collects shared refs, then applies a visibility mask in
/// add order.
#[derive(Default)]
struct MaskResolver<'frame> {
    collected: Vec<&'frame dyn OverlayHandle>,
}

impl<'frame> VisibilityResolver<'frame> for MaskResolver<'frame> {
    fn add(&mut self, handle: &'frame dyn OverlayHandle) {
        self.collected.push(handle);
    }
}

impl<'frame> MaskResolver<'frame> {
    fn resolve(self, mask: &[bool]) {
        assert_eq!(self.collected.len(), mask.len());
        for (handle, visible) in self.collected.into_iter().zip(mask) {
            handle.set_visible(*visible);
        }
    }
}

fn screen() -> ScreenTransform {
    ScreenTransform::identity()
}

#[test]
fn zero_overlay_bucket_draws_without_mutation() {
    let mut bucket = RenderBucket::new(RecordingBuffer::default());
    bucket.render(screen());
    assert_eq!(bucket.buffer().draw_calls, 1);
    assert!(bucket.buffer().mutations.is_empty());
}

#[test]
fn visible_subset_emits_in_insertion_order() {
    let mut bucket = RenderBucket::new(RecordingBuffer::default());
    for (first, dynamic) in [(0u16, false), (4, true), (8, true), (12, false)] {
        bucket.add_overlay_handle(Box::new(TestHandle::new(first, dynamic)));
    }
    bucket.update(screen());

    let mut resolver = MaskResolver::default();
    bucket.collect_overlay_handles(&mut resolver);
    resolver.resolve(&[true, false, true, true]);

    bucket.render(screen());
    let (indexes, spans, _) = &bucket.buffer().mutations[0];
    let mut expect = Vec::new();
    expect.extend_from_slice(&quad_indexes(0));
    expect.extend_from_slice(&quad_indexes(8));
    expect.extend_from_slice(&quad_indexes(12));
    assert_eq!(indexes, &expect);
    // Attribute contributions come from the dynamic subset of the visible
    // set only: handle 4 is dynamic but invisible, handle 12 visible but
    // static.
    let firsts: Vec<u32> = spans.iter().map(|s| s.first_vertex).collect();
    assert_eq!(firsts, vec![8]);
}

#[test]
fn capacity_hint_is_six_per_overlay_regardless_of_visibility() {
    let mut bucket = RenderBucket::new(RecordingBuffer::default());
    for first in [0u16, 4, 8, 12, 16] {
        bucket.add_overlay_handle(Box::new(TestHandle::new(first, false)));
    }
    bucket.update(screen());
    // Nobody resolved visible; the mutation is empty but still pre-sized.
    bucket.render(screen());
    let (indexes, spans, capacity) = &bucket.buffer().mutations[0];
    assert!(indexes.is_empty());
    assert!(spans.is_empty());
    assert!(*capacity >= 6 * 5);
    assert_eq!(bucket.buffer().draw_calls, 1);
}

#[test]
fn scenario_three_visible_one_dynamic() {
    let mut bucket = RenderBucket::new(RecordingBuffer::default());
    bucket.add_overlay_handle(Box::new(TestHandle::new(0, false)));
    bucket.add_overlay_handle(Box::new(TestHandle::new(4, true)));
    bucket.add_overlay_handle(Box::new(TestHandle::new(8, false)));
    bucket.update(screen());

    let mut resolver = MaskResolver::default();
    bucket.collect_overlay_handles(&mut resolver);
    resolver.resolve(&[true, true, true]);

    bucket.render(screen());
    let (indexes, spans, _) = &bucket.buffer().mutations[0];
    assert_eq!(indexes.len(), 18);
    assert_eq!(&indexes[..6], &quad_indexes(0));
    assert_eq!(&indexes[6..12], &quad_indexes(4));
    assert_eq!(&indexes[12..], &quad_indexes(8));
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].first_vertex, 4);
}

#[test]
fn scenario_two_invisible_still_draws() {
    let mut bucket = RenderBucket::new(RecordingBuffer::default());
    bucket.add_overlay_handle(Box::new(TestHandle::new(0, true)));
    bucket.add_overlay_handle(Box::new(TestHandle::new(4, true)));
    bucket.update(screen());

    let mut resolver = MaskResolver::default();
    bucket.collect_overlay_handles(&mut resolver);
    resolver.resolve(&[false, false]);

    bucket.render(screen());
    let (indexes, spans, _) = &bucket.buffer().mutations[0];
    assert!(indexes.is_empty());
    assert!(spans.is_empty());
    assert_eq!(bucket.buffer().draw_calls, 1);
}

#[test]
fn repeated_update_with_same_transform_renders_identical_mutations() {
    let transform = ScreenTransform::new(1.5, Angle::new(0.3), Vec2::new(200.0, 100.0));
    let mut bucket = RenderBucket::new(RecordingBuffer::default());
    bucket.add_overlay_handle(Box::new(IconHandle::new(
        Vec2::new(10.0, 10.0),
        Vec2::new(16.0, 16.0),
        0,
    )));
    bucket.add_overlay_handle(Box::new(LabelHandle::new(
        Vec2::new(10.0, 10.0),
        Vec2::new(48.0, 12.0),
        Vec2::new(0.0, 18.0),
        4,
    )));

    bucket.update(transform);
    let mut resolver = MaskResolver::default();
    bucket.collect_overlay_handles(&mut resolver);
    resolver.resolve(&[true, true]);
    bucket.render(transform);

    // Second update with the same transform, no visibility change.
    bucket.update(transform);
    bucket.render(transform);

    let first = &bucket.buffer().mutations[0];
    let second = &bucket.buffer().mutations[1];
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
    assert_eq!(bucket.buffer().draw_calls, 2);
}

#[test]
fn update_reaches_every_owned_overlay() {
    let updates = Arc::new(AtomicUsize::new(0));
    let mut bucket = RenderBucket::new(RecordingBuffer::default());
    for first in [0u16, 4, 8] {
        bucket.add_overlay_handle(Box::new(TestHandle::with_update_counter(
            first,
            false,
            updates.clone(),
        )));
    }
    bucket.update(screen());
    assert_eq!(updates.load(Ordering::SeqCst), 3);
    bucket.update(screen());
    assert_eq!(updates.load(Ordering::SeqCst), 6);
}

#[test]
fn collect_hands_every_overlay_in_insertion_order() {
    let mut bucket = RenderBucket::new(RecordingBuffer::default());
    for first in [0u16, 4, 8] {
        bucket.add_overlay_handle(Box::new(TestHandle::new(first, false)));
    }
    bucket.update(screen());
    let mut resolver = MaskResolver::default();
    bucket.collect_overlay_handles(&mut resolver);
    let order: Vec<f32> = resolver
        .collected
        .iter()
        .map(|h| h.screen_rect().center().x)
        .collect();
    assert_eq!(order, vec![0.0, 4.0, 8.0]);
}

struct DropProbeBuffer {
    drops: Arc<AtomicUsize>,
}

impl Drop for DropProbeBuffer {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

impl BatchBuffer for DropProbeBuffer {
    fn apply_mutation(&mut self, _indexes: &IndexMutator, _attributes: &AttributeMutator) {}
    fn render(&mut self) {}
}

struct DropProbeHandle {
    drops: Arc<AtomicUsize>,
    visible: VisibilityFlag,
}

impl Drop for DropProbeHandle {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

impl OverlayHandle for DropProbeHandle {
    fn is_visible(&self) -> bool {
        self.visible.get()
    }
    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }
    fn update(&mut self, _screen: ScreenTransform) {}
    fn has_dynamic_attributes(&self) -> bool {
        false
    }
    fn screen_rect(&self) -> ScreenRect {
        ScreenRect::default()
    }
    fn element_indexes(&self, _mutator: &mut IndexMutator) {}
    fn attribute_mutation(&self, _mutator: &mut AttributeMutator, _screen: ScreenTransform) {}
}

#[test]
fn drop_releases_buffer_and_every_overlay_exactly_once() {
    let buffer_drops = Arc::new(AtomicUsize::new(0));
    let overlay_drops = Arc::new(AtomicUsize::new(0));
    {
        let mut bucket = RenderBucket::new(DropProbeBuffer {
            drops: buffer_drops.clone(),
        });
        for _ in 0..3 {
            bucket.add_overlay_handle(Box::new(DropProbeHandle {
                drops: overlay_drops.clone(),
                visible: VisibilityFlag::default(),
            }));
        }
        // Never updated or rendered: the partially assembled bucket still
        // releases everything it owns.
    }
    assert_eq!(buffer_drops.load(Ordering::SeqCst), 1);
    assert_eq!(overlay_drops.load(Ordering::SeqCst), 3);
}
