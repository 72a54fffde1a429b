//! Per-frame overlay batching over one shared vertex buffer.
#![forbid(unsafe_code)]

use sigil_geom::ScreenTransform;
use sigil_overlay::{AttributeMutator, IndexMutator, OverlayHandle};

/// Indexes reserved per overlay when pre-sizing the index mutator; the
/// common overlay is a screen-aligned quad of two triangles.
const INDEXES_PER_QUAD: usize = 6;

/// Contract of the persistent buffer a bucket owns.
///
/// Applying a mutation must be visually equivalent to rebuilding the buffer
/// from the final accumulated state, and idempotent per call.
pub trait BatchBuffer {
    /// Apply one frame's accumulated deltas in place.
    fn apply_mutation(&mut self, indexes: &IndexMutator, attributes: &AttributeMutator);

    /// Issue the batched draw call for the current buffer contents.
    fn render(&mut self);
}

/// Contract of the shared visibility arbiter for one frame.
///
/// Every bucket hands over shared references during collection; once all
/// buckets have added and the resolver has finalized, each overlay's
/// `is_visible` reflects the outcome. The resolver carries no internal
/// synchronization: collection from multiple threads requires an external
/// lock spanning the whole collection phase.
pub trait VisibilityResolver<'frame> {
    /// Accept one overlay for this frame's arbitration.
    fn add(&mut self, handle: &'frame dyn OverlayHandle);
}

/// A batch of overlays sharing one vertex buffer and one draw call.
///
/// Owns the buffer and every overlay for its whole lifetime; dropping the
/// bucket releases both exactly once. Overlays keep insertion order, which
/// is update and draw order.
pub struct RenderBucket<B: BatchBuffer> {
    buffer: B,
    overlays: Vec<Box<dyn OverlayHandle>>,
}

impl<B: BatchBuffer> RenderBucket<B> {
    /// Takes exclusive ownership of a fully formed buffer.
    pub fn new(buffer: B) -> Self {
        Self {
            buffer,
            overlays: Vec::new(),
        }
    }

    /// Non-owning view for collaborators that read buffer state.
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Takes exclusive ownership of one overlay and appends it. No
    /// deduplication, no reordering.
    pub fn add_overlay_handle(&mut self, handle: Box<dyn OverlayHandle>) {
        self.overlays.push(handle);
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Push the camera transform to every owned overlay so each recomputes
    /// its screen placement. Runs before collection and render in a frame.
    pub fn update(&mut self, screen: ScreenTransform) {
        for handle in &mut self.overlays {
            handle.update(screen);
        }
    }

    /// Hand a shared reference to every owned overlay to the resolver.
    /// Runs after `update` so the resolver sees fresh placements.
    pub fn collect_overlay_handles<'frame, R>(&'frame self, resolver: &mut R)
    where
        R: VisibilityResolver<'frame> + ?Sized,
    {
        for handle in &self.overlays {
            resolver.add(handle.as_ref());
        }
    }

    /// Accumulate deltas from the visible overlays in insertion order,
    /// apply them to the buffer once, then issue the draw call.
    pub fn render(&mut self, screen: ScreenTransform) {
        if !self.overlays.is_empty() {
            let mut indexes = IndexMutator::with_capacity(INDEXES_PER_QUAD * self.overlays.len());
            let mut attributes = AttributeMutator::new();
            for handle in &self.overlays {
                if !handle.is_visible() {
                    continue;
                }
                handle.element_indexes(&mut indexes);
                if handle.has_dynamic_attributes() {
                    handle.attribute_mutation(&mut attributes, screen);
                }
            }
            self.buffer.apply_mutation(&indexes, &attributes);
        }
        self.buffer.render();
    }
}
