//! Builds demo buckets on worker threads and hands them to the render loop.

use crossbeam_channel::unbounded;
use rayon::ThreadPoolBuilder;

use sigil_bucket::RenderBucket;
use sigil_geom::{ScreenRect, Vec2};
use sigil_overlay::{IconHandle, LabelHandle, OverlayHandle, QUAD_VERTEX_COUNT};

use crate::scene::{BucketSpec, Scene};
use crate::staging::StagingBuffer;

/// One named bucket owned by the render loop.
pub struct DemoBucket {
    pub name: String,
    pub bucket: RenderBucket<StagingBuffer>,
}

/// Builds every bucket in the scene on a worker pool; completed buckets
/// cross back over a channel (single-owner transfer to the render thread)
/// and come out in scene order.
pub fn build_buckets(scene: &Scene, threads: usize) -> Vec<DemoBucket> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("sigil-build-{i}"))
        .build()
        .expect("bucket build pool");
    let (tx, rx) = unbounded::<(usize, DemoBucket)>();
    pool.scope(|scope| {
        for (slot, spec) in scene.buckets.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let _ = tx.send((slot, build_bucket(spec)));
            });
        }
    });
    drop(tx);
    let mut out: Vec<(usize, DemoBucket)> = rx.iter().collect();
    out.sort_by_key(|(slot, _)| *slot);
    out.into_iter().map(|(_, bucket)| bucket).collect()
}

/// Lays the bucket's overlays out on a grid, fills the staging buffer with
/// their initial quads, and moves everything into a fresh bucket.
fn build_bucket(spec: &BucketSpec) -> DemoBucket {
    let total = spec.overlay_count();
    let mut staging = StagingBuffer::with_vertex_capacity(total * usize::from(QUAD_VERTEX_COUNT));
    let cols = (total as f32).sqrt().ceil().max(1.0) as usize;

    let mut handles: Vec<Box<dyn OverlayHandle>> = Vec::with_capacity(total);
    for i in 0..total {
        let col = (i % cols) as f32;
        let row = (i / cols) as f32;
        let pivot = Vec2::new(
            spec.spacing_px * (col + 0.5),
            spec.spacing_px * (row + 0.5),
        );
        let first_vertex = (i * usize::from(QUAD_VERTEX_COUNT)) as u16;
        let (size, offset): (Vec2, Vec2) = if i < spec.icons {
            (Vec2::new(spec.icon_size[0], spec.icon_size[1]), Vec2::ZERO)
        } else {
            (
                Vec2::new(spec.label_size[0], spec.label_size[1]),
                Vec2::new(spec.label_offset[0], spec.label_offset[1]),
            )
        };
        staging.upload(
            u32::from(first_vertex),
            &initial_quad(ScreenRect::from_center_size(pivot + offset, size)),
        );
        if i < spec.icons {
            handles.push(Box::new(IconHandle::new(pivot, size, first_vertex)));
        } else {
            handles.push(Box::new(LabelHandle::new(pivot, size, offset, first_vertex)));
        }
    }

    let mut bucket = RenderBucket::new(staging);
    for handle in handles {
        bucket.add_overlay_handle(handle);
    }
    log::debug!(
        target: "producer",
        "built bucket '{}': {} icons, {} labels, {} vertices",
        spec.name,
        spec.icons,
        spec.labels,
        bucket.buffer().vertex_capacity()
    );
    DemoBucket {
        name: spec.name.clone(),
        bucket,
    }
}

// Corner order matches the quad index pattern the handles emit.
fn initial_quad(rect: ScreenRect) -> [f32; 8] {
    [
        rect.min.x, rect.min.y, rect.max.x, rect.min.y, rect.max.x, rect.max.y, rect.min.x,
        rect.max.y,
    ]
}
