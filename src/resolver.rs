//! First-come rectangle arbitration for one frame.

use sigil_bucket::VisibilityResolver;
use sigil_geom::ScreenRect;
use sigil_overlay::OverlayHandle;

/// Outcome counts for one frame's arbitration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub accepted: usize,
    pub rejected: usize,
}

/// Per-frame arbiter: an overlay wins its spot when its rect touches the
/// viewport and overlaps no earlier-accepted rect. Add order across buckets
/// is priority order.
pub struct FirstFitResolver<'frame> {
    viewport: ScreenRect,
    pending: Vec<&'frame dyn OverlayHandle>,
}

impl<'frame> FirstFitResolver<'frame> {
    pub fn new(viewport: ScreenRect) -> Self {
        Self {
            viewport,
            pending: Vec::new(),
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Decide visibility for everything collected, writing each verdict
    /// back through the shared handle. Consuming the resolver ends the
    /// frame's borrow of the buckets.
    pub fn finalize(self) -> ResolveStats {
        let Self { viewport, pending } = self;
        let mut taken: Vec<ScreenRect> = Vec::with_capacity(pending.len());
        let mut stats = ResolveStats::default();
        for handle in pending {
            let rect = handle.screen_rect();
            // Linear scan over accepted rects; fine at demo scale.
            let wins =
                viewport.intersects(rect) && !taken.iter().any(|prior| prior.intersects(rect));
            handle.set_visible(wins);
            if wins {
                taken.push(rect);
                stats.accepted += 1;
            } else {
                stats.rejected += 1;
            }
        }
        stats
    }
}

impl<'frame> VisibilityResolver<'frame> for FirstFitResolver<'frame> {
    fn add(&mut self, handle: &'frame dyn OverlayHandle) {
        self.pending.push(handle);
    }
}
