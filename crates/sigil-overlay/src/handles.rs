use sigil_geom::{ScreenRect, ScreenTransform, Vec2};

use crate::{AttributeMutator, AttributeSpan, IndexMutator, OverlayHandle, VisibilityFlag};

pub const QUAD_VERTEX_COUNT: u16 = 4;

/// Two-triangle index pattern over a quad's four vertices.
#[inline]
pub fn quad_indexes(first_vertex: u16) -> [u16; 6] {
    let b = first_vertex;
    [b, b + 1, b + 2, b, b + 2, b + 3]
}

// Corner order matches quad_indexes: min, (max.x, min.y), max, (min.x, max.y).
fn corner_data(rect: ScreenRect) -> Vec<f32> {
    vec![
        rect.min.x, rect.min.y, rect.max.x, rect.min.y, rect.max.x, rect.max.y, rect.min.x,
        rect.max.y,
    ]
}

/// Fixed-size icon quad anchored at a world pivot.
///
/// Its vertices are uploaded once by the batching stage and positioned by
/// the shader, so attributes never change after upload; only the placement
/// rect is refreshed for arbitration.
pub struct IconHandle {
    pivot: Vec2,
    size_px: Vec2,
    first_vertex: u16,
    rect: ScreenRect,
    visible: VisibilityFlag,
}

impl IconHandle {
    pub fn new(pivot: Vec2, size_px: Vec2, first_vertex: u16) -> Self {
        Self {
            pivot,
            size_px,
            first_vertex,
            rect: ScreenRect::default(),
            visible: VisibilityFlag::default(),
        }
    }

    pub fn first_vertex(&self) -> u16 {
        self.first_vertex
    }
}

impl OverlayHandle for IconHandle {
    fn is_visible(&self) -> bool {
        self.visible.get()
    }

    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    fn update(&mut self, screen: ScreenTransform) {
        self.rect = ScreenRect::from_center_size(screen.apply(self.pivot), self.size_px);
    }

    fn has_dynamic_attributes(&self) -> bool {
        false
    }

    fn screen_rect(&self) -> ScreenRect {
        self.rect
    }

    fn element_indexes(&self, mutator: &mut IndexMutator) {
        mutator.append(&quad_indexes(self.first_vertex));
    }

    fn attribute_mutation(&self, _mutator: &mut AttributeMutator, _screen: ScreenTransform) {
        // Static geometry; the bucket never routes a dynamic pass here.
    }
}

/// Text label quad that stays axis-aligned while the map rotates, so its
/// corner positions are rewritten on the CPU every visible frame.
pub struct LabelHandle {
    pivot: Vec2,
    size_px: Vec2,
    offset_px: Vec2,
    first_vertex: u16,
    rect: ScreenRect,
    visible: VisibilityFlag,
}

impl LabelHandle {
    pub fn new(pivot: Vec2, size_px: Vec2, offset_px: Vec2, first_vertex: u16) -> Self {
        Self {
            pivot,
            size_px,
            offset_px,
            first_vertex,
            rect: ScreenRect::default(),
            visible: VisibilityFlag::default(),
        }
    }

    pub fn first_vertex(&self) -> u16 {
        self.first_vertex
    }

    fn placement(&self, screen: ScreenTransform) -> ScreenRect {
        let center = screen.apply(self.pivot) + self.offset_px;
        ScreenRect::from_center_size(center, self.size_px)
    }
}

impl OverlayHandle for LabelHandle {
    fn is_visible(&self) -> bool {
        self.visible.get()
    }

    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    fn update(&mut self, screen: ScreenTransform) {
        self.rect = self.placement(screen);
    }

    fn has_dynamic_attributes(&self) -> bool {
        true
    }

    fn screen_rect(&self) -> ScreenRect {
        self.rect
    }

    fn element_indexes(&self, mutator: &mut IndexMutator) {
        mutator.append(&quad_indexes(self.first_vertex));
    }

    fn attribute_mutation(&self, mutator: &mut AttributeMutator, screen: ScreenTransform) {
        mutator.push(AttributeSpan {
            first_vertex: u32::from(self.first_vertex),
            data: corner_data(self.placement(screen)),
        });
    }
}
