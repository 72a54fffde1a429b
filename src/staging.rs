//! CPU mirror of the persistent GPU-side vertex/index buffer.

use sigil_bucket::BatchBuffer;
use sigil_overlay::{AttributeMutator, IndexMutator};

/// Floats per vertex in the demo layout (screen-space position only).
pub const FLOATS_PER_VERTEX: usize = 2;

/// In-memory stand-in for the buffer object a bucket owns: a fixed-capacity
/// attribute store mutated in place, and the index list the draw call
/// consumes, replaced wholesale by each mutation.
pub struct StagingBuffer {
    attributes: Vec<f32>,
    active_indexes: Vec<u16>,
    draw_calls: u64,
    indexes_drawn: u64,
    spans_applied: u64,
}

impl StagingBuffer {
    pub fn with_vertex_capacity(vertices: usize) -> Self {
        Self {
            attributes: vec![0.0; vertices * FLOATS_PER_VERTEX],
            active_indexes: Vec::new(),
            draw_calls: 0,
            indexes_drawn: 0,
            spans_applied: 0,
        }
    }

    /// Build-time fill from the batching stage; same write path the
    /// per-frame mutation uses.
    pub fn upload(&mut self, first_vertex: u32, data: &[f32]) {
        self.write_span(first_vertex, data);
    }

    // Out-of-range spans are a contract violation, not a recoverable error.
    fn write_span(&mut self, first_vertex: u32, data: &[f32]) {
        let start = first_vertex as usize * FLOATS_PER_VERTEX;
        let end = start + data.len();
        assert!(
            end <= self.attributes.len(),
            "attribute span {start}..{end} outside buffer of {} floats",
            self.attributes.len()
        );
        self.attributes[start..end].copy_from_slice(data);
    }

    pub fn vertex_capacity(&self) -> usize {
        self.attributes.len() / FLOATS_PER_VERTEX
    }

    pub fn attributes(&self) -> &[f32] {
        &self.attributes
    }

    pub fn active_index_count(&self) -> usize {
        self.active_indexes.len()
    }

    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }

    pub fn indexes_drawn(&self) -> u64 {
        self.indexes_drawn
    }

    pub fn spans_applied(&self) -> u64 {
        self.spans_applied
    }
}

impl BatchBuffer for StagingBuffer {
    fn apply_mutation(&mut self, indexes: &IndexMutator, attributes: &AttributeMutator) {
        self.active_indexes.clear();
        self.active_indexes.extend_from_slice(indexes.indexes());
        for span in attributes.spans() {
            self.write_span(span.first_vertex, &span.data);
        }
        self.spans_applied += attributes.len() as u64;
    }

    fn render(&mut self) {
        self.draw_calls += 1;
        self.indexes_drawn += self.active_indexes.len() as u64;
        log::trace!(
            target: "draw",
            "draw call over {} indexes",
            self.active_indexes.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_overlay::AttributeSpan;

    #[test]
    fn upload_and_mutation_share_the_write_path() {
        let mut buf = StagingBuffer::with_vertex_capacity(4);
        buf.upload(0, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(&buf.attributes()[..4], &[1.0, 2.0, 3.0, 4.0]);

        let mut indexes = IndexMutator::with_capacity(6);
        indexes.append(&[0, 1, 2, 0, 2, 3]);
        let mut attrs = AttributeMutator::new();
        attrs.push(AttributeSpan {
            first_vertex: 1,
            data: vec![9.0, 9.5],
        });
        buf.apply_mutation(&indexes, &attrs);
        assert_eq!(&buf.attributes()[2..4], &[9.0, 9.5]);
        assert_eq!(buf.active_index_count(), 6);
        assert_eq!(buf.spans_applied(), 1);
    }

    #[test]
    fn mutation_replaces_the_active_index_set() {
        let mut buf = StagingBuffer::with_vertex_capacity(8);
        let mut first = IndexMutator::with_capacity(12);
        first.append(&[0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
        buf.apply_mutation(&first, &AttributeMutator::new());
        assert_eq!(buf.active_index_count(), 12);

        let second = IndexMutator::with_capacity(12);
        buf.apply_mutation(&second, &AttributeMutator::new());
        assert_eq!(buf.active_index_count(), 0);
    }

    #[test]
    fn draw_counters_accumulate() {
        let mut buf = StagingBuffer::with_vertex_capacity(4);
        let mut indexes = IndexMutator::with_capacity(6);
        indexes.append(&[0, 1, 2, 0, 2, 3]);
        buf.apply_mutation(&indexes, &AttributeMutator::new());
        buf.render();
        buf.render();
        assert_eq!(buf.draw_calls(), 2);
        assert_eq!(buf.indexes_drawn(), 12);
    }

    #[test]
    #[should_panic(expected = "outside buffer")]
    fn out_of_range_span_aborts() {
        let mut buf = StagingBuffer::with_vertex_capacity(2);
        buf.upload(1, &[0.0, 0.0, 0.0]);
    }
}
