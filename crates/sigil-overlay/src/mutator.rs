/// Write-only accumulator of element indexes for one render pass.
///
/// Pre-sized by the bucket with a quad-per-overlay hint; growth past the
/// hint must not disturb entries already appended.
#[derive(Debug, Default)]
pub struct IndexMutator {
    indexes: Vec<u16>,
}

impl IndexMutator {
    pub fn with_capacity(hint: usize) -> Self {
        Self {
            indexes: Vec::with_capacity(hint),
        }
    }

    #[inline]
    pub fn append(&mut self, indexes: &[u16]) {
        self.indexes.extend_from_slice(indexes);
    }

    #[inline]
    pub fn indexes(&self) -> &[u16] {
        &self.indexes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.indexes.capacity()
    }
}

/// One contiguous run of vertex attribute floats to overwrite in the
/// shared buffer, starting at `first_vertex`.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeSpan {
    pub first_vertex: u32,
    pub data: Vec<f32>,
}

/// Write-only accumulator of attribute spans for one render pass.
///
/// Emission order is preserved: buffer application correlates attribute and
/// index writes by position.
#[derive(Debug, Default)]
pub struct AttributeMutator {
    spans: Vec<AttributeSpan>,
}

impl AttributeMutator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, span: AttributeSpan) {
        self.spans.push(span);
    }

    #[inline]
    pub fn spans(&self) -> &[AttributeSpan] {
        &self.spans
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}
