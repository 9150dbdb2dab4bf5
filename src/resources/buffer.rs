use keystone_backend::{IndexBufferDesc, IndexType, VertexAttribute, VertexAttributeDesc, VertexBufferDesc};
use smallvec::SmallVec;

/// Properties of a built vertex buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexBufferInfo {
    pub vertex_count: u32,
    pub buffer_count: u8,
    pub attributes: SmallVec<[VertexAttributeDesc; 4]>,
}

impl VertexBufferInfo {
    #[must_use]
    pub fn attribute(&self, attribute: VertexAttribute) -> Option<&VertexAttributeDesc> {
        self.attributes.iter().find(|a| a.attribute == attribute)
    }
}

impl From<VertexBufferDesc> for VertexBufferInfo {
    fn from(desc: VertexBufferDesc) -> Self {
        Self {
            vertex_count: desc.vertex_count,
            buffer_count: desc.buffer_count,
            attributes: desc.attributes,
        }
    }
}

/// Properties of a built index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBufferInfo {
    pub index_count: u32,
    pub index_type: IndexType,
}

impl IndexBufferInfo {
    /// Storage size in bytes.
    #[must_use]
    pub fn byte_size(&self) -> u64 {
        u64::from(self.index_count) * u64::from(self.index_type.size())
    }
}

impl From<IndexBufferDesc> for IndexBufferInfo {
    fn from(desc: IndexBufferDesc) -> Self {
        Self {
            index_count: desc.index_count,
            index_type: desc.index_type,
        }
    }
}
