use keystone_backend::{IndexBufferDesc, IndexType};
use keystone_core::{KeystoneError, Result};

use crate::context::Context;
use crate::handle::IndexBuffer;

/// Builder for [`IndexBuffer`].
#[derive(Debug, Clone, Copy, Default)]
#[must_use]
pub struct IndexBufferBuilder {
    index_count: Option<u32>,
    index_type: IndexType,
}

impl IndexBuffer {
    /// Starts building an index buffer.
    pub fn builder() -> IndexBufferBuilder {
        IndexBufferBuilder::new()
    }
}

impl IndexBufferBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index_count(mut self, count: u32) -> Self {
        self.index_count = Some(count);
        self
    }

    /// Element type; 32-bit unless set.
    pub fn buffer_type(mut self, ty: IndexType) -> Self {
        self.index_type = ty;
        self
    }

    /// Creates the index buffer in `ctx`.
    pub fn build(self, ctx: &mut Context) -> Result<IndexBuffer> {
        let index_count = match self.index_count {
            Some(n) if n > 0 => n,
            _ => {
                return Err(KeystoneError::MissingProperty {
                    builder: "IndexBuffer::Builder",
                    property: "indexCount",
                });
            }
        };
        ctx.create_index_buffer(IndexBufferDesc {
            index_count,
            index_type: self.index_type,
        })
    }
}
