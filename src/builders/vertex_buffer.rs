use keystone_backend::{AttributeType, VertexAttribute, VertexAttributeDesc, VertexBufferDesc};
use keystone_core::{KeystoneError, Result};
use smallvec::SmallVec;

use crate::context::Context;
use crate::handle::VertexBuffer;

const BUILDER: &str = "VertexBuffer::Builder";

/// Largest number of separate buffers one vertex buffer may interleave.
pub const MAX_VERTEX_BUFFER_COUNT: u8 = 8;

/// Builder for [`VertexBuffer`].
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct VertexBufferBuilder {
    vertex_count: Option<u32>,
    buffer_count: Option<u8>,
    attributes: SmallVec<[VertexAttributeDesc; 4]>,
    normalized: SmallVec<[(VertexAttribute, bool); 2]>,
}

impl VertexBuffer {
    /// Starts building a vertex buffer.
    pub fn builder() -> VertexBufferBuilder {
        VertexBufferBuilder::new()
    }
}

impl VertexBufferBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(mut self, count: u32) -> Self {
        self.vertex_count = Some(count);
        self
    }

    pub fn buffer_count(mut self, count: u8) -> Self {
        self.buffer_count = Some(count);
        self
    }

    /// Declares where `attribute` lives. A `byte_stride` of 0 means tightly
    /// packed. Declaring the same attribute again replaces it.
    pub fn attribute(
        mut self,
        attribute: VertexAttribute,
        buffer_index: u8,
        ty: AttributeType,
        byte_offset: u32,
        byte_stride: u8,
    ) -> Self {
        let byte_stride = if byte_stride == 0 {
            ty.size() as u8
        } else {
            byte_stride
        };
        let desc = VertexAttributeDesc {
            attribute,
            buffer_index,
            ty,
            byte_offset,
            byte_stride,
            normalized: false,
        };
        match self.attributes.iter_mut().find(|a| a.attribute == attribute) {
            Some(existing) => *existing = desc,
            None => self.attributes.push(desc),
        }
        self
    }

    /// Marks an integer attribute as normalized to `[0, 1]` / `[-1, 1]`.
    pub fn normalized(mut self, attribute: VertexAttribute, normalized: bool) -> Self {
        self.normalized.retain(|(a, _)| *a != attribute);
        self.normalized.push((attribute, normalized));
        self
    }

    /// Creates the vertex buffer in `ctx`.
    pub fn build(self, ctx: &mut Context) -> Result<VertexBuffer> {
        let vertex_count = match self.vertex_count {
            Some(n) if n > 0 => n,
            _ => {
                return Err(KeystoneError::MissingProperty {
                    builder: BUILDER,
                    property: "vertexCount",
                });
            }
        };
        let buffer_count = self.buffer_count.ok_or(KeystoneError::MissingProperty {
            builder: BUILDER,
            property: "bufferCount",
        })?;
        if !(1..=MAX_VERTEX_BUFFER_COUNT).contains(&buffer_count) {
            return Err(KeystoneError::InvalidArgument(format!(
                "{BUILDER}: bufferCount must be in 1..={MAX_VERTEX_BUFFER_COUNT}, got {buffer_count}"
            )));
        }

        let mut attributes = self.attributes;
        for attr in &attributes {
            if attr.buffer_index >= buffer_count {
                return Err(KeystoneError::InvalidArgument(format!(
                    "{BUILDER}: {:?} uses buffer {} but bufferCount is {buffer_count}",
                    attr.attribute, attr.buffer_index
                )));
            }
        }
        for (attribute, normalized) in self.normalized {
            let attr = attributes
                .iter_mut()
                .find(|a| a.attribute == attribute)
                .ok_or_else(|| {
                    KeystoneError::InvalidArgument(format!(
                        "{BUILDER}: normalized() on undeclared attribute {attribute:?}"
                    ))
                })?;
            attr.normalized = normalized;
        }

        ctx.create_vertex_buffer(VertexBufferDesc {
            vertex_count,
            buffer_count,
            attributes,
        })
    }
}
