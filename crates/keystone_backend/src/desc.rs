//! Object descriptors handed to a [`RenderBackend`](crate::RenderBackend).
//!
//! Descriptors are fully validated by the Keystone builders before they get
//! here; backends may trust their contents.

use bitflags::bitflags;
use keystone_core::{BoundingBox, Entity};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::backend::NativeId;

/// What to create.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectDesc {
    SwapChain,
    Renderer,
    View,
    Scene,
    Camera,
    VertexBuffer(VertexBufferDesc),
    IndexBuffer(IndexBufferDesc),
}

// ----------------------------------------------------------------------------
// Vertex buffers
// ----------------------------------------------------------------------------

/// Semantic slot of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexAttribute {
    Position,
    Tangents,
    Color,
    Uv0,
    Uv1,
    BoneIndices,
    BoneWeights,
}

/// Element type of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    Byte4,
    UByte4,
    Short2,
    Short4,
    UShort2,
    UShort4,
    Half4,
    Float,
    Float2,
    Float3,
    Float4,
}

impl AttributeType {
    /// Size of one element in bytes.
    #[must_use]
    pub fn size(self) -> u32 {
        match self {
            AttributeType::Float
            | AttributeType::Byte4
            | AttributeType::UByte4
            | AttributeType::Short2
            | AttributeType::UShort2 => 4,
            AttributeType::Short4
            | AttributeType::UShort4
            | AttributeType::Half4
            | AttributeType::Float2 => 8,
            AttributeType::Float3 => 12,
            AttributeType::Float4 => 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttributeDesc {
    pub attribute: VertexAttribute,
    pub buffer_index: u8,
    pub ty: AttributeType,
    pub byte_offset: u32,
    pub byte_stride: u8,
    pub normalized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VertexBufferDesc {
    pub vertex_count: u32,
    pub buffer_count: u8,
    pub attributes: SmallVec<[VertexAttributeDesc; 4]>,
}

// ----------------------------------------------------------------------------
// Index buffers
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IndexType {
    UShort,
    #[default]
    UInt,
}

impl IndexType {
    #[must_use]
    pub fn size(self) -> u32 {
        match self {
            IndexType::UShort => 2,
            IndexType::UInt => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexBufferDesc {
    pub index_count: u32,
    pub index_type: IndexType,
}

// ----------------------------------------------------------------------------
// Renderables
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrimitiveType {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct RenderableFlags: u8 {
        const CULLING         = 1 << 0;
        const CAST_SHADOWS    = 1 << 1;
        const RECEIVE_SHADOWS = 1 << 2;
    }
}

impl Default for RenderableFlags {
    fn default() -> Self {
        RenderableFlags::CULLING | RenderableFlags::RECEIVE_SHADOWS
    }
}

/// One draw range of a renderable, already resolved to native buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primitive {
    pub ty: PrimitiveType,
    pub vertices: NativeId,
    pub indices: NativeId,
    pub offset: u32,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderableDesc {
    pub bounding_box: BoundingBox,
    pub flags: RenderableFlags,
    pub priority: u8,
    pub layer_mask: u8,
    /// One slot per primitive declared up front; `None` slots draw nothing.
    pub primitives: SmallVec<[Option<Primitive>; 4]>,
}

// ----------------------------------------------------------------------------
// Frames
// ----------------------------------------------------------------------------

/// Summary of one rendered frame, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Sequence number of the frame within its renderer, starting at 1.
    pub frame: u64,
    /// Entities with renderable data that were drawn.
    pub drawn: Vec<Entity>,
    /// Renderables rejected by culling or layer mask.
    pub culled: usize,
    /// Primitive draws issued.
    pub primitives: usize,
}
