//! Keystone Backend Interface
//!
//! The rendering engine itself (rasterization, scene traversal, shader
//! compilation) is an external collaborator. This crate is the narrow seam
//! through which the Keystone Context talks to it:
//!
//! - [`RenderBackend`]: the operations the facade forwards
//! - [`desc`]: plain descriptors describing objects to create
//! - [`HeadlessBackend`]: an in-memory engine used by default and in tests

pub mod backend;
pub mod desc;
pub mod headless;

pub use backend::{BackendKind, NativeId, RenderBackend, create_builtin};
pub use desc::{
    AttributeType, FrameStats, IndexBufferDesc, IndexType, ObjectDesc, Primitive, PrimitiveType,
    RenderableDesc, RenderableFlags, VertexAttribute, VertexAttributeDesc, VertexBufferDesc,
};
pub use headless::HeadlessBackend;
