#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! # Keystone
//!
//! Handle-checked ownership and builder facade over a retained-mode 3D
//! rendering engine.
//!
//! A [`Context`] owns a rendering backend and every resource created through
//! it. Resources come back as small `Copy` handles; using one after it was
//! destroyed, or with a Context that did not issue it, is reported as an
//! error instead of touching freed engine state. Objects with many optional
//! parameters are made with consuming builders, and renderable objects are
//! plain [`Entity`] identifiers from the [`EntityManager`].
//!
//! ```rust,ignore
//! use keystone::prelude::*;
//!
//! let mut ctx = Context::create()?;
//! let renderer = ctx.create_renderer()?;
//! let view = ctx.create_view()?;
//! let scene = ctx.create_scene()?;
//! let camera = ctx.create_camera()?;
//! ctx.view(view)?.set_scene(scene)?.set_camera(camera)?;
//!
//! let vb = VertexBuffer::builder().vertex_count(3).buffer_count(1).build(&mut ctx)?;
//! let ib = IndexBuffer::builder().index_count(3).build(&mut ctx)?;
//!
//! let triangle = EntityManager::get().create();
//! RenderableBuilder::new(1)
//!     .bounding_box(BoundingBox::new(Vec3::ZERO, Vec3::ONE))
//!     .geometry(0, PrimitiveType::Triangles, vb, ib)
//!     .build(&mut ctx, triangle)?;
//! ctx.scene(scene)?.add_entity(triangle)?;
//!
//! ctx.renderer(renderer)?.render(view)?;
//! ctx.destroy();
//! ```
//!
//! Scripting hosts use the [`binding`] module instead, which exposes the
//! same operations through a declarative table and opaque handles.

pub mod binding;
pub mod builders;
pub mod context;
pub mod handle;
pub mod resources;
pub mod settings;

pub use keystone_backend as backend;

pub use builders::{
    IndexBufferBuilder, MAX_PRIMITIVE_COUNT, RenderableBuilder, VertexBufferBuilder,
};
pub use context::Context;
pub use handle::{
    Camera, ContextId, IndexBuffer, Renderer, ResourceHandle, Scene, SwapChain, VertexBuffer,
    View,
};
pub use keystone_backend::{
    AttributeType, BackendKind, FrameStats, IndexType, PrimitiveType, RenderBackend,
    RenderableFlags, VertexAttribute,
};
pub use keystone_core::{
    BoundingBox, Entity, EntityManager, Float3, KeystoneError, ResourceKind, Result,
};
pub use resources::{
    IndexBufferInfo, PrimitiveRef, Renderable, RenderableManager, RendererMut, SceneMut,
    VertexBufferInfo, ViewMut,
};
pub use settings::ContextSettings;

/// Common imports for applications.
pub mod prelude {
    pub use crate::builders::{IndexBufferBuilder, RenderableBuilder, VertexBufferBuilder};
    pub use crate::context::Context;
    pub use crate::handle::{Camera, IndexBuffer, Renderer, Scene, SwapChain, VertexBuffer, View};
    pub use crate::settings::ContextSettings;
    pub use glam::Vec3;
    pub use keystone_backend::{AttributeType, IndexType, PrimitiveType, VertexAttribute};
    pub use keystone_core::{BoundingBox, Entity, EntityManager, KeystoneError, Result};
}
