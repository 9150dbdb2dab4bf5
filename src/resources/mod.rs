//! Resource Façades
//!
//! Thin proxies over Context-owned engine objects. A façade is borrowed from
//! the [`Context`](crate::Context) for the duration of a call chain, in the
//! manner of a scene-node wrapper, and forwards each operation to the
//! backend after checking every handle involved.
//!
//! - [`RendererMut`]: draws a view
//! - [`ViewMut`]: binds a scene and a camera
//! - [`SceneMut`]: registers entities for rendering
//! - [`RenderableManager`]: per-entity renderable components
//!
//! Swap chains and cameras have no operations beyond create/destroy.

mod buffer;
mod renderable;
mod renderer;
mod scene;
mod view;

pub use buffer::{IndexBufferInfo, VertexBufferInfo};
pub use renderable::{PrimitiveRef, Renderable, RenderableManager};
pub use renderer::RendererMut;
pub use scene::SceneMut;
pub use view::ViewMut;

pub(crate) use renderer::RendererState;
pub(crate) use scene::SceneState;
pub(crate) use view::ViewState;
