//! Builder Protocol
//!
//! Objects with several optional parameters are configured first and built
//! once: a fresh builder per construction, any number of chained mutators,
//! then a single terminal `build`. Builders are plain values, never created
//! or destroyed through the [`Context`](crate::Context).
//!
//! Every mutator takes the builder by value and hands it back, and `build`
//! consumes it, so a builder cannot be touched after it has been built.
//! Missing or out-of-range configuration surfaces as an error from `build`.
//!
//! ```rust,ignore
//! let vb = VertexBuffer::builder()
//!     .vertex_count(4)
//!     .buffer_count(1)
//!     .build(&mut ctx)?;
//!
//! RenderableManager::builder(1)
//!     .bounding_box(aabb)
//!     .culling(false)
//!     .geometry(0, PrimitiveType::Triangles, vb, ib)
//!     .build(&mut ctx, entity)?;
//! ```

mod index_buffer;
mod renderable;
mod vertex_buffer;

pub use index_buffer::IndexBufferBuilder;
pub use renderable::{MAX_PRIMITIVE_COUNT, MAX_PRIORITY, RenderableBuilder};
pub use vertex_buffer::{MAX_VERTEX_BUFFER_COUNT, VertexBufferBuilder};
