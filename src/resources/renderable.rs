use keystone_backend::{PrimitiveType, RenderableFlags};
use keystone_core::{BoundingBox, Entity};
use smallvec::SmallVec;

use crate::context::Context;
use crate::handle::{IndexBuffer, VertexBuffer};

/// One draw range of a renderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveRef {
    pub ty: PrimitiveType,
    pub vertex_buffer: VertexBuffer,
    pub index_buffer: IndexBuffer,
    pub offset: u32,
    pub count: u32,
}

/// Renderable component of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    pub bounding_box: BoundingBox,
    pub flags: RenderableFlags,
    pub priority: u8,
    pub layer_mask: u8,
    /// Fixed at build time to the count given to the builder.
    pub primitives: SmallVec<[Option<PrimitiveRef>; 4]>,
}

impl Renderable {
    #[inline]
    #[must_use]
    pub fn is_culling_enabled(&self) -> bool {
        self.flags.contains(RenderableFlags::CULLING)
    }

    #[inline]
    #[must_use]
    pub fn casts_shadows(&self) -> bool {
        self.flags.contains(RenderableFlags::CAST_SHADOWS)
    }

    #[inline]
    #[must_use]
    pub fn receives_shadows(&self) -> bool {
        self.flags.contains(RenderableFlags::RECEIVE_SHADOWS)
    }

    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    pub(crate) fn uses_vertex_buffer(&self, buffer: VertexBuffer) -> bool {
        self.primitives.iter().flatten().any(|p| p.vertex_buffer == buffer)
    }

    pub(crate) fn uses_index_buffer(&self, buffer: IndexBuffer) -> bool {
        self.primitives.iter().flatten().any(|p| p.index_buffer == buffer)
    }
}

/// Borrowed manager of renderable components.
///
/// Components are attached by
/// [`RenderableBuilder::build`](crate::RenderableBuilder::build).
#[derive(Debug)]
pub struct RenderableManager<'a> {
    ctx: &'a mut Context,
}

impl<'a> RenderableManager<'a> {
    pub(crate) fn new(ctx: &'a mut Context) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn has_component(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&Renderable> {
        if !self.ctx.entities.is_alive(entity) {
            return None;
        }
        self.ctx.renderables.get(&entity)
    }

    #[must_use]
    pub fn component_count(&self) -> usize {
        self.ctx.renderables.len()
    }

    /// Removes the component; the entity itself stays alive. Returns `false`
    /// if there was no component.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if self.ctx.renderables.remove(&entity).is_some() {
            self.ctx.backend.remove_renderable(entity);
            log::debug!("Renderable removed from entity {entity}");
            true
        } else {
            false
        }
    }
}
