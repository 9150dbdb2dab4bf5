use keystone_backend::{PrimitiveType, RenderableFlags};
use keystone_core::{BoundingBox, Entity, KeystoneError, Result};
use smallvec::{SmallVec, smallvec};

use crate::context::Context;
use crate::handle::{IndexBuffer, VertexBuffer};
use crate::resources::{PrimitiveRef, Renderable, RenderableManager};

const BUILDER: &str = "RenderableManager::Builder";

/// Highest draw priority; lower draws first.
pub const MAX_PRIORITY: u8 = 7;

/// Upper bound on the primitives one renderable may hold.
pub const MAX_PRIMITIVE_COUNT: usize = u16::MAX as usize;

#[derive(Debug, Clone, Copy)]
struct Geometry {
    index: usize,
    ty: PrimitiveType,
    vertex_buffer: VertexBuffer,
    index_buffer: IndexBuffer,
    range: Option<(u32, u32)>,
}

/// Builder that attaches a renderable component to an entity.
///
/// The primitive count is fixed up front because it sizes the component.
#[derive(Debug, Clone)]
#[must_use]
pub struct RenderableBuilder {
    count: usize,
    bounding_box: Option<BoundingBox>,
    flags: RenderableFlags,
    priority: u8,
    layer_mask: u8,
    geometry: SmallVec<[Geometry; 4]>,
}

impl RenderableManager<'_> {
    /// Starts building a renderable with `count` primitives.
    pub fn builder(count: usize) -> RenderableBuilder {
        RenderableBuilder::new(count)
    }
}

impl RenderableBuilder {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            bounding_box: None,
            flags: RenderableFlags::default(),
            priority: 4,
            layer_mask: 0x1,
            geometry: SmallVec::new(),
        }
    }

    pub fn bounding_box(mut self, aabb: BoundingBox) -> Self {
        self.bounding_box = Some(aabb);
        self
    }

    /// Frustum culling; on unless disabled. Requires a bounding box.
    pub fn culling(mut self, enable: bool) -> Self {
        self.flags.set(RenderableFlags::CULLING, enable);
        self
    }

    pub fn cast_shadows(mut self, enable: bool) -> Self {
        self.flags.set(RenderableFlags::CAST_SHADOWS, enable);
        self
    }

    pub fn receive_shadows(mut self, enable: bool) -> Self {
        self.flags.set(RenderableFlags::RECEIVE_SHADOWS, enable);
        self
    }

    /// Draw order bucket, clamped to `0..=7`.
    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority.min(MAX_PRIORITY);
        self
    }

    pub fn layer_mask(mut self, mask: u8) -> Self {
        self.layer_mask = mask;
        self
    }

    /// Draws the whole index buffer as primitive `index`.
    pub fn geometry(
        self,
        index: usize,
        ty: PrimitiveType,
        vertices: VertexBuffer,
        indices: IndexBuffer,
    ) -> Self {
        self.push_geometry(index, ty, vertices, indices, None)
    }

    /// Draws `count` indices starting at `offset` as primitive `index`.
    pub fn geometry_range(
        self,
        index: usize,
        ty: PrimitiveType,
        vertices: VertexBuffer,
        indices: IndexBuffer,
        offset: u32,
        count: u32,
    ) -> Self {
        self.push_geometry(index, ty, vertices, indices, Some((offset, count)))
    }

    fn push_geometry(
        mut self,
        index: usize,
        ty: PrimitiveType,
        vertex_buffer: VertexBuffer,
        index_buffer: IndexBuffer,
        range: Option<(u32, u32)>,
    ) -> Self {
        self.geometry.retain(|g| g.index != index);
        self.geometry.push(Geometry {
            index,
            ty,
            vertex_buffer,
            index_buffer,
            range,
        });
        self
    }

    /// Attaches the configured component to `entity` in `ctx`.
    ///
    /// Fails with `InvalidArgument` when the primitive count exceeds
    /// [`MAX_PRIMITIVE_COUNT`].
    pub fn build(self, ctx: &mut Context, entity: Entity) -> Result<()> {
        if self.count > MAX_PRIMITIVE_COUNT {
            return Err(KeystoneError::InvalidArgument(format!(
                "{BUILDER}: primitive count {} exceeds {MAX_PRIMITIVE_COUNT}",
                self.count
            )));
        }
        if !ctx.entity_manager().is_alive(entity) {
            return Err(KeystoneError::DeadEntity(entity));
        }

        let culling = self.flags.contains(RenderableFlags::CULLING);
        let bounding_box = match self.bounding_box {
            Some(aabb) if aabb.is_empty() && culling => {
                return Err(KeystoneError::InvalidArgument(format!(
                    "{BUILDER}: culling needs a non-empty bounding box"
                )));
            }
            Some(aabb) => aabb,
            None if culling => {
                return Err(KeystoneError::MissingProperty {
                    builder: BUILDER,
                    property: "boundingBox",
                });
            }
            None => BoundingBox::EMPTY,
        };

        let mut primitives: SmallVec<[Option<PrimitiveRef>; 4]> = smallvec![None; self.count];
        for g in &self.geometry {
            if g.index >= self.count {
                return Err(KeystoneError::InvalidArgument(format!(
                    "{BUILDER}: primitive {} out of range (count is {})",
                    g.index, self.count
                )));
            }
            ctx.vertex_buffer(g.vertex_buffer)?;
            let index_count = ctx.index_buffer(g.index_buffer)?.index_count;
            let (offset, count) = g.range.unwrap_or((0, index_count));
            if u64::from(offset) + u64::from(count) > u64::from(index_count) {
                return Err(KeystoneError::InvalidArgument(format!(
                    "{BUILDER}: primitive {} range {offset}+{count} exceeds {index_count} indices",
                    g.index
                )));
            }
            primitives[g.index] = Some(PrimitiveRef {
                ty: g.ty,
                vertex_buffer: g.vertex_buffer,
                index_buffer: g.index_buffer,
                offset,
                count,
            });
        }

        ctx.attach_renderable(
            entity,
            Renderable {
                bounding_box,
                flags: self.flags,
                priority: self.priority,
                layer_mask: self.layer_mask,
                primitives,
            },
        )
    }
}
