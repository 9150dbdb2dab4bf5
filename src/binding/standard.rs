//! The standard surface: engine lifecycle, the five core façades, the three
//! builders and the entity manager.

use keystone_backend::PrimitiveType;
use keystone_core::{BoundingBox, Entity};

use super::boundary::{
    ENGINE, ENTITY_MANAGER, INDEX_BUFFER_BUILDER, RENDERABLE_BUILDER, VERTEX_BUFFER_BUILDER,
};
use super::table::{BindingTable, ClassBinding};
use super::value::{IntoValue, Value};
use crate::builders::{IndexBufferBuilder, RenderableBuilder, VertexBufferBuilder};
use crate::context::Context;
use crate::handle::{Camera, IndexBuffer, Renderer, Scene, VertexBuffer, View};

impl BindingTable {
    /// Registers the standard classes.
    ///
    /// `Engine` can destroy vertex buffers but not index buffers; index
    /// buffers are released with their Context.
    pub fn standard() -> Self {
        BindingTable::new()
            .value_array("float3", &["x", "y", "z"])
            .value_array("Box", &["center", "halfExtent"])
            .class(engine())
            .class(ClassBinding::new("SwapChain"))
            .class(ClassBinding::new("Renderer").function("render", 2, |b, a| {
                let view = b.resource_in::<View>(a.handle(1)?)?;
                let (ctx, renderer) = b.owner_of::<Renderer>(a.this()?)?;
                ctx.renderer(renderer)?.render(view)?;
                Ok(Value::Void)
            }))
            .class(
                ClassBinding::new("View")
                    .function("setScene", 2, |b, a| {
                        let scene = b.resource_in::<Scene>(a.handle(1)?)?;
                        let (ctx, view) = b.owner_of::<View>(a.this()?)?;
                        ctx.view(view)?.set_scene(scene)?;
                        Ok(Value::Void)
                    })
                    .function("setCamera", 2, |b, a| {
                        let camera = b.resource_in::<Camera>(a.handle(1)?)?;
                        let (ctx, view) = b.owner_of::<View>(a.this()?)?;
                        ctx.view(view)?.set_camera(camera)?;
                        Ok(Value::Void)
                    }),
            )
            .class(ClassBinding::new("Scene").function("addEntity", 2, |b, a| {
                let entity: Entity = a.get(1)?;
                let (ctx, scene) = b.owner_of::<Scene>(a.this()?)?;
                ctx.scene(scene)?.add_entity(entity)?;
                Ok(Value::Void)
            }))
            .class(ClassBinding::new("Camera"))
            .class(
                ClassBinding::new("RenderableManager").class_function("Builder", 1, |b, a| {
                    Ok(b.new_builder(RenderableBuilder::new(a.get(0)?)))
                }),
            )
            .class(renderable_builder())
            .class(
                ClassBinding::new("VertexBuffer")
                    .class_function("Builder", 0, |b, _| Ok(b.new_builder(VertexBufferBuilder::new()))),
            )
            .class(vertex_buffer_builder())
            .class(
                ClassBinding::new("IndexBuffer")
                    .class_function("Builder", 0, |b, _| Ok(b.new_builder(IndexBufferBuilder::new()))),
            )
            .class(index_buffer_builder())
            .class(ClassBinding::new("Entity"))
            .class(
                ClassBinding::new(ENTITY_MANAGER)
                    .class_function("get", 0, |b, _| Ok(b.entity_manager_handle()))
                    .function("create", 1, |b, _| Ok(b.entities().create().into_value()))
                    .function("destroy", 2, |b, a| {
                        let entity: Entity = a.get(1)?;
                        b.entities().destroy(entity);
                        Ok(Value::Void)
                    }),
            )
    }
}

fn engine() -> ClassBinding {
    ClassBinding::new(ENGINE)
        .class_function("create", 0, |b, _| b.create_engine())
        .class_function("destroy", 1, |b, a| b.destroy_engine(a.handle(0)?))
        .function("createSwapChain", 1, |b, a| b.create_in(a, Context::create_swap_chain))
        .function("destroySwapChain", 2, |b, a| b.destroy_in(a, Context::destroy_swap_chain))
        .function("createRenderer", 1, |b, a| b.create_in(a, Context::create_renderer))
        .function("destroyRenderer", 2, |b, a| b.destroy_in(a, Context::destroy_renderer))
        .function("createView", 1, |b, a| b.create_in(a, Context::create_view))
        .function("destroyView", 2, |b, a| b.destroy_in(a, Context::destroy_view))
        .function("createScene", 1, |b, a| b.create_in(a, Context::create_scene))
        .function("destroyScene", 2, |b, a| b.destroy_in(a, Context::destroy_scene))
        .function("createCamera", 1, |b, a| b.create_in(a, Context::create_camera))
        .function("destroyCamera", 2, |b, a| b.destroy_in(a, Context::destroy_camera))
        .function("destroyEntity", 2, |b, a| {
            let entity: Entity = a.get(1)?;
            b.engine_mut(a.this()?)?.destroy_entity(entity)?;
            Ok(Value::Void)
        })
        .function("destroyVertexBuffer", 2, |b, a| {
            b.destroy_in(a, Context::destroy_vertex_buffer)
        })
}

fn renderable_builder() -> ClassBinding {
    ClassBinding::new(RENDERABLE_BUILDER)
        .function("build", 3, |b, a| {
            let engine = a.handle(1)?;
            let entity: Entity = a.get(2)?;
            b.engine_mut(engine)?;
            let builder = b.take_builder::<RenderableBuilder>(a.this()?)?;
            builder.build(b.engine_mut(engine)?, entity)?;
            Ok(Value::Void)
        })
        .function("boundingBox", 2, |b, a| {
            let aabb: BoundingBox = a.get(1)?;
            b.update_builder(a.this()?, |r: RenderableBuilder| Ok(r.bounding_box(aabb)))
        })
        .function("culling", 2, |b, a| {
            let enable: bool = a.get(1)?;
            b.update_builder(a.this()?, |r: RenderableBuilder| Ok(r.culling(enable)))
        })
        .function("receiveShadows", 2, |b, a| {
            let enable: bool = a.get(1)?;
            b.update_builder(a.this()?, |r: RenderableBuilder| Ok(r.receive_shadows(enable)))
        })
        .function("castShadows", 2, |b, a| {
            let enable: bool = a.get(1)?;
            b.update_builder(a.this()?, |r: RenderableBuilder| Ok(r.cast_shadows(enable)))
        })
        .function("geometry", 5, |b, a| {
            let index: usize = a.get(1)?;
            let ty: PrimitiveType = a.get(2)?;
            let vertices = b.resource_in::<VertexBuffer>(a.handle(3)?)?;
            let indices = b.resource_in::<IndexBuffer>(a.handle(4)?)?;
            b.update_builder(a.this()?, |r: RenderableBuilder| {
                Ok(r.geometry(index, ty, vertices, indices))
            })
        })
        .function("delete", 1, |b, a| b.delete_builder(a.this()?))
}

fn vertex_buffer_builder() -> ClassBinding {
    ClassBinding::new(VERTEX_BUFFER_BUILDER)
        .function("build", 2, |b, a| {
            let engine = a.handle(1)?;
            b.engine_mut(engine)?;
            let builder = b.take_builder::<VertexBufferBuilder>(a.this()?)?;
            let buffer = builder.build(b.engine_mut(engine)?)?;
            Ok(b.register(engine, buffer))
        })
        .function("vertexCount", 2, |b, a| {
            let count: u32 = a.get(1)?;
            b.update_builder(a.this()?, |v: VertexBufferBuilder| Ok(v.vertex_count(count)))
        })
        .function("bufferCount", 2, |b, a| {
            let count: u8 = a.get(1)?;
            b.update_builder(a.this()?, |v: VertexBufferBuilder| Ok(v.buffer_count(count)))
        })
        .function("delete", 1, |b, a| b.delete_builder(a.this()?))
}

fn index_buffer_builder() -> ClassBinding {
    ClassBinding::new(INDEX_BUFFER_BUILDER)
        .function("build", 2, |b, a| {
            let engine = a.handle(1)?;
            b.engine_mut(engine)?;
            let builder = b.take_builder::<IndexBufferBuilder>(a.this()?)?;
            let buffer = builder.build(b.engine_mut(engine)?)?;
            Ok(b.register(engine, buffer))
        })
        .function("indexCount", 2, |b, a| {
            let count: u32 = a.get(1)?;
            b.update_builder(a.this()?, |i: IndexBufferBuilder| Ok(i.index_count(count)))
        })
        .function("delete", 1, |b, a| b.delete_builder(a.this()?))
}
