//! Binding Surface Integration Tests
//!
//! Tests for:
//! - BindingTable::standard(): class names, entry points, value arrays
//! - Boundary::call dispatch, chaining and argument marshaling
//! - Handle invalidation when an Engine is destroyed
//! - Builder tombstones after build()

use keystone::backend::{HeadlessBackend, RenderBackend};
use keystone::{RenderableFlags, ResourceKind};
use keystone::binding::{BindingTable, Boundary, EntryKind, RawHandle, Value};
use keystone::prelude::*;

fn call(b: &mut Boundary, class: &str, function: &str, args: &[Value]) -> Value {
    b.call(class, function, args)
        .unwrap_or_else(|e| panic!("{class}.{function} failed: {e}"))
}

fn unit_box() -> Value {
    Value::Box([[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]])
}

// ============================================================================
// Table
// ============================================================================

#[test]
fn standard_table_classes() {
    let table = BindingTable::standard();
    let names: Vec<_> = table.classes().iter().map(|c| c.name()).collect();
    for expected in [
        "Engine",
        "SwapChain",
        "Renderer",
        "View",
        "Scene",
        "Camera",
        "RenderableManager",
        "RenderableManager$Builder",
        "VertexBuffer",
        "VertexBuffer$Builder",
        "IndexBuffer",
        "IndexBuffer$Builder",
        "Entity",
        "EntityManager",
    ] {
        assert!(names.contains(&expected), "{expected} missing");
    }
}

#[test]
fn standard_table_engine_entries() {
    let table = BindingTable::standard();
    let engine = table.class_binding("Engine").unwrap();

    assert_eq!(engine.get("create").unwrap().kind(), EntryKind::ClassFunction);
    assert_eq!(engine.get("destroy").unwrap().kind(), EntryKind::ClassFunction);
    for kind in ["SwapChain", "Renderer", "View", "Scene", "Camera"] {
        let create = engine.get(&format!("create{kind}")).unwrap();
        let destroy = engine.get(&format!("destroy{kind}")).unwrap();
        assert_eq!(create.kind(), EntryKind::Function);
        assert_eq!(create.arity(), 1);
        assert_eq!(destroy.arity(), 2);
    }
    assert!(engine.get("destroyEntity").is_some());
    assert!(engine.get("destroyVertexBuffer").is_some());
    assert!(engine.get("destroyIndexBuffer").is_none());

    assert!(table.class_binding("SwapChain").unwrap().entries().is_empty());
    assert!(table.class_binding("Camera").unwrap().entries().is_empty());
}

#[test]
fn unknown_entry_point() {
    let mut b = Boundary::new();
    assert_eq!(
        b.call("Engine", "createSkybox", &[]).unwrap_err(),
        KeystoneError::UnknownEntryPoint("Engine.createSkybox".into())
    );
    assert!(matches!(
        b.call("Skybox", "create", &[]),
        Err(KeystoneError::UnknownEntryPoint(_))
    ));
}

// ============================================================================
// Engine & Resources
// ============================================================================

#[test]
fn engine_create_and_destroy_resources() {
    let mut b = Boundary::new();
    let engine = call(&mut b, "Engine", "create", &[]);
    let raw = engine.as_handle().unwrap();
    assert_eq!(b.class_of(raw).unwrap(), "Engine");

    let view = call(&mut b, "Engine", "createView", &[engine]);
    let scene = call(&mut b, "Engine", "createScene", &[engine]);
    let camera = call(&mut b, "Engine", "createCamera", &[engine]);
    assert_eq!(b.class_of(view.as_handle().unwrap()).unwrap(), "View");
    assert_eq!(b.context(raw).unwrap().live_count(ResourceKind::View), 1);

    call(&mut b, "View", "setScene", &[view, scene]);
    call(&mut b, "View", "setCamera", &[view, camera]);

    call(&mut b, "Engine", "destroyView", &[engine, view]);
    assert_eq!(b.context(raw).unwrap().live_count(ResourceKind::View), 0);
    assert!(!b.contains(view.as_handle().unwrap()));
    assert!(matches!(
        b.call("Engine", "destroyView", &[engine, view]),
        Err(KeystoneError::InvalidHandle(_))
    ));

    call(&mut b, "Engine", "destroy", &[engine]);
    assert!(!b.contains(raw));
}

#[test]
fn wrong_receiver_kind() {
    let mut b = Boundary::new();
    let engine = call(&mut b, "Engine", "create", &[]);
    let scene = call(&mut b, "Engine", "createScene", &[engine]);
    let camera = call(&mut b, "Engine", "createCamera", &[engine]);

    assert_eq!(
        b.call("View", "setScene", &[scene, camera]).unwrap_err(),
        KeystoneError::HandleKindMismatch {
            expected: "View",
            found: "Scene",
        }
    );
    let view = call(&mut b, "Engine", "createView", &[engine]);
    assert_eq!(
        b.call("View", "setScene", &[view, camera]).unwrap_err(),
        KeystoneError::HandleKindMismatch {
            expected: "Scene",
            found: "Camera",
        }
    );
}

#[test]
fn argument_marshaling_errors() {
    let mut b = Boundary::new();
    let engine = call(&mut b, "Engine", "create", &[]);

    assert!(matches!(
        b.call("Engine", "createView", &[]),
        Err(KeystoneError::InvalidArgument(_))
    ));
    assert_eq!(
        b.call("Engine", "destroyEntity", &[engine, Value::Int(3)]).unwrap_err(),
        KeystoneError::ArgumentMismatch {
            entry: "Engine.destroyEntity".into(),
            index: 1,
            expected: "Entity",
        }
    );
    assert!(matches!(
        b.call("Engine", "createView", &[Value::Handle(RawHandle(0xdead_beef))]),
        Err(KeystoneError::InvalidHandle(_))
    ));
}

#[test]
fn engine_destroy_invalidates_its_handles() {
    let mut b = Boundary::new();
    let engine = call(&mut b, "Engine", "create", &[]);
    let view = call(&mut b, "Engine", "createView", &[engine]);
    let scene = call(&mut b, "Engine", "createScene", &[engine]);

    call(&mut b, "Engine", "destroy", &[engine]);

    assert!(!b.contains(view.as_handle().unwrap()));
    assert!(!b.contains(scene.as_handle().unwrap()));
    assert!(matches!(
        b.call("View", "setScene", &[view, scene]),
        Err(KeystoneError::InvalidHandle(_))
    ));
    assert!(matches!(
        b.call("Engine", "createScene", &[engine]),
        Err(KeystoneError::InvalidHandle(_))
    ));
    assert!(matches!(
        b.call("Engine", "destroy", &[engine]),
        Err(KeystoneError::InvalidHandle(_))
    ));
}

#[test]
fn destroyed_resources_leave_the_registry() {
    let mut b = Boundary::new();
    let engine = call(&mut b, "Engine", "create", &[]);
    let before = b.object_count();

    for _ in 0..1000 {
        let view = call(&mut b, "Engine", "createView", &[engine]);
        call(&mut b, "Engine", "destroyView", &[engine, view]);
    }
    assert_eq!(b.object_count(), before);

    for _ in 0..10 {
        call(&mut b, "Engine", "createScene", &[engine]);
    }
    let builder = call(&mut b, "IndexBuffer", "Builder", &[]);
    call(&mut b, "IndexBuffer$Builder", "indexCount", &[builder, Value::Int(3)]);
    call(&mut b, "IndexBuffer$Builder", "build", &[builder, engine]);
    call(&mut b, "IndexBuffer$Builder", "delete", &[builder]);
    assert_eq!(b.object_count(), before + 11);

    call(&mut b, "Engine", "destroy", &[engine]);
    assert_eq!(b.object_count(), 0);
}

#[test]
fn failed_destroy_keeps_the_record() {
    let mut b = Boundary::new();
    let first = call(&mut b, "Engine", "create", &[]);
    let second = call(&mut b, "Engine", "create", &[]);
    let view = call(&mut b, "Engine", "createView", &[first]);

    assert!(b.call("Engine", "destroyView", &[second, view]).is_err());
    assert!(b.contains(view.as_handle().unwrap()));
    call(&mut b, "Engine", "destroyView", &[first, view]);
}

#[test]
fn handles_from_another_engine_are_foreign() {
    let mut b = Boundary::new();
    let first = call(&mut b, "Engine", "create", &[]);
    let second = call(&mut b, "Engine", "create", &[]);
    let view = call(&mut b, "Engine", "createView", &[first]);

    assert_eq!(
        b.call("Engine", "destroyView", &[second, view]).unwrap_err(),
        KeystoneError::ForeignHandle { kind: ResourceKind::View }
    );
}

// ============================================================================
// Builders
// ============================================================================

#[test]
fn vertex_buffer_builder_chain() {
    let mut b = Boundary::new();
    let engine = call(&mut b, "Engine", "create", &[]);

    let builder = call(&mut b, "VertexBuffer", "Builder", &[]);
    assert_eq!(
        b.class_of(builder.as_handle().unwrap()).unwrap(),
        "VertexBuffer$Builder"
    );
    let chained = call(&mut b, "VertexBuffer$Builder", "vertexCount", &[builder, Value::Int(4)]);
    assert_eq!(chained, builder);
    call(&mut b, "VertexBuffer$Builder", "bufferCount", &[chained, Value::Int(1)]);

    let vb = call(&mut b, "VertexBuffer$Builder", "build", &[builder, engine]);
    let ctx = b.context(engine.as_handle().unwrap()).unwrap();
    assert_eq!(ctx.live_count(ResourceKind::VertexBuffer), 1);

    call(&mut b, "Engine", "destroyVertexBuffer", &[engine, vb]);
    let ctx = b.context(engine.as_handle().unwrap()).unwrap();
    assert_eq!(ctx.live_count(ResourceKind::VertexBuffer), 0);
}

#[test]
fn builder_is_consumed_by_build() {
    let mut b = Boundary::new();
    let engine = call(&mut b, "Engine", "create", &[]);
    let builder = call(&mut b, "IndexBuffer", "Builder", &[]);
    call(&mut b, "IndexBuffer$Builder", "indexCount", &[builder, Value::Int(3)]);
    call(&mut b, "IndexBuffer$Builder", "build", &[builder, engine]);

    let consumed = KeystoneError::BuilderConsumed {
        builder: "IndexBuffer$Builder",
    };
    assert_eq!(
        b.call("IndexBuffer$Builder", "indexCount", &[builder, Value::Int(6)]).unwrap_err(),
        consumed
    );
    assert_eq!(
        b.call("IndexBuffer$Builder", "build", &[builder, engine]).unwrap_err(),
        consumed
    );

    call(&mut b, "IndexBuffer$Builder", "delete", &[builder]);
    assert!(!b.contains(builder.as_handle().unwrap()));
}

#[test]
fn failed_build_still_consumes() {
    let mut b = Boundary::new();
    let engine = call(&mut b, "Engine", "create", &[]);
    let builder = call(&mut b, "VertexBuffer", "Builder", &[]);

    assert!(matches!(
        b.call("VertexBuffer$Builder", "build", &[builder, engine]),
        Err(KeystoneError::MissingProperty { .. })
    ));
    assert!(matches!(
        b.call("VertexBuffer$Builder", "vertexCount", &[builder, Value::Int(1)]),
        Err(KeystoneError::BuilderConsumed { .. })
    ));
}

#[test]
fn builder_with_bad_engine_is_not_consumed() {
    let mut b = Boundary::new();
    let builder = call(&mut b, "IndexBuffer", "Builder", &[]);
    call(&mut b, "IndexBuffer$Builder", "indexCount", &[builder, Value::Int(3)]);

    assert!(b.call("IndexBuffer$Builder", "build", &[builder, builder]).is_err());

    let engine = call(&mut b, "Engine", "create", &[]);
    assert!(b.call("IndexBuffer$Builder", "build", &[builder, engine]).is_ok());
}

// ============================================================================
// Entities & Renderables
// ============================================================================

#[test]
fn entity_manager_get_returns_same_handle() {
    let mut b = Boundary::new();
    let first = call(&mut b, "EntityManager", "get", &[]);
    let second = call(&mut b, "EntityManager", "get", &[]);
    assert_eq!(first, second);

    let entity = call(&mut b, "EntityManager", "create", &[first]);
    let e = entity.as_entity().unwrap();
    assert!(EntityManager::get().is_alive(e));
    call(&mut b, "EntityManager", "destroy", &[first, entity]);
    assert!(!EntityManager::get().is_alive(e));
}

#[test]
fn renderable_through_boundary_is_drawn() {
    let mut b = Boundary::new();
    let engine = call(&mut b, "Engine", "create", &[]);
    let renderer = call(&mut b, "Engine", "createRenderer", &[engine]);
    let view = call(&mut b, "Engine", "createView", &[engine]);
    let scene = call(&mut b, "Engine", "createScene", &[engine]);
    let camera = call(&mut b, "Engine", "createCamera", &[engine]);
    call(&mut b, "View", "setScene", &[view, scene]);
    call(&mut b, "View", "setCamera", &[view, camera]);

    let vbb = call(&mut b, "VertexBuffer", "Builder", &[]);
    call(&mut b, "VertexBuffer$Builder", "vertexCount", &[vbb, Value::Int(3)]);
    call(&mut b, "VertexBuffer$Builder", "bufferCount", &[vbb, Value::Int(1)]);
    let vb = call(&mut b, "VertexBuffer$Builder", "build", &[vbb, engine]);

    let ibb = call(&mut b, "IndexBuffer", "Builder", &[]);
    call(&mut b, "IndexBuffer$Builder", "indexCount", &[ibb, Value::Int(3)]);
    let ib = call(&mut b, "IndexBuffer$Builder", "build", &[ibb, engine]);

    let em = call(&mut b, "EntityManager", "get", &[]);
    let entity = call(&mut b, "EntityManager", "create", &[em]);

    let rb = call(&mut b, "RenderableManager", "Builder", &[Value::Int(1)]);
    let rb = call(&mut b, "RenderableManager$Builder", "boundingBox", &[rb, unit_box()]);
    let rb = call(&mut b, "RenderableManager$Builder", "culling", &[rb, Value::Bool(false)]);
    let rb = call(&mut b, "RenderableManager$Builder", "castShadows", &[rb, Value::Bool(true)]);
    let rb = call(&mut b, "RenderableManager$Builder", "receiveShadows", &[rb, Value::Bool(false)]);
    let rb = call(
        &mut b,
        "RenderableManager$Builder",
        "geometry",
        &[rb, Value::Int(0), Value::Int(4), vb, ib],
    );
    call(&mut b, "RenderableManager$Builder", "build", &[rb, engine, entity]);
    call(&mut b, "Scene", "addEntity", &[scene, entity]);
    call(&mut b, "Renderer", "render", &[renderer, view]);

    let e = entity.as_entity().unwrap();
    let ctx = b.context(engine.as_handle().unwrap()).unwrap();
    let headless = ctx
        .backend()
        .as_any()
        .downcast_ref::<HeadlessBackend>()
        .expect("default backend is headless");
    let desc = headless.renderable(e).expect("renderable reached the backend");
    assert!(desc.flags.contains(RenderableFlags::CAST_SHADOWS));
    assert!(!desc.flags.contains(RenderableFlags::RECEIVE_SHADOWS));

    assert!(matches!(
        b.call("Engine", "destroyVertexBuffer", &[engine, vb]),
        Err(KeystoneError::InvalidState(_))
    ));
    call(&mut b, "Engine", "destroyEntity", &[engine, entity]);
    call(&mut b, "Engine", "destroyVertexBuffer", &[engine, vb]);
}

#[test]
fn oversized_renderable_builder_is_rejected() {
    let mut b = Boundary::new();
    let engine = call(&mut b, "Engine", "create", &[]);
    let em = call(&mut b, "EntityManager", "get", &[]);
    let entity = call(&mut b, "EntityManager", "create", &[em]);

    for count in [i64::MAX, 1 << 40] {
        let rb = call(&mut b, "RenderableManager", "Builder", &[Value::Int(count)]);
        call(&mut b, "RenderableManager$Builder", "culling", &[rb, Value::Bool(false)]);
        assert!(matches!(
            b.call("RenderableManager$Builder", "build", &[rb, engine, entity]),
            Err(KeystoneError::InvalidArgument(_))
        ));
        call(&mut b, "RenderableManager$Builder", "delete", &[rb]);
    }
    assert!(matches!(
        b.call("RenderableManager", "Builder", &[Value::Int(-1)]),
        Err(KeystoneError::ArgumentMismatch { .. })
    ));

    call(&mut b, "EntityManager", "destroy", &[em, entity]);
}

#[test]
fn values_round_trip_as_json() {
    let args = vec![
        Value::Int(1),
        Value::Bool(false),
        Value::Float3([0.0, 1.0, 2.0]),
        unit_box(),
        Value::Handle(RawHandle(7)),
    ];
    let text = serde_json::to_string(&args).unwrap();
    let back: Vec<Value> = serde_json::from_str(&text).unwrap();
    assert_eq!(back, args);
}
