//! Context Integration Tests
//!
//! Tests for:
//! - Context lifecycle: create, destroy, backend selection
//! - Create/destroy pairs for every resource kind
//! - Handle checking: stale, double destroy, foreign Context
//! - View/Scene/Renderer façades and frame submission

use std::sync::Arc;

use keystone::backend::{HeadlessBackend, RenderBackend};
use keystone::prelude::*;
use keystone::{BackendKind, ResourceKind};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn headless(ctx: &Context) -> &HeadlessBackend {
    ctx.backend()
        .as_any()
        .downcast_ref::<HeadlessBackend>()
        .expect("default backend is headless")
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn context_create_defaults_to_headless() {
    init_logger();
    let ctx = Context::create().unwrap();
    assert_eq!(ctx.backend_kind(), BackendKind::Headless);
    for kind in ResourceKind::ALL {
        assert_eq!(ctx.live_count(kind), 0);
    }
}

#[test]
fn context_create_unavailable_backend_fails() {
    let result = Context::create_with(ContextSettings {
        backend: BackendKind::Vulkan,
        ..Default::default()
    });
    assert!(matches!(result, Err(KeystoneError::BackendUnavailable(_))));
}

#[test]
fn context_create_with_mismatched_backend_fails() {
    let settings = ContextSettings {
        backend: BackendKind::Metal,
        ..Default::default()
    };
    let result = Context::create_with_backend(settings, Box::new(HeadlessBackend::new()));
    assert!(matches!(result, Err(KeystoneError::BackendInit(_))));
}

#[test]
fn context_ids_are_unique() {
    let a = Context::create().unwrap();
    let b = Context::create().unwrap();
    assert_ne!(a.id(), b.id());
}

#[test]
fn context_settings_label_is_kept() {
    let ctx = Context::create_with(ContextSettings {
        label: Some("viewer".into()),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(ctx.settings().label.as_deref(), Some("viewer"));
    assert!(format!("{ctx:?}").contains("viewer"));
}

// ============================================================================
// Create / Destroy Pairs
// ============================================================================

#[test]
fn create_destroy_every_kind() -> anyhow::Result<()> {
    init_logger();
    let mut ctx = Context::create()?;

    let swap_chain = ctx.create_swap_chain()?;
    let renderer = ctx.create_renderer()?;
    let view = ctx.create_view()?;
    let scene = ctx.create_scene()?;
    let camera = ctx.create_camera()?;
    for kind in [
        ResourceKind::SwapChain,
        ResourceKind::Renderer,
        ResourceKind::View,
        ResourceKind::Scene,
        ResourceKind::Camera,
    ] {
        assert_eq!(ctx.live_count(kind), 1, "{kind}");
    }
    assert_eq!(headless(&ctx).object_count(), 5);

    ctx.destroy_swap_chain(swap_chain)?;
    ctx.destroy_renderer(renderer)?;
    ctx.destroy_view(view)?;
    ctx.destroy_scene(scene)?;
    ctx.destroy_camera(camera)?;

    for kind in ResourceKind::ALL {
        assert_eq!(ctx.live_count(kind), 0, "{kind}");
    }
    assert_eq!(headless(&ctx).object_count(), 0);
    Ok(())
}

#[test]
fn handles_are_distinct_per_create() {
    let mut ctx = Context::create().unwrap();
    let a = ctx.create_view().unwrap();
    let b = ctx.create_view().unwrap();
    assert_ne!(a, b);
    assert_eq!(a.context(), ctx.id());
}

// ============================================================================
// Handle Checking
// ============================================================================

#[test]
fn double_destroy_is_stale() {
    let mut ctx = Context::create().unwrap();
    let scene = ctx.create_scene().unwrap();
    ctx.destroy_scene(scene).unwrap();
    assert_eq!(
        ctx.destroy_scene(scene).unwrap_err(),
        KeystoneError::StaleHandle { kind: ResourceKind::Scene }
    );
}

#[test]
fn destroyed_handle_is_not_revived_by_reuse() {
    let mut ctx = Context::create().unwrap();
    let old = ctx.create_camera().unwrap();
    ctx.destroy_camera(old).unwrap();
    let new = ctx.create_camera().unwrap();

    assert_ne!(old, new);
    assert!(ctx.destroy_camera(old).is_err());
    assert!(ctx.destroy_camera(new).is_ok());
}

#[test]
fn is_alive_tracks_lifetime_and_owner() {
    let mut a = Context::create().unwrap();
    let b = Context::create().unwrap();
    let camera = a.create_camera().unwrap();

    assert!(a.is_alive(camera));
    assert!(!b.is_alive(camera));
    a.destroy_camera(camera).unwrap();
    assert!(!a.is_alive(camera));
}

#[test]
fn foreign_handle_is_rejected() {
    let mut a = Context::create().unwrap();
    let mut b = Context::create().unwrap();
    let view_a = a.create_view().unwrap();
    let scene_b = b.create_scene().unwrap();

    assert_eq!(
        b.destroy_view(view_a).unwrap_err(),
        KeystoneError::ForeignHandle { kind: ResourceKind::View }
    );
    assert_eq!(
        a.view(view_a).unwrap().set_scene(scene_b).unwrap_err(),
        KeystoneError::ForeignHandle { kind: ResourceKind::Scene }
    );
    // Still owned and live in its own Context.
    assert!(a.destroy_view(view_a).is_ok());
}

#[test]
fn handles_of_destroyed_context_are_foreign_everywhere() {
    let mut a = Context::create().unwrap();
    let scene = a.create_scene().unwrap();
    a.destroy();

    let mut b = Context::create().unwrap();
    assert!(matches!(
        b.destroy_scene(scene),
        Err(KeystoneError::ForeignHandle { .. })
    ));
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn destroy_releases_everything() {
    init_logger();
    let entities = Arc::new(EntityManager::new());
    let mut ctx =
        Context::create_with_entity_manager(ContextSettings::default(), Arc::clone(&entities))
            .unwrap();
    let view = ctx.create_view().unwrap();
    let scene = ctx.create_scene().unwrap();
    ctx.view(view).unwrap().set_scene(scene).unwrap();
    let e = entities.create();
    ctx.scene(scene).unwrap().add_entity(e).unwrap();

    ctx.destroy();

    // Entities outlive the Context; they are not Context resources.
    assert!(entities.is_alive(e));
}

#[test]
fn drop_tears_down_like_destroy() {
    let mut ctx = Context::create().unwrap();
    ctx.create_renderer().unwrap();
    ctx.create_swap_chain().unwrap();
    drop(ctx);
}

// ============================================================================
// View & Scene Façades
// ============================================================================

#[test]
fn view_binds_scene_and_camera() -> anyhow::Result<()> {
    let mut ctx = Context::create()?;
    let view = ctx.create_view()?;
    let scene = ctx.create_scene()?;
    let camera = ctx.create_camera()?;

    ctx.view(view)?.set_scene(scene)?.set_camera(camera)?;

    let facade = ctx.view(view)?;
    assert_eq!(facade.scene(), Some(scene));
    assert_eq!(facade.camera(), Some(camera));
    Ok(())
}

#[test]
fn view_set_scene_rejects_stale_scene() {
    let mut ctx = Context::create().unwrap();
    let view = ctx.create_view().unwrap();
    let scene = ctx.create_scene().unwrap();
    ctx.destroy_scene(scene).unwrap();

    assert_eq!(
        ctx.view(view).unwrap().set_scene(scene).unwrap_err(),
        KeystoneError::StaleHandle { kind: ResourceKind::Scene }
    );
    assert_eq!(ctx.view(view).unwrap().scene(), None);
}

#[test]
fn destroying_scene_detaches_it_from_views() {
    let mut ctx = Context::create().unwrap();
    let view = ctx.create_view().unwrap();
    let scene = ctx.create_scene().unwrap();
    let camera = ctx.create_camera().unwrap();
    ctx.view(view).unwrap().set_scene(scene).unwrap().set_camera(camera).unwrap();

    ctx.destroy_scene(scene).unwrap();
    ctx.destroy_camera(camera).unwrap();

    let facade = ctx.view(view).unwrap();
    assert_eq!(facade.scene(), None);
    assert_eq!(facade.camera(), None);
}

#[test]
fn scene_add_entity_is_idempotent() {
    let mut ctx = Context::create().unwrap();
    let scene = ctx.create_scene().unwrap();
    let e = EntityManager::get().create();

    let mut facade = ctx.scene(scene).unwrap();
    facade.add_entity(e).unwrap().add_entity(e).unwrap();
    assert_eq!(facade.entity_count(), 1);
    assert!(facade.contains(e));
    assert_eq!(facade.renderable_count(), 0);
    EntityManager::get().destroy(e);
}

#[test]
fn scene_add_dead_entity_fails() {
    let mut ctx = Context::create().unwrap();
    let scene = ctx.create_scene().unwrap();
    let em = EntityManager::get();
    let e = em.create();
    em.destroy(e);

    assert_eq!(
        ctx.scene(scene).unwrap().add_entity(e).unwrap_err(),
        KeystoneError::DeadEntity(e)
    );
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn render_requires_scene_and_camera() {
    let mut ctx = Context::create().unwrap();
    let renderer = ctx.create_renderer().unwrap();
    let view = ctx.create_view().unwrap();

    assert!(matches!(
        ctx.renderer(renderer).unwrap().render(view),
        Err(KeystoneError::InvalidState(_))
    ));

    let scene = ctx.create_scene().unwrap();
    ctx.view(view).unwrap().set_scene(scene).unwrap();
    assert!(matches!(
        ctx.renderer(renderer).unwrap().render(view),
        Err(KeystoneError::InvalidState(_))
    ));
}

#[test]
fn render_empty_scene_counts_frames() -> anyhow::Result<()> {
    init_logger();
    let mut ctx = Context::create()?;
    let renderer = ctx.create_renderer()?;
    let view = ctx.create_view()?;
    let scene = ctx.create_scene()?;
    let camera = ctx.create_camera()?;
    ctx.view(view)?.set_scene(scene)?.set_camera(camera)?;

    let mut facade = ctx.renderer(renderer)?;
    let first = facade.render(view)?;
    let second = facade.render(view)?;

    assert_eq!(first.frame, 1);
    assert_eq!(second.frame, 2);
    assert!(second.drawn.is_empty());
    assert_eq!(facade.frame_count(), 2);
    assert_eq!(facade.last_frame(), Some(&second));
    Ok(())
}

#[test]
fn render_with_foreign_view_fails() {
    let mut a = Context::create().unwrap();
    let mut b = Context::create().unwrap();
    let renderer = a.create_renderer().unwrap();
    let view = b.create_view().unwrap();

    assert_eq!(
        a.renderer(renderer).unwrap().render(view).unwrap_err(),
        KeystoneError::ForeignHandle { kind: ResourceKind::View }
    );
}

// ============================================================================
// Scenario: view setup and teardown
// ============================================================================

#[test]
fn scenario_view_setup_and_teardown() -> anyhow::Result<()> {
    init_logger();
    let mut ctx = Context::create()?;
    let view = ctx.create_view()?;
    let scene = ctx.create_scene()?;
    let camera = ctx.create_camera()?;

    ctx.view(view)?.set_scene(scene)?;
    ctx.view(view)?.set_camera(camera)?;
    assert_eq!(ctx.view(view)?.scene(), Some(scene));
    assert_eq!(ctx.view(view)?.camera(), Some(camera));

    ctx.destroy_view(view)?;
    ctx.destroy_scene(scene)?;
    ctx.destroy_camera(camera)?;
    for kind in ResourceKind::ALL {
        assert_eq!(ctx.live_count(kind), 0);
    }
    ctx.destroy();
    Ok(())
}
