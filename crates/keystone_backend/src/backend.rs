use std::any::Any;
use std::fmt;

use keystone_core::{Entity, KeystoneError, Result};
use serde::{Deserialize, Serialize};

use crate::desc::{FrameStats, ObjectDesc, RenderableDesc};
use crate::headless::HeadlessBackend;

/// Backend-side identifier of a native engine object.
///
/// Only meaningful to the backend that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeId(pub u64);

impl fmt::Display for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Backend selection, fixed when a Context is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-memory engine with no GPU. Always available.
    #[default]
    Headless,
    OpenGl,
    Vulkan,
    Metal,
}

impl BackendKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Headless => "headless",
            BackendKind::OpenGl => "opengl",
            BackendKind::Vulkan => "vulkan",
            BackendKind::Metal => "metal",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The operations the facade forwards to the external rendering engine.
///
/// Implementations own the native objects; the Context owns the
/// bookkeeping that decides when to call [`RenderBackend::destroy`]. A
/// backend may assume every [`NativeId`] it receives was issued by itself and
/// is still live: the Context checks handles before forwarding.
pub trait RenderBackend: Send + fmt::Debug {
    fn kind(&self) -> BackendKind;

    /// Creates one native object.
    fn create(&mut self, desc: &ObjectDesc) -> Result<NativeId>;

    /// Frees one native object.
    fn destroy(&mut self, id: NativeId);

    /// Points a view at a scene (`None` detaches).
    fn set_view_scene(&mut self, view: NativeId, scene: Option<NativeId>);

    /// Points a view at a camera (`None` detaches).
    fn set_view_camera(&mut self, view: NativeId, camera: Option<NativeId>);

    fn scene_add_entity(&mut self, scene: NativeId, entity: Entity);

    /// Drops an entity from a scene. Used only for teardown of dead entities.
    fn scene_remove_entity(&mut self, scene: NativeId, entity: Entity);

    /// Attaches renderable data to an entity.
    fn set_renderable(&mut self, entity: Entity, desc: &RenderableDesc) -> Result<()>;

    fn remove_renderable(&mut self, entity: Entity);

    /// Draws one frame of `view` with `renderer`.
    fn render(&mut self, renderer: NativeId, view: NativeId) -> Result<FrameStats>;

    /// Releases the engine. No call follows this one.
    fn shutdown(&mut self);

    fn as_any(&self) -> &dyn Any;
}

/// Constructs one of the backends compiled into this crate.
///
/// GPU backends live outside Keystone and are handed to the Context by the
/// embedder, so only [`BackendKind::Headless`] resolves here.
pub fn create_builtin(kind: BackendKind) -> Result<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Headless => Ok(Box::new(HeadlessBackend::new())),
        other => Err(KeystoneError::BackendUnavailable(format!(
            "{other} is not built in; supply it with Context::create_with_backend"
        ))),
    }
}
