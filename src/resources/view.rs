use keystone_core::Result;

use crate::context::Context;
use crate::handle::{Camera, Scene, View};

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ViewState {
    pub scene: Option<Scene>,
    pub camera: Option<Camera>,
}

/// Borrowed view façade.
///
/// Setters check that the scene or camera is live and issued by the same
/// Context as the view.
#[derive(Debug)]
pub struct ViewMut<'a> {
    ctx: &'a mut Context,
    handle: View,
}

impl<'a> ViewMut<'a> {
    pub(crate) fn new(ctx: &'a mut Context, handle: View) -> Self {
        Self { ctx, handle }
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> View {
        self.handle
    }

    pub fn set_scene(&mut self, scene: Scene) -> Result<&mut Self> {
        let scene_native = self.ctx.scenes.get(scene)?.native;
        let view = self.ctx.views.get_mut(self.handle)?;
        view.state.scene = Some(scene);
        self.ctx.backend.set_view_scene(view.native, Some(scene_native));
        Ok(self)
    }

    pub fn set_camera(&mut self, camera: Camera) -> Result<&mut Self> {
        let camera_native = self.ctx.cameras.get(camera)?.native;
        let view = self.ctx.views.get_mut(self.handle)?;
        view.state.camera = Some(camera);
        self.ctx.backend.set_view_camera(view.native, Some(camera_native));
        Ok(self)
    }

    #[must_use]
    pub fn scene(&self) -> Option<Scene> {
        self.ctx.views.get(self.handle).ok().and_then(|v| v.state.scene)
    }

    #[must_use]
    pub fn camera(&self) -> Option<Camera> {
        self.ctx.views.get(self.handle).ok().and_then(|v| v.state.camera)
    }
}
