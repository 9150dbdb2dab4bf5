use keystone_backend::FrameStats;
use keystone_core::{KeystoneError, Result};

use crate::context::Context;
use crate::handle::{Renderer, View};

#[derive(Debug, Default)]
pub(crate) struct RendererState {
    pub frame_count: u64,
    pub last_frame: Option<FrameStats>,
}

/// Borrowed renderer façade.
#[derive(Debug)]
pub struct RendererMut<'a> {
    ctx: &'a mut Context,
    handle: Renderer,
}

impl<'a> RendererMut<'a> {
    pub(crate) fn new(ctx: &'a mut Context, handle: Renderer) -> Self {
        Self { ctx, handle }
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> Renderer {
        self.handle
    }

    /// Draws one frame of `view`.
    ///
    /// The view must have a live scene and a live camera; both are checked
    /// before anything reaches the backend.
    pub fn render(&mut self, view: View) -> Result<FrameStats> {
        let ctx = &mut *self.ctx;
        ctx.gc();

        let record = ctx.view_record(view)?;
        let view_native = record.native;
        let state = record.state;
        let scene = state
            .scene
            .ok_or_else(|| KeystoneError::InvalidState(format!("{view:?} has no scene")))?;
        let camera = state
            .camera
            .ok_or_else(|| KeystoneError::InvalidState(format!("{view:?} has no camera")))?;
        if ctx.scenes.get(scene)?.state.is_empty() {
            log::debug!("{view:?} renders an empty {scene:?}");
        }
        ctx.cameras.get(camera)?;

        let renderer_native = ctx.renderers.get(self.handle)?.native;
        let stats = ctx.backend.render(renderer_native, view_native)?;

        let renderer = ctx.renderers.get_mut(self.handle)?;
        renderer.state.frame_count += 1;
        renderer.state.last_frame = Some(stats.clone());
        Ok(stats)
    }

    /// Frames rendered so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.ctx
            .renderers
            .get(self.handle)
            .map_or(0, |r| r.state.frame_count)
    }

    /// Statistics of the most recent frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<&FrameStats> {
        self.ctx
            .renderers
            .get(self.handle)
            .ok()
            .and_then(|r| r.state.last_frame.as_ref())
    }
}
