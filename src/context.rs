//! Root Authority
//!
//! [`Context`] is the single owner of a rendering backend and of every
//! resource issued against it. It is the only component that allocates or
//! frees dependent resources; façades and builders always route back here.
//!
//! # Lifecycle
//!
//! A Context has two states, *live* and *destroyed*. [`Context::destroy`]
//! consumes the value, so after the transition the Rust type system rejects
//! any further call. Handles issued by a destroyed Context stay `Copy` values
//! but can never resolve again: every other Context rejects them as foreign.
//!
//! ```rust,ignore
//! let mut ctx = Context::create()?;
//! let view = ctx.create_view()?;
//! let scene = ctx.create_scene()?;
//! ctx.view(view)?.set_scene(scene)?;
//! ctx.destroy_view(view)?;
//! ctx.destroy();
//! ```

use std::sync::Arc;

use keystone_backend::{
    BackendKind, IndexBufferDesc, NativeId, ObjectDesc, RenderBackend, RenderableDesc,
    VertexBufferDesc, create_builtin,
};
use keystone_core::{Entity, EntityManager, KeystoneError, ResourceKind, Result};
use rustc_hash::FxHashMap;

use crate::handle::{
    Camera, ContextId, IndexBuffer, Pool, Record, Renderer, Scene, SwapChain, VertexBuffer, View,
};
use crate::resources::{
    IndexBufferInfo, Renderable, RenderableManager, RendererMut, RendererState, SceneMut,
    SceneState, VertexBufferInfo, ViewMut, ViewState,
};
use crate::settings::ContextSettings;

/// Owner of a backend and of every resource created through it.
pub struct Context {
    pub(crate) id: ContextId,
    pub(crate) settings: ContextSettings,
    pub(crate) backend: Box<dyn RenderBackend>,
    pub(crate) entities: Arc<EntityManager>,

    pub(crate) swap_chains: Pool<SwapChain, ()>,
    pub(crate) renderers: Pool<Renderer, RendererState>,
    pub(crate) views: Pool<View, ViewState>,
    pub(crate) scenes: Pool<Scene, SceneState>,
    pub(crate) cameras: Pool<Camera, ()>,
    pub(crate) vertex_buffers: Pool<VertexBuffer, VertexBufferInfo>,
    pub(crate) index_buffers: Pool<IndexBuffer, IndexBufferInfo>,

    pub(crate) renderables: FxHashMap<Entity, Renderable>,

    /// `EntityManager::retired_count` as of the last collection.
    gc_stamp: u64,
    torn_down: bool,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("backend", &self.backend.kind())
            .field("label", &self.settings.display_label())
            .finish_non_exhaustive()
    }
}

impl Context {
    // ========================================================================
    // Construction & Teardown
    // ========================================================================

    /// Creates a Context on the default (headless) backend.
    pub fn create() -> Result<Self> {
        Self::create_with(ContextSettings::default())
    }

    /// Creates a Context on the backend named by `settings`.
    ///
    /// Fails with [`KeystoneError::BackendUnavailable`] when that backend is
    /// not built in. There is no retry: a failed Context is never partially
    /// constructed.
    pub fn create_with(settings: ContextSettings) -> Result<Self> {
        let backend = create_builtin(settings.backend)?;
        Self::create_with_backend(settings, backend)
    }

    /// Creates a Context around an embedder-supplied backend.
    pub fn create_with_backend(
        settings: ContextSettings,
        backend: Box<dyn RenderBackend>,
    ) -> Result<Self> {
        Self::create_with_backend_and_entities(settings, backend, EntityManager::get())
    }

    /// Creates a Context around an embedder-supplied backend that checks
    /// entities against `entities`.
    pub fn create_with_backend_and_entities(
        settings: ContextSettings,
        backend: Box<dyn RenderBackend>,
        entities: Arc<EntityManager>,
    ) -> Result<Self> {
        if backend.kind() != settings.backend {
            return Err(KeystoneError::BackendInit(format!(
                "settings request {} but the supplied backend is {}",
                settings.backend,
                backend.kind()
            )));
        }
        Ok(Self::assemble(settings, backend, entities))
    }

    /// Creates a Context that issues and checks entities against `entities`
    /// instead of the process-wide manager.
    pub fn create_with_entity_manager(
        settings: ContextSettings,
        entities: Arc<EntityManager>,
    ) -> Result<Self> {
        let backend = create_builtin(settings.backend)?;
        Ok(Self::assemble(settings, backend, entities))
    }

    fn assemble(
        settings: ContextSettings,
        backend: Box<dyn RenderBackend>,
        entities: Arc<EntityManager>,
    ) -> Self {
        let id = ContextId::next();
        let entities_stamp = entities.retired_count();
        log::info!(
            "Context {id} ({}) created on {} backend",
            settings.display_label(),
            backend.kind()
        );
        Self {
            id,
            settings,
            backend,
            entities,
            swap_chains: Pool::new(id),
            renderers: Pool::new(id),
            views: Pool::new(id),
            scenes: Pool::new(id),
            cameras: Pool::new(id),
            vertex_buffers: Pool::new(id),
            index_buffers: Pool::new(id),
            renderables: FxHashMap::default(),
            gc_stamp: entities_stamp,
            torn_down: false,
        }
    }

    /// Releases the backend and everything this Context issued.
    ///
    /// Consumes the Context: the live→destroyed transition is one-way.
    pub fn destroy(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        let live: usize = ResourceKind::ALL.iter().map(|k| self.live_count(*k)).sum();
        if live > 0 || !self.renderables.is_empty() {
            log::warn!(
                "Context {} destroyed with {live} live resources and {} renderables; releasing them",
                self.id,
                self.renderables.len()
            );
        }

        // Dependents first: renderables reference buffers, views reference
        // scenes and cameras.
        for (entity, _) in self.renderables.drain() {
            self.backend.remove_renderable(entity);
        }
        let natives: Vec<NativeId> = [
            self.views.drain(),
            self.renderers.drain(),
            self.swap_chains.drain(),
            self.scenes.drain(),
            self.cameras.drain(),
            self.vertex_buffers.drain(),
            self.index_buffers.drain(),
        ]
        .concat();
        for native in natives {
            self.backend.destroy(native);
        }
        self.backend.shutdown();
        log::info!("Context {} destroyed", self.id);
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn id(&self) -> ContextId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// The backend, for embedders that need to reach engine-specific state.
    #[must_use]
    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    #[must_use]
    pub fn settings(&self) -> &ContextSettings {
        &self.settings
    }

    /// The entity manager this Context checks entities against.
    #[must_use]
    pub fn entity_manager(&self) -> &Arc<EntityManager> {
        &self.entities
    }

    /// Number of live resources of one kind.
    #[must_use]
    pub fn live_count(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::SwapChain => self.swap_chains.len(),
            ResourceKind::Renderer => self.renderers.len(),
            ResourceKind::View => self.views.len(),
            ResourceKind::Scene => self.scenes.len(),
            ResourceKind::Camera => self.cameras.len(),
            ResourceKind::VertexBuffer => self.vertex_buffers.len(),
            ResourceKind::IndexBuffer => self.index_buffers.len(),
        }
    }

    // ========================================================================
    // SwapChain
    // ========================================================================

    pub fn create_swap_chain(&mut self) -> Result<SwapChain> {
        let native = self.backend.create(&ObjectDesc::SwapChain)?;
        let handle = self.swap_chains.insert(native, ());
        log::debug!("{handle:?} created ({native})");
        Ok(handle)
    }

    pub fn destroy_swap_chain(&mut self, swap_chain: SwapChain) -> Result<()> {
        let record = self.swap_chains.remove(swap_chain)?;
        self.release(swap_chain, record.native);
        Ok(())
    }

    // ========================================================================
    // Renderer
    // ========================================================================

    pub fn create_renderer(&mut self) -> Result<Renderer> {
        let native = self.backend.create(&ObjectDesc::Renderer)?;
        let handle = self.renderers.insert(native, RendererState::default());
        log::debug!("{handle:?} created ({native})");
        Ok(handle)
    }

    pub fn destroy_renderer(&mut self, renderer: Renderer) -> Result<()> {
        let record = self.renderers.remove(renderer)?;
        self.release(renderer, record.native);
        Ok(())
    }

    /// Borrows a renderer façade.
    pub fn renderer(&mut self, renderer: Renderer) -> Result<RendererMut<'_>> {
        self.renderers.get(renderer)?;
        Ok(RendererMut::new(self, renderer))
    }

    // ========================================================================
    // View
    // ========================================================================

    pub fn create_view(&mut self) -> Result<View> {
        let native = self.backend.create(&ObjectDesc::View)?;
        let handle = self.views.insert(native, ViewState::default());
        log::debug!("{handle:?} created ({native})");
        Ok(handle)
    }

    pub fn destroy_view(&mut self, view: View) -> Result<()> {
        let record = self.views.remove(view)?;
        self.release(view, record.native);
        Ok(())
    }

    /// Borrows a view façade.
    pub fn view(&mut self, view: View) -> Result<ViewMut<'_>> {
        self.views.get(view)?;
        Ok(ViewMut::new(self, view))
    }

    // ========================================================================
    // Scene
    // ========================================================================

    pub fn create_scene(&mut self) -> Result<Scene> {
        let native = self.backend.create(&ObjectDesc::Scene)?;
        let handle = self.scenes.insert(native, SceneState::default());
        log::debug!("{handle:?} created ({native})");
        Ok(handle)
    }

    /// Destroys a scene. Views still pointing at it are detached.
    pub fn destroy_scene(&mut self, scene: Scene) -> Result<()> {
        let record = self.scenes.remove(scene)?;
        for (view, state) in self.views.iter_mut() {
            if state.state.scene == Some(scene) {
                log::warn!("{scene:?} destroyed while attached to {view:?}; detaching");
                state.state.scene = None;
                self.backend.set_view_scene(state.native, None);
            }
        }
        self.release(scene, record.native);
        Ok(())
    }

    /// Borrows a scene façade.
    pub fn scene(&mut self, scene: Scene) -> Result<SceneMut<'_>> {
        self.scenes.get(scene)?;
        Ok(SceneMut::new(self, scene))
    }

    // ========================================================================
    // Camera
    // ========================================================================

    pub fn create_camera(&mut self) -> Result<Camera> {
        let native = self.backend.create(&ObjectDesc::Camera)?;
        let handle = self.cameras.insert(native, ());
        log::debug!("{handle:?} created ({native})");
        Ok(handle)
    }

    /// Destroys a camera. Views still pointing at it are detached.
    pub fn destroy_camera(&mut self, camera: Camera) -> Result<()> {
        let record = self.cameras.remove(camera)?;
        for (view, state) in self.views.iter_mut() {
            if state.state.camera == Some(camera) {
                log::warn!("{camera:?} destroyed while attached to {view:?}; detaching");
                state.state.camera = None;
                self.backend.set_view_camera(state.native, None);
            }
        }
        self.release(camera, record.native);
        Ok(())
    }

    // ========================================================================
    // Buffers
    // ========================================================================

    pub(crate) fn create_vertex_buffer(&mut self, desc: VertexBufferDesc) -> Result<VertexBuffer> {
        let native = self.backend.create(&ObjectDesc::VertexBuffer(desc.clone()))?;
        let handle = self.vertex_buffers.insert(native, VertexBufferInfo::from(desc));
        log::debug!("{handle:?} built ({native})");
        Ok(handle)
    }

    pub(crate) fn create_index_buffer(&mut self, desc: IndexBufferDesc) -> Result<IndexBuffer> {
        let native = self.backend.create(&ObjectDesc::IndexBuffer(desc))?;
        let handle = self.index_buffers.insert(native, IndexBufferInfo::from(desc));
        log::debug!("{handle:?} built ({native})");
        Ok(handle)
    }

    /// Properties of a built vertex buffer.
    pub fn vertex_buffer(&self, buffer: VertexBuffer) -> Result<&VertexBufferInfo> {
        Ok(&self.vertex_buffers.get(buffer)?.state)
    }

    /// Properties of a built index buffer.
    pub fn index_buffer(&self, buffer: IndexBuffer) -> Result<&IndexBufferInfo> {
        Ok(&self.index_buffers.get(buffer)?.state)
    }

    /// Destroys a vertex buffer. Refused while a renderable draws from it.
    pub fn destroy_vertex_buffer(&mut self, buffer: VertexBuffer) -> Result<()> {
        self.vertex_buffers.get(buffer)?;
        self.gc();
        if let Some(entity) = self.user_of(|r| r.uses_vertex_buffer(buffer)) {
            return Err(KeystoneError::InvalidState(format!(
                "{buffer:?} is still used by renderable {entity}"
            )));
        }
        let record = self.vertex_buffers.remove(buffer)?;
        self.release(buffer, record.native);
        Ok(())
    }

    /// Destroys an index buffer. Refused while a renderable draws from it.
    pub fn destroy_index_buffer(&mut self, buffer: IndexBuffer) -> Result<()> {
        self.index_buffers.get(buffer)?;
        self.gc();
        if let Some(entity) = self.user_of(|r| r.uses_index_buffer(buffer)) {
            return Err(KeystoneError::InvalidState(format!(
                "{buffer:?} is still used by renderable {entity}"
            )));
        }
        let record = self.index_buffers.remove(buffer)?;
        self.release(buffer, record.native);
        Ok(())
    }

    fn user_of(&self, uses: impl Fn(&Renderable) -> bool) -> Option<Entity> {
        self.renderables
            .iter()
            .find(|(_, r)| uses(r))
            .map(|(entity, _)| *entity)
    }

    // ========================================================================
    // Entities & Renderables
    // ========================================================================

    /// Destroys an entity: strips its components in this Context, then
    /// retires the identifier in the entity manager.
    ///
    /// Calling [`EntityManager::destroy`] directly has the same observable
    /// effect; this Context collects the leftovers lazily.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<()> {
        if !self.entities.is_alive(entity) {
            return Err(KeystoneError::DeadEntity(entity));
        }
        self.strip_entity(entity);
        self.entities.destroy(entity);
        log::debug!("Entity {entity} destroyed through {}", self.id);
        Ok(())
    }

    /// Borrows the renderable component manager.
    pub fn renderable_manager(&mut self) -> RenderableManager<'_> {
        self.gc();
        RenderableManager::new(self)
    }

    pub(crate) fn attach_renderable(&mut self, entity: Entity, renderable: Renderable) -> Result<()> {
        if !self.entities.is_alive(entity) {
            return Err(KeystoneError::DeadEntity(entity));
        }
        self.gc();
        if self.renderables.contains_key(&entity) {
            return Err(KeystoneError::ComponentExists(entity));
        }
        let desc = self.resolve_renderable(&renderable)?;
        self.backend.set_renderable(entity, &desc)?;
        self.renderables.insert(entity, renderable);
        log::debug!("Renderable attached to entity {entity}");
        Ok(())
    }

    fn resolve_renderable(&self, renderable: &Renderable) -> Result<RenderableDesc> {
        let mut primitives = smallvec::SmallVec::with_capacity(renderable.primitives.len());
        for slot in &renderable.primitives {
            let resolved = match slot {
                Some(prim) => Some(keystone_backend::Primitive {
                    ty: prim.ty,
                    vertices: self.vertex_buffers.get(prim.vertex_buffer)?.native,
                    indices: self.index_buffers.get(prim.index_buffer)?.native,
                    offset: prim.offset,
                    count: prim.count,
                }),
                None => None,
            };
            primitives.push(resolved);
        }
        Ok(RenderableDesc {
            bounding_box: renderable.bounding_box,
            flags: renderable.flags,
            priority: renderable.priority,
            layer_mask: renderable.layer_mask,
            primitives,
        })
    }

    /// Removes every trace of `entity` from this Context.
    pub(crate) fn strip_entity(&mut self, entity: Entity) {
        if self.renderables.remove(&entity).is_some() {
            self.backend.remove_renderable(entity);
        }
        for (_, scene) in self.scenes.iter_mut() {
            if scene.state.remove(entity) {
                self.backend.scene_remove_entity(scene.native, entity);
            }
        }
    }

    /// Collects components of entities retired directly through the entity
    /// manager. A no-op unless some entity was retired since the last pass.
    pub(crate) fn gc(&mut self) {
        let stamp = self.entities.retired_count();
        if stamp == self.gc_stamp {
            return;
        }
        self.gc_stamp = stamp;
        let entities = Arc::clone(&self.entities);
        let dead: Vec<Entity> = self
            .renderables
            .keys()
            .copied()
            .chain(self.scenes.values().flat_map(|s| s.state.entities().iter().copied()))
            .filter(|e| !entities.is_alive(*e))
            .collect();
        for entity in dead {
            log::trace!("Context {}: collecting dead entity {entity}", self.id);
            self.strip_entity(entity);
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn release<H: std::fmt::Debug>(&mut self, handle: H, native: NativeId) {
        self.backend.destroy(native);
        log::debug!("{handle:?} destroyed ({native})");
    }

    pub(crate) fn view_record(&self, view: View) -> Result<&Record<ViewState>> {
        self.views.get(view)
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.teardown();
    }
}
