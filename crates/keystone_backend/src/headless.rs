//! In-memory rendering engine.
//!
//! Keeps just enough state to make every forwarded call observable: which
//! objects exist, what each view points at, which entities each scene holds,
//! and what each frame would have drawn. No pixels are produced.

use std::any::Any;

use keystone_core::{Entity, KeystoneError, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{Key, KeyData, SlotMap, new_key_type};

use crate::backend::{BackendKind, NativeId, RenderBackend};
use crate::desc::{FrameStats, IndexBufferDesc, ObjectDesc, RenderableDesc, VertexBufferDesc};

new_key_type! {
    struct ObjectKey;
}

#[derive(Debug)]
enum NativeObject {
    SwapChain,
    Renderer {
        frames: u64,
    },
    View {
        scene: Option<NativeId>,
        camera: Option<NativeId>,
    },
    Scene {
        // Insertion order is draw order.
        entities: Vec<Entity>,
        members: FxHashSet<Entity>,
    },
    Camera,
    VertexBuffer(VertexBufferDesc),
    IndexBuffer(IndexBufferDesc),
}

impl NativeObject {
    fn label(&self) -> &'static str {
        match self {
            NativeObject::SwapChain => "SwapChain",
            NativeObject::Renderer { .. } => "Renderer",
            NativeObject::View { .. } => "View",
            NativeObject::Scene { .. } => "Scene",
            NativeObject::Camera => "Camera",
            NativeObject::VertexBuffer(_) => "VertexBuffer",
            NativeObject::IndexBuffer(_) => "IndexBuffer",
        }
    }
}

/// Reference backend with no GPU.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    objects: SlotMap<ObjectKey, NativeObject>,
    renderables: FxHashMap<Entity, RenderableDesc>,
    shut_down: bool,
}

fn to_native(key: ObjectKey) -> NativeId {
    NativeId(key.data().as_ffi())
}

fn to_key(id: NativeId) -> ObjectKey {
    KeyData::from_ffi(id.0).into()
}

impl HeadlessBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live native objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_live(&self, id: NativeId) -> bool {
        self.objects.contains_key(to_key(id))
    }

    #[must_use]
    pub fn renderable(&self, entity: Entity) -> Option<&RenderableDesc> {
        self.renderables.get(&entity)
    }

    #[must_use]
    pub fn renderable_count(&self) -> usize {
        self.renderables.len()
    }

    /// Entities registered with a scene, in insertion order.
    #[must_use]
    pub fn scene_entities(&self, scene: NativeId) -> &[Entity] {
        match self.objects.get(to_key(scene)) {
            Some(NativeObject::Scene { entities, .. }) => entities,
            _ => &[],
        }
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    fn view_mut(&mut self, view: NativeId) -> Option<(&mut Option<NativeId>, &mut Option<NativeId>)> {
        match self.objects.get_mut(to_key(view)) {
            Some(NativeObject::View { scene, camera }) => Some((scene, camera)),
            _ => None,
        }
    }
}

impl RenderBackend for HeadlessBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Headless
    }

    fn create(&mut self, desc: &ObjectDesc) -> Result<NativeId> {
        let object = match desc {
            ObjectDesc::SwapChain => NativeObject::SwapChain,
            ObjectDesc::Renderer => NativeObject::Renderer { frames: 0 },
            ObjectDesc::View => NativeObject::View {
                scene: None,
                camera: None,
            },
            ObjectDesc::Scene => NativeObject::Scene {
                entities: Vec::new(),
                members: FxHashSet::default(),
            },
            ObjectDesc::Camera => NativeObject::Camera,
            ObjectDesc::VertexBuffer(vb) => NativeObject::VertexBuffer(vb.clone()),
            ObjectDesc::IndexBuffer(ib) => NativeObject::IndexBuffer(*ib),
        };
        Ok(to_native(self.objects.insert(object)))
    }

    fn destroy(&mut self, id: NativeId) {
        match self.objects.remove(to_key(id)) {
            Some(object) => log::trace!("Headless: freed {} {id}", object.label()),
            None => log::warn!("Headless: destroy of unknown object {id}"),
        }
    }

    fn set_view_scene(&mut self, view: NativeId, scene: Option<NativeId>) {
        if let Some((slot, _)) = self.view_mut(view) {
            *slot = scene;
        }
    }

    fn set_view_camera(&mut self, view: NativeId, camera: Option<NativeId>) {
        if let Some((_, slot)) = self.view_mut(view) {
            *slot = camera;
        }
    }

    fn scene_add_entity(&mut self, scene: NativeId, entity: Entity) {
        if let Some(NativeObject::Scene { entities, members }) = self.objects.get_mut(to_key(scene))
            && members.insert(entity)
        {
            entities.push(entity);
        }
    }

    fn scene_remove_entity(&mut self, scene: NativeId, entity: Entity) {
        if let Some(NativeObject::Scene { entities, members }) = self.objects.get_mut(to_key(scene))
            && members.remove(&entity)
        {
            entities.retain(|e| *e != entity);
        }
    }

    fn set_renderable(&mut self, entity: Entity, desc: &RenderableDesc) -> Result<()> {
        for prim in desc.primitives.iter().flatten() {
            for buffer in [prim.vertices, prim.indices] {
                if !self.is_live(buffer) {
                    return Err(KeystoneError::Backend(format!(
                        "renderable {entity} references unknown buffer {buffer}"
                    )));
                }
            }
        }
        self.renderables.insert(entity, desc.clone());
        Ok(())
    }

    fn remove_renderable(&mut self, entity: Entity) {
        self.renderables.remove(&entity);
    }

    fn render(&mut self, renderer: NativeId, view: NativeId) -> Result<FrameStats> {
        let (scene, camera) = match self.objects.get(to_key(view)) {
            Some(NativeObject::View { scene, camera }) => (*scene, *camera),
            _ => return Err(KeystoneError::Backend(format!("{view} is not a view"))),
        };
        let Some(scene) = scene else {
            return Err(KeystoneError::Backend(format!("view {view} has no scene")));
        };
        if camera.is_none() {
            return Err(KeystoneError::Backend(format!("view {view} has no camera")));
        }

        let mut stats = FrameStats::default();
        for &entity in self.scene_entities(scene) {
            let Some(renderable) = self.renderables.get(&entity) else {
                continue;
            };
            if renderable.layer_mask == 0 {
                stats.culled += 1;
                continue;
            }
            stats.primitives += renderable.primitives.iter().flatten().count();
            stats.drawn.push(entity);
        }

        match self.objects.get_mut(to_key(renderer)) {
            Some(NativeObject::Renderer { frames }) => {
                *frames += 1;
                stats.frame = *frames;
            }
            _ => return Err(KeystoneError::Backend(format!("{renderer} is not a renderer"))),
        }
        Ok(stats)
    }

    fn shutdown(&mut self) {
        if !self.objects.is_empty() {
            log::debug!("Headless: shutdown with {} objects still live", self.objects.len());
        }
        self.objects.clear();
        self.renderables.clear();
        self.shut_down = true;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
