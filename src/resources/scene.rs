use keystone_core::{Entity, KeystoneError, Result};
use rustc_hash::FxHashSet;

use crate::context::Context;
use crate::handle::Scene;

/// Mirror of the backend's scene membership.
#[derive(Debug, Default)]
pub(crate) struct SceneState {
    entities: Vec<Entity>,
    members: FxHashSet<Entity>,
}

impl SceneState {
    pub fn add(&mut self, entity: Entity) -> bool {
        if self.members.insert(entity) {
            self.entities.push(entity);
            true
        } else {
            false
        }
    }

    pub fn remove(&mut self, entity: Entity) -> bool {
        if self.members.remove(&entity) {
            self.entities.retain(|e| *e != entity);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.members.contains(&entity)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Borrowed scene façade.
///
/// Entities are never removed one by one; an entity leaves every scene when
/// it is destroyed.
#[derive(Debug)]
pub struct SceneMut<'a> {
    ctx: &'a mut Context,
    handle: Scene,
}

impl<'a> SceneMut<'a> {
    pub(crate) fn new(ctx: &'a mut Context, handle: Scene) -> Self {
        Self { ctx, handle }
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> Scene {
        self.handle
    }

    /// Registers `entity` for rendering. Adding an entity twice is a no-op.
    pub fn add_entity(&mut self, entity: Entity) -> Result<&mut Self> {
        if !self.ctx.entities.is_alive(entity) {
            return Err(KeystoneError::DeadEntity(entity));
        }
        let scene = self.ctx.scenes.get_mut(self.handle)?;
        if scene.state.add(entity) {
            self.ctx.backend.scene_add_entity(scene.native, entity);
        }
        Ok(self)
    }

    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.ctx.entities.is_alive(entity)
            && self
                .ctx
                .scenes
                .get(self.handle)
                .is_ok_and(|s| s.state.contains(entity))
    }

    /// Entities registered with this scene, in insertion order.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        self.ctx
            .scenes
            .get(self.handle)
            .map(|s| {
                s.state
                    .entities()
                    .iter()
                    .copied()
                    .filter(|e| self.ctx.entities.is_alive(*e))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities().len()
    }

    /// Entities of this scene that carry a renderable component.
    #[must_use]
    pub fn renderable_count(&self) -> usize {
        self.entities()
            .iter()
            .filter(|e| self.ctx.renderables.contains_key(e))
            .count()
    }
}
