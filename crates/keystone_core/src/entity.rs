//! Entity identifiers.
//!
//! An [`Entity`] is a plain integer, not a pointer: it names a renderable
//! object independently of any Context. Identifiers are issued and retired by
//! an [`EntityManager`].
//!
//! # Layout
//!
//! ```text
//!  31        22 21                    0
//! +------------+-----------------------+
//! | generation |         index         |
//! +------------+-----------------------+
//! ```
//!
//! Index 0 is reserved for [`Entity::NULL`]. A retired index is recycled only
//! after [`MIN_FREE_INDICES`] others are queued behind it, and always comes
//! back with a bumped generation. The generation has 10 bits: an index that
//! has been through all 1024 of them is retired for good instead of wrapping,
//! so a stale identifier never aliases a live one.
//!
//! At most [`MAX_ENTITIES`] indices exist. Once they are all issued,
//! [`EntityManager::create`] logs an error and returns [`Entity::NULL`],
//! which every Context treats as dead.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

const INDEX_BITS: u32 = 22;
const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;
const GENERATION_MASK: u32 = (1 << (32 - INDEX_BITS)) - 1;

/// Generation slot value of an index that is never issued again.
const RETIRED: u32 = u32::MAX;

/// Number of retired indices queued before the oldest is reused.
pub const MIN_FREE_INDICES: usize = 1024;

/// Largest number of entities alive at once.
pub const MAX_ENTITIES: usize = INDEX_MASK as usize;

/// Lightweight entity identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(u32);

impl Entity {
    /// The null entity; never issued.
    pub const NULL: Entity = Entity(0);

    #[inline]
    fn from_parts(index: u32, generation: u32) -> Self {
        Self((generation << INDEX_BITS) | index)
    }

    #[inline]
    #[must_use]
    pub fn index(self) -> u32 {
        self.0 & INDEX_MASK
    }

    #[inline]
    #[must_use]
    pub fn generation(self) -> u32 {
        self.0 >> INDEX_BITS
    }

    #[inline]
    #[must_use]
    pub fn is_null(self) -> bool {
        self.index() == 0
    }

    /// Raw identifier as passed across the boundary.
    #[inline]
    #[must_use]
    pub fn to_bits(self) -> u32 {
        self.0
    }

    #[inline]
    #[must_use]
    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

struct Allocator {
    generations: Vec<u32>,
    free: VecDeque<u32>,
    alive: usize,
    retired: u64,
}

impl Allocator {
    fn new() -> Self {
        Self {
            // Slot 0 backs Entity::NULL and is never handed out.
            generations: vec![0],
            free: VecDeque::new(),
            alive: 0,
            retired: 0,
        }
    }

    fn create(&mut self) -> Entity {
        let index = if self.free.len() > MIN_FREE_INDICES {
            self.free.pop_front().unwrap_or_default()
        } else {
            0
        };
        let index = if index == 0 {
            let next = self.generations.len();
            if next >= MAX_ENTITIES {
                log::error!("EntityManager exhausted ({MAX_ENTITIES} entities); issuing NULL");
                return Entity::NULL;
            }
            self.generations.push(0);
            next as u32
        } else {
            index
        };
        self.alive += 1;
        Entity::from_parts(index, self.generations[index as usize])
    }

    fn is_alive(&self, e: Entity) -> bool {
        let index = e.index() as usize;
        index != 0 && index < self.generations.len() && self.generations[index] == e.generation()
    }

    fn destroy(&mut self, e: Entity) -> bool {
        if !self.is_alive(e) {
            return false;
        }
        let index = e.index();
        let slot = &mut self.generations[index as usize];
        if *slot == GENERATION_MASK {
            *slot = RETIRED;
            log::debug!("EntityManager: index {index} exhausted its generations");
        } else {
            *slot += 1;
            self.free.push_back(index);
        }
        self.alive -= 1;
        self.retired += 1;
        true
    }
}

/// Issues and retires [`Entity`] identifiers.
///
/// The manager is internally synchronized, so one instance may be shared by
/// every Context in the process. [`EntityManager::get`] returns the shared
/// instance; [`EntityManager::new`] builds a private one for callers that
/// prefer to pass the allocator explicitly.
pub struct EntityManager {
    inner: Mutex<Allocator>,
}

static SHARED: Lazy<Arc<EntityManager>> = Lazy::new(|| Arc::new(EntityManager::new()));

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityManager")
            .field("alive", &self.alive_count())
            .finish_non_exhaustive()
    }
}

impl EntityManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Allocator::new()),
        }
    }

    /// The process-wide manager. Lives until the process exits.
    #[must_use]
    pub fn get() -> Arc<EntityManager> {
        Arc::clone(&SHARED)
    }

    /// Issues a fresh identifier, or [`Entity::NULL`] once all
    /// [`MAX_ENTITIES`] indices are in use or retired.
    pub fn create(&self) -> Entity {
        self.inner.lock().create()
    }

    /// Issues `n` fresh identifiers under a single lock.
    pub fn create_many(&self, n: usize) -> Vec<Entity> {
        let mut inner = self.inner.lock();
        (0..n).map(|_| inner.create()).collect()
    }

    /// Retires `entity`. Returns `false` if it was already dead.
    pub fn destroy(&self, entity: Entity) -> bool {
        let destroyed = self.inner.lock().destroy(entity);
        if !destroyed {
            log::debug!("EntityManager: destroy of dead entity {entity} ignored");
        }
        destroyed
    }

    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.inner.lock().is_alive(entity)
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.inner.lock().alive
    }

    /// Number of identifiers retired so far. Grows by one per successful
    /// [`destroy`](Self::destroy) and never decreases.
    #[must_use]
    pub fn retired_count(&self) -> u64 {
        self.inner.lock().retired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_null_is_never_issued() {
        let em = EntityManager::new();
        let e = em.create();
        assert!(!e.is_null());
        assert!(!em.is_alive(Entity::NULL));
    }

    #[test]
    fn test_destroy_only_affects_target() {
        let em = EntityManager::new();
        let a = em.create();
        let b = em.create();
        assert!(em.destroy(a));
        assert!(!em.is_alive(a));
        assert!(em.is_alive(b));
        assert!(!em.destroy(a), "second destroy is a no-op");
        assert_eq!(em.alive_count(), 1);
    }

    #[test]
    fn test_indices_not_recycled_before_threshold() {
        let em = EntityManager::new();
        let mut seen = HashSet::new();
        for _ in 0..MIN_FREE_INDICES {
            let e = em.create();
            em.destroy(e);
            assert!(seen.insert(e.index()), "index reused too early");
        }
    }

    #[test]
    fn test_recycled_index_has_new_generation() {
        let em = EntityManager::new();
        let first = em.create();
        em.destroy(first);
        for _ in 0..MIN_FREE_INDICES {
            let e = em.create();
            em.destroy(e);
        }
        let recycled = em.create();
        assert_eq!(recycled.index(), first.index());
        assert_ne!(recycled, first);
        assert!(!em.is_alive(first));
        assert!(em.is_alive(recycled));
    }

    #[test]
    fn test_exhaustion_issues_null() {
        let mut alloc = Allocator::new();
        alloc.generations.resize(MAX_ENTITIES - 1, 0);
        let last = alloc.create();
        assert!(!last.is_null());
        assert!(alloc.create().is_null());
        assert!(!alloc.is_alive(Entity::NULL));
        assert_eq!(alloc.alive, 1);
    }

    #[test]
    fn test_exhausted_generation_retires_index() {
        let mut alloc = Allocator::new();
        let first = alloc.create();
        alloc.generations[first.index() as usize] = GENERATION_MASK;
        let last = Entity::from_parts(first.index(), GENERATION_MASK);
        assert!(alloc.is_alive(last));

        assert!(alloc.destroy(last));
        assert!(alloc.free.is_empty());
        for generation in 0..=GENERATION_MASK {
            assert!(!alloc.is_alive(Entity::from_parts(first.index(), generation)));
        }
        assert!(!alloc.destroy(last));
    }

    #[test]
    fn test_retired_count_tracks_destroys() {
        let em = EntityManager::new();
        let e = em.create();
        assert_eq!(em.retired_count(), 0);
        em.destroy(e);
        em.destroy(e);
        assert_eq!(em.retired_count(), 1);
    }

    #[test]
    fn test_bits_round_trip() {
        let em = EntityManager::new();
        let e = em.create();
        assert_eq!(Entity::from_bits(e.to_bits()), e);
    }
}
