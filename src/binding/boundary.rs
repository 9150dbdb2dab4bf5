//! Host object registry and call dispatch.
//!
//! The [`Boundary`] owns everything a host creates through the
//! [`BindingTable`]: Contexts, handle records and in-flight builders. The
//! host only ever sees [`RawHandle`]s, generation-checked keys into this
//! registry, so a handle can go stale but can never dangle.

use std::sync::Arc;

use keystone_core::{EntityManager, KeystoneError, ResourceKind, Result};
use slotmap::{Key, KeyData, SlotMap, new_key_type};

use super::table::{Args, BindingTable, EntryKind};
use super::value::{RawHandle, Value};
use crate::builders::{IndexBufferBuilder, RenderableBuilder, VertexBufferBuilder};
use crate::context::Context;
use crate::handle::{
    Camera, IndexBuffer, Renderer, ResourceHandle, Scene, SwapChain, VertexBuffer, View,
};
use crate::settings::ContextSettings;

new_key_type! {
    struct ObjectKey;
}

impl From<ObjectKey> for RawHandle {
    fn from(key: ObjectKey) -> Self {
        RawHandle(key.data().as_ffi())
    }
}

impl From<RawHandle> for ObjectKey {
    fn from(raw: RawHandle) -> Self {
        KeyData::from_ffi(raw.0).into()
    }
}

pub(crate) const ENGINE: &str = "Engine";
pub(crate) const ENTITY_MANAGER: &str = "EntityManager";
pub(crate) const RENDERABLE_BUILDER: &str = "RenderableManager$Builder";
pub(crate) const VERTEX_BUFFER_BUILDER: &str = "VertexBuffer$Builder";
pub(crate) const INDEX_BUFFER_BUILDER: &str = "IndexBuffer$Builder";

// ============================================================================
// Registry objects
// ============================================================================

macro_rules! resource_refs {
    ($($name:ident),* $(,)?) => {
        /// A Context-issued handle, as stored in the registry.
        #[derive(Debug, Clone, Copy)]
        pub(crate) enum ResourceRef {
            $( $name($name), )*
        }

        impl ResourceRef {
            fn kind(self) -> ResourceKind {
                match self {
                    $( ResourceRef::$name(_) => ResourceKind::$name, )*
                }
            }
        }

        $(
            impl BoundResource for $name {
                fn into_ref(self) -> ResourceRef {
                    ResourceRef::$name(self)
                }

                fn from_ref(resource: ResourceRef) -> Option<Self> {
                    match resource {
                        ResourceRef::$name(h) => Some(h),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }
        )*
    };
}

/// Handle types the boundary can register.
pub(crate) trait BoundResource: ResourceHandle {
    fn into_ref(self) -> ResourceRef;
    fn from_ref(resource: ResourceRef) -> Option<Self>;
}

resource_refs!(SwapChain, Renderer, View, Scene, Camera, VertexBuffer, IndexBuffer);

#[derive(Debug)]
pub(crate) enum BuilderSlot {
    Renderable(RenderableBuilder),
    VertexBuffer(VertexBufferBuilder),
    IndexBuffer(IndexBufferBuilder),
    /// Left behind by `build`.
    Consumed(&'static str),
}

impl BuilderSlot {
    fn class(&self) -> &'static str {
        match self {
            BuilderSlot::Renderable(_) => RENDERABLE_BUILDER,
            BuilderSlot::VertexBuffer(_) => VERTEX_BUFFER_BUILDER,
            BuilderSlot::IndexBuffer(_) => INDEX_BUFFER_BUILDER,
            BuilderSlot::Consumed(class) => class,
        }
    }
}

/// Builder types the boundary can register.
pub(crate) trait BoundBuilder: Sized {
    const CLASS: &'static str;

    fn into_slot(self) -> BuilderSlot;
    fn from_slot(slot: BuilderSlot) -> Option<Self>;
}

macro_rules! bound_builder {
    ($ty:ty, $variant:ident, $class:expr) => {
        impl BoundBuilder for $ty {
            const CLASS: &'static str = $class;

            fn into_slot(self) -> BuilderSlot {
                BuilderSlot::$variant(self)
            }

            fn from_slot(slot: BuilderSlot) -> Option<Self> {
                match slot {
                    BuilderSlot::$variant(b) => Some(b),
                    _ => None,
                }
            }
        }
    };
}

bound_builder!(RenderableBuilder, Renderable, RENDERABLE_BUILDER);
bound_builder!(VertexBufferBuilder, VertexBuffer, VERTEX_BUFFER_BUILDER);
bound_builder!(IndexBufferBuilder, IndexBuffer, INDEX_BUFFER_BUILDER);

#[derive(Debug)]
enum Object {
    Engine(Box<Context>),
    Resource {
        engine: ObjectKey,
        resource: ResourceRef,
    },
    Builder(BuilderSlot),
    EntityManager,
}

impl Object {
    fn class(&self) -> &'static str {
        match self {
            Object::Engine(_) => ENGINE,
            Object::Resource { resource, .. } => resource.kind().name(),
            Object::Builder(slot) => slot.class(),
            Object::EntityManager => ENTITY_MANAGER,
        }
    }
}

// ============================================================================
// Boundary
// ============================================================================

/// Registry and dispatcher behind a host binding.
///
/// ```rust,ignore
/// let mut boundary = Boundary::new();
/// let engine = boundary.call("Engine", "create", &[])?;
/// let view = boundary.call("Engine", "createView", &[engine])?;
/// boundary.call("Engine", "destroy", &[engine])?;
///
/// // Every handle the engine issued is gone with it.
/// assert!(boundary.call("View", "setScene", &[view, scene]).is_err());
/// ```
pub struct Boundary {
    table: Arc<BindingTable>,
    settings: ContextSettings,
    entities: Arc<EntityManager>,
    objects: SlotMap<ObjectKey, Object>,
    entity_manager: Option<ObjectKey>,
}

impl std::fmt::Debug for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Boundary")
            .field("objects", &self.objects.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Default for Boundary {
    fn default() -> Self {
        Self::new()
    }
}

impl Boundary {
    /// A boundary exposing [`BindingTable::standard`] over the process-wide
    /// entity manager.
    #[must_use]
    pub fn new() -> Self {
        Self::with_table(
            BindingTable::standard(),
            ContextSettings::default(),
            EntityManager::get(),
        )
    }

    /// A boundary whose `Engine.create` uses `settings`.
    #[must_use]
    pub fn with_settings(settings: ContextSettings) -> Self {
        Self::with_table(BindingTable::standard(), settings, EntityManager::get())
    }

    pub fn with_table(
        table: BindingTable,
        settings: ContextSettings,
        entities: Arc<EntityManager>,
    ) -> Self {
        Self {
            table: Arc::new(table),
            settings,
            entities,
            objects: SlotMap::with_key(),
            entity_manager: None,
        }
    }

    #[must_use]
    pub fn table(&self) -> &BindingTable {
        &self.table
    }

    /// Invokes `class.function`. Member functions take `this` as argument 0.
    pub fn call(&mut self, class: &str, function: &str, args: &[Value]) -> Result<Value> {
        let table = Arc::clone(&self.table);
        let binding = table
            .class_binding(class)
            .ok_or_else(|| KeystoneError::UnknownEntryPoint(format!("{class}.{function}")))?;
        let entry = *table.lookup(class, function)?;
        let args = Args::new(binding.name(), entry.name(), args);

        if args.len() != entry.arity() {
            return Err(KeystoneError::InvalidArgument(format!(
                "{}: expected {} arguments, got {}",
                args.entry(),
                entry.arity(),
                args.len()
            )));
        }
        if entry.kind() == EntryKind::Function {
            let this = args.this()?;
            let found = self.object(this)?.class();
            if found != binding.name() {
                return Err(KeystoneError::HandleKindMismatch {
                    expected: binding.name(),
                    found,
                });
            }
        }

        log::trace!("call {}", args.entry());
        (entry.thunk())(self, &args)
    }

    /// Number of registry entries: engines, live resource records, builders
    /// (built or not) and the entity manager.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Whether `raw` still names a registry entry.
    #[must_use]
    pub fn contains(&self, raw: RawHandle) -> bool {
        self.objects.contains_key(raw.into())
    }

    /// Class of the object behind `raw`.
    pub fn class_of(&self, raw: RawHandle) -> Result<&'static str> {
        Ok(self.object(raw)?.class())
    }

    /// The Context behind an `Engine` handle.
    pub fn context(&self, raw: RawHandle) -> Result<&Context> {
        match self.object(raw)? {
            Object::Engine(ctx) => Ok(ctx.as_ref()),
            other => Err(KeystoneError::HandleKindMismatch {
                expected: ENGINE,
                found: other.class(),
            }),
        }
    }

    /// Drops a registry entry the host no longer references. Releasing an
    /// `Engine` destroys its Context and drops every record it issued.
    pub fn release(&mut self, raw: RawHandle) -> bool {
        let key = ObjectKey::from(raw);
        match self.objects.remove(key) {
            Some(Object::Engine(ctx)) => {
                ctx.destroy();
                let before = self.objects.len();
                self.objects.retain(|_, object| match object {
                    Object::Resource { engine, .. } => *engine != key,
                    _ => true,
                });
                log::debug!(
                    "released engine {raw:?} with {} handle records",
                    before - self.objects.len()
                );
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    // ========================================================================
    // Engine
    // ========================================================================

    pub(crate) fn create_engine(&mut self) -> Result<Value> {
        let ctx = Context::create_with_entity_manager(
            self.settings.clone(),
            Arc::clone(&self.entities),
        )?;
        Ok(self.insert(Object::Engine(Box::new(ctx))))
    }

    pub(crate) fn destroy_engine(&mut self, raw: RawHandle) -> Result<Value> {
        match self.objects.get(raw.into()) {
            Some(Object::Engine(_)) => {}
            Some(other) => {
                return Err(KeystoneError::HandleKindMismatch {
                    expected: ENGINE,
                    found: other.class(),
                });
            }
            None => return Err(invalid(raw)),
        }
        self.release(raw);
        Ok(Value::Void)
    }

    pub(crate) fn engine_mut(&mut self, raw: RawHandle) -> Result<&mut Context> {
        match self.objects.get_mut(raw.into()) {
            Some(Object::Engine(ctx)) => Ok(ctx.as_mut()),
            Some(other) => Err(KeystoneError::HandleKindMismatch {
                expected: ENGINE,
                found: other.class(),
            }),
            None => Err(invalid(raw)),
        }
    }

    // ========================================================================
    // Resources
    // ========================================================================

    /// Resolves a resource handle together with its issuing engine.
    pub(crate) fn resource<H: BoundResource>(&self, raw: RawHandle) -> Result<(RawHandle, H)> {
        match self.object(raw)? {
            Object::Resource { engine, resource } => {
                let handle = H::from_ref(*resource).ok_or(KeystoneError::HandleKindMismatch {
                    expected: H::KIND.name(),
                    found: resource.kind().name(),
                })?;
                Ok(((*engine).into(), handle))
            }
            other => Err(KeystoneError::HandleKindMismatch {
                expected: H::KIND.name(),
                found: other.class(),
            }),
        }
    }

    /// Resolves a resource handle, dropping the engine.
    pub(crate) fn resource_in<H: BoundResource>(&self, raw: RawHandle) -> Result<H> {
        self.resource(raw).map(|(_, h)| h)
    }

    /// The Context that issued the resource behind `raw`, with the handle.
    pub(crate) fn owner_of<H: BoundResource>(
        &mut self,
        raw: RawHandle,
    ) -> Result<(&mut Context, H)> {
        let (engine, handle) = self.resource::<H>(raw)?;
        Ok((self.engine_mut(engine)?, handle))
    }

    pub(crate) fn register<H: BoundResource>(&mut self, engine: RawHandle, handle: H) -> Value {
        self.insert(Object::Resource {
            engine: engine.into(),
            resource: handle.into_ref(),
        })
    }

    /// `Engine.createX(this)`.
    pub(crate) fn create_in<H: BoundResource>(
        &mut self,
        args: &Args<'_>,
        create: fn(&mut Context) -> Result<H>,
    ) -> Result<Value> {
        let engine = args.this()?;
        let handle = create(self.engine_mut(engine)?)?;
        Ok(self.register(engine, handle))
    }

    /// `Engine.destroyX(this, handle)`. On success the record is dropped, so
    /// the host's handle no longer resolves.
    pub(crate) fn destroy_in<H: BoundResource>(
        &mut self,
        args: &Args<'_>,
        destroy: fn(&mut Context, H) -> Result<()>,
    ) -> Result<Value> {
        let engine = args.this()?;
        let raw = args.handle(1)?;
        let handle = self.resource_in::<H>(raw)?;
        destroy(self.engine_mut(engine)?, handle)?;
        self.objects.remove(raw.into());
        Ok(Value::Void)
    }

    // ========================================================================
    // Builders
    // ========================================================================

    pub(crate) fn new_builder<B: BoundBuilder>(&mut self, builder: B) -> Value {
        self.insert(Object::Builder(builder.into_slot()))
    }

    /// Takes the builder out of its slot, leaving a tombstone.
    pub(crate) fn take_builder<B: BoundBuilder>(&mut self, raw: RawHandle) -> Result<B> {
        let slot = match self.objects.get_mut(raw.into()) {
            Some(Object::Builder(slot)) => slot,
            Some(other) => {
                return Err(KeystoneError::HandleKindMismatch {
                    expected: B::CLASS,
                    found: other.class(),
                });
            }
            None => return Err(invalid(raw)),
        };
        match &*slot {
            BuilderSlot::Consumed(builder) => {
                return Err(KeystoneError::BuilderConsumed { builder: *builder });
            }
            other if other.class() != B::CLASS => {
                return Err(KeystoneError::HandleKindMismatch {
                    expected: B::CLASS,
                    found: other.class(),
                });
            }
            _ => {}
        }
        let taken = std::mem::replace(slot, BuilderSlot::Consumed(B::CLASS));
        B::from_slot(taken).ok_or(KeystoneError::BuilderConsumed { builder: B::CLASS })
    }

    /// Applies a chained mutator and hands the same builder handle back.
    pub(crate) fn update_builder<B: BoundBuilder>(
        &mut self,
        raw: RawHandle,
        update: impl FnOnce(B) -> Result<B>,
    ) -> Result<Value> {
        let builder = self.take_builder::<B>(raw)?;
        let builder = update(builder)?;
        if let Some(Object::Builder(slot)) = self.objects.get_mut(raw.into()) {
            *slot = builder.into_slot();
        }
        Ok(Value::Handle(raw))
    }

    /// `X$Builder.delete(this)`.
    pub(crate) fn delete_builder(&mut self, raw: RawHandle) -> Result<Value> {
        match self.objects.get(raw.into()) {
            Some(Object::Builder(_)) => {
                self.objects.remove(raw.into());
                Ok(Value::Void)
            }
            Some(other) => Err(KeystoneError::HandleKindMismatch {
                expected: "Builder",
                found: other.class(),
            }),
            None => Err(invalid(raw)),
        }
    }

    // ========================================================================
    // Entity manager
    // ========================================================================

    /// `EntityManager.get()`: the same handle on every call.
    pub(crate) fn entity_manager_handle(&mut self) -> Value {
        if let Some(key) = self.entity_manager
            && self.objects.contains_key(key)
        {
            return Value::Handle(key.into());
        }
        let key = self.objects.insert(Object::EntityManager);
        self.entity_manager = Some(key);
        Value::Handle(key.into())
    }

    pub(crate) fn entities(&self) -> &Arc<EntityManager> {
        &self.entities
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn insert(&mut self, object: Object) -> Value {
        let class = object.class();
        let key = self.objects.insert(object);
        let raw = RawHandle::from(key);
        log::trace!("registered {class} as {raw:?}");
        Value::Handle(raw)
    }

    fn object(&self, raw: RawHandle) -> Result<&Object> {
        self.objects.get(raw.into()).ok_or_else(|| invalid(raw))
    }
}

fn invalid(raw: RawHandle) -> KeystoneError {
    KeystoneError::InvalidHandle(format!("{raw:?} does not name a live object"))
}
