//! Typed resource handles.
//!
//! Every handle is a `Copy` pair of the issuing Context's id and a
//! generation-checked slot key. Destroying a resource retires its slot, so a
//! stale handle resolves to [`KeystoneError::StaleHandle`] instead of freed
//! memory, and a handle presented to the wrong Context resolves to
//! [`KeystoneError::ForeignHandle`].

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use keystone_backend::NativeId;
use keystone_core::{KeystoneError, ResourceKind, Result};
use slotmap::{SlotMap, new_key_type};

use crate::context::Context;

static NEXT_CONTEXT_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique identity of a [`Context`](crate::Context).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u32);

impl ContextId {
    pub(crate) fn next() -> Self {
        Self(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextId({})", self.0)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx{}", self.0)
    }
}

mod private {
    pub trait Sealed {
        fn is_live_in(self, ctx: &crate::Context) -> bool;
    }
}

/// Implemented by every Context-issued handle type.
pub trait ResourceHandle: Copy + fmt::Debug + private::Sealed {
    const KIND: ResourceKind;
}

impl Context {
    /// Whether `handle` was issued by this Context and not yet destroyed.
    #[must_use]
    pub fn is_alive<H: ResourceHandle>(&self, handle: H) -> bool {
        private::Sealed::is_live_in(handle, self)
    }
}

pub(crate) trait Handle: ResourceHandle {
    type Key: slotmap::Key;

    fn from_parts(context: ContextId, key: Self::Key) -> Self;
    fn context(self) -> ContextId;
    fn key(self) -> Self::Key;
}

macro_rules! define_handles {
    ($( $(#[$meta:meta])* $name:ident => $key:ident in $pool:ident ),* $(,)?) => {
        new_key_type! {
            $( pub(crate) struct $key; )*
        }

        $(
            $(#[$meta])*
            #[derive(Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name {
                context: ContextId,
                key: $key,
            }

            impl $name {
                /// The Context that issued this handle.
                #[inline]
                #[must_use]
                pub fn context(&self) -> ContextId {
                    self.context
                }
            }

            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}({}:{:?})", stringify!($name), self.context, self.key)
                }
            }

            impl private::Sealed for $name {
                fn is_live_in(self, ctx: &Context) -> bool {
                    ctx.$pool.get(self).is_ok()
                }
            }

            impl ResourceHandle for $name {
                const KIND: ResourceKind = ResourceKind::$name;
            }

            impl Handle for $name {
                type Key = $key;

                #[inline]
                fn from_parts(context: ContextId, key: $key) -> Self {
                    Self { context, key }
                }

                #[inline]
                fn context(self) -> ContextId {
                    self.context
                }

                #[inline]
                fn key(self) -> $key {
                    self.key
                }
            }
        )*
    };
}

define_handles! {
    /// Presentation surface; handed to the renderer by the engine.
    SwapChain => SwapChainKey in swap_chains,
    /// Draws views.
    Renderer => RendererKey in renderers,
    /// Pairs a scene with a camera.
    View => ViewKey in views,
    /// Set of entities to render.
    Scene => SceneKey in scenes,
    /// Viewpoint.
    Camera => CameraKey in cameras,
    /// Vertex storage built by [`VertexBufferBuilder`](crate::VertexBufferBuilder).
    VertexBuffer => VertexBufferKey in vertex_buffers,
    /// Index storage built by [`IndexBufferBuilder`](crate::IndexBufferBuilder).
    IndexBuffer => IndexBufferKey in index_buffers,
}

/// Bookkeeping for one native object.
#[derive(Debug)]
pub(crate) struct Record<T> {
    pub native: NativeId,
    pub state: T,
}

/// Slot storage for one resource kind, scoped to one Context.
pub(crate) struct Pool<H: Handle, T> {
    context: ContextId,
    items: SlotMap<H::Key, Record<T>>,
}

impl<H: Handle, T> Pool<H, T> {
    pub fn new(context: ContextId) -> Self {
        Self {
            context,
            items: SlotMap::with_key(),
        }
    }

    #[inline]
    fn check_owner(&self, handle: H) -> Result<()> {
        if handle.context() == self.context {
            Ok(())
        } else {
            Err(KeystoneError::ForeignHandle { kind: H::KIND })
        }
    }

    pub fn insert(&mut self, native: NativeId, state: T) -> H {
        let key = self.items.insert(Record { native, state });
        H::from_parts(self.context, key)
    }

    pub fn get(&self, handle: H) -> Result<&Record<T>> {
        self.check_owner(handle)?;
        self.items
            .get(handle.key())
            .ok_or(KeystoneError::StaleHandle { kind: H::KIND })
    }

    pub fn get_mut(&mut self, handle: H) -> Result<&mut Record<T>> {
        self.check_owner(handle)?;
        self.items
            .get_mut(handle.key())
            .ok_or(KeystoneError::StaleHandle { kind: H::KIND })
    }

    pub fn remove(&mut self, handle: H) -> Result<Record<T>> {
        self.check_owner(handle)?;
        self.items
            .remove(handle.key())
            .ok_or(KeystoneError::StaleHandle { kind: H::KIND })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (H, &mut Record<T>)> {
        let context = self.context;
        self.items
            .iter_mut()
            .map(move |(key, record)| (H::from_parts(context, key), record))
    }

    pub fn values(&self) -> impl Iterator<Item = &Record<T>> {
        self.items.values()
    }

    /// Removes every record, yielding the native ids in slot order.
    pub fn drain(&mut self) -> Vec<NativeId> {
        self.items.drain().map(|(_, record)| record.native).collect()
    }
}
