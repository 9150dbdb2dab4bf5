//! Declarative description of the host-visible surface.
//!
//! A [`BindingTable`] lists classes and the functions registered on each,
//! plus the value types that cross by copy. It is built with the same chain
//! a host binding generator would use:
//!
//! ```rust,ignore
//! let table = BindingTable::new()
//!     .value_array("float3", &["x", "y", "z"])
//!     .class(
//!         ClassBinding::new("Scene")
//!             .function("addEntity", 2, |b, args| b.scene_add_entity(args)),
//!     );
//! ```

use keystone_core::{KeystoneError, Result};
use rustc_hash::FxHashMap;

use super::boundary::Boundary;
use super::value::{FromValue, RawHandle, Value};

/// Native implementation of one entry point.
pub type Thunk = fn(&mut Boundary, &Args<'_>) -> Result<Value>;

/// Whether an entry point is called on the class or on an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Static; no receiver.
    ClassFunction,
    /// Takes `this` as argument 0.
    Function,
}

/// One registered entry point.
#[derive(Clone, Copy)]
pub struct Entry {
    name: &'static str,
    kind: EntryKind,
    arity: usize,
    thunk: Thunk,
}

impl Entry {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Number of arguments, counting `this` for member functions.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub(crate) fn thunk(&self) -> Thunk {
        self.thunk
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Entry points registered under one class name.
#[derive(Debug, Clone)]
#[must_use]
pub struct ClassBinding {
    name: &'static str,
    entries: Vec<Entry>,
}

impl ClassBinding {
    /// Class names are kept verbatim, separators included
    /// (`RenderableManager$Builder`).
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }

    pub fn class_function(self, name: &'static str, arity: usize, thunk: Thunk) -> Self {
        self.entry(name, EntryKind::ClassFunction, arity, thunk)
    }

    pub fn function(self, name: &'static str, arity: usize, thunk: Thunk) -> Self {
        self.entry(name, EntryKind::Function, arity, thunk)
    }

    fn entry(mut self, name: &'static str, kind: EntryKind, arity: usize, thunk: Thunk) -> Self {
        self.entries.retain(|e| e.name != name);
        self.entries.push(Entry {
            name,
            kind,
            arity,
            thunk,
        });
        self
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

/// A fixed-size value type copied element-wise across the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueArray {
    pub name: &'static str,
    pub elements: &'static [&'static str],
}

/// The complete host-visible surface.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct BindingTable {
    classes: Vec<ClassBinding>,
    index: FxHashMap<&'static str, usize>,
    value_arrays: Vec<ValueArray>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class, replacing any earlier binding with the same name.
    pub fn class(mut self, class: ClassBinding) -> Self {
        match self.index.get(class.name) {
            Some(&i) => self.classes[i] = class,
            None => {
                self.index.insert(class.name, self.classes.len());
                self.classes.push(class);
            }
        }
        self
    }

    pub fn value_array(mut self, name: &'static str, elements: &'static [&'static str]) -> Self {
        self.value_arrays.retain(|v| v.name != name);
        self.value_arrays.push(ValueArray { name, elements });
        self
    }

    /// Registered classes, in registration order.
    #[must_use]
    pub fn classes(&self) -> &[ClassBinding] {
        &self.classes
    }

    #[must_use]
    pub fn class_binding(&self, name: &str) -> Option<&ClassBinding> {
        self.index.get(name).map(|&i| &self.classes[i])
    }

    #[must_use]
    pub fn value_arrays(&self) -> &[ValueArray] {
        &self.value_arrays
    }

    /// Resolves `class.function`.
    pub fn lookup(&self, class: &str, function: &str) -> Result<&Entry> {
        self.class_binding(class)
            .and_then(|c| c.get(function))
            .ok_or_else(|| KeystoneError::UnknownEntryPoint(format!("{class}.{function}")))
    }
}

/// Arguments of one call, with typed accessors that report marshaling
/// failures against the entry point.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    class: &'static str,
    function: &'static str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub(crate) fn new(class: &'static str, function: &'static str, values: &'a [Value]) -> Self {
        Self {
            class,
            function,
            values,
        }
    }

    /// Qualified entry point name.
    #[must_use]
    pub fn entry(&self) -> String {
        format!("{}.{}", self.class, self.function)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Argument `index` converted to `T`.
    pub fn get<T: FromValue>(&self, index: usize) -> Result<T> {
        self.values
            .get(index)
            .and_then(T::from_value)
            .ok_or_else(|| KeystoneError::ArgumentMismatch {
                entry: self.entry(),
                index,
                expected: T::EXPECTED,
            })
    }

    pub fn handle(&self, index: usize) -> Result<RawHandle> {
        self.get(index)
    }

    /// Argument 0 of a member function.
    pub fn this(&self) -> Result<RawHandle> {
        self.handle(0)
    }
}
