//! Host Binding Surface
//!
//! Everything a scripting host needs to drive Keystone without touching Rust
//! types directly:
//!
//! - [`Value`]: arguments and results, always copied
//! - [`RawHandle`]: opaque registry keys standing in for engine objects
//! - [`BindingTable`]: the declared classes and their entry points
//! - [`Boundary`]: the registry that owns host-created objects and
//!   dispatches calls through the table
//!
//! The boundary is host-agnostic. A concrete host (a JS engine, a Python
//! extension, a JSON-RPC loop) walks [`BindingTable::classes`] to generate
//! its glue and forwards every call to [`Boundary::call`].

mod boundary;
mod standard;
mod table;
mod value;

pub use boundary::Boundary;
pub use table::{Args, BindingTable, ClassBinding, Entry, EntryKind, Thunk, ValueArray};
pub use value::{FromValue, IntoValue, RawHandle, Value};
