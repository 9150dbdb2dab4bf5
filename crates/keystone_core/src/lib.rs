//! Keystone Core
//!
//! Foundational types shared by every Keystone crate:
//!
//! - [`errors`]: the [`KeystoneError`] type and the crate-wide [`Result`] alias
//! - [`math`]: fixed-layout value types that cross the host boundary by copy
//! - [`entity`]: lightweight [`Entity`] identifiers and the [`EntityManager`]
//! - [`kind`]: [`ResourceKind`] tags used in diagnostics

pub mod entity;
pub mod errors;
pub mod kind;
pub mod math;

pub use entity::{Entity, EntityManager};
pub use errors::{KeystoneError, Result};
pub use kind::ResourceKind;
pub use math::{BoundingBox, Float3};
