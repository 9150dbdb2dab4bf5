//! Error Types
//!
//! This module defines the error type used throughout Keystone.
//!
//! # Overview
//!
//! The native engine this crate fronts treats most misuse as undefined
//! behaviour: a stale pointer, a double destroy, a builder touched after it
//! was consumed. Keystone turns every one of those into a [`KeystoneError`]
//! variant instead:
//!
//! - Setup failures (the backend could not be acquired)
//! - Handle misuse (stale, foreign, or wrongly typed handles)
//! - Builder misuse (missing properties, consumed builders)
//! - Boundary marshaling failures (unknown entry points, bad arguments)
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, KeystoneError>`.
//!
//! ```rust,ignore
//! use keystone_core::errors::{KeystoneError, Result};
//!
//! fn create_view(ctx: &mut Context) -> Result<View> {
//!     ctx.create_view()
//! }
//! ```

use thiserror::Error;

use crate::entity::Entity;
use crate::kind::ResourceKind;

/// The main error type for Keystone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeystoneError {
    // ========================================================================
    // Setup Errors
    // ========================================================================
    /// The requested backend is not built in and none was supplied.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend was found but failed to initialize.
    #[error("Backend initialization failed: {0}")]
    BackendInit(String),

    /// A backend call failed after initialization.
    #[error("Backend error: {0}")]
    Backend(String),

    // ========================================================================
    // Handle Errors
    // ========================================================================
    /// The handle was destroyed, or its owning Context was.
    #[error("Stale {kind} handle: resource was destroyed or never issued")]
    StaleHandle {
        /// Kind of resource the handle referred to
        kind: ResourceKind,
    },

    /// The handle was issued by a different Context.
    #[error("{kind} handle belongs to another Context")]
    ForeignHandle {
        /// Kind of resource the handle referred to
        kind: ResourceKind,
    },

    /// The entity was destroyed through the entity manager.
    #[error("Entity {0} is not alive")]
    DeadEntity(Entity),

    /// A raw boundary handle resolved to an object of the wrong kind.
    #[error("Handle kind mismatch: expected {expected}, found {found}")]
    HandleKindMismatch {
        /// What the entry point expected
        expected: &'static str,
        /// What the handle actually refers to
        found: &'static str,
    },

    /// A raw boundary handle does not resolve to any live object.
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    // ========================================================================
    // Builder & State Errors
    // ========================================================================
    /// `build` already consumed this builder.
    #[error("{builder} was already consumed by build()")]
    BuilderConsumed {
        /// Builder type name
        builder: &'static str,
    },

    /// A required builder property was never set.
    #[error("{builder}: required property `{property}` was not set")]
    MissingProperty {
        /// Builder type name
        builder: &'static str,
        /// Property name
        property: &'static str,
    },

    /// The entity already carries a component of this kind.
    #[error("Entity {0} already has a renderable component")]
    ComponentExists(Entity),

    /// An argument was outside its accepted range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation's preconditions on other resources were not met.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    // ========================================================================
    // Boundary Errors
    // ========================================================================
    /// No entry point is registered under this name.
    #[error("Unknown entry point: {0}")]
    UnknownEntryPoint(String),

    /// An argument could not be marshaled to the expected type.
    #[error("{entry}: argument {index} must be {expected}")]
    ArgumentMismatch {
        /// Qualified entry point name (`Class.function`)
        entry: String,
        /// Zero-based argument position
        index: usize,
        /// Expected boundary type
        expected: &'static str,
    },
}

/// Alias for `Result<T, KeystoneError>`.
pub type Result<T> = std::result::Result<T, KeystoneError>;
