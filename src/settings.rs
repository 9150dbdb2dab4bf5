//! Context configuration.
//!
//! ```rust,ignore
//! use keystone::{Context, ContextSettings, BackendKind};
//!
//! let ctx = Context::create_with(ContextSettings {
//!     label: Some("viewer".into()),
//!     ..Default::default()
//! })?;
//!
//! // Hosts that ship configuration as text:
//! let settings = ContextSettings::from_json(r#"{ "backend": "headless" }"#)?;
//! ```

use keystone_backend::BackendKind;
use keystone_core::{KeystoneError, Result};
use serde::{Deserialize, Serialize};

/// Settings fixed for the lifetime of a [`Context`](crate::Context).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    /// Which engine backend to acquire. Only [`BackendKind::Headless`] is
    /// built in; the rest must be supplied by the embedder.
    pub backend: BackendKind,
    /// Name used in log lines.
    pub label: Option<String>,
}

impl ContextSettings {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| KeystoneError::InvalidArgument(format!("context settings: {e}")))
    }

    pub(crate) fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or("context")
    }
}
