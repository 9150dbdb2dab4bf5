use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag naming each kind of Context-owned resource.
///
/// Carried by handle errors so a host sees *what* it misused, not just that
/// a key failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    SwapChain,
    Renderer,
    View,
    Scene,
    Camera,
    VertexBuffer,
    IndexBuffer,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::SwapChain,
        ResourceKind::Renderer,
        ResourceKind::View,
        ResourceKind::Scene,
        ResourceKind::Camera,
        ResourceKind::VertexBuffer,
        ResourceKind::IndexBuffer,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::SwapChain => "SwapChain",
            ResourceKind::Renderer => "Renderer",
            ResourceKind::View => "View",
            ResourceKind::Scene => "Scene",
            ResourceKind::Camera => "Camera",
            ResourceKind::VertexBuffer => "VertexBuffer",
            ResourceKind::IndexBuffer => "IndexBuffer",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
