//! Prelude module for convenient imports.

pub use crate::error::ExecutionFailure;
pub use crate::host::scene::{SceneGraph, SceneObject};
pub use crate::host::HostBridge;
pub use crate::sandbox::{
    config::SandboxConfig,
    executor::{ExecutionResult, SceneScriptSandbox},
    manifest::CapabilityManifest,
};
pub use crate::validator::{CodeValidator, ValidationVerdict};
