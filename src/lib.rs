//! # Scene Script Sandbox
//!
//! A validated, sandboxed execution core for model-generated scene scripts.
//!
//! This crate accepts a string of candidate Python code (typically extracted
//! from a language-model response), statically screens it against a fixed
//! safety policy, and runs it in an embedded RustPython interpreter whose
//! namespace exposes only allow-listed modules, builtins, and the host's
//! capability objects. Host state is checkpointed before every run and
//! restored on any failure, so a crashing or timed-out script leaves the
//! scene exactly as it found it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use scene_script_sandbox::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let scene = SceneGraph::new();
//!     let sandbox = SceneScriptSandbox::new(
//!         SandboxConfig::default(),
//!         CapabilityManifest::default(),
//!         Arc::new(scene.clone()),
//!     );
//!
//!     let result = sandbox.execute("print(2 + 2)").await;
//!     assert!(result.is_success());
//!     assert_eq!(result.captured_output, "4\n");
//! }
//! ```
//!
//! ## Security Model
//!
//! Defense in depth, in order of application:
//!
//! 1. **Static validation**: the candidate AST is walked before anything
//!    runs; imports, dynamic evaluation, dunder access, and scope escapes
//!    are rejected with a reason naming the violated rule
//! 2. **Restricted namespace**: the interpreter globals contain only the
//!    manifest's modules and builtins plus the host capability objects
//! 3. **Runtime guards**: denied builtins are overridden inside the fresh
//!    interpreter so indirect lookups raise instead of escaping
//! 4. **Wall-clock timeout**: execution races a deadline; on expiry the run
//!    is reported as timed out and host state is rolled back
//! 5. **Checkpoint bracketing**: every failure path restores the host
//!    snapshot taken before the run
//!
//! The static screen is a best-effort deny list, not a proof system; the
//! timeout is best effort unless the host wraps execution in a killable
//! worker process.

pub mod error;
pub mod host;
pub mod prelude;
pub mod sandbox;
pub mod validator;

// Re-export main types at crate root for convenience
pub use error::ExecutionFailure;
pub use host::scene::{SceneGraph, SceneObject};
pub use host::{HostBridge, HostCheckpoint};
pub use sandbox::config::{SandboxConfig, SandboxConfigBuilder};
pub use sandbox::executor::{ExecutionResult, SceneScriptSandbox};
pub use sandbox::manifest::CapabilityManifest;
pub use validator::{CodeValidator, ValidationVerdict};
