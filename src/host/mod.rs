//! The seam between the execution core and the host environment.
//!
//! The core never models the scene graph itself; it reaches it only through
//! the capability objects a [`HostBridge`] installs into the namespace, and
//! brackets every run with the bridge's checkpoint/restore primitives.

pub mod scene;

use rustpython_vm::{builtins::PyDictRef, PyResult, VirtualMachine};

/// An opaque, host-defined checkpoint of mutable state.
///
/// Owned by the executor for exactly one execution call: discarded after a
/// successful commit, or passed back to [`HostBridge::restore_checkpoint`]
/// after a failure.
pub type HostCheckpoint = Box<dyn std::any::Any + Send>;

/// Host environment contract consumed by the executor.
///
/// Implementations expose the capability objects candidate code may touch
/// and an undo-checkpoint primitive covering all state those objects can
/// mutate. `restore_checkpoint` must be safe to call after any partial
/// mutation.
pub trait HostBridge: Send + Sync {
    /// Install the host's capability objects into the execution globals.
    ///
    /// Called once per run, on the interpreter thread, after the restricted
    /// builtins and manifest modules are in place.
    fn install(&self, vm: &VirtualMachine, globals: &PyDictRef) -> PyResult<()>;

    /// Snapshot all mutable state the capability objects can reach.
    fn begin_checkpoint(&self) -> anyhow::Result<HostCheckpoint>;

    /// Restore a previously taken checkpoint, undoing any changes since.
    fn restore_checkpoint(&self, checkpoint: HostCheckpoint) -> anyhow::Result<()>;

    /// Propagate a committed change to dependent host state (the original
    /// system's view-layer update). Called only after a successful run.
    fn refresh(&self);
}
