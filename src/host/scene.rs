//! In-memory scene graph host.
//!
//! The reference [`HostBridge`] implementation: a flat list of named objects
//! with positions, mutated by candidate code through a `scene` capability
//! module. Checkpoints are whole-state clones, so restore is exact and
//! idempotent. Production hosts (a real 3D scene) implement the same trait
//! against their own undo machinery.

use std::sync::{Arc, Mutex};

use rustpython_vm::{
    builtins::PyDictRef, function::FuncArgs, PyObjectRef, PyResult, TryFromObject, VirtualMachine,
};

use super::{HostBridge, HostCheckpoint};

/// One object in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Object name; not deduplicated, two adds create two objects.
    pub name: String,
    /// World-space position.
    pub position: [f64; 3],
}

#[derive(Debug, Clone, Default, PartialEq)]
struct SceneState {
    objects: Vec<SceneObject>,
    revision: u64,
}

/// A shared, mutable in-memory scene.
///
/// Clones share the same underlying state, so a handle kept by the caller
/// observes mutations made through the sandbox.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    state: Arc<Mutex<SceneState>>,
}

impl SceneGraph {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current objects.
    pub fn objects(&self) -> Vec<SceneObject> {
        self.state.lock().unwrap().objects.clone()
    }

    /// Number of objects in the scene.
    pub fn object_count(&self) -> usize {
        self.state.lock().unwrap().objects.len()
    }

    /// Revision counter, bumped once per committed execution.
    pub fn revision(&self) -> u64 {
        self.state.lock().unwrap().revision
    }

    /// Add an object directly (host-side, outside any sandbox run).
    pub fn add_object(&self, name: impl Into<String>, position: [f64; 3]) {
        let mut state = self.state.lock().unwrap();
        state.objects.push(SceneObject {
            name: name.into(),
            position,
        });
    }
}

/// Lock the scene state, surfacing a poisoned lock as a Python exception
/// instead of panicking the interpreter thread.
fn lock_scene<'a>(
    state: &'a Mutex<SceneState>,
    vm: &VirtualMachine,
) -> PyResult<std::sync::MutexGuard<'a, SceneState>> {
    state.lock().map_err(|_| {
        vm.new_exception_msg(
            vm.ctx.exceptions.runtime_error.to_owned(),
            "scene state poisoned".to_owned(),
        )
    })
}

/// Extract a required string argument by position.
fn str_arg(args: &FuncArgs, index: usize, fn_name: &str, vm: &VirtualMachine) -> PyResult<String> {
    let obj = args
        .args
        .get(index)
        .ok_or_else(|| vm.new_type_error(format!("{fn_name}() missing argument {index}")))?;
    Ok(obj.str(vm)?.as_str().to_owned())
}

/// Extract an optional float argument by position, defaulting to 0.0.
fn float_arg(args: &FuncArgs, index: usize, vm: &VirtualMachine) -> PyResult<f64> {
    match args.args.get(index) {
        Some(obj) => f64::try_from_object(vm, obj.clone()),
        None => Ok(0.0),
    }
}

impl HostBridge for SceneGraph {
    fn install(&self, vm: &VirtualMachine, globals: &PyDictRef) -> PyResult<()> {
        let module = vm.new_module("scene", vm.ctx.new_dict(), None);

        let state = Arc::clone(&self.state);
        let add_object = vm.new_function(
            "add_object",
            move |args: FuncArgs, vm: &VirtualMachine| -> PyResult<PyObjectRef> {
                let name = str_arg(&args, 0, "add_object", vm)?;
                let position = [
                    float_arg(&args, 1, vm)?,
                    float_arg(&args, 2, vm)?,
                    float_arg(&args, 3, vm)?,
                ];
                let mut state = lock_scene(&state, vm)?;
                state.objects.push(SceneObject { name, position });
                Ok(vm.ctx.new_int(state.objects.len() - 1).into())
            },
        );

        let state = Arc::clone(&self.state);
        let move_object = vm.new_function(
            "move_object",
            move |args: FuncArgs, vm: &VirtualMachine| -> PyResult<PyObjectRef> {
                let name = str_arg(&args, 0, "move_object", vm)?;
                let delta = [
                    float_arg(&args, 1, vm)?,
                    float_arg(&args, 2, vm)?,
                    float_arg(&args, 3, vm)?,
                ];
                let mut state = lock_scene(&state, vm)?;
                let mut found = false;
                for object in state.objects.iter_mut().filter(|o| o.name == name) {
                    object.position[0] += delta[0];
                    object.position[1] += delta[1];
                    object.position[2] += delta[2];
                    found = true;
                }
                Ok(vm.ctx.new_bool(found).into())
            },
        );

        let state = Arc::clone(&self.state);
        let remove_object = vm.new_function(
            "remove_object",
            move |args: FuncArgs, vm: &VirtualMachine| -> PyResult<PyObjectRef> {
                let name = str_arg(&args, 0, "remove_object", vm)?;
                let mut state = lock_scene(&state, vm)?;
                let before = state.objects.len();
                state.objects.retain(|o| o.name != name);
                Ok(vm.ctx.new_bool(state.objects.len() < before).into())
            },
        );

        let state = Arc::clone(&self.state);
        let object_count = vm.new_function(
            "object_count",
            move |_args: FuncArgs, vm: &VirtualMachine| -> PyResult<PyObjectRef> {
                let state = lock_scene(&state, vm)?;
                Ok(vm.ctx.new_int(state.objects.len()).into())
            },
        );

        let state = Arc::clone(&self.state);
        let object_names = vm.new_function(
            "object_names",
            move |_args: FuncArgs, vm: &VirtualMachine| -> PyResult<PyObjectRef> {
                let state = lock_scene(&state, vm)?;
                let names: Vec<PyObjectRef> = state
                    .objects
                    .iter()
                    .map(|o| vm.ctx.new_str(o.name.as_str()).into())
                    .collect();
                Ok(vm.ctx.new_list(names).into())
            },
        );

        module.set_attr("add_object", add_object, vm)?;
        module.set_attr("move_object", move_object, vm)?;
        module.set_attr("remove_object", remove_object, vm)?;
        module.set_attr("object_count", object_count, vm)?;
        module.set_attr("object_names", object_names, vm)?;

        globals.set_item("scene", module.into(), vm)
    }

    fn begin_checkpoint(&self) -> anyhow::Result<HostCheckpoint> {
        let state = self
            .state
            .lock()
            .map_err(|_| anyhow::anyhow!("scene state poisoned"))?;
        Ok(Box::new(state.clone()))
    }

    fn restore_checkpoint(&self, checkpoint: HostCheckpoint) -> anyhow::Result<()> {
        let snapshot = checkpoint
            .downcast::<SceneState>()
            .map_err(|_| anyhow::anyhow!("checkpoint was not taken from this scene"))?;
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow::anyhow!("scene state poisoned"))?;
        *state = *snapshot;
        Ok(())
    }

    fn refresh(&self) {
        let mut state = self.state.lock().expect("scene mutex poisoned");
        state.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_count() {
        let scene = SceneGraph::new();
        scene.add_object("cube", [0.0, 0.0, 0.0]);
        scene.add_object("lamp", [1.0, 2.0, 3.0]);
        assert_eq!(scene.object_count(), 2);
        assert_eq!(scene.objects()[1].position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_clones_share_state() {
        let scene = SceneGraph::new();
        let handle = scene.clone();
        scene.add_object("cube", [0.0; 3]);
        assert_eq!(handle.object_count(), 1);
    }

    #[test]
    fn test_checkpoint_restore_roundtrip() {
        let scene = SceneGraph::new();
        scene.add_object("cube", [0.0; 3]);
        let before = scene.objects();

        let checkpoint = scene.begin_checkpoint().unwrap();
        scene.add_object("intruder", [9.0; 3]);
        scene.add_object("intruder2", [9.0; 3]);
        assert_eq!(scene.object_count(), 3);

        scene.restore_checkpoint(checkpoint).unwrap();
        assert_eq!(scene.objects(), before);
    }

    #[test]
    fn test_restore_rejects_foreign_checkpoint() {
        let scene = SceneGraph::new();
        let bogus: HostCheckpoint = Box::new(42u32);
        assert!(scene.restore_checkpoint(bogus).is_err());
    }

    #[test]
    fn test_poisoned_state_is_an_error_not_a_panic() {
        let scene = SceneGraph::new();
        let state = Arc::clone(&scene.state);
        let _ = std::thread::spawn(move || {
            let _guard = state.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(scene.begin_checkpoint().is_err());
    }

    #[test]
    fn test_refresh_bumps_revision() {
        let scene = SceneGraph::new();
        assert_eq!(scene.revision(), 0);
        scene.refresh();
        scene.refresh();
        assert_eq!(scene.revision(), 2);
    }
}
