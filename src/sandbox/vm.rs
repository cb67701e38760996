//! RustPython interpreter lifecycle for one sandboxed run.
//!
//! A fresh interpreter is built per execution; nothing is cached or reused
//! between calls. The restricted namespace is assembled in layers: manifest
//! modules are pre-imported and bound by name, `__builtins__` is replaced by
//! a dict holding only the allow-listed builtins, the host bridge installs
//! its capability objects, and finally the denied builtins are overridden in
//! the interpreter's own builtins module with guards that raise, so even a
//! lookup that bypasses the restricted table hits a wall.
//!
//! Output capture replaces `sys.stdout` and `sys.stderr` with minimal
//! Python-level writer objects whose `write(s)` delegates to the shared
//! [`CapturedOutput`] buffer.

use rustpython_vm::{
    builtins::{PyBaseExceptionRef, PyDictRef},
    compiler::Mode,
    function::FuncArgs,
    scope::Scope,
    AsObject, Interpreter, PyObjectRef, PyResult, VirtualMachine,
};

use crate::host::HostBridge;
use crate::sandbox::io::CapturedOutput;
use crate::sandbox::manifest::CapabilityManifest;

/// Builtins overridden with raising guards inside the fresh interpreter.
///
/// Redundant with the validator's static deny list on purpose: the static
/// screen stops these at the AST, the guards stop any indirect lookup that
/// slips past it.
const GUARDED_BUILTINS: &[&str] = &[
    "eval",
    "exec",
    "compile",
    "open",
    "input",
    "__import__",
    "globals",
    "locals",
    "vars",
    "setattr",
    "delattr",
    "breakpoint",
    "exit",
    "quit",
    "help",
];

/// Internal result of running code in the VM.
pub(crate) struct VmRunOutcome {
    pub error: Option<ScriptTrace>,
}

/// A formatted script failure extracted from the interpreter.
pub(crate) struct ScriptTrace {
    pub message: String,
    pub traceback: String,
}

/// Candidate filesystem paths for a pure-Python standard library.
///
/// The native extension modules come from `rustpython_stdlib`; pure-Python
/// stdlib modules (json, datetime, ...) are resolved from a host Python
/// installation when one is present. Manifest modules that cannot be
/// imported are skipped with a warning rather than failing the run.
fn python_stdlib_paths() -> Vec<String> {
    let candidates = [
        "/usr/local/lib/python3.12",
        "/usr/local/lib/python3.11",
        "/usr/lib/python3.12",
        "/usr/lib/python3.11",
        "/usr/lib/python3.10",
        "/usr/lib/python3",
    ];
    candidates
        .iter()
        .filter(|p| std::path::Path::new(p).is_dir())
        .map(|p| p.to_string())
        .collect()
}

/// Compile and execute one piece of validated candidate code.
///
/// Runs on a blocking thread; everything it touches on the host side must be
/// `Send`. Returns diagnostics only; output lands in the shared buffer as it
/// is written.
pub(crate) fn run_candidate(
    code: &str,
    source_name: &str,
    manifest: &CapabilityManifest,
    host: &dyn HostBridge,
    output: CapturedOutput,
) -> VmRunOutcome {
    let mut settings = rustpython_vm::Settings::default();
    for path in python_stdlib_paths() {
        settings.path_list.push(path);
    }

    let interpreter = Interpreter::with_init(settings, |vm| {
        vm.add_native_modules(rustpython_stdlib::get_module_inits());
    });

    interpreter.enter(|vm| {
        install_output_capture(vm, output);

        let globals = vm.ctx.new_dict();
        if let Err(exc) = build_namespace(vm, &globals, manifest, host) {
            return VmRunOutcome {
                error: Some(extract_runtime_error(vm, exc)),
            };
        }
        neutralize_guarded_builtins(vm);

        let code_obj = match vm.compile(code, Mode::Exec, source_name.to_owned()) {
            Ok(code_obj) => code_obj,
            Err(err) => {
                // The validator already parsed this source; reaching here
                // means the parser and the VM disagree about the grammar.
                return VmRunOutcome {
                    error: Some(ScriptTrace {
                        message: format!("compile error: {err}"),
                        traceback: String::new(),
                    }),
                };
            }
        };

        let scope = Scope::new(None, globals);
        match vm.run_code_obj(code_obj, scope) {
            Ok(_) => VmRunOutcome { error: None },
            Err(exc) => VmRunOutcome {
                error: Some(extract_runtime_error(vm, exc)),
            },
        }
    })
}

/// Assemble the restricted globals: manifest modules, restricted builtins,
/// capability objects.
fn build_namespace(
    vm: &VirtualMachine,
    globals: &PyDictRef,
    manifest: &CapabilityManifest,
    host: &dyn HostBridge,
) -> PyResult<()> {
    globals.set_item("__name__", vm.ctx.new_str("__main__").into(), vm)?;

    // Pre-import allow-listed modules through the interpreter's own import
    // machinery, before the guards replace it.
    let import_fn = vm.builtins.get_attr("__import__", vm)?;
    for name in manifest.modules() {
        match import_fn.call((vm.ctx.new_str(name),), vm) {
            Ok(module) => globals.set_item(name, module, vm)?,
            Err(_) => {
                tracing::warn!(module = name, "allow-listed module unavailable, skipping");
            }
        }
    }

    let builtins = vm.ctx.new_dict();
    for name in manifest.builtins() {
        if let Ok(value) = vm.builtins.get_attr(&vm.ctx.new_str(name), vm) {
            builtins.set_item(name, value, vm)?;
        }
    }
    globals.set_item("__builtins__", builtins.into(), vm)?;

    host.install(vm, globals)
}

/// Override denied builtins on the interpreter's builtins module with
/// closures that raise.
fn neutralize_guarded_builtins(vm: &VirtualMachine) {
    for name in GUARDED_BUILTINS {
        if vm.builtins.get_attr(*name, vm).is_err() {
            continue;
        }
        let denied = name.to_string();
        let guard = vm.new_function(
            name,
            move |_args: FuncArgs, vm: &VirtualMachine| -> PyResult<PyObjectRef> {
                Err(vm.new_exception_msg(
                    vm.ctx.exceptions.runtime_error.to_owned(),
                    format!("'{denied}' is not available in the sandbox"),
                ))
            },
        );
        let _ = vm.builtins.set_attr(*name, guard, vm);
    }
}

/// Replace `sys.stdout` and `sys.stderr` with write-capturing objects.
fn install_output_capture(vm: &VirtualMachine, output: CapturedOutput) {
    let stdout_obj = build_writer_object(vm, output.clone());
    let stderr_obj = build_writer_object(vm, output);

    let _ = vm.sys_module.set_attr("stdout", stdout_obj, vm);
    let _ = vm.sys_module.set_attr("stderr", stderr_obj, vm);
}

/// Build a minimal Python object with `write(s)` and `flush()` methods
/// backed by the shared capture buffer.
fn build_writer_object(vm: &VirtualMachine, output: CapturedOutput) -> PyObjectRef {
    let write_fn = vm.new_function(
        "write",
        move |args: FuncArgs, vm: &VirtualMachine| -> PyResult<PyObjectRef> {
            let data: String = args
                .args
                .first()
                .and_then(|o| o.str(vm).ok())
                .map(|s| s.as_str().to_owned())
                .unwrap_or_default();
            output.push_bytes(data.as_bytes());
            Ok(vm.ctx.new_int(data.len()).into())
        },
    );

    let flush_fn = vm.new_function(
        "flush",
        move |_args: FuncArgs, vm: &VirtualMachine| -> PyResult<PyObjectRef> {
            Ok(vm.ctx.none())
        },
    );

    let ns = vm.new_module("<writer>", vm.ctx.new_dict(), None);
    let _ = ns.set_attr("write", write_fn, vm);
    let _ = ns.set_attr("flush", flush_fn, vm);
    let _ = ns.set_attr("closed", vm.ctx.new_bool(false), vm);
    let _ = ns.set_attr("encoding", vm.ctx.new_str("utf-8"), vm);
    ns.into()
}

/// Convert a runtime exception into a formatted [`ScriptTrace`].
///
/// `String` implements `rustpython_vm::py_io::Write` via `write_fmt`, so the
/// full traceback renders without a custom writer.
fn extract_runtime_error(vm: &VirtualMachine, exc: PyBaseExceptionRef) -> ScriptTrace {
    let message = exc
        .as_object()
        .str(vm)
        .map(|s| s.as_str().to_owned())
        .unwrap_or_else(|_| "unknown runtime error".to_owned());

    let mut traceback = String::new();
    let _ = vm.write_exception(&mut traceback, &exc);

    ScriptTrace { message, traceback }
}
