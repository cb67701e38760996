//! Walkthrough of the static validation rules.
//!
//! Run with: cargo run --example rejected_code

use scene_script_sandbox::prelude::*;

fn main() {
    let validator = CodeValidator::new();

    let candidates = [
        ("import", "import os"),
        ("from-import", "from subprocess import run"),
        ("dynamic eval", "eval('2 + 2')"),
        ("file open", "open('/etc/passwd').read()"),
        ("dunder walk", "().__class__.__bases__[0].__subclasses__()"),
        ("scope escape", "def f():\n    global state\n    state = {}"),
        ("literal infinite loop", "while True:\n    pass"),
        ("reflective dunder", "getattr(scene, '__dict__')"),
        ("honest script", "scene.add_object('cube', 0.0, 0.0, 1.0)"),
    ];

    for (label, code) in candidates {
        let verdict = validator.validate(code);
        let status = if verdict.accepted { "ACCEPT" } else { "REJECT" };
        println!("{status:6} {label}: {}", verdict.reason);
    }
}
