#![allow(dead_code)]

pub use swbridge_test_utils::builders;
pub use swbridge_test_utils::scripted::{RecordingListener, ScriptedOperation};
pub use swbridge_test_utils::{init_tracing, wait_until, with_timeout};

use std::path::{Path, PathBuf};

/// Write an executable `sh` script standing in for an external tool.
#[cfg(unix)]
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}
