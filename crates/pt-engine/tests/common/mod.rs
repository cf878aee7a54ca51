// crates/pt-engine/tests/common.rs
//
// Locates (and, if necessary, builds) the cdylib test-fixture plugins
// used by `scenarios.rs`. Cargo's "artifact dependencies" feature that
// would let a dev-dependency declare `artifact = "cdylib"` is still
// nightly-only, so this shells out to `cargo build -p <crate>` the
// same way a developer running these tests locally would, treating a
// missing `.dll`/`.so` as a recoverable, logged condition rather than
// a panic.

use std::path::{Path, PathBuf};
use std::process::Command;

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("crates/ directory")
        .parent()
        .expect("workspace root")
        .to_path_buf()
}

fn platform_artifact_name(crate_name: &str) -> String {
    let lib_name = crate_name.replace('-', "_");
    if cfg!(target_os = "windows") {
        format!("{lib_name}.dll")
    } else if cfg!(target_os = "macos") {
        format!("lib{lib_name}.dylib")
    } else {
        format!("lib{lib_name}.so")
    }
}

/// Returns the path to `crate_name`'s built cdylib, building it with
/// `cargo build -p <crate_name>` first if the artifact isn't already
/// present under `target/debug`.
pub fn fixture_artifact(crate_name: &str) -> PathBuf {
    let root = workspace_root();
    let artifact = root.join("target").join("debug").join(platform_artifact_name(crate_name));

    if artifact.exists() {
        return artifact;
    }

    let status = Command::new(env!("CARGO"))
        .args(["build", "-p", crate_name])
        .current_dir(&root)
        .status()
        .unwrap_or_else(|err| panic!("failed to spawn cargo build for {crate_name}: {err}"));

    assert!(status.success(), "cargo build -p {crate_name} failed");
    assert!(artifact.exists(), "expected artifact at {artifact:?} after building {crate_name}");
    artifact
}
