// crates/pt-engine/src/platform/library.rs
//
// Thin wrapper around `libloading`. Never aborts: on failure, return
// null/zero and let the caller log and skip the plugin. No copy of the
// library to a unique temp path before loading — that dance only
// matters for dodging Windows file-locking during repeated hot
// reloads, and this engine does not hot-swap plugins mid-run, so a
// plugin is loaded once, straight from its declared path, and kept for
// the engine's lifetime.

use libloading::{Library, Symbol};
use std::path::Path;

/// Load a shared library at `path`. Returns `None` rather than
/// propagating the `libloading::Error` — failure semantics are
/// "return null", with the caller responsible for logging.
pub fn load_library(path: &Path) -> Option<Library> {
    match unsafe { Library::new(path) } {
        Ok(lib) => Some(lib),
        Err(err) => {
            tracing::warn!(?path, %err, "failed to load plugin library");
            None
        }
    }
}

/// Resolve a symbol by name. The returned pointer is only valid for
/// the lifetime of `lib`.
///
/// # Safety
/// `T` must accurately describe the signature of the symbol `name` in
/// `lib`; calling through a wrongly-typed symbol is undefined behavior.
pub unsafe fn get_symbol<'lib, T>(lib: &'lib Library, name: &[u8]) -> Option<Symbol<'lib, T>> {
    match lib.get::<T>(name) {
        Ok(sym) => Some(sym),
        Err(err) => {
            tracing::warn!(symbol = %String::from_utf8_lossy(name), %err, "failed to resolve symbol");
            None
        }
    }
}

/// Dropping a `libloading::Library` closes it; kept as a named
/// function so call sites read the same as a conceptual `close_library`.
pub fn close_library(lib: Library) {
    drop(lib);
}
