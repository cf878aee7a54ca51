// crates/pt-engine/src/platform/fs.rs
//
// File-system facts the plugin loader needs: staleness detection and
// plugin discovery, grounded on
// `original_source/pointer_transfer/platform/file/file_{timestamp,search}.c`.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Modification time in seconds since the Unix epoch, or `None` on any
/// I/O error — callers surface a warning and treat the plugin as
/// unchanged rather than propagating the error.
pub fn file_mtime(path: &Path) -> Option<u64> {
    let metadata = std::fs::metadata(path).ok()?;
    let modified = metadata.modified().ok()?;
    modified.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}

#[cfg(target_os = "windows")]
const SHARED_OBJECT_EXTENSIONS: &[&str] = &["dll"];
#[cfg(target_os = "macos")]
const SHARED_OBJECT_EXTENSIONS: &[&str] = &["dylib"];
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const SHARED_OBJECT_EXTENSIONS: &[&str] = &["so"];

fn has_shared_object_extension(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    SHARED_OBJECT_EXTENSIONS
        .iter()
        .any(|candidate| ext.eq_ignore_ascii_case(candidate))
}

/// Recursively walk `dir` collecting shared-object paths, filtered by
/// the platform extension (case-insensitive), capped at `max` entries.
pub fn enumerate_shared_objects(dir: &Path, max: usize) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut stack = vec![dir.to_path_buf()];

    while let Some(current) = stack.pop() {
        if found.len() >= max {
            break;
        }
        let Ok(entries) = std::fs::read_dir(&current) else {
            continue;
        };
        for entry in entries.flatten() {
            if found.len() >= max {
                break;
            }
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if has_shared_object_extension(&path) {
                found.push(path);
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerate_filters_by_extension() {
        let dir = std::env::temp_dir().join("pt_engine_fs_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("a.txt"), b"").unwrap();
        let so_name = if cfg!(windows) {
            "b.dll"
        } else if cfg!(target_os = "macos") {
            "b.dylib"
        } else {
            "b.so"
        };
        std::fs::write(dir.join(so_name), b"").unwrap();
        std::fs::write(dir.join("nested").join(so_name), b"").unwrap();

        let found = enumerate_shared_objects(&dir, 16);
        assert_eq!(found.len(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn enumerate_respects_max() {
        let dir = std::env::temp_dir().join("pt_engine_fs_test_max");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let so_ext = if cfg!(windows) {
            "dll"
        } else if cfg!(target_os = "macos") {
            "dylib"
        } else {
            "so"
        };
        for i in 0..5 {
            std::fs::write(dir.join(format!("p{i}.{so_ext}")), b"").unwrap();
        }

        let found = enumerate_shared_objects(&dir, 2);
        assert_eq!(found.len(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn mtime_missing_file_is_none() {
        assert!(file_mtime(Path::new("/nonexistent/path/xyz")).is_none());
    }
}
