// crates/pt-engine/src/plugin/table.rs
//
// Loaded-plugin table: one entry per plugin, created on first
// reference, kept until engine shutdown. N plugins loaded by path,
// looked up by name, never unloaded mid-run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use libloading::Library;
use pt_types::PluginDescriptor;

use super::introspect::introspect_plugin;
use crate::platform::load_library;

pub struct LoadedPlugin {
    pub descriptor: PluginDescriptor,
    pub library: Library,
}

#[derive(Default)]
pub struct PluginTable {
    plugins: HashMap<String, LoadedPlugin>,
    /// Cached name -> path mapping so repeated lookups don't re-walk
    /// the plugin list.
    path_cache: HashMap<String, PathBuf>,
}

impl PluginTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, plugin_name: &str) -> Option<&LoadedPlugin> {
        self.plugins.get(plugin_name)
    }

    pub fn cached_path(&self, plugin_name: &str) -> Option<&Path> {
        self.path_cache.get(plugin_name).map(PathBuf::as_path)
    }

    pub fn register_path(&mut self, plugin_name: &str, path: &Path) {
        self.path_cache
            .insert(plugin_name.to_string(), path.to_path_buf());
    }

    /// Load (or return already-loaded) plugin at `path`. Never aborts:
    /// a failed load logs a warning and returns `None`.
    pub fn load_or_get(&mut self, path: &Path) -> Option<&LoadedPlugin> {
        // Fast path: already loaded under this exact path.
        if let Some(name) = self
            .plugins
            .iter()
            .find(|(_, p)| p.descriptor.path == path)
            .map(|(name, _)| name.clone())
        {
            return self.plugins.get(&name);
        }

        let library = load_library(path)?;
        let descriptor = match introspect_plugin(&library, path) {
            Some(d) => d,
            None => {
                tracing::warn!(?path, "plugin introspection failed, skipping");
                return None;
            }
        };

        let name = descriptor.name.clone();
        self.path_cache.insert(name.clone(), path.to_path_buf());
        self.plugins.insert(name.clone(), LoadedPlugin { descriptor, library });
        self.plugins.get(&name)
    }

    /// Resolve a plugin purely by name, using the cached path. Used
    /// when a rule names a target plugin without an explicit path
    /// override — `target_plugin_path` is optional.
    pub fn load_or_get_by_name(&mut self, plugin_name: &str) -> Option<&LoadedPlugin> {
        if self.plugins.contains_key(plugin_name) {
            return self.plugins.get(plugin_name);
        }
        let path = self.cached_path(plugin_name)?.to_path_buf();
        self.load_or_get(&path)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
