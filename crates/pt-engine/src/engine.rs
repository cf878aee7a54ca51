// crates/pt-engine/src/engine.rs
//
// The engine: owns the plugin table, the rule table and its hash
// index, per-interface runtime state, and the "last transferred"
// slot as one owned context, never an ambient static. Exposes the two
// public entry points plugins call through plus constructor/builder
// configuration (`PluginManager::new`-style, no config-file reading
// anywhere).

use std::collections::HashMap;
use std::path::Path;

use pt_types::{HostApi, LastTransferred, PluginDescriptor, TransferRule, Value};

use crate::error::{DispatchOutcome, PtError};
use crate::plugin::{InterfaceRuntimeState, PluginTable};
use crate::rules::{dispatch_event, AlwaysTrueEvaluator, CallChain, ConditionEvaluator, DispatchContext, RuleIndex};

pub struct Engine {
    plugins: PluginTable,
    rules: Vec<TransferRule>,
    rule_index: RuleIndex,
    interfaces: HashMap<(String, String), InterfaceRuntimeState>,
    last_transferred: Option<LastTransferred>,
    condition_evaluator: Box<dyn ConditionEvaluator>,
    recursion_limit: u32,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            plugins: PluginTable::new(),
            rules: Vec::new(),
            rule_index: RuleIndex::new(),
            interfaces: HashMap::new(),
            last_transferred: None,
            condition_evaluator: Box::new(AlwaysTrueEvaluator),
            recursion_limit: crate::rules::cycle::RECURSION_DEPTH_WARN_THRESHOLD,
        }
    }

    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn with_condition_evaluator(mut self, evaluator: Box<dyn ConditionEvaluator>) -> Self {
        self.condition_evaluator = evaluator;
        self
    }

    /// Load a plugin library up front (rule targets otherwise load
    /// lazily on first dispatch).
    pub fn load_plugin(&mut self, path: &Path) -> Result<&PluginDescriptor, PtError> {
        self.plugins
            .load_or_get(path)
            .map(|loaded| &loaded.descriptor)
            .ok_or_else(|| PtError::PluginLoadFailed { path: path.to_path_buf() })
    }

    pub fn add_rule(&mut self, rule: TransferRule) {
        self.rules.push(rule);
        self.rebuild_rule_index();
    }

    pub fn set_rules(&mut self, rules: Vec<TransferRule>) {
        self.rules = rules;
        self.rebuild_rule_index();
    }

    fn rebuild_rule_index(&mut self) {
        self.rule_index = RuleIndex::build(&self.rules);
    }

    /// Rule indices hinted as hot via `cache_self`. Not consulted by
    /// dispatch, exposed for host-side introspection.
    pub fn cached_rule_indices(&self) -> Vec<usize> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.enabled && r.cache_self)
            .map(|(i, _)| i)
            .collect()
    }

    fn dispatch(&mut self, plugin: &str, interface: &str, param_index: i32, value: Value) -> DispatchOutcome {
        let mut ctx = DispatchContext {
            plugins: &mut self.plugins,
            interfaces: &mut self.interfaces,
            rules: &self.rules,
            rule_index: &self.rule_index,
            last_transferred: &mut self.last_transferred,
            condition_evaluator: self.condition_evaluator.as_ref(),
            recursion_limit: self.recursion_limit,
        };
        dispatch_event(&mut ctx, plugin, interface, param_index, value, &CallChain::new(), 0)
    }

    /// `TransferPointer`: registers a pointer and triggers dispatch.
    /// Returns `0` on a successful dispatch, `1` on a non-fatal
    /// type/size mismatch with the previously stored pointer, `-1`
    /// otherwise.
    #[tracing::instrument(skip(self, value))]
    pub fn transfer_pointer(&mut self, source_plugin: &str, source_interface: &str, source_param_index: i32, value: Value, type_name: &str) -> i32 {
        let mismatch = self
            .last_transferred
            .as_ref()
            .is_some_and(|prev| prev.tag != value.type_tag() || prev.size != value.size());
        self.last_transferred = Some(LastTransferred {
            tag: value.type_tag(),
            type_name: type_name.to_string(),
            size: value.size(),
        });

        let outcome = self.dispatch(source_plugin, source_interface, source_param_index, value);
        match outcome {
            DispatchOutcome::Dispatched { success_count } if success_count > 0 => {
                if mismatch {
                    tracing::warn!(source = %format!("{source_plugin}.{source_interface}"), "type/size mismatch with previously stored pointer");
                    1
                } else {
                    0
                }
            }
            _ => {
                tracing::warn!(source = %format!("{source_plugin}.{source_interface}"), "no rule matched or all targets failed");
                -1
            }
        }
    }

    /// `CallPlugin`: triggers dispatch from a specific parameter slot
    /// of a calling interface. When `param_index >= 0` and the calling
    /// interface already has that slot ready, the stored value drives
    /// dispatch instead of the supplied `value`.
    #[tracing::instrument(skip(self, value))]
    pub fn call_plugin(&mut self, source_plugin: &str, source_interface: &str, param_index: i32, value: Value) -> i32 {
        let effective_value = if param_index >= 0 {
            self.interfaces
                .get(&(source_plugin.to_string(), source_interface.to_string()))
                .and_then(|state| state.slots.get(param_index as usize))
                .filter(|slot| slot.ready)
                .and_then(|slot| slot.value)
                .unwrap_or(value)
        } else {
            value
        };

        self.dispatch(source_plugin, source_interface, param_index, effective_value).as_raw()
    }

    /// Builds the `HostApi` vtable a plugin receives at load time,
    /// bound to `self` via an opaque context pointer rather than an
    /// ambient global.
    pub fn host_api(&mut self) -> HostApi {
        crate::host_api::build(self)
    }
}
