// crates/pt-engine/src/rules/context.rs
//
// Bundles the mutable engine state a dispatch pass touches, as one
// explicit borrow rather than a process-wide global.

use std::collections::HashMap;

use pt_types::host_api::LastTransferred;
use pt_types::TransferRule;

use crate::plugin::{InterfaceRuntimeState, PluginTable};
use crate::rules::condition::ConditionEvaluator;
use crate::rules::index::RuleIndex;

pub struct DispatchContext<'a> {
    pub plugins: &'a mut PluginTable,
    pub interfaces: &'a mut HashMap<(String, String), InterfaceRuntimeState>,
    pub rules: &'a [TransferRule],
    pub rule_index: &'a RuleIndex,
    pub last_transferred: &'a mut Option<LastTransferred>,
    pub condition_evaluator: &'a dyn ConditionEvaluator,
    pub recursion_limit: u32,
}

impl<'a> DispatchContext<'a> {
    /// Candidate rule indices for a source event tuple: prefer the
    /// hash index; fall back to a full linear scan only when the index
    /// has never been built. The two must agree whenever both run.
    pub fn candidate_rule_indices(&self, plugin: &str, interface: &str, param_index: i32) -> Vec<usize> {
        if self.rule_index.is_empty() {
            return self
                .rules
                .iter()
                .enumerate()
                .filter(|(_, r)| r.matches_source(plugin, interface, param_index))
                .map(|(i, _)| i)
                .collect();
        }
        self.rule_index
            .candidates(plugin, interface, param_index)
            .map(|slice| slice.to_vec())
            .unwrap_or_default()
    }
}
