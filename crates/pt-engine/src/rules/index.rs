// crates/pt-engine/src/rules/index.rs
//
// Rule-index: a hash map keyed by `(source_plugin, source_interface,
// source_param_index)`, each value a list of rule indices. A manual
// FNV-1a open-chain hash table with a load factor and doubling isn't
// load-bearing here: `std::collections::HashMap<RuleKey, Vec<usize>>`
// reproduces the same narrowing semantics — indexed application must
// be a subset-preserving filter equivalent to a linear scan — without
// hand-rolled buckets.

use std::collections::HashMap;

use pt_types::{RuleKey, TransferRule};

#[derive(Default)]
pub struct RuleIndex {
    buckets: HashMap<RuleKey, Vec<usize>>,
}

impl RuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the index from scratch. Disabled rules, and rules
    /// missing a source plugin/interface, are never indexed — they can
    /// never match an event.
    pub fn build(rules: &[TransferRule]) -> Self {
        let mut buckets: HashMap<RuleKey, Vec<usize>> = HashMap::new();
        for (i, rule) in rules.iter().enumerate() {
            if !rule.enabled {
                continue;
            }
            let key = RuleKey::new(
                rule.source.plugin.clone(),
                rule.source.interface.clone(),
                rule.source.param_index,
            );
            buckets.entry(key).or_default().push(i);
        }
        tracing::info!(
            entries = buckets.values().map(Vec::len).sum::<usize>(),
            buckets = buckets.len(),
            "built rule hash index"
        );
        Self { buckets }
    }

    /// Candidate rule indices for a source event tuple, in rule-table
    /// insertion order.
    pub fn candidates(&self, plugin: &str, interface: &str, param_index: i32) -> Option<&[usize]> {
        let key = RuleKey::new(plugin, interface, param_index);
        self.buckets.get(&key).map(Vec::as_slice)
    }

    /// `true` when the index has never been built: dispatch falls back
    /// to a linear scan in that case instead of trusting an empty
    /// result.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pt_types::{RuleEndpointSource, RuleEndpointTarget, TransferRule};

    fn rule(src_plugin: &str, src_iface: &str, src_param: i32) -> TransferRule {
        TransferRule::unicast(
            RuleEndpointSource {
                plugin: src_plugin.to_string(),
                interface: src_iface.to_string(),
                param_index: src_param,
            },
            RuleEndpointTarget {
                plugin: "T".to_string(),
                interface: "x".to_string(),
                param_index: 0,
                target_plugin_path: None,
            },
        )
    }

    #[test]
    fn narrows_to_matching_source() {
        let rules = vec![rule("A", "f", -1), rule("B", "g", 0)];
        let index = RuleIndex::build(&rules);
        assert_eq!(index.candidates("A", "f", -1), Some(&[0][..]));
        assert_eq!(index.candidates("B", "g", 0), Some(&[1][..]));
        assert_eq!(index.candidates("C", "h", 0), None);
    }

    #[test]
    fn disabled_rules_are_never_indexed() {
        let mut rules = vec![rule("A", "f", -1)];
        rules[0].enabled = false;
        let index = RuleIndex::build(&rules);
        assert_eq!(index.candidates("A", "f", -1), None);
    }
}
