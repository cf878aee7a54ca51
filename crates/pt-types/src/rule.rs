// crates/pt-types/src/rule.rs
//
// The declarative transfer rule. The in-memory shape is contractually
// fixed; the on-disk `.nxpt` format that produces these is out of
// scope.

/// `param_index = -1` denotes "the source interface's return value".
pub const RETURN_VALUE_PARAM_INDEX: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Unicast,
    Multicast,
    Broadcast,
}

#[derive(Debug, Clone)]
pub struct RuleEndpointSource {
    pub plugin: String,
    pub interface: String,
    /// `-1` for "the return value", otherwise a parameter slot.
    pub param_index: i32,
}

#[derive(Debug, Clone)]
pub struct RuleEndpointTarget {
    pub plugin: String,
    pub interface: String,
    pub param_index: i32,
    /// Overrides the plugin-name -> path lookup when present.
    pub target_plugin_path: Option<std::path::PathBuf>,
}

#[derive(Debug, Clone)]
pub struct TransferRule {
    pub source: RuleEndpointSource,
    pub target: RuleEndpointTarget,
    pub transfer_mode: TransferMode,
    /// Required non-empty when `transfer_mode == Multicast`, ignored
    /// otherwise.
    pub multicast_group: Option<String>,
    /// Rules sharing a `set_group` and target interface fire as one
    /// atomic group.
    pub set_group: Option<String>,
    /// Opaque predicate string evaluated by the engine's condition
    /// evaluator; `None`/empty means "always true".
    pub condition: Option<String>,
    /// Supersedes the propagated value when present.
    pub target_param_value: Option<String>,
    pub enabled: bool,
    /// Hint that the rule is hot; consumed only by
    /// `Engine::cached_rule_indices` for host-side introspection, never
    /// by dispatch itself.
    pub cache_self: bool,
}

impl TransferRule {
    pub fn unicast(source: RuleEndpointSource, target: RuleEndpointTarget) -> Self {
        Self {
            source,
            target,
            transfer_mode: TransferMode::Unicast,
            multicast_group: None,
            set_group: None,
            condition: None,
            target_param_value: None,
            enabled: true,
            cache_self: false,
        }
    }

    /// Matches a `(source_plugin, source_interface, source_param_index)`
    /// event tuple exactly, never loosely.
    pub fn matches_source(&self, plugin: &str, interface: &str, param_index: i32) -> bool {
        self.enabled
            && self.source.plugin == plugin
            && self.source.interface == interface
            && self.source.param_index == param_index
    }

    /// Whether this rule and `other` write the exact same target slot,
    /// used by the "exact duplicate target" unicast tie-break.
    pub fn targets_same_slot(&self, other: &TransferRule) -> bool {
        self.target.plugin == other.target.plugin
            && self.target.interface == other.target.interface
            && self.target.param_index == other.target.param_index
    }
}

/// Key used to index rules by source tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleKey {
    pub source_plugin: String,
    pub source_interface: String,
    pub source_param_index: i32,
}

impl RuleKey {
    pub fn new(plugin: impl Into<String>, interface: impl Into<String>, param_index: i32) -> Self {
        Self {
            source_plugin: plugin.into(),
            source_interface: interface.into(),
            source_param_index: param_index,
        }
    }
}
