// crates/pt-engine/src/rules/dispatch.rs
//
// Top-level rule dispatch for one event: two passes over the same
// candidate range, broadcast+multicast first, then unicast with the
// "exact duplicate target" tie-break.

use pt_types::{TransferMode, TransferRule, Value};

use crate::error::{DispatchOutcome, RejectReason};

use super::context::DispatchContext;
use super::cycle::CallChain;
use super::target::{self, Incoming};

fn apply_broadcast_multicast(ctx: &mut DispatchContext, candidates: &[TransferRule], value: Value, call_chain: &CallChain, recursion_depth: u32) -> usize {
    let mut success_count = 0;
    for rule in candidates.iter().filter(|r| target::is_broadcast_or_gated_multicast(r)) {
        if !ctx.condition_evaluator.evaluate(rule.condition.as_deref(), &value) {
            tracing::info!(condition = ?rule.condition, "transfer rule condition not met, skipping");
            continue;
        }
        tracing::info!(mode = ?rule.transfer_mode, target = %format!("{}.{}", rule.target.plugin, rule.target.interface), "applying transfer rule");
        match target::prepare_and_invoke(ctx, rule, Incoming::Propagated(value), call_chain, recursion_depth, false) {
            Ok(_) => {
                success_count += 1;
                tracing::info!("successfully called target plugin interface");
            }
            Err(err) => tracing::warn!(?err, "failed to call target plugin interface"),
        }
    }
    success_count
}

/// Applies every matching unicast rule in order. Per the "exact
/// duplicate target" tie-break: when a later rule in `candidates`
/// names the exact same
/// `(target_plugin, target_interface, target_param_index)`, the
/// earlier rule is suppressed rather than fired — the later rule wins
/// without the target ever being called twice for it. This is a
/// lookahead-and-skip, not a fire-then-stop: rules targeting unrelated
/// slots after a suppressed one still fire.
fn apply_unicast(ctx: &mut DispatchContext, candidates: &[TransferRule], value: Value, call_chain: &CallChain, recursion_depth: u32) -> usize {
    let mut success_count = 0;
    for (i, rule) in candidates.iter().enumerate() {
        if rule.transfer_mode != TransferMode::Unicast {
            continue;
        }
        if target::has_later_exact_duplicate(rule, &candidates[i + 1..].iter().collect::<Vec<_>>()) {
            tracing::info!(target = %format!("{}.{}", rule.target.plugin, rule.target.interface), "suppressed by a later exact-duplicate-target rule");
            continue;
        }
        if !ctx.condition_evaluator.evaluate(rule.condition.as_deref(), &value) {
            tracing::info!(condition = ?rule.condition, "transfer rule condition not met, skipping");
            continue;
        }
        tracing::info!(target = %format!("{}.{}", rule.target.plugin, rule.target.interface), "applying unicast transfer rule");
        match target::prepare_and_invoke(ctx, rule, Incoming::Propagated(value), call_chain, recursion_depth, false) {
            Ok(_) => {
                success_count += 1;
                tracing::info!("successfully called target plugin interface");
            }
            Err(err) => tracing::warn!(?err, "failed to call target plugin interface"),
        }
    }
    success_count
}

/// Dispatch one `(plugin, interface, param_index)` event.
#[allow(clippy::too_many_arguments)]
pub fn dispatch_event(
    ctx: &mut DispatchContext,
    source_plugin: &str,
    source_interface: &str,
    source_param_index: i32,
    value: Value,
    call_chain: &CallChain,
    recursion_depth: u32,
) -> DispatchOutcome {
    if call_chain.contains(source_plugin, source_interface) {
        tracing::warn!(source = %format!("{source_plugin}.{source_interface}"), "cycle detected at dispatch entry, rejecting");
        return DispatchOutcome::Rejected(RejectReason::CycleDetected);
    }

    let indices = ctx.candidate_rule_indices(source_plugin, source_interface, source_param_index);
    if indices.is_empty() {
        return DispatchOutcome::NoMatch;
    }
    let candidates: Vec<TransferRule> = indices.into_iter().map(|i| ctx.rules[i].clone()).collect();

    let mut success_count = apply_broadcast_multicast(ctx, &candidates, value, call_chain, recursion_depth);
    success_count += apply_unicast(ctx, &candidates, value, call_chain, recursion_depth);

    DispatchOutcome::Dispatched { success_count }
}
