// crates/pt-engine/src/rules/fanout.rs
//
// Return-value fan-out: routes a target interface's return value on
// to every rule whose source is that interface's return slot, with a
// dedicated grouped-commit path for SetGroup members.

use core::ffi::c_void;

use pt_types::rule::RETURN_VALUE_PARAM_INDEX;
use pt_types::{LastTransferred, ReturnKind, TransferRule, Value};

use crate::ffi::{invoke, CallResult};

use super::context::DispatchContext;
use super::cycle::CallChain;
use super::target::{self, Incoming};

/// Reinterprets a call's raw result registers as a typed `Value` the
/// way the returning interface's declared kind dictates: an int64
/// shadow for integer/pointer, a double shadow for floating, a struct
/// buffer pointer for by-value.
fn return_as_value(call: &CallResult, kind: ReturnKind) -> Value {
    match kind {
        ReturnKind::Float | ReturnKind::Double => Value::Double(call.float_result),
        ReturnKind::StructByValue(size) => {
            let addr = call
                .struct_buf
                .as_ref()
                .map(|buf| buf.bytes().as_ptr() as *mut c_void)
                .unwrap_or(core::ptr::null_mut());
            Value::Ptr { addr, size }
        }
        ReturnKind::PointerOrStructPtr => Value::Ptr {
            addr: call.int_result as *mut c_void,
            size: core::mem::size_of::<usize>(),
        },
        ReturnKind::Integer => Value::Int64(call.int_result),
    }
}

fn record_last_transferred(ctx: &mut DispatchContext, value: &Value) {
    *ctx.last_transferred = Some(LastTransferred {
        tag: value.type_tag(),
        type_name: String::new(),
        size: value.size(),
    });
}

/// Drive one member of a SetGroup: re-invoke the source interface
/// fresh, check the target's lower slots are ready, then prepare the
/// member's target slot.
fn apply_setgroup_member(
    ctx: &mut DispatchContext,
    source_plugin: &str,
    source_interface: &str,
    member: &TransferRule,
    call_chain: &CallChain,
    recursion_depth: u32,
) -> bool {
    let Some(source_state) = ctx.interfaces.get(&(source_plugin.to_string(), source_interface.to_string())) else {
        return false;
    };
    let func_ptr = source_state.func_ptr;
    let return_kind = source_state.return_kind;
    let values = source_state.ready_values(source_state.ready_prefix_len().max(source_state.min_params));

    let fresh = match unsafe { invoke(func_ptr, &values, return_kind) } {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(?err, "setgroup re-invocation of source interface failed");
            return false;
        }
    };

    // Lower-indexed slots of the target must already be ready.
    if member.target.param_index > 0 {
        let key = (member.target.plugin.clone(), member.target.interface.clone());
        let lower_ready = ctx
            .interfaces
            .get(&key)
            .map(|s| s.slots.iter().take(member.target.param_index as usize).all(|slot| slot.ready))
            .unwrap_or(member.target.param_index == 0);
        if !lower_ready {
            return false;
        }
    }

    let value = return_as_value(&fresh, return_kind);
    record_last_transferred(ctx, &value);

    let incoming = match member.target_param_value.as_deref().filter(|v| !v.is_empty()) {
        Some(literal) => Incoming::Literal(literal),
        None => Incoming::Propagated(value),
    };

    target::prepare_and_invoke(ctx, member, incoming, call_chain, recursion_depth, true).is_ok()
}

/// Collect, sort, and drive one SetGroup. `members` are already known
/// to share `set_group` and the same target interface.
fn run_setgroup(
    ctx: &mut DispatchContext,
    source_plugin: &str,
    source_interface: &str,
    mut members: Vec<TransferRule>,
    call_chain: &CallChain,
    recursion_depth: u32,
) -> usize {
    members.sort_by_key(|r| r.target.param_index);
    let mut success_count = 0;

    // Within the group, an exact-duplicate-target peer later in
    // ascending-index order suppresses an earlier one (same lookahead
    // rule as the unicast tie-break), scoped first to the group before
    // any cross-group check happens in `fan_out`.
    for (i, member) in members.iter().enumerate() {
        let rest: Vec<&TransferRule> = members[i + 1..].iter().collect();
        if target::has_later_exact_duplicate(member, &rest) {
            continue;
        }
        if apply_setgroup_member(ctx, source_plugin, source_interface, member, call_chain, recursion_depth) {
            success_count += 1;
        }
    }

    // SetGroup atomic-commit discipline: clear the target interface's
    // parameter-ready bits once the whole group has fired.
    if let Some(first) = members.first() {
        let key = (first.target.plugin.clone(), first.target.interface.clone());
        if let Some(state) = ctx.interfaces.get_mut(&key) {
            state.reset_slots();
        }
    }

    success_count
}

/// Entry point called after a target's invocation completes
/// successfully. Routes the just-returned value to every rule whose
/// source is `(plugin, interface, -1)`.
#[allow(clippy::too_many_arguments)]
pub fn fan_out(
    ctx: &mut DispatchContext,
    plugin: &str,
    interface: &str,
    call: &CallResult,
    return_kind: ReturnKind,
    _triggering_rule: &TransferRule,
    call_chain: &CallChain,
    recursion_depth: u32,
) -> usize {
    let candidates: Vec<TransferRule> = ctx
        .rules
        .iter()
        .filter(|r| r.matches_source(plugin, interface, RETURN_VALUE_PARAM_INDEX))
        .cloned()
        .collect();
    if candidates.is_empty() {
        return 0;
    }

    let value = return_as_value(call, return_kind);
    record_last_transferred(ctx, &value);

    let mut processed = vec![false; candidates.len()];
    let mut success_count = 0;

    for i in 0..candidates.len() {
        if processed[i] {
            continue;
        }
        let rule = candidates[i].clone();

        if let Some(group) = rule.set_group.as_ref().filter(|g| !g.is_empty()) {
            let group = group.clone();
            let mut members = vec![rule.clone()];
            processed[i] = true;
            for (j, other) in candidates.iter().enumerate().skip(i + 1) {
                if processed[j] {
                    continue;
                }
                if other.set_group.as_deref() == Some(group.as_str())
                    && other.target.plugin == rule.target.plugin
                    && other.target.interface == rule.target.interface
                {
                    members.push(other.clone());
                    processed[j] = true;
                }
            }
            success_count += run_setgroup(ctx, plugin, interface, members.clone(), call_chain, recursion_depth);

            // After exhausting the group, check non-group rules for an
            // exact duplicate target against any group member: if one
            // exists, stop fan-out here.
            let non_group_duplicate = candidates
                .iter()
                .enumerate()
                .any(|(j, other)| !processed[j] && members.iter().any(|m| m.targets_same_slot(other)));
            if non_group_duplicate {
                break;
            }
            continue;
        }

        if rule.transfer_mode == pt_types::TransferMode::Unicast
            && target::has_later_exact_duplicate(&rule, &candidates[i + 1..].iter().collect::<Vec<_>>())
        {
            processed[i] = true;
            continue;
        }

        processed[i] = true;
        let incoming = match rule.target_param_value.as_deref().filter(|v| !v.is_empty()) {
            Some(literal) => Incoming::Literal(literal),
            None => Incoming::Propagated(value),
        };
        let ok = target::prepare_and_invoke(ctx, &rule, incoming, call_chain, recursion_depth, false).is_ok();
        if ok {
            success_count += 1;
        }
    }

    success_count
}
