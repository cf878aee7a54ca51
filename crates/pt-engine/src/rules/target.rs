// crates/pt-engine/src/rules/target.rs
//
// Target preparation and invocation. Folds what would otherwise be a
// prepare/execute pair into one function, since Rust's ownership makes
// the split state threading (`state_out`, `actual_param_count_out`,
// ...) unnecessary.

use pt_types::vtable::ArityKind;
use pt_types::{InterfaceDescriptor, ParamType, ReturnKind, TransferMode, TransferRule, Value};

use crate::error::PrepareError;
use crate::ffi::{invoke, CallResult};
use crate::plugin::InterfaceRuntimeState;
use crate::platform::get_symbol;
use crate::plugin::return_kind::infer_interface_return_kind;

use super::context::DispatchContext;
use super::cycle::CallChain;
use super::fanout;

/// What a target's parameter slot is written from.
pub enum Incoming<'a> {
    /// The propagated pointer/value from the triggering event, plus
    /// its declared size — written into the target slot when no
    /// literal override applies.
    Propagated(Value),
    /// Only used internally by fan-out when a rule's `target_param_value`
    /// literal overrides the propagated return (kept distinct from
    /// `Propagated` only for clarity at call sites).
    Literal(&'a str),
}

pub struct TargetOutcome {
    pub call: CallResult,
    pub return_kind: ReturnKind,
    pub target_plugin: String,
    pub target_interface: String,
}

fn resolve_descriptor<'d>(plugin_descriptor: &'d pt_types::PluginDescriptor, interface_name: &str) -> Option<&'d InterfaceDescriptor> {
    plugin_descriptor.interfaces.iter().find(|i| i.name == interface_name)
}

fn find_or_create_state(
    ctx: &mut DispatchContext,
    plugin_name: &str,
    interface_name: &str,
) -> Result<(), PrepareError> {
    let key = (plugin_name.to_string(), interface_name.to_string());
    if ctx.interfaces.contains_key(&key) {
        return Ok(());
    }

    let loaded = ctx
        .plugins
        .load_or_get_by_name(plugin_name)
        .ok_or(PrepareError::PluginUnavailable)?;
    let descriptor = resolve_descriptor(&loaded.descriptor, interface_name).ok_or(PrepareError::PluginUnavailable)?;

    // Safety: the engine does not outlive the owning `LoadedPlugin`'s
    // library, so the resolved symbol remains valid for every call
    // made through the cached `func_ptr`.
    let symbol = unsafe { get_symbol::<pt_types::vtable::InterfaceFn>(&loaded.library, interface_name.as_bytes()) }
        .ok_or(PrepareError::PluginUnavailable)?;
    let func_ptr = *symbol as *const ();

    let declared_return_size = descriptor.params.iter().map(|p| p.size).max().unwrap_or(0);
    let (return_kind, return_size) = infer_interface_return_kind(descriptor, declared_return_size);

    let state = InterfaceRuntimeState::new(plugin_name.to_string(), func_ptr, descriptor, return_kind, return_size);
    ctx.interfaces.insert(key, state);
    Ok(())
}

/// Apply every still-unready literal constant targeting this
/// interface. A `string`-typed literal's `Value::Str` points directly
/// into the `String` buffer parsed here, so the caller must keep the
/// returned `Vec` alive at least until after the target call that
/// consumes these slots returns.
fn apply_constant_value_rules(ctx: &mut DispatchContext, target_plugin: &str, target_interface: &str) -> Vec<String> {
    let literals: Vec<(i32, String)> = ctx
        .rules
        .iter()
        .filter(|r| r.enabled && r.target.plugin == target_plugin && r.target.interface == target_interface)
        .filter_map(|r| r.target_param_value.as_ref().filter(|v| !v.is_empty()).map(|v| (r.target.param_index, v.clone())))
        .collect();

    let key = (target_plugin.to_string(), target_interface.to_string());
    let mut keepalive = Vec::with_capacity(literals.len());
    for (index, literal) in literals {
        let should_write = match ctx.interfaces.get(&key) {
            Some(state) => index >= 0 && ((index as usize) >= state.slots.len() || !state.slots[index as usize].ready),
            None => false,
        };
        if should_write {
            let tag = slot_type_tag(ctx, target_plugin, target_interface, index);
            if let Some(value) = Value::parse_literal(&literal, tag) {
                if let Some(state) = ctx.interfaces.get_mut(&key) {
                    let _ = state.write_slot(index, value);
                }
            }
        }
        keepalive.push(literal);
    }
    keepalive
}

fn slot_type_tag(ctx: &DispatchContext, target_plugin: &str, target_interface: &str, index: i32) -> ParamType {
    ctx.plugins
        .get(target_plugin)
        .and_then(|p| resolve_descriptor(&p.descriptor, target_interface))
        .and_then(|d| d.params.get(index.max(0) as usize))
        .map(|p| p.type_tag)
        .unwrap_or(ParamType::Any)
}

/// Variadic envelope: widest `target_param_index` any enabled rule
/// targets on this interface, clamped to the allocated slot count.
fn variadic_envelope(ctx: &DispatchContext, target_plugin: &str, target_interface: &str, required: i32, param_count: i32) -> i32 {
    let widest = ctx
        .rules
        .iter()
        .filter(|r| r.enabled && r.target.plugin == target_plugin && r.target.interface == target_interface)
        .map(|r| r.target.param_index + 1)
        .max()
        .unwrap_or(required);
    required.max(widest).min(param_count.max(required))
}

/// Prepare and invoke one target rule. `call_chain` is the chain
/// inherited from the caller; cycle detection runs first, before any
/// state mutation.
pub fn prepare_and_invoke(
    ctx: &mut DispatchContext,
    rule: &TransferRule,
    incoming: Incoming<'_>,
    call_chain: &CallChain,
    recursion_depth: u32,
    skip_param_cleanup: bool,
) -> Result<TargetOutcome, PrepareError> {
    let target_plugin = rule.target.plugin.clone();
    let target_interface = rule.target.interface.clone();

    if call_chain.contains(&target_plugin, &target_interface) {
        tracing::warn!(target = %format!("{target_plugin}.{target_interface}"), "cycle detected, rejecting dispatch");
        return Err(PrepareError::CycleDetected);
    }
    super::cycle::check_recursion_depth(recursion_depth, ctx.recursion_limit);

    if let Some(path) = &rule.target.target_plugin_path {
        ctx.plugins.register_path(&target_plugin, path);
    }

    find_or_create_state(ctx, &target_plugin, &target_interface)?;

    let key = (target_plugin.clone(), target_interface.clone());
    let tag = slot_type_tag(ctx, &target_plugin, &target_interface, rule.target.param_index);

    let value = match incoming {
        Incoming::Literal(literal) => Value::parse_literal(literal, tag).ok_or(PrepareError::LiteralParseFailed)?,
        Incoming::Propagated(value) => {
            if let Some(literal) = rule.target_param_value.as_ref().filter(|v| !v.is_empty()) {
                Value::parse_literal(literal, tag).ok_or(PrepareError::LiteralParseFailed)?
            } else {
                value
            }
        }
    };

    {
        let state = ctx.interfaces.get_mut(&key).expect("state created above");
        state
            .write_slot(rule.target.param_index, value)
            .map_err(|_| PrepareError::ParamIndexOutOfRange)?;
    }

    // Held until after `invoke()` below: any `string`-typed literal's
    // `Value::Str` points directly into one of these buffers.
    let _literal_value_keepalive = apply_constant_value_rules(ctx, &target_plugin, &target_interface);

    let state = ctx.interfaces.get(&key).expect("state created above");
    let ready = match state.arity {
        ArityKind::Fixed => {
            if state.first_gap().is_some() {
                return Err(PrepareError::ParameterGap);
            }
            state.is_fixed_ready()
        }
        ArityKind::Variadic => {
            if let Some(gap) = state.first_gap() {
                tracing::warn!(gap, "variadic parameter gap, aborting dispatch");
                return Err(PrepareError::ParameterGap);
            }
            state.ready_prefix_len() >= state.min_params
        }
    };
    if !ready {
        return Err(PrepareError::ReadinessMiss);
    }

    let required = state.ready_prefix_len().max(state.min_params);
    let envelope = variadic_envelope(ctx, &target_plugin, &target_interface, required, state.param_count);
    if envelope < state.min_params {
        return Err(PrepareError::VariadicEnvelopeTooSmall);
    }

    let actual_param_count = match state.arity {
        ArityKind::Fixed => state.param_count,
        ArityKind::Variadic => envelope,
    };
    let return_kind = state.return_kind;
    if let ReturnKind::StructByValue(size) = return_kind {
        if size == 0 {
            return Err(PrepareError::MissingReturnSize);
        }
    }
    let func_ptr = state.func_ptr;
    let values = state.ready_values(actual_param_count);

    tracing::info!(target = %format!("{target_plugin}.{target_interface}"), param_count = actual_param_count, "calling target plugin interface");
    let call = unsafe { invoke(func_ptr, &values, return_kind) }.map_err(|err| {
        tracing::warn!(?err, target = %format!("{target_plugin}.{target_interface}"), "target call failed");
        PrepareError::CallFailed
    })?;

    if !skip_param_cleanup {
        if let Some(state) = ctx.interfaces.get_mut(&key) {
            state.reset_slots();
        }
    }

    let extended_chain = call_chain.extended(&target_plugin, &target_interface);
    fanout::fan_out(ctx, &target_plugin, &target_interface, &call, return_kind, rule, &extended_chain, recursion_depth + 1);

    Ok(TargetOutcome {
        call,
        return_kind,
        target_plugin,
        target_interface,
    })
}

/// Checks the unicast "exact duplicate target" tie-break: whether a
/// later rule among `remaining` targets the exact same
/// `(plugin, interface, param_index)` slot as `current`.
pub fn has_later_exact_duplicate(current: &TransferRule, remaining: &[&TransferRule]) -> bool {
    remaining.iter().any(|r| r.targets_same_slot(current))
}

pub fn is_broadcast_or_gated_multicast(rule: &TransferRule) -> bool {
    match rule.transfer_mode {
        TransferMode::Broadcast => true,
        TransferMode::Multicast => rule.multicast_group.as_ref().is_some_and(|g| !g.is_empty()),
        TransferMode::Unicast => false,
    }
}
