// crates/pt-engine/src/plugin/state.rs
//
// Per-(plugin, interface) runtime state: resolved function pointer,
// parameter slots, return-type metadata. Created lazily on first
// preparation, reused across calls, slots reset after each successful
// dispatch unless a recursive frame suppresses cleanup.

use pt_types::vtable::ArityKind;
use pt_types::{InterfaceDescriptor, ReturnKind, Value};

#[derive(Debug, Clone, Default)]
pub struct ParamSlotState {
    pub ready: bool,
    pub value: Option<Value>,
}

pub struct InterfaceRuntimeState {
    pub plugin_name: String,
    pub interface_name: String,
    pub func_ptr: *const (),
    pub arity: ArityKind,
    pub min_params: i32,
    pub param_count: i32,
    pub slots: Vec<ParamSlotState>,
    pub return_kind: ReturnKind,
    pub return_size: usize,
    /// Set while a dispatch is in flight on this interface, used to
    /// suppress re-entrant cleanup during SetGroup re-invocation.
    pub in_use: bool,
}

impl InterfaceRuntimeState {
    pub fn new(
        plugin_name: String,
        func_ptr: *const (),
        descriptor: &InterfaceDescriptor,
        return_kind: ReturnKind,
        return_size: usize,
    ) -> Self {
        // For variadic interfaces `actual_param_count = max_params`;
        // when `max_params` is the unbounded sentinel, start with a
        // generous default envelope that grows on demand as
        // `write_slot` is called with higher indices.
        const UNBOUNDED_DEFAULT_ENVELOPE: i32 = 16;
        let param_count = match descriptor.arity {
            ArityKind::Fixed => descriptor.min_params,
            ArityKind::Variadic => descriptor
                .max_params
                .unwrap_or(UNBOUNDED_DEFAULT_ENVELOPE)
                .max(descriptor.min_params),
        };
        Self {
            plugin_name,
            interface_name: descriptor.name.clone(),
            func_ptr,
            arity: descriptor.arity,
            min_params: descriptor.min_params,
            param_count,
            slots: vec![ParamSlotState::default(); param_count.max(0) as usize],
            return_kind,
            return_size,
            in_use: false,
        }
    }

    /// Longest contiguous ready prefix. Variadic slots must fill in as
    /// a contiguous prefix, no gaps.
    pub fn ready_prefix_len(&self) -> i32 {
        let mut count = 0;
        for slot in &self.slots {
            if slot.ready {
                count += 1;
            } else {
                break;
            }
        }
        count
    }

    /// Detects a parameter gap: some slot `k` is ready while an earlier
    /// slot `j < k` is not. Returns the first gap index, if any.
    pub fn first_gap(&self) -> Option<i32> {
        let prefix = self.ready_prefix_len();
        for (i, slot) in self.slots.iter().enumerate().skip(prefix as usize) {
            if slot.ready {
                return Some(i as i32);
            }
        }
        None
    }

    pub fn is_fixed_ready(&self) -> bool {
        self.slots.iter().take(self.param_count as usize).all(|s| s.ready)
    }

    pub fn write_slot(&mut self, index: i32, value: Value) -> Result<(), SlotWriteError> {
        if index < 0 {
            return Err(SlotWriteError::NegativeIndex);
        }
        let max_allowed = match self.arity {
            ArityKind::Fixed => self.param_count,
            ArityKind::Variadic => self.slots.len() as i32,
        };
        if index >= max_allowed {
            return Err(SlotWriteError::OutOfRange {
                index,
                max_allowed,
            });
        }
        let idx = index as usize;
        if idx >= self.slots.len() {
            self.slots.resize(idx + 1, ParamSlotState::default());
        }
        self.slots[idx] = ParamSlotState {
            ready: true,
            value: Some(value),
        };
        Ok(())
    }

    /// Values for the currently-ready prefix, in order — what gets
    /// marshaled into the parameter pack for the call.
    pub fn ready_values(&self, count: i32) -> Vec<Value> {
        self.slots
            .iter()
            .take(count.max(0) as usize)
            .map(|s| s.value.unwrap_or(Value::Int32(0)))
            .collect()
    }

    /// Reset every slot to not-ready after a successful dispatch.
    pub fn reset_slots(&mut self) {
        for slot in &mut self.slots {
            slot.ready = false;
            slot.value = None;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotWriteError {
    NegativeIndex,
    OutOfRange { index: i32, max_allowed: i32 },
}
