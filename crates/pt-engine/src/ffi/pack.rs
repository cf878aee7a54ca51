// crates/pt-engine/src/ffi/pack.rs
//
// Marshals a slice of typed `Value`s into the ABI-mandated parameter
// pack: a count plus an array of 24-byte slots. The backing
// `Vec<ParamSlot>` must outlive the call, so this is a small owning
// builder rather than a bare function.

use pt_types::{ParamPack, ParamSlot, Value};

pub struct ParamPackBuilder {
    slots: Vec<ParamSlot>,
}

impl ParamPackBuilder {
    pub fn new(values: &[Value]) -> Self {
        Self {
            slots: values.iter().map(ParamSlot::from_value).collect(),
        }
    }

    /// Borrow the pack as the raw pointer the plugin ABI expects. The
    /// returned `ParamPack` is only valid while `self` (and the values
    /// it was built from) are alive.
    pub fn as_pack(&mut self) -> ParamPack {
        ParamPack {
            param_count: self.slots.len() as i32,
            params: self.slots.as_mut_ptr(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_pack_with_matching_count() {
        let values = [Value::Int32(3), Value::Int32(4)];
        let mut builder = ParamPackBuilder::new(&values);
        let pack = builder.as_pack();
        assert_eq!(pack.param_count, 2);
        assert!(!pack.params.is_null());
    }

    #[test]
    fn empty_pack_has_zero_count() {
        let mut builder = ParamPackBuilder::new(&[]);
        let pack = builder.as_pack();
        assert_eq!(pack.param_count, 0);
    }
}
