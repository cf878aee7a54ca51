// crates/pt-engine/src/plugin/return_kind.rs
//
// Wires an interface descriptor's free-form description through
// `pt_types::return_kind::infer_return_kind` and applies the platform
// struct-pointer promotion rule.

use pt_types::return_kind::{infer_return_kind, promote_return_kind};
use pt_types::{InterfaceDescriptor, ReturnKind};

/// Returns the inferred `ReturnKind` and the declared return size to
/// use for allocating a struct-by-value buffer. Declared size is taken
/// as the widest parameter's `size` field when nonzero, otherwise left
/// at 0 (no struct promotion possible without a declared size).
pub fn infer_interface_return_kind(descriptor: &InterfaceDescriptor, declared_return_size: usize) -> (ReturnKind, usize) {
    let kind = infer_return_kind(&descriptor.description);
    let promoted = promote_return_kind(kind, declared_return_size);
    let size = if promoted.is_struct_by_value() {
        declared_return_size
    } else {
        0
    };
    (promoted, size)
}
