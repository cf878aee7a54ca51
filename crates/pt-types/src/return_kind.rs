// crates/pt-types/src/return_kind.rs

/// The ABI shape of a plugin function's return value. Inferred from
/// the interface's free-form description text — best effort, never
/// reliable from the declaration alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    Integer,
    Float,
    Double,
    PointerOrStructPtr,
    StructByValue(usize),
}

impl ReturnKind {
    pub fn is_struct_by_value(self) -> bool {
        matches!(self, ReturnKind::StructByValue(_))
    }
}

/// Threshold above which a declared-size struct-pointer return is
/// promoted to struct-by-value, per platform ABI convention.
#[cfg(windows)]
pub const STRUCT_PTR_PROMOTION_THRESHOLD: usize = 8;
#[cfg(not(windows))]
pub const STRUCT_PTR_PROMOTION_THRESHOLD: usize = 16;

/// Apply the promotion rule a SetGroup re-invoke path relies on: a
/// `PointerOrStructPtr` interface whose declared return size exceeds
/// the platform threshold is actually returned by value.
pub fn promote_return_kind(kind: ReturnKind, declared_size: usize) -> ReturnKind {
    if kind == ReturnKind::PointerOrStructPtr
        && declared_size > 0
        && declared_size > STRUCT_PTR_PROMOTION_THRESHOLD
    {
        ReturnKind::StructByValue(declared_size)
    } else {
        kind
    }
}

/// Best-effort return-kind inference from an interface's human-readable
/// description, scanning in order for recognizable substrings and
/// falling back to `Integer`. Mirrors the source's substring sniffing
/// in `pointer_transfer_plugin_metadata.c`.
pub fn infer_return_kind(description: &str) -> ReturnKind {
    let lower = description.to_ascii_lowercase();
    const SIGNALS: &[(&str, ReturnKind)] = &[
        ("returns string pointer", ReturnKind::PointerOrStructPtr),
        ("double", ReturnKind::Double),
        ("float", ReturnKind::Float),
        ("struct", ReturnKind::PointerOrStructPtr),
        ("pointer", ReturnKind::PointerOrStructPtr),
    ];
    for (needle, kind) in SIGNALS {
        if lower.contains(needle) {
            return *kind;
        }
    }
    ReturnKind::Integer
}
