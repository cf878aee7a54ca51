// crates/pt-types/src/value.rs

use core::ffi::c_void;

/// Parameter type tag. Mirrors `NXLD_PARAM_TYPE_*` from the plugin ABI
/// 1:1 so a declared `type_tag` round-trips through FFI without
/// translation.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Void = 0,
    Int32 = 1,
    Int64 = 2,
    Float = 3,
    Double = 4,
    Char = 5,
    String = 6,
    Pointer = 7,
    Any = 8,
    VariadicMarker = 9,
    Unknown = 10,
}

impl ParamType {
    /// Decode a raw tag as read off the wire (plugin introspection call
    /// or parameter-pack slot). Unrecognized values fall back to
    /// `Unknown` rather than panicking — plugins are untrusted input.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => ParamType::Void,
            1 => ParamType::Int32,
            2 => ParamType::Int64,
            3 => ParamType::Float,
            4 => ParamType::Double,
            5 => ParamType::Char,
            6 => ParamType::String,
            7 => ParamType::Pointer,
            8 => ParamType::Any,
            9 => ParamType::VariadicMarker,
            _ => ParamType::Unknown,
        }
    }
}

/// A runtime-tagged parameter value. Replaces the source's
/// `void* + tag + size` triple threaded through every call site with a
/// sum type; only the dynamic-FFI layer unpacks this back into the raw
/// parameter-pack slot layout the plugin ABI mandates.
#[derive(Debug, Clone, Copy)]
pub enum Value {
    Int32(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    Char(u8),
    /// Pointer to NUL-terminated bytes.
    Str { ptr: *const u8, len: usize },
    /// Opaque untyped address plus an explicit size.
    Ptr { addr: *mut c_void, size: usize },
    /// Matches anything; `size == 0` means "as wide as a machine word".
    Any { addr: *mut c_void, size: usize },
}

impl Value {
    pub fn type_tag(&self) -> ParamType {
        match self {
            Value::Int32(_) => ParamType::Int32,
            Value::Int64(_) => ParamType::Int64,
            Value::Float(_) => ParamType::Float,
            Value::Double(_) => ParamType::Double,
            Value::Char(_) => ParamType::Char,
            Value::Str { .. } => ParamType::String,
            Value::Ptr { .. } => ParamType::Pointer,
            Value::Any { .. } => ParamType::Any,
        }
    }

    /// Size in bytes: scalars report their inline width,
    /// `string`/`pointer`/`any` report the caller-declared size.
    pub fn size(&self) -> usize {
        match self {
            Value::Int32(_) => 4,
            Value::Int64(_) => 8,
            Value::Float(_) => 4,
            Value::Double(_) => 8,
            Value::Char(_) => 1,
            Value::Str { len, .. } => *len,
            Value::Ptr { size, .. } => *size,
            Value::Any { size, .. } => *size,
        }
    }

    /// Address this value would occupy in the `ptr` slot of a parameter
    /// pack, or null for inline scalars.
    pub fn addr(&self) -> *mut c_void {
        match self {
            Value::Str { ptr, .. } => *ptr as *mut c_void,
            Value::Ptr { addr, .. } => *addr,
            Value::Any { addr, .. } => *addr,
            _ => core::ptr::null_mut(),
        }
    }

    /// Parse a constant literal string per a target slot's declared
    /// type tag, as a rule's `target_param_value` override requires.
    /// Pointer literals parse as an integer address.
    pub fn parse_literal(literal: &str, tag: ParamType) -> Option<Value> {
        match tag {
            ParamType::Int32 => literal.trim().parse::<i32>().ok().map(Value::Int32),
            ParamType::Int64 => literal.trim().parse::<i64>().ok().map(Value::Int64),
            ParamType::Float => literal.trim().parse::<f32>().ok().map(Value::Float),
            ParamType::Double => literal.trim().parse::<f64>().ok().map(Value::Double),
            ParamType::Char => literal.bytes().next().map(Value::Char),
            ParamType::Pointer | ParamType::Any => {
                let addr = if let Some(hex) = literal.trim().strip_prefix("0x") {
                    usize::from_str_radix(hex, 16).ok()?
                } else {
                    literal.trim().parse::<usize>().ok()?
                };
                Some(Value::Ptr {
                    addr: addr as *mut c_void,
                    size: core::mem::size_of::<usize>(),
                })
            }
            ParamType::String => Some(Value::Str {
                ptr: literal.as_ptr(),
                len: literal.len(),
            }),
            ParamType::Void | ParamType::VariadicMarker | ParamType::Unknown => None,
        }
    }
}
