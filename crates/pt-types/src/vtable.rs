// crates/pt-types/src/vtable.rs
//
// The plugin introspection ABI (spec 6): six symbols every plugin
// library exports, resolved by name. All string buffers are
// caller-allocated and NUL-terminated by the callee, truncated if too
// small — exactly the C convention, carried over unchanged since this
// is the wire contract with plugins written in any language.

use core::ffi::c_char;

pub type GetNameFn = unsafe extern "C" fn(buf: *mut c_char, size: usize) -> i32;
pub type GetVersionFn = unsafe extern "C" fn(buf: *mut c_char, size: usize) -> i32;
pub type GetInterfaceCountFn = unsafe extern "C" fn(count: *mut i32) -> i32;

pub type GetInterfaceInfoFn = unsafe extern "C" fn(
    index: i32,
    name_buf: *mut c_char,
    name_size: usize,
    desc_buf: *mut c_char,
    desc_size: usize,
    ver_buf: *mut c_char,
    ver_size: usize,
) -> i32;

pub type GetInterfaceParamCountFn = unsafe extern "C" fn(
    index: i32,
    kind: *mut i32,
    min: *mut i32,
    max: *mut i32,
) -> i32;

pub type GetInterfaceParamInfoFn = unsafe extern "C" fn(
    index: i32,
    param_index: i32,
    name_buf: *mut c_char,
    name_size: usize,
    tag: *mut i32,
    type_buf: *mut c_char,
    type_size: usize,
) -> i32;

/// Symbol names the engine resolves on every plugin at load time.
pub const SYM_GET_NAME: &[u8] = b"get_name";
pub const SYM_GET_VERSION: &[u8] = b"get_version";
pub const SYM_GET_INTERFACE_COUNT: &[u8] = b"get_interface_count";
pub const SYM_GET_INTERFACE_INFO: &[u8] = b"get_interface_info";
pub const SYM_GET_INTERFACE_PARAM_COUNT: &[u8] = b"get_interface_param_count";
pub const SYM_GET_INTERFACE_PARAM_INFO: &[u8] = b"get_interface_param_info";

/// Arity kind of an interface, as declared by `get_interface_param_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityKind {
    Fixed,
    Variadic,
}

impl ArityKind {
    pub fn from_raw(raw: i32) -> Self {
        if raw == 1 {
            ArityKind::Variadic
        } else {
            ArityKind::Fixed
        }
    }
}

/// Sentinel for an unbounded `max_params` on a variadic interface.
pub const MAX_PARAMS_UNBOUNDED: i32 = -1;

/// A plugin interface function: every user-defined interface has this
/// signature regardless of its declared return kind — the real return
/// register contents are interpreted by the dynamic-FFI caller
/// according to the interface's inferred `ReturnKind`.
pub type InterfaceFn = unsafe extern "C" fn(pack: *mut crate::pack::ParamPack) -> i64;
