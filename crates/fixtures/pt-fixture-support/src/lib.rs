// crates/fixtures/pt-fixture-support/src/lib.rs
//
// Shared scaffolding for the engine's test-fixture plugins. Every
// fixture implements the same six introspection symbols against a
// `'static` table of declared interfaces; this crate holds the
// boilerplate so each fixture only states its own metadata, keeping
// FFI-facing plumbing in one place rather than duplicated per plugin
// crate.
//
// Not part of the engine's public surface — purely test tooling.

use std::os::raw::c_char;

pub use pt_types::value::ParamType;
pub use pt_types::vtable::{ArityKind, MAX_PARAMS_UNBOUNDED};

#[derive(Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub tag: ParamType,
    pub type_name: &'static str,
}

#[derive(Clone, Copy)]
pub struct InterfaceSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub arity: ArityKind,
    pub min_params: i32,
    pub max_params: i32,
    pub params: &'static [ParamSpec],
}

#[derive(Clone, Copy)]
pub struct PluginMetadata {
    pub name: &'static str,
    pub version: &'static str,
    pub interfaces: &'static [InterfaceSpec],
}

/// Writes `s` NUL-terminated into `buf`, truncating if `size` is too
/// small.
///
/// # Safety
/// `buf` must be valid for `size` writes of `c_char`.
pub unsafe fn write_c_string(buf: *mut c_char, size: usize, s: &str) -> i32 {
    if buf.is_null() || size == 0 {
        return -1;
    }
    let bytes = s.as_bytes();
    let copy_len = bytes.len().min(size - 1);
    for (i, byte) in bytes.iter().take(copy_len).enumerate() {
        *buf.add(i) = *byte as c_char;
    }
    *buf.add(copy_len) = 0;
    0
}

pub fn get_name_impl(meta: &PluginMetadata, buf: *mut c_char, size: usize) -> i32 {
    unsafe { write_c_string(buf, size, meta.name) }
}

pub fn get_version_impl(meta: &PluginMetadata, buf: *mut c_char, size: usize) -> i32 {
    unsafe { write_c_string(buf, size, meta.version) }
}

pub fn get_interface_count_impl(meta: &PluginMetadata, count: *mut i32) -> i32 {
    if count.is_null() {
        return -1;
    }
    unsafe { *count = meta.interfaces.len() as i32 };
    0
}

#[allow(clippy::too_many_arguments)]
pub fn get_interface_info_impl(
    meta: &PluginMetadata,
    index: i32,
    name_buf: *mut c_char,
    name_size: usize,
    desc_buf: *mut c_char,
    desc_size: usize,
    ver_buf: *mut c_char,
    ver_size: usize,
) -> i32 {
    if index < 0 {
        return -1;
    }
    let Some(iface) = meta.interfaces.get(index as usize) else {
        return -1;
    };
    unsafe {
        if write_c_string(name_buf, name_size, iface.name) != 0 {
            return -1;
        }
        if write_c_string(desc_buf, desc_size, iface.description) != 0 {
            return -1;
        }
        if write_c_string(ver_buf, ver_size, iface.version) != 0 {
            return -1;
        }
    }
    0
}

pub fn get_interface_param_count_impl(meta: &PluginMetadata, index: i32, kind: *mut i32, min: *mut i32, max: *mut i32) -> i32 {
    if index < 0 || kind.is_null() || min.is_null() || max.is_null() {
        return -1;
    }
    let Some(iface) = meta.interfaces.get(index as usize) else {
        return -1;
    };
    unsafe {
        *kind = match iface.arity {
            ArityKind::Fixed => 0,
            ArityKind::Variadic => 1,
        };
        *min = iface.min_params;
        *max = iface.max_params;
    }
    0
}

#[allow(clippy::too_many_arguments)]
pub fn get_interface_param_info_impl(
    meta: &PluginMetadata,
    index: i32,
    param_index: i32,
    name_buf: *mut c_char,
    name_size: usize,
    tag: *mut i32,
    type_buf: *mut c_char,
    type_size: usize,
) -> i32 {
    if index < 0 || param_index < 0 || tag.is_null() {
        return -1;
    }
    let Some(iface) = meta.interfaces.get(index as usize) else {
        return -1;
    };
    let Some(param) = iface.params.get(param_index as usize) else {
        return -1;
    };
    unsafe {
        if write_c_string(name_buf, name_size, param.name) != 0 {
            return -1;
        }
        *tag = param.tag as i32;
        if write_c_string(type_buf, type_size, param.type_name) != 0 {
            return -1;
        }
    }
    0
}

/// Generates the six `#[no_mangle] extern "C"` introspection symbols
/// for a fixture plugin, delegating to the `'static PluginMetadata`
/// returned by `$meta_fn`.
#[macro_export]
macro_rules! export_plugin_metadata {
    ($meta_fn:path) => {
        #[no_mangle]
        pub unsafe extern "C" fn get_name(buf: *mut ::std::os::raw::c_char, size: usize) -> i32 {
            $crate::get_name_impl($meta_fn(), buf, size)
        }

        #[no_mangle]
        pub unsafe extern "C" fn get_version(buf: *mut ::std::os::raw::c_char, size: usize) -> i32 {
            $crate::get_version_impl($meta_fn(), buf, size)
        }

        #[no_mangle]
        pub unsafe extern "C" fn get_interface_count(count: *mut i32) -> i32 {
            $crate::get_interface_count_impl($meta_fn(), count)
        }

        #[no_mangle]
        pub unsafe extern "C" fn get_interface_info(
            index: i32,
            name_buf: *mut ::std::os::raw::c_char,
            name_size: usize,
            desc_buf: *mut ::std::os::raw::c_char,
            desc_size: usize,
            ver_buf: *mut ::std::os::raw::c_char,
            ver_size: usize,
        ) -> i32 {
            $crate::get_interface_info_impl($meta_fn(), index, name_buf, name_size, desc_buf, desc_size, ver_buf, ver_size)
        }

        #[no_mangle]
        pub unsafe extern "C" fn get_interface_param_count(index: i32, kind: *mut i32, min: *mut i32, max: *mut i32) -> i32 {
            $crate::get_interface_param_count_impl($meta_fn(), index, kind, min, max)
        }

        #[no_mangle]
        pub unsafe extern "C" fn get_interface_param_info(
            index: i32,
            param_index: i32,
            name_buf: *mut ::std::os::raw::c_char,
            name_size: usize,
            tag: *mut i32,
            type_buf: *mut ::std::os::raw::c_char,
            type_size: usize,
        ) -> i32 {
            $crate::get_interface_param_info_impl($meta_fn(), index, param_index, name_buf, name_size, tag, type_buf, type_size)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: PluginMetadata = PluginMetadata {
        name: "fixture",
        version: "1.0.0",
        interfaces: &[InterfaceSpec {
            name: "Echo",
            description: "echoes an integer",
            version: "1.0.0",
            arity: ArityKind::Fixed,
            min_params: 1,
            max_params: 1,
            params: &[ParamSpec {
                name: "value",
                tag: ParamType::Int32,
                type_name: "int32",
            }],
        }],
    };

    #[test]
    fn writes_truncated_string() {
        let mut buf = [1i8; 4];
        let rc = unsafe { write_c_string(buf.as_mut_ptr(), buf.len(), "hello") };
        assert_eq!(rc, 0);
        assert_eq!(&buf, &[b'h' as i8, b'e' as i8, b'l' as i8, 0]);
    }

    #[test]
    fn interface_count_matches_spec() {
        let mut count = 0;
        assert_eq!(get_interface_count_impl(&SPEC, &mut count), 0);
        assert_eq!(count, 1);
    }

    #[test]
    fn out_of_range_index_fails() {
        let mut kind = 0;
        let mut min = 0;
        let mut max = 0;
        assert_eq!(get_interface_param_count_impl(&SPEC, 5, &mut kind, &mut min, &mut max), -1);
    }
}
