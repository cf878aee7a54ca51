// crates/pt-engine/src/host_api.rs
//
// extern "C" shims binding a `HostApi` vtable to one `Engine` instance:
// a thin `extern "C"` function recovers a concrete Rust type from an
// opaque context pointer and forwards the call.

use core::ffi::c_void;
use std::ffi::CStr;
use std::os::raw::c_char;

use pt_types::host_api::{ApiResult, EngineContext};
use pt_types::{HostApi, ParamType, Value};

use crate::engine::Engine;

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}

/// Reconstructs a typed `Value` from the raw `(tag, ptr, size)` triple
/// plugins pass across the C ABI. Scalars are passed by address, the
/// same idiom the plugin invocation ABI uses for its parameter slots.
unsafe fn value_from_raw(tag: ParamType, ptr: *mut c_void, size: usize) -> Option<Value> {
    if ptr.is_null() {
        return None;
    }
    Some(match tag {
        ParamType::Int32 => Value::Int32(*(ptr as *const i32)),
        ParamType::Int64 => Value::Int64(*(ptr as *const i64)),
        ParamType::Float => Value::Float(*(ptr as *const f32)),
        ParamType::Double => Value::Double(*(ptr as *const f64)),
        ParamType::Char => Value::Char(*(ptr as *const u8)),
        ParamType::String => Value::Str { ptr: ptr as *const u8, len: size },
        ParamType::Pointer | ParamType::Any | ParamType::Void | ParamType::VariadicMarker | ParamType::Unknown => {
            Value::Ptr { addr: ptr, size }
        }
    })
}

unsafe extern "C" fn transfer_pointer_shim(
    engine: *mut EngineContext,
    source_plugin: *const c_char,
    source_interface: *const c_char,
    source_param_index: i32,
    ptr: *mut c_void,
    expected_tag: i32,
    type_name: *const c_char,
    size: usize,
) -> i32 {
    if engine.is_null() {
        return ApiResult::Failure.as_raw();
    }
    let engine = &mut *(engine as *mut Engine);
    let (Some(plugin), Some(interface)) = (cstr_to_string(source_plugin), cstr_to_string(source_interface)) else {
        return ApiResult::Failure.as_raw();
    };
    let Some(value) = value_from_raw(ParamType::from_raw(expected_tag), ptr, size) else {
        return ApiResult::Failure.as_raw();
    };
    let type_name = cstr_to_string(type_name).unwrap_or_default();
    engine.transfer_pointer(&plugin, &interface, source_param_index, value, &type_name)
}

unsafe extern "C" fn call_plugin_shim(
    engine: *mut EngineContext,
    source_plugin: *const c_char,
    source_interface: *const c_char,
    param_index: i32,
    value: *mut c_void,
) -> i32 {
    if engine.is_null() {
        return ApiResult::Failure.as_raw();
    }
    let engine = &mut *(engine as *mut Engine);
    let (Some(plugin), Some(interface)) = (cstr_to_string(source_plugin), cstr_to_string(source_interface)) else {
        return ApiResult::Failure.as_raw();
    };
    let value = Value::Ptr {
        addr: value,
        size: core::mem::size_of::<usize>(),
    };
    engine.call_plugin(&plugin, &interface, param_index, value)
}

/// Builds the vtable handed to a plugin at load time, bound to
/// `engine` via an opaque context pointer.
pub fn build(engine: &mut Engine) -> HostApi {
    HostApi {
        engine: engine as *mut Engine as *mut EngineContext,
        transfer_pointer: transfer_pointer_shim,
        call_plugin: call_plugin_shim,
    }
}
