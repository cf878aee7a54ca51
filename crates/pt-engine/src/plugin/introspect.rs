// crates/pt-engine/src/plugin/introspect.rs
//
// Builds a `PluginDescriptor` by calling the six introspection symbols
// every plugin must export (spec 6, 4.3). Grounded on
// `original_source/pointer_transfer/core/pointer_transfer_plugin_metadata.c`.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::path::Path;

use libloading::Library;
use pt_types::vtable::{
    ArityKind, GetInterfaceCountFn, GetInterfaceInfoFn, GetInterfaceParamCountFn,
    GetInterfaceParamInfoFn, GetNameFn, GetVersionFn, MAX_PARAMS_UNBOUNDED, SYM_GET_INTERFACE_COUNT,
    SYM_GET_INTERFACE_INFO, SYM_GET_INTERFACE_PARAM_COUNT, SYM_GET_INTERFACE_PARAM_INFO,
    SYM_GET_NAME, SYM_GET_VERSION,
};
use pt_types::{InterfaceDescriptor, ParamDescriptor, ParamType, PluginDescriptor};

use crate::platform::get_symbol;

const BUF_SIZE: usize = 256;

fn call_into_buf(f: impl FnOnce(*mut c_char, usize) -> i32) -> Option<String> {
    let mut buf = [0 as c_char; BUF_SIZE];
    let rc = f(buf.as_mut_ptr(), BUF_SIZE);
    if rc != 0 {
        return None;
    }
    // Safety: the plugin NUL-terminates within BUF_SIZE per spec 6.
    let cstr = unsafe { CStr::from_ptr(buf.as_ptr()) };
    Some(cstr.to_string_lossy().into_owned())
}

/// Introspect a freshly loaded plugin library, resolving its six
/// introspection symbols and querying every interface's metadata.
pub fn introspect_plugin(lib: &Library, path: &Path) -> Option<PluginDescriptor> {
    let get_name: libloading::Symbol<GetNameFn> = unsafe { get_symbol(lib, SYM_GET_NAME)? };
    let get_version: libloading::Symbol<GetVersionFn> = unsafe { get_symbol(lib, SYM_GET_VERSION)? };
    let get_interface_count: libloading::Symbol<GetInterfaceCountFn> =
        unsafe { get_symbol(lib, SYM_GET_INTERFACE_COUNT)? };
    let get_interface_info: libloading::Symbol<GetInterfaceInfoFn> =
        unsafe { get_symbol(lib, SYM_GET_INTERFACE_INFO)? };
    let get_interface_param_count: libloading::Symbol<GetInterfaceParamCountFn> =
        unsafe { get_symbol(lib, SYM_GET_INTERFACE_PARAM_COUNT)? };
    let get_interface_param_info: libloading::Symbol<GetInterfaceParamInfoFn> =
        unsafe { get_symbol(lib, SYM_GET_INTERFACE_PARAM_INFO)? };

    let name = call_into_buf(|buf, size| unsafe { get_name(buf, size) })?;
    let version = call_into_buf(|buf, size| unsafe { get_version(buf, size) })?;

    let mut count: i32 = 0;
    if unsafe { get_interface_count(&mut count) } != 0 {
        tracing::warn!(plugin = %name, "get_interface_count failed");
        return None;
    }

    // Interface counts are small, typically < 16 (spec 4.3 step 3).
    let mut interfaces = Vec::with_capacity(count.max(0) as usize);
    for index in 0..count {
        let Some(descriptor) = introspect_interface(
            index,
            &get_interface_info,
            &get_interface_param_count,
            &get_interface_param_info,
        ) else {
            tracing::warn!(plugin = %name, index, "failed to introspect interface, skipping");
            continue;
        };
        interfaces.push(descriptor);
    }

    Some(PluginDescriptor {
        name,
        version,
        path: path.to_path_buf(),
        interfaces,
    })
}

fn introspect_interface(
    index: i32,
    get_interface_info: &GetInterfaceInfoFn,
    get_interface_param_count: &GetInterfaceParamCountFn,
    get_interface_param_info: &GetInterfaceParamInfoFn,
) -> Option<InterfaceDescriptor> {
    let mut name_buf = [0 as c_char; BUF_SIZE];
    let mut desc_buf = [0 as c_char; BUF_SIZE];
    let mut ver_buf = [0 as c_char; BUF_SIZE];
    let rc = unsafe {
        get_interface_info(
            index,
            name_buf.as_mut_ptr(),
            BUF_SIZE,
            desc_buf.as_mut_ptr(),
            BUF_SIZE,
            ver_buf.as_mut_ptr(),
            BUF_SIZE,
        )
    };
    if rc != 0 {
        return None;
    }
    let name = unsafe { CStr::from_ptr(name_buf.as_ptr()) }
        .to_string_lossy()
        .into_owned();
    let description = unsafe { CStr::from_ptr(desc_buf.as_ptr()) }
        .to_string_lossy()
        .into_owned();
    let version = unsafe { CStr::from_ptr(ver_buf.as_ptr()) }
        .to_string_lossy()
        .into_owned();

    let mut kind_raw: i32 = 0;
    let mut min: i32 = 0;
    let mut max: i32 = 0;
    if unsafe { get_interface_param_count(index, &mut kind_raw, &mut min, &mut max) } != 0 {
        return None;
    }
    let arity = ArityKind::from_raw(kind_raw);
    let max_params = if max == MAX_PARAMS_UNBOUNDED { None } else { Some(max) };
    let declared_count = match arity {
        ArityKind::Fixed => min,
        ArityKind::Variadic => max_params.unwrap_or(min),
    };

    let mut params = Vec::with_capacity(declared_count.max(0) as usize);
    for j in 0..declared_count {
        let mut param_name_buf = [0 as c_char; BUF_SIZE];
        let mut tag_raw: i32 = 0;
        let mut type_buf = [0 as c_char; BUF_SIZE];
        let rc = unsafe {
            get_interface_param_info(
                index,
                j,
                param_name_buf.as_mut_ptr(),
                BUF_SIZE,
                &mut tag_raw,
                type_buf.as_mut_ptr(),
                BUF_SIZE,
            )
        };
        if rc != 0 {
            continue;
        }
        let type_name = unsafe { CStr::from_ptr(type_buf.as_ptr()) }
            .to_string_lossy()
            .into_owned();
        params.push(ParamDescriptor {
            type_tag: ParamType::from_raw(tag_raw),
            type_name,
            size: 0,
        });
    }

    Some(InterfaceDescriptor {
        name,
        description,
        version,
        arity,
        min_params: min,
        max_params,
        params,
    })
}
