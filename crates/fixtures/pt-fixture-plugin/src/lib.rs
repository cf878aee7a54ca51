// crates/fixtures/pt-fixture-plugin/src/lib.rs
//
// Test-only fixture plugin exercising the interfaces named in the
// end-to-end scenarios: two-arg add, SetGroup atomic write, broadcast
// fan-out, unicast tie-break and a variadic gap target. Not a
// deliverable plugin — loaded only from `pt-engine`'s integration
// tests via real `libloading`.

use std::ffi::CString;
use std::os::raw::c_char;
use std::sync::atomic::{AtomicI32, AtomicI64, AtomicPtr, AtomicU64, Ordering};

use pt_fixture_support::{export_plugin_metadata, ArityKind, InterfaceSpec, ParamSpec, ParamType, PluginMetadata};
use pt_types::ParamPack;

unsafe fn slot_i32(pack: &ParamPack, index: usize) -> i32 {
    (*pack.params.add(index)).value.i32_val
}

unsafe fn slot_f64(pack: &ParamPack, index: usize) -> f64 {
    (*pack.params.add(index)).value.f64_val
}

const INTERFACES: &[InterfaceSpec] = &[
    InterfaceSpec {
        name: "Add",
        description: "adds two integers and returns a double",
        version: "1.0.0",
        arity: ArityKind::Fixed,
        min_params: 2,
        max_params: 2,
        params: &[
            ParamSpec { name: "a", tag: ParamType::Int32, type_name: "int32" },
            ParamSpec { name: "b", tag: ParamType::Int32, type_name: "int32" },
        ],
    },
    InterfaceSpec {
        name: "FormatDouble",
        description: "formats a double and returns string pointer",
        version: "1.0.0",
        arity: ArityKind::Fixed,
        min_params: 1,
        max_params: 1,
        params: &[ParamSpec { name: "value", tag: ParamType::Double, type_name: "double" }],
    },
    InterfaceSpec {
        name: "F",
        description: "setgroup source interface",
        version: "1.0.0",
        arity: ArityKind::Fixed,
        min_params: 1,
        max_params: 1,
        params: &[ParamSpec { name: "seed", tag: ParamType::Int32, type_name: "int32" }],
    },
    InterfaceSpec {
        name: "G",
        description: "setgroup target interface",
        version: "1.0.0",
        arity: ArityKind::Fixed,
        min_params: 2,
        max_params: 2,
        params: &[
            ParamSpec { name: "a", tag: ParamType::Int32, type_name: "int32" },
            ParamSpec { name: "b", tag: ParamType::Int32, type_name: "int32" },
        ],
    },
    InterfaceSpec {
        name: "RecvA",
        description: "broadcast receiver a",
        version: "1.0.0",
        arity: ArityKind::Fixed,
        min_params: 1,
        max_params: 1,
        params: &[ParamSpec { name: "value", tag: ParamType::Any, type_name: "any" }],
    },
    InterfaceSpec {
        name: "RecvB",
        description: "broadcast receiver b",
        version: "1.0.0",
        arity: ArityKind::Fixed,
        min_params: 1,
        max_params: 1,
        params: &[ParamSpec { name: "value", tag: ParamType::Any, type_name: "any" }],
    },
    InterfaceSpec {
        name: "X",
        description: "unicast tie-break target",
        version: "1.0.0",
        arity: ArityKind::Fixed,
        min_params: 1,
        max_params: 1,
        params: &[ParamSpec { name: "value", tag: ParamType::Int32, type_name: "int32" }],
    },
    InterfaceSpec {
        name: "Y",
        description: "unicast distinct-target peer",
        version: "1.0.0",
        arity: ArityKind::Fixed,
        min_params: 1,
        max_params: 1,
        params: &[ParamSpec { name: "value", tag: ParamType::Int32, type_name: "int32" }],
    },
    InterfaceSpec {
        name: "V",
        description: "variadic gap target",
        version: "1.0.0",
        arity: ArityKind::Variadic,
        min_params: 1,
        max_params: 8,
        params: &[
            ParamSpec { name: "v0", tag: ParamType::Int32, type_name: "int32" },
            ParamSpec { name: "v1", tag: ParamType::Int32, type_name: "int32" },
            ParamSpec { name: "v2", tag: ParamType::Int32, type_name: "int32" },
            ParamSpec { name: "v3", tag: ParamType::Int32, type_name: "int32" },
            ParamSpec { name: "v4", tag: ParamType::Int32, type_name: "int32" },
            ParamSpec { name: "v5", tag: ParamType::Int32, type_name: "int32" },
            ParamSpec { name: "v6", tag: ParamType::Int32, type_name: "int32" },
            ParamSpec { name: "v7", tag: ParamType::Int32, type_name: "int32" },
        ],
    },
];

const METADATA: PluginMetadata = PluginMetadata {
    name: "pt_fixture_plugin",
    version: "1.0.0",
    interfaces: INTERFACES,
};

fn metadata() -> &'static PluginMetadata {
    &METADATA
}

export_plugin_metadata!(metadata);

static ADD_LAST_RESULT: AtomicU64 = AtomicU64::new(0);

#[no_mangle]
pub unsafe extern "C" fn Add(pack: *mut ParamPack) -> f64 {
    let pack = &*pack;
    let result = (slot_i32(pack, 0) + slot_i32(pack, 1)) as f64;
    ADD_LAST_RESULT.store(result.to_bits(), Ordering::SeqCst);
    result
}

#[no_mangle]
pub extern "C" fn fixture_add_last_result() -> f64 {
    f64::from_bits(ADD_LAST_RESULT.load(Ordering::SeqCst))
}

static FORMAT_LAST_PTR: AtomicPtr<c_char> = AtomicPtr::new(std::ptr::null_mut());

// Leaked intentionally: the fixture never frees formatted strings.
// Parameter-value memory is owned by the caller; this value is one an
// engine test only reads, never retains.
#[no_mangle]
pub unsafe extern "C" fn FormatDouble(pack: *mut ParamPack) -> i64 {
    let pack = &*pack;
    let formatted = format!("{:.6}", slot_f64(pack, 0));
    let c_string = CString::new(formatted).unwrap_or_default();
    let ptr = c_string.into_raw();
    FORMAT_LAST_PTR.store(ptr, Ordering::SeqCst);
    ptr as i64
}

#[no_mangle]
pub extern "C" fn fixture_format_double_last_ptr() -> *const c_char {
    FORMAT_LAST_PTR.load(Ordering::SeqCst)
}

static F_CALL_COUNT: AtomicI64 = AtomicI64::new(0);

#[no_mangle]
pub unsafe extern "C" fn F(_pack: *mut ParamPack) -> i64 {
    F_CALL_COUNT.fetch_add(1, Ordering::SeqCst) + 1
}

static G_LAST_A: AtomicI32 = AtomicI32::new(i32::MIN);
static G_LAST_B: AtomicI32 = AtomicI32::new(i32::MIN);
static G_CALL_COUNT: AtomicI64 = AtomicI64::new(0);

#[no_mangle]
pub unsafe extern "C" fn G(pack: *mut ParamPack) -> i64 {
    let pack = &*pack;
    let a = slot_i32(pack, 0);
    let b = slot_i32(pack, 1);
    G_LAST_A.store(a, Ordering::SeqCst);
    G_LAST_B.store(b, Ordering::SeqCst);
    G_CALL_COUNT.fetch_add(1, Ordering::SeqCst);
    (a + b) as i64
}

static RECV_A_COUNT: AtomicI64 = AtomicI64::new(0);
static RECV_B_COUNT: AtomicI64 = AtomicI64::new(0);

#[no_mangle]
pub unsafe extern "C" fn RecvA(_pack: *mut ParamPack) -> i64 {
    RECV_A_COUNT.fetch_add(1, Ordering::SeqCst) + 1
}

#[no_mangle]
pub unsafe extern "C" fn RecvB(_pack: *mut ParamPack) -> i64 {
    RECV_B_COUNT.fetch_add(1, Ordering::SeqCst) + 1
}

static X_LAST_VALUE: AtomicI32 = AtomicI32::new(i32::MIN);
static X_CALL_COUNT: AtomicI64 = AtomicI64::new(0);

#[no_mangle]
pub unsafe extern "C" fn X(pack: *mut ParamPack) -> i64 {
    let pack = &*pack;
    X_LAST_VALUE.store(slot_i32(pack, 0), Ordering::SeqCst);
    X_CALL_COUNT.fetch_add(1, Ordering::SeqCst);
    slot_i32(pack, 0) as i64
}

static Y_LAST_VALUE: AtomicI32 = AtomicI32::new(i32::MIN);
static Y_CALL_COUNT: AtomicI64 = AtomicI64::new(0);

#[no_mangle]
pub unsafe extern "C" fn Y(pack: *mut ParamPack) -> i64 {
    let pack = &*pack;
    Y_LAST_VALUE.store(slot_i32(pack, 0), Ordering::SeqCst);
    Y_CALL_COUNT.fetch_add(1, Ordering::SeqCst);
    slot_i32(pack, 0) as i64
}

#[no_mangle]
pub extern "C" fn fixture_y_call_count() -> i64 {
    Y_CALL_COUNT.load(Ordering::SeqCst)
}

static V_LAST_COUNT: AtomicI32 = AtomicI32::new(-1);

#[no_mangle]
pub unsafe extern "C" fn V(pack: *mut ParamPack) -> i64 {
    let pack = &*pack;
    V_LAST_COUNT.store(pack.param_count, Ordering::SeqCst);
    let mut sum = 0i64;
    for i in 0..pack.param_count as usize {
        sum += slot_i32(pack, i) as i64;
    }
    sum
}

// --- Test-only accessors: not part of the plugin invocation ABI. ---

#[no_mangle]
pub extern "C" fn fixture_f_call_count() -> i64 {
    F_CALL_COUNT.load(Ordering::SeqCst)
}

#[no_mangle]
pub extern "C" fn fixture_g_call_count() -> i64 {
    G_CALL_COUNT.load(Ordering::SeqCst)
}

#[no_mangle]
pub extern "C" fn fixture_g_last_params(out_a: *mut i32, out_b: *mut i32) {
    unsafe {
        if !out_a.is_null() {
            *out_a = G_LAST_A.load(Ordering::SeqCst);
        }
        if !out_b.is_null() {
            *out_b = G_LAST_B.load(Ordering::SeqCst);
        }
    }
}

#[no_mangle]
pub extern "C" fn fixture_recv_a_count() -> i64 {
    RECV_A_COUNT.load(Ordering::SeqCst)
}

#[no_mangle]
pub extern "C" fn fixture_recv_b_count() -> i64 {
    RECV_B_COUNT.load(Ordering::SeqCst)
}

#[no_mangle]
pub extern "C" fn fixture_x_call_count() -> i64 {
    X_CALL_COUNT.load(Ordering::SeqCst)
}

#[no_mangle]
pub extern "C" fn fixture_x_last_value() -> i32 {
    X_LAST_VALUE.load(Ordering::SeqCst)
}

#[no_mangle]
pub extern "C" fn fixture_v_last_count() -> i32 {
    V_LAST_COUNT.load(Ordering::SeqCst)
}
