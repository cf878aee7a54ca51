// crates/fixtures/pt-fixture-plugin-b/src/lib.rs
//
// Other half of the cycle-detection fixture pair; see
// `pt-fixture-plugin-a` for the overall shape.

use std::sync::atomic::{AtomicI64, Ordering};

use pt_fixture_support::{export_plugin_metadata, ArityKind, InterfaceSpec, ParamSpec, ParamType, PluginMetadata};
use pt_types::ParamPack;

const INTERFACES: &[InterfaceSpec] = &[InterfaceSpec {
    name: "g",
    description: "cycle participant b",
    version: "1.0.0",
    arity: ArityKind::Fixed,
    min_params: 1,
    max_params: 1,
    params: &[ParamSpec { name: "value", tag: ParamType::Int32, type_name: "int32" }],
}];

const METADATA: PluginMetadata = PluginMetadata {
    name: "pt_fixture_plugin_b",
    version: "1.0.0",
    interfaces: INTERFACES,
};

fn metadata() -> &'static PluginMetadata {
    &METADATA
}

export_plugin_metadata!(metadata);

static G_CALL_COUNT: AtomicI64 = AtomicI64::new(0);

#[no_mangle]
pub unsafe extern "C" fn g(pack: *mut ParamPack) -> i64 {
    let pack = &*pack;
    G_CALL_COUNT.fetch_add(1, Ordering::SeqCst);
    (*pack.params.add(0)).value.i32_val as i64
}

#[no_mangle]
pub extern "C" fn fixture_g_call_count() -> i64 {
    G_CALL_COUNT.load(Ordering::SeqCst)
}
