// crates/fixtures/pt-fixture-plugin-a/src/lib.rs
//
// Half of the cycle-detection fixture pair: a
// rule table routes A.f's return into B.g, and another routes B.g's
// return back into A.f, forming a two-hop cycle the call chain must
// catch. Split across two cdylibs because the cycle only shows up
// across a real plugin boundary, not within one load.

use std::sync::atomic::{AtomicI64, Ordering};

use pt_fixture_support::{export_plugin_metadata, ArityKind, InterfaceSpec, ParamSpec, ParamType, PluginMetadata};
use pt_types::ParamPack;

const INTERFACES: &[InterfaceSpec] = &[InterfaceSpec {
    name: "f",
    description: "cycle participant a",
    version: "1.0.0",
    arity: ArityKind::Fixed,
    min_params: 1,
    max_params: 1,
    params: &[ParamSpec { name: "value", tag: ParamType::Int32, type_name: "int32" }],
}];

const METADATA: PluginMetadata = PluginMetadata {
    name: "pt_fixture_plugin_a",
    version: "1.0.0",
    interfaces: INTERFACES,
};

fn metadata() -> &'static PluginMetadata {
    &METADATA
}

export_plugin_metadata!(metadata);

static F_CALL_COUNT: AtomicI64 = AtomicI64::new(0);

#[no_mangle]
pub unsafe extern "C" fn f(pack: *mut ParamPack) -> i64 {
    let pack = &*pack;
    F_CALL_COUNT.fetch_add(1, Ordering::SeqCst);
    (*pack.params.add(0)).value.i32_val as i64
}

#[no_mangle]
pub extern "C" fn fixture_f_call_count() -> i64 {
    F_CALL_COUNT.load(Ordering::SeqCst)
}
