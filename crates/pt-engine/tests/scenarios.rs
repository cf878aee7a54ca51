// crates/pt-engine/tests/scenarios.rs
//
// End-to-end dispatch scenarios driven through real `libloading`-
// loaded cdylib fixtures rather than mocked plugin tables. Each
// scenario's fixture interfaces are exclusive to that scenario (no two
// tests read the same atomic counter), so the tests are safe under
// cargo's default parallel test execution despite all loading the
// same on-disk cdylib.

mod common;

use libloading::{Library, Symbol};

use pt_engine::Engine;
use pt_types::rule::{RuleEndpointSource, RuleEndpointTarget, RETURN_VALUE_PARAM_INDEX};
use pt_types::{TransferMode, TransferRule, Value};

fn seeded(plugin: &str, source_interface: &str, target_interface: &str, param_index: i32, literal: &str) -> TransferRule {
    let mut rule = TransferRule::unicast(
        RuleEndpointSource {
            plugin: plugin.to_string(),
            interface: source_interface.to_string(),
            param_index: RETURN_VALUE_PARAM_INDEX,
        },
        RuleEndpointTarget {
            plugin: plugin.to_string(),
            interface: target_interface.to_string(),
            param_index,
            target_plugin_path: None,
        },
    );
    rule.target_param_value = Some(literal.to_string());
    rule
}

fn unicast_return(plugin: &str, source_interface: &str, target_interface: &str, target_param_index: i32) -> TransferRule {
    TransferRule::unicast(
        RuleEndpointSource {
            plugin: plugin.to_string(),
            interface: source_interface.to_string(),
            param_index: RETURN_VALUE_PARAM_INDEX,
        },
        RuleEndpointTarget {
            plugin: plugin.to_string(),
            interface: target_interface.to_string(),
            param_index: target_param_index,
            target_plugin_path: None,
        },
    )
}

#[test]
fn scenario_1_simple_two_arg_add() {
    let path = common::fixture_artifact("pt-fixture-plugin");
    let mut engine = Engine::new();
    let descriptor = engine.load_plugin(&path).expect("plugin loads").clone();
    let name = descriptor.name.clone();

    engine.set_rules(vec![
        seeded(&name, "Starter", "Add", 0, "3"),
        seeded(&name, "Starter", "Add", 1, "4"),
        unicast_return(&name, "Add", "FormatDouble", 0),
    ]);

    let rc = engine.call_plugin(&name, "Starter", RETURN_VALUE_PARAM_INDEX, Value::Int32(0));
    assert_eq!(rc, 0);

    let lib = unsafe { Library::new(&path) }.expect("reload fixture for accessors");
    let add_result: Symbol<unsafe extern "C" fn() -> f64> = unsafe { lib.get(b"fixture_add_last_result") }.unwrap();
    assert_eq!(unsafe { add_result() }, 7.0);

    let format_ptr: Symbol<unsafe extern "C" fn() -> *const std::os::raw::c_char> =
        unsafe { lib.get(b"fixture_format_double_last_ptr") }.unwrap();
    let ptr = unsafe { format_ptr() };
    assert!(!ptr.is_null());
    let formatted = unsafe { std::ffi::CStr::from_ptr(ptr) }.to_str().unwrap();
    assert_eq!(formatted, "7.000000");
}

#[test]
fn scenario_2_setgroup_atomic_write() {
    let path = common::fixture_artifact("pt-fixture-plugin");
    let mut engine = Engine::new();
    let descriptor = engine.load_plugin(&path).expect("plugin loads").clone();
    let name = descriptor.name.clone();

    let mut member0 = unicast_return(&name, "F", "G", 0);
    member0.set_group = Some("p".to_string());
    let mut member1 = unicast_return(&name, "F", "G", 1);
    member1.set_group = Some("p".to_string());

    engine.set_rules(vec![seeded(&name, "Boot", "F", 0, "5"), member0, member1]);

    let rc = engine.call_plugin(&name, "Boot", RETURN_VALUE_PARAM_INDEX, Value::Int32(0));
    assert_eq!(rc, 0);

    let lib = unsafe { Library::new(&path) }.expect("reload fixture for accessors");
    let f_calls: Symbol<unsafe extern "C" fn() -> i64> = unsafe { lib.get(b"fixture_f_call_count") }.unwrap();
    let g_calls: Symbol<unsafe extern "C" fn() -> i64> = unsafe { lib.get(b"fixture_g_call_count") }.unwrap();

    // One bootstrap invocation plus one fresh re-invocation per group
    // member.
    assert_eq!(unsafe { f_calls() }, 3);
    // Tgt.g only becomes ready once both group members have written
    // their slot, so it fires exactly once.
    assert_eq!(unsafe { g_calls() }, 1);
}

#[test]
fn scenario_3_broadcast_fan_out() {
    let path = common::fixture_artifact("pt-fixture-plugin");
    let mut engine = Engine::new();
    let descriptor = engine.load_plugin(&path).expect("plugin loads").clone();
    let name = descriptor.name.clone();

    let broadcast_to = |target: &str| {
        let mut rule = TransferRule::unicast(
            RuleEndpointSource {
                plugin: name.clone(),
                interface: "Ev".to_string(),
                param_index: 0,
            },
            RuleEndpointTarget {
                plugin: name.clone(),
                interface: target.to_string(),
                param_index: 0,
                target_plugin_path: None,
            },
        );
        rule.transfer_mode = TransferMode::Broadcast;
        rule
    };
    let rule_a = broadcast_to("RecvA");
    let rule_b = broadcast_to("RecvB");

    engine.set_rules(vec![rule_a, rule_b]);

    let rc = engine.transfer_pointer(&name, "Ev", 0, Value::Int32(42), "int32");
    assert_eq!(rc, 0);

    let lib = unsafe { Library::new(&path) }.expect("reload fixture for accessors");
    let recv_a: Symbol<unsafe extern "C" fn() -> i64> = unsafe { lib.get(b"fixture_recv_a_count") }.unwrap();
    let recv_b: Symbol<unsafe extern "C" fn() -> i64> = unsafe { lib.get(b"fixture_recv_b_count") }.unwrap();
    assert_eq!(unsafe { recv_a() }, 1);
    assert_eq!(unsafe { recv_b() }, 1);
}

#[test]
fn scenario_4_unicast_tie_break() {
    let path = common::fixture_artifact("pt-fixture-plugin");
    let mut engine = Engine::new();
    let descriptor = engine.load_plugin(&path).expect("plugin loads").clone();
    let name = descriptor.name.clone();

    let source = || RuleEndpointSource {
        plugin: name.clone(),
        interface: "Tie".to_string(),
        param_index: 0,
    };
    let target_x = || RuleEndpointTarget {
        plugin: name.clone(),
        interface: "X".to_string(),
        param_index: 0,
        target_plugin_path: None,
    };

    let duplicate_first = TransferRule::unicast(source(), target_x());
    let duplicate_second = TransferRule::unicast(source(), target_x());
    let distinct_target = TransferRule::unicast(
        source(),
        RuleEndpointTarget {
            plugin: name.clone(),
            interface: "Y".to_string(),
            param_index: 0,
            target_plugin_path: None,
        },
    );

    engine.set_rules(vec![duplicate_first, duplicate_second, distinct_target]);

    let rc = engine.call_plugin(&name, "Tie", 0, Value::Int32(9));
    assert_eq!(rc, 0);

    let lib = unsafe { Library::new(&path) }.expect("reload fixture for accessors");
    let x_calls: Symbol<unsafe extern "C" fn() -> i64> = unsafe { lib.get(b"fixture_x_call_count") }.unwrap();
    let x_value: Symbol<unsafe extern "C" fn() -> i32> = unsafe { lib.get(b"fixture_x_last_value") }.unwrap();
    let y_calls: Symbol<unsafe extern "C" fn() -> i64> = unsafe { lib.get(b"fixture_y_call_count") }.unwrap();

    // The first duplicate is suppressed by the exact-duplicate
    // lookahead; only the second rule's target is ever invoked.
    assert_eq!(unsafe { x_calls() }, 1);
    assert_eq!(unsafe { x_value() }, 9);
    // A rule targeting a different slot is unaffected by the
    // suppression and fires independently.
    assert_eq!(unsafe { y_calls() }, 1);
}

#[test]
fn scenario_5_cycle_rejection() {
    let path_a = common::fixture_artifact("pt-fixture-plugin-a");
    let path_b = common::fixture_artifact("pt-fixture-plugin-b");

    let mut engine = Engine::new();
    let descriptor_a = engine.load_plugin(&path_a).expect("plugin a loads").clone();
    let descriptor_b = engine.load_plugin(&path_b).expect("plugin b loads").clone();
    let name_a = descriptor_a.name.clone();
    let name_b = descriptor_b.name.clone();

    engine.set_rules(vec![
        TransferRule::unicast(
            RuleEndpointSource {
                plugin: name_a.clone(),
                interface: "f".to_string(),
                param_index: RETURN_VALUE_PARAM_INDEX,
            },
            RuleEndpointTarget {
                plugin: name_b.clone(),
                interface: "g".to_string(),
                param_index: 0,
                target_plugin_path: None,
            },
        ),
        TransferRule::unicast(
            RuleEndpointSource {
                plugin: name_b.clone(),
                interface: "g".to_string(),
                param_index: RETURN_VALUE_PARAM_INDEX,
            },
            RuleEndpointTarget {
                plugin: name_a.clone(),
                interface: "f".to_string(),
                param_index: 0,
                target_plugin_path: None,
            },
        ),
    ]);

    let rc = engine.call_plugin(&name_a, "f", RETURN_VALUE_PARAM_INDEX, Value::Int32(1));
    // One rule (A.f -> B.g) succeeds at the top level; the chain's
    // second attempt to re-enter B.g is rejected deeper in the
    // recursion, but that rejection doesn't change the top-level
    // outcome — dispatch terminates cleanly with a success return.
    assert_eq!(rc, 0);

    let lib_a = unsafe { Library::new(&path_a) }.expect("reload fixture a for accessors");
    let lib_b = unsafe { Library::new(&path_b) }.expect("reload fixture b for accessors");
    let f_calls: Symbol<unsafe extern "C" fn() -> i64> = unsafe { lib_a.get(b"fixture_f_call_count") }.unwrap();
    let g_calls: Symbol<unsafe extern "C" fn() -> i64> = unsafe { lib_b.get(b"fixture_g_call_count") }.unwrap();

    assert_eq!(unsafe { g_calls() }, 1);
    assert_eq!(unsafe { f_calls() }, 1);
}

#[test]
fn scenario_6_variadic_gap() {
    let path = common::fixture_artifact("pt-fixture-plugin");
    let mut engine = Engine::new();
    let descriptor = engine.load_plugin(&path).expect("plugin loads").clone();
    let name = descriptor.name.clone();

    let rule = seeded(&name, "Gap", "V", 3, "99");
    engine.set_rules(vec![rule]);

    let rc = engine.call_plugin(&name, "Gap", RETURN_VALUE_PARAM_INDEX, Value::Int32(0));
    // Writing slot 3 while slots 0..2 are unwritten is a parameter
    // gap; the target is never invoked.
    assert_eq!(rc, -1);

    let lib = unsafe { Library::new(&path) }.expect("reload fixture for accessors");
    let v_last_count: Symbol<unsafe extern "C" fn() -> i32> = unsafe { lib.get(b"fixture_v_last_count") }.unwrap();
    assert_eq!(unsafe { v_last_count() }, -1);
}
