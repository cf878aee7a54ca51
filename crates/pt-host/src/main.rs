// crates/pt-host/src/main.rs
//
// Minimal demonstration binary: loads a single plugin, wires up one
// unicast transfer rule by hand (no `.nxpt` parsing, out of scope) and
// drives `CallPlugin` once to show the rule firing end to end. A thin
// entry point that only constructs the engine and runs one dispatch.

use std::env;
use std::path::Path;

use pt_engine::Engine;
use pt_types::rule::{RuleEndpointSource, RuleEndpointTarget, RETURN_VALUE_PARAM_INDEX};
use pt_types::{TransferRule, Value};

fn default_plugin_path() -> &'static str {
    if cfg!(target_os = "windows") {
        "target/debug/pt_fixture_plugin.dll"
    } else if cfg!(target_os = "macos") {
        "target/debug/libpt_fixture_plugin.dylib"
    } else {
        "target/debug/libpt_fixture_plugin.so"
    }
}

fn seeded_rule(plugin: &str, target_interface: &str, param_index: i32, literal: &str) -> TransferRule {
    let mut rule = TransferRule::unicast(
        RuleEndpointSource {
            plugin: plugin.to_string(),
            interface: "Boot".to_string(),
            param_index: 0,
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

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let plugin_path = args.get(1).map(String::as_str).unwrap_or_else(default_plugin_path);

    let mut engine = Engine::new();
    let descriptor = match engine.load_plugin(Path::new(plugin_path)) {
        Ok(descriptor) => descriptor.clone(),
        Err(err) => {
            tracing::error!(?err, path = plugin_path, "failed to load plugin");
            return;
        }
    };

    tracing::info!(plugin = %descriptor.name, interfaces = descriptor.interfaces.len(), "loaded plugin");

    // Two literal-seeded rules fill Add's parameters from a single
    // bootstrap event; once both slots are ready the engine calls
    // Add, and a third rule routes its return into X.
    engine.set_rules(vec![
        seeded_rule(&descriptor.name, "Add", 0, "2"),
        seeded_rule(&descriptor.name, "Add", 1, "3"),
        TransferRule::unicast(
            RuleEndpointSource {
                plugin: descriptor.name.clone(),
                interface: "Add".to_string(),
                param_index: RETURN_VALUE_PARAM_INDEX,
            },
            RuleEndpointTarget {
                plugin: descriptor.name.clone(),
                interface: "X".to_string(),
                param_index: 0,
                target_plugin_path: None,
            },
        ),
    ]);

    let rc = engine.call_plugin(&descriptor.name, "Boot", 0, Value::Int32(0));
    tracing::info!(rc, "demonstration dispatch complete");
}
