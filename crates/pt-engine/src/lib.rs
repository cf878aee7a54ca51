// crates/pt-engine/src/lib.rs
//
// The pointer-transfer orchestration engine: dynamic plugin loading,
// the FFI call layer, and the rule-dispatch engine built on top of
// both. Split into plugin-manager / host-api / rules modules,
// generalized from one hot-reloadable game plugin to N plugins routed
// by a declarative rule table.

pub mod engine;
pub mod error;
pub mod ffi;
pub mod host_api;
pub mod platform;
pub mod plugin;
pub mod rules;

pub use engine::Engine;
pub use error::{DispatchOutcome, PrepareError, PtError, RejectReason};
