// crates/pt-types/src/lib.rs
//
// ABI types shared between the engine and every plugin: the parameter
// pack layout, type tags, the plugin introspection vtable, and the
// public host API plugins call back into. Kept dependency-free and
// `#[repr(C)]` wherever it crosses the FFI boundary — the one place
// both host and plugin binaries agree on layout.

pub mod descriptor;
pub mod host_api;
pub mod pack;
pub mod return_kind;
pub mod rule;
pub mod value;
pub mod vtable;

pub use descriptor::{InterfaceDescriptor, ParamDescriptor, PluginDescriptor};
pub use host_api::{ApiResult, EngineContext, HostApi, LastTransferred};
pub use pack::{ParamPack, ParamSlot, ValueUnion};
pub use return_kind::ReturnKind;
pub use rule::{RuleEndpointSource, RuleEndpointTarget, RuleKey, TransferMode, TransferRule};
pub use value::{ParamType, Value};
pub use vtable::{ArityKind, InterfaceFn};
