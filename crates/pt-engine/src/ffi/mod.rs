// crates/pt-engine/src/ffi/mod.rs
//
// Dynamic call layer.

pub mod call;
pub mod pack;
pub mod struct_return;

pub use call::{invoke, CallError, CallResult, MAX_STRUCT_RETURN_SIZE};
pub use pack::ParamPackBuilder;
pub use struct_return::StructReturn;
