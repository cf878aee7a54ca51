// crates/pt-engine/src/ffi/call.rs
//
// Dynamic FFI caller. Given a function pointer, an ordered list of
// typed parameter values and a declared return shape, performs the
// target-ABI call and returns a tagged result. This is the one
// `unsafe`/`extern` island the upper layers never reach past.
//
// Native calling conventions route integer and floating-point returns
// through different registers, so the caller must invoke through a
// function pointer typed to match the plugin's real return kind
// rather than always reading an `i64` back. Struct-by-value returns
// additionally rely on the platform's hidden-return-pointer
// convention, which only Rust's ABI lowering for a same-sized
// `#[repr(C)]` type can reproduce — we support a fixed ladder of
// buffer sizes and reject anything larger with a clear validation
// error rather than silently truncating.

use pt_types::{ReturnKind, Value};

use super::pack::ParamPackBuilder;
use super::struct_return::StructReturn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    NullFunctionPointer,
    UnsizedReferenceValue { index: usize },
    MissingStructReturnSize,
    StructTooLargeForBuffer { size: usize, max_supported: usize },
    PluginPanicked,
}

pub struct CallResult {
    pub int_result: i64,
    pub float_result: f64,
    pub struct_buf: Option<StructReturn>,
}

type RawFn = unsafe extern "C" fn(*mut pt_types::ParamPack) -> i64;
type FloatFn = unsafe extern "C" fn(*mut pt_types::ParamPack) -> f32;
type DoubleFn = unsafe extern "C" fn(*mut pt_types::ParamPack) -> f64;

/// Largest struct-by-value return this caller can marshal. Interfaces
/// declaring a larger `return_size` fail validation rather than
/// corrupting memory.
pub const MAX_STRUCT_RETURN_SIZE: usize = 256;

macro_rules! struct_buf {
    ($name:ident, $size:expr) => {
        #[repr(C)]
        struct $name([u8; $size]);
    };
}

struct_buf!(StructBuf8, 8);
struct_buf!(StructBuf16, 16);
struct_buf!(StructBuf32, 32);
struct_buf!(StructBuf64, 64);
struct_buf!(StructBuf128, 128);
struct_buf!(StructBuf256, 256);

macro_rules! call_struct_bucket {
    ($func_ptr:expr, $pack:expr, $bucket_ty:ty, $dest:expr) => {{
        type BucketFn = unsafe extern "C" fn(*mut pt_types::ParamPack) -> $bucket_ty;
        let f: BucketFn = std::mem::transmute($func_ptr);
        let raw = f($pack);
        let bytes = std::slice::from_raw_parts(
            &raw as *const $bucket_ty as *const u8,
            std::mem::size_of::<$bucket_ty>(),
        );
        let n = $dest.len().min(bytes.len());
        $dest[..n].copy_from_slice(&bytes[..n]);
    }};
}

/// Validate inputs before attempting the call.
fn validate(func_ptr: usize, values: &[Value], return_kind: ReturnKind) -> Result<(), CallError> {
    if func_ptr == 0 {
        return Err(CallError::NullFunctionPointer);
    }
    for (index, value) in values.iter().enumerate() {
        let needs_known_size = matches!(value, Value::Str { .. } | Value::Ptr { .. });
        if needs_known_size && !value.addr().is_null() && value.size() == 0 {
            return Err(CallError::UnsizedReferenceValue { index });
        }
    }
    if let ReturnKind::StructByValue(size) = return_kind {
        if size == 0 {
            return Err(CallError::MissingStructReturnSize);
        }
        if size > MAX_STRUCT_RETURN_SIZE {
            return Err(CallError::StructTooLargeForBuffer {
                size,
                max_supported: MAX_STRUCT_RETURN_SIZE,
            });
        }
    }
    Ok(())
}

/// Invoke `func_ptr` with `values` marshaled into a parameter pack,
/// reading the return register(s) matching `return_kind`.
///
/// # Safety
/// `func_ptr` must point to a function implementing the plugin
/// invocation ABI: it takes exactly one `*mut ParamPack` argument and
/// its real return type matches `return_kind`.
pub unsafe fn invoke(
    func_ptr: *const (),
    values: &[Value],
    return_kind: ReturnKind,
) -> Result<CallResult, CallError> {
    validate(func_ptr as usize, values, return_kind)?;

    let mut builder = ParamPackBuilder::new(values);
    let mut pack = builder.as_pack();
    let pack_ptr = &mut pack as *mut pt_types::ParamPack;

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| -> CallResult {
        match return_kind {
            ReturnKind::Integer | ReturnKind::PointerOrStructPtr => {
                let f: RawFn = std::mem::transmute(func_ptr);
                let result = f(pack_ptr);
                CallResult {
                    int_result: result,
                    float_result: 0.0,
                    struct_buf: None,
                }
            }
            ReturnKind::Float => {
                let f: FloatFn = std::mem::transmute(func_ptr);
                let result = f(pack_ptr);
                CallResult {
                    int_result: 0,
                    float_result: result as f64,
                    struct_buf: None,
                }
            }
            ReturnKind::Double => {
                let f: DoubleFn = std::mem::transmute(func_ptr);
                let result = f(pack_ptr);
                CallResult {
                    int_result: 0,
                    float_result: result,
                    struct_buf: None,
                }
            }
            ReturnKind::StructByValue(size) => {
                let mut ret = StructReturn::new(size);
                {
                    let dest = std::slice::from_raw_parts_mut(ret.as_mut_ptr(), ret.len());
                    match size {
                        0..=8 => call_struct_bucket!(func_ptr, pack_ptr, StructBuf8, dest),
                        9..=16 => call_struct_bucket!(func_ptr, pack_ptr, StructBuf16, dest),
                        17..=32 => call_struct_bucket!(func_ptr, pack_ptr, StructBuf32, dest),
                        33..=64 => call_struct_bucket!(func_ptr, pack_ptr, StructBuf64, dest),
                        65..=128 => call_struct_bucket!(func_ptr, pack_ptr, StructBuf128, dest),
                        _ => call_struct_bucket!(func_ptr, pack_ptr, StructBuf256, dest),
                    }
                }
                CallResult {
                    int_result: 0,
                    float_result: 0.0,
                    struct_buf: Some(ret),
                }
            }
        }
    }));

    outcome.map_err(|_| CallError::PluginPanicked)
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "C" fn add_two(pack: *mut pt_types::ParamPack) -> i64 {
        let pack = &*pack;
        let slots = std::slice::from_raw_parts(pack.params, pack.param_count as usize);
        let a = slots[0].value.i32_val;
        let b = slots[1].value.i32_val;
        (a + b) as i64
    }

    unsafe extern "C" fn return_double(pack: *mut pt_types::ParamPack) -> f64 {
        let pack = &*pack;
        let slots = std::slice::from_raw_parts(pack.params, pack.param_count as usize);
        slots[0].value.f64_val * 2.0
    }

    #[test]
    fn integer_call_round_trips() {
        let values = [Value::Int32(3), Value::Int32(4)];
        let result = unsafe {
            invoke(add_two as *const (), &values, ReturnKind::Integer).unwrap()
        };
        assert_eq!(result.int_result, 7);
    }

    #[test]
    fn double_call_reads_float_register() {
        let values = [Value::Double(3.5)];
        let result = unsafe {
            invoke(return_double as *const (), &values, ReturnKind::Double).unwrap()
        };
        assert_eq!(result.float_result, 7.0);
    }

    #[test]
    fn null_function_pointer_rejected() {
        let err = unsafe { invoke(std::ptr::null(), &[], ReturnKind::Integer) }.unwrap_err();
        assert_eq!(err, CallError::NullFunctionPointer);
    }

    #[test]
    fn oversized_struct_return_rejected() {
        let err = unsafe {
            invoke(
                add_two as *const (),
                &[],
                ReturnKind::StructByValue(MAX_STRUCT_RETURN_SIZE + 1),
            )
        }
        .unwrap_err();
        assert!(matches!(err, CallError::StructTooLargeForBuffer { .. }));
    }
}
