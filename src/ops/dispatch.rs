//! Runtime dtype dispatch to typed kernels

/// Dispatch on a [`DType`](crate::dtype::DType) value, binding a type alias
/// for the matching [`Element`](crate::dtype::Element) type in each arm.
///
/// ```ignore
/// dispatch_dtype!(tensor.dtype(), T => {
///     unsafe { kernel::<T>(ptr as *const T, out as *mut T, n) }
/// });
/// ```
#[macro_export]
macro_rules! dispatch_dtype {
    ($dtype:expr, $T:ident => $body:block) => {
        match $dtype {
            $crate::dtype::DType::F64 => {
                type $T = f64;
                $body
            }
            $crate::dtype::DType::F32 => {
                type $T = f32;
                $body
            }
            $crate::dtype::DType::I64 => {
                type $T = i64;
                $body
            }
            $crate::dtype::DType::I32 => {
                type $T = i32;
                $body
            }
        }
    };
}
