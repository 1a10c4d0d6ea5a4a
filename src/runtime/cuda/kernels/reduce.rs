//! Launchers for single-axis reduction kernels

use super::loader::{
    elementwise_launch_config, get_kernel_function, get_or_load_module, kernel_name, kernel_names,
};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::runtime::cuda::CudaClient;
use crate::runtime::RuntimeClient;
use cudarc::driver::PushKernelArg;

/// Launch a `[outer, reduce, inner]` reduction kernel (`sum_dim` or
/// `logsumexp_dim`), one thread per output element.
///
/// # Safety
///
/// `src` must hold `outer * reduce * inner` elements of `dtype` and `dst`
/// must hold `outer * inner`.
pub(crate) unsafe fn launch_reduce_dim(
    client: &CudaClient,
    base: &str,
    dtype: DType,
    src: u64,
    dst: u64,
    outer: usize,
    reduce: usize,
    inner: usize,
) -> Result<()> {
    let module = get_or_load_module(
        client.context(),
        client.device().index(),
        kernel_names::REDUCE_MODULE,
    )?;
    let func = get_kernel_function(&module, &kernel_name(base, dtype)?)?;

    let cfg = elementwise_launch_config(outer * inner);
    let outer = outer as u32;
    let reduce = reduce as u32;
    let inner = inner as u32;

    let mut builder = client.stream().launch_builder(&func);
    builder.arg(&src);
    builder.arg(&dst);
    builder.arg(&outer);
    builder.arg(&reduce);
    builder.arg(&inner);
    builder
        .launch(cfg)
        .map_err(|e| Error::Internal(format!("CUDA {} launch failed: {:?}", base, e)))?;

    Ok(())
}
