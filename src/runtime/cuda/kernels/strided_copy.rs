//! Launcher for the strided gather kernel

use super::loader::{
    elementwise_launch_config, get_kernel_function, get_or_load_module, kernel_names,
};
use crate::error::{Error, Result};
use crate::runtime::cuda::CudaClient;
use crate::runtime::RuntimeClient;
use cudarc::driver::PushKernelArg;

/// Gather a strided view into a packed buffer, one thread per element.
///
/// The kernel is byte-wise and dtype-agnostic; `shape_dev` and
/// `strides_dev` are device arrays of `ndim` u64/i64 values.
///
/// # Safety
///
/// `src` must cover every element reachable through the strides; `dst`
/// must hold `numel * elem_size` bytes.
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn launch_strided_copy(
    client: &CudaClient,
    src: u64,
    dst: u64,
    shape_dev: u64,
    strides_dev: u64,
    numel: usize,
    ndim: usize,
    elem_size: usize,
) -> Result<()> {
    let module = get_or_load_module(
        client.context(),
        client.device().index(),
        kernel_names::STRIDED_COPY_MODULE,
    )?;
    let func = get_kernel_function(&module, "strided_copy")?;

    let cfg = elementwise_launch_config(numel);
    let numel = numel as u32;
    let ndim = ndim as u32;
    let elem_size = elem_size as u32;

    let mut builder = client.stream().launch_builder(&func);
    builder.arg(&src);
    builder.arg(&dst);
    builder.arg(&shape_dev);
    builder.arg(&strides_dev);
    builder.arg(&numel);
    builder.arg(&ndim);
    builder.arg(&elem_size);
    builder
        .launch(cfg)
        .map_err(|e| Error::Internal(format!("CUDA strided_copy launch failed: {:?}", e)))?;

    Ok(())
}
