//! Launchers for the parameter normalization kernels

use super::loader::{
    elementwise_launch_config, get_kernel_function, get_or_load_module, kernel_name, kernel_names,
};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::runtime::cuda::CudaClient;
use crate::runtime::RuntimeClient;
use cudarc::driver::PushKernelArg;

/// Scatter-accumulate `rows * inner` elements into segment totals with
/// atomicAdd, one thread per input element.
///
/// # Safety
///
/// `src` must hold `rows * inner` elements of `dtype`, `ids` `rows`
/// in-range I64 ids, and `dst` the zero-initialized segment totals.
pub(crate) unsafe fn launch_segment_sum(
    client: &CudaClient,
    dtype: DType,
    src: u64,
    ids: u64,
    dst: u64,
    rows: usize,
    inner: usize,
) -> Result<()> {
    let module = get_or_load_module(
        client.context(),
        client.device().index(),
        kernel_names::NORMALIZE_MODULE,
    )?;
    let func = get_kernel_function(&module, &kernel_name("segment_sum", dtype)?)?;

    let cfg = elementwise_launch_config(rows * inner);
    let rows = rows as u32;
    let inner = inner as u32;

    let mut builder = client.stream().launch_builder(&func);
    builder.arg(&src);
    builder.arg(&ids);
    builder.arg(&dst);
    builder.arg(&rows);
    builder.arg(&inner);
    builder
        .launch(cfg)
        .map_err(|e| Error::Internal(format!("CUDA segment_sum launch failed: {:?}", e)))?;

    Ok(())
}

/// Rescale every parameter element in place, one thread per element.
///
/// # Safety
///
/// Pointer extents as for the host kernel: `params` is
/// `num_blocks * group_size * ch_group_size * batch_size` elements, `cum`
/// the per-group totals, `ids` the block mapping, and `nchs` a device
/// array of `f64` child counts.
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn launch_normalize_params(
    client: &CudaClient,
    dtype: DType,
    params: u64,
    cum: u64,
    ids: u64,
    nchs: u64,
    pseudocount: f64,
    num_blocks: usize,
    group_size: usize,
    ch_group_size: usize,
    batch_size: usize,
) -> Result<()> {
    let module = get_or_load_module(
        client.context(),
        client.device().index(),
        kernel_names::NORMALIZE_MODULE,
    )?;
    let func = get_kernel_function(&module, &kernel_name("normalize_params", dtype)?)?;

    let numel = num_blocks * group_size * ch_group_size * batch_size;
    let cfg = elementwise_launch_config(numel);
    let num_blocks = num_blocks as u32;
    let group_size = group_size as u32;
    let ch_group_size = ch_group_size as u32;
    let batch_size = batch_size as u32;

    let mut builder = client.stream().launch_builder(&func);
    builder.arg(&params);
    builder.arg(&cum);
    builder.arg(&ids);
    builder.arg(&nchs);
    builder.arg(&pseudocount);
    builder.arg(&num_blocks);
    builder.arg(&group_size);
    builder.arg(&ch_group_size);
    builder.arg(&batch_size);
    builder
        .launch(cfg)
        .map_err(|e| Error::Internal(format!("CUDA normalize_params launch failed: {:?}", e)))?;

    Ok(())
}
