//! CPU reductions

use crate::dispatch_dtype;
use crate::error::{unsupported_dtype, Result};
use crate::ops::reduce::{check_reduce_dim, reduce_dim_extents, reduce_dim_output_shape};
use crate::ops::traits::ReduceOps;
use crate::runtime::cpu::{kernels, CpuClient, CpuRuntime};
use crate::runtime::RuntimeClient;
use crate::tensor::Tensor;

enum ReduceKind {
    Sum,
    LogSumExp,
}

fn reduce_dim_impl(
    client: &CpuClient,
    a: &Tensor<CpuRuntime>,
    dim: usize,
    keepdim: bool,
    kind: ReduceKind,
) -> Result<Tensor<CpuRuntime>> {
    check_reduce_dim(a.ndim(), dim)?;
    if matches!(kind, ReduceKind::LogSumExp) && !a.dtype().is_float() {
        return Err(unsupported_dtype(a.dtype(), "logsumexp_dim"));
    }

    let a = a.contiguous()?;
    let (outer, reduce, inner) = reduce_dim_extents(a.shape(), dim);
    let out_shape = reduce_dim_output_shape(a.shape(), dim, keepdim);
    let out = Tensor::try_empty(&out_shape, a.dtype(), client.device())?;

    dispatch_dtype!(a.dtype(), T => {
        let src = a.storage().ptr() as *const T;
        let dst = out.storage().ptr() as *mut T;
        unsafe {
            match kind {
                ReduceKind::Sum => kernels::sum_dim_kernel::<T>(src, dst, outer, reduce, inner),
                ReduceKind::LogSumExp => {
                    kernels::logsumexp_dim_kernel::<T>(src, dst, outer, reduce, inner)
                }
            }
        }
    });

    Ok(out)
}

impl ReduceOps<CpuRuntime> for CpuClient {
    fn sum_dim(&self, a: &Tensor<CpuRuntime>, dim: usize, keepdim: bool) -> Result<Tensor<CpuRuntime>> {
        reduce_dim_impl(self, a, dim, keepdim, ReduceKind::Sum)
    }

    fn logsumexp_dim(
        &self,
        a: &Tensor<CpuRuntime>,
        dim: usize,
        keepdim: bool,
    ) -> Result<Tensor<CpuRuntime>> {
        reduce_dim_impl(self, a, dim, keepdim, ReduceKind::LogSumExp)
    }
}
