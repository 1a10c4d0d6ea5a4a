//! CUDA reductions

use crate::error::{unsupported_dtype, Result};
use crate::ops::reduce::{check_reduce_dim, reduce_dim_extents, reduce_dim_output_shape};
use crate::ops::traits::ReduceOps;
use crate::runtime::cuda::{kernels, CudaClient, CudaRuntime};
use crate::runtime::RuntimeClient;
use crate::tensor::Tensor;

fn reduce_dim_impl(
    client: &CudaClient,
    a: &Tensor<CudaRuntime>,
    dim: usize,
    keepdim: bool,
    base: &'static str,
) -> Result<Tensor<CudaRuntime>> {
    check_reduce_dim(a.ndim(), dim)?;
    // Reduction kernels are float-only on this backend
    if !a.dtype().is_float() {
        return Err(unsupported_dtype(a.dtype(), base));
    }

    let a = a.contiguous()?;
    let (outer, reduce, inner) = reduce_dim_extents(a.shape(), dim);
    let out_shape = reduce_dim_output_shape(a.shape(), dim, keepdim);
    let out = Tensor::try_empty(&out_shape, a.dtype(), client.device())?;

    unsafe {
        kernels::reduce::launch_reduce_dim(
            client,
            base,
            a.dtype(),
            a.storage().ptr(),
            out.storage().ptr(),
            outer,
            reduce,
            inner,
        )?;
    }

    Ok(out)
}

impl ReduceOps<CudaRuntime> for CudaClient {
    fn sum_dim(
        &self,
        a: &Tensor<CudaRuntime>,
        dim: usize,
        keepdim: bool,
    ) -> Result<Tensor<CudaRuntime>> {
        reduce_dim_impl(self, a, dim, keepdim, "sum_dim")
    }

    fn logsumexp_dim(
        &self,
        a: &Tensor<CudaRuntime>,
        dim: usize,
        keepdim: bool,
    ) -> Result<Tensor<CudaRuntime>> {
        reduce_dim_impl(self, a, dim, keepdim, "logsumexp_dim")
    }
}
