//! CUDA segment operations

use crate::error::{unsupported_dtype, Result};
use crate::ops::segment::{host_bincount, validate_segment_ids};
use crate::ops::traits::SegmentOps;
use crate::runtime::cuda::{kernels, CudaClient, CudaRuntime};
use crate::runtime::RuntimeClient;
use crate::tensor::Tensor;

impl SegmentOps<CudaRuntime> for CudaClient {
    fn segment_sum(
        &self,
        a: &Tensor<CudaRuntime>,
        segment_ids: &Tensor<CudaRuntime>,
        num_segments: usize,
    ) -> Result<Tensor<CudaRuntime>> {
        validate_segment_ids(a, segment_ids, num_segments, "segment_sum")?;
        // atomicAdd limits this backend to float dtypes
        if !a.dtype().is_float() {
            return Err(unsupported_dtype(a.dtype(), "segment_sum"));
        }

        let a = a.contiguous()?;
        let ids = segment_ids.contiguous()?;

        let rows = a.shape()[0];
        let inner: usize = a.shape()[1..].iter().product();
        let mut out_shape = a.shape().to_vec();
        out_shape[0] = num_segments;
        let out = Tensor::try_zeros(&out_shape, a.dtype(), self.device())?;

        unsafe {
            kernels::normalize::launch_segment_sum(
                self,
                a.dtype(),
                a.storage().ptr(),
                ids.storage().ptr(),
                out.storage().ptr(),
                rows,
                inner,
            )?;
        }

        Ok(out)
    }

    fn bincount(&self, ids: &Tensor<CudaRuntime>, minlength: usize) -> Result<Tensor<CudaRuntime>> {
        // Ids come through the host anyway to size the output tensor
        let counts = host_bincount(ids, minlength)?;
        Tensor::try_from_slice(&counts, &[counts.len()], self.device())
    }
}
