//! CPU segment operations

use crate::dispatch_dtype;
use crate::error::Result;
use crate::ops::segment::{host_bincount, validate_segment_ids};
use crate::ops::traits::SegmentOps;
use crate::runtime::cpu::{kernels, CpuClient, CpuRuntime};
use crate::runtime::RuntimeClient;
use crate::tensor::Tensor;

impl SegmentOps<CpuRuntime> for CpuClient {
    fn segment_sum(
        &self,
        a: &Tensor<CpuRuntime>,
        segment_ids: &Tensor<CpuRuntime>,
        num_segments: usize,
    ) -> Result<Tensor<CpuRuntime>> {
        let ids = validate_segment_ids(a, segment_ids, num_segments, "segment_sum")?;
        let a = a.contiguous()?;

        let rows = a.shape()[0];
        let inner: usize = a.shape()[1..].iter().product();
        let mut out_shape = a.shape().to_vec();
        out_shape[0] = num_segments;
        let out = Tensor::try_zeros(&out_shape, a.dtype(), self.device())?;

        dispatch_dtype!(a.dtype(), T => {
            unsafe {
                kernels::segment_sum_kernel::<T>(
                    a.storage().ptr() as *const T,
                    ids.as_ptr(),
                    out.storage().ptr() as *mut T,
                    rows,
                    inner,
                );
            }
        });

        Ok(out)
    }

    fn bincount(&self, ids: &Tensor<CpuRuntime>, minlength: usize) -> Result<Tensor<CpuRuntime>> {
        let counts = host_bincount(ids, minlength)?;
        Tensor::try_from_slice(&counts, &[counts.len()], self.device())
    }
}
