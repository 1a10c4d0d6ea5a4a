//! CUDA parameter normalization
//!
//! Accelerated strategy, three passes on one stream: channel-sum kernel,
//! atomic scatter-accumulation into per-group totals, then the in-place
//! rescale. The stream is synchronized between accumulation and rescale so
//! every total is complete before any element divides by it.

use crate::error::Result;
use crate::ops::normalize::plan_normalize;
use crate::ops::traits::{NormalizeOps, ReduceOps};
use crate::runtime::cuda::{kernels, CudaClient, CudaRuntime};
use crate::runtime::RuntimeClient;
use crate::tensor::Tensor;

impl NormalizeOps<CudaRuntime> for CudaClient {
    fn normalize_parameters(
        &self,
        params: &mut Tensor<CudaRuntime>,
        node_ids: &Tensor<CudaRuntime>,
        group_size: usize,
        ch_group_size: usize,
        node_nchs: Option<&Tensor<CudaRuntime>>,
        pseudocount: f64,
    ) -> Result<()> {
        let plan = plan_normalize(
            params,
            node_ids,
            group_size,
            ch_group_size,
            node_nchs,
            pseudocount,
        )?;

        // Pass 1: grouped[m, k, b] = channel sums
        let grouped = self.sum_dim(params, 2, false)?;

        // Pass 2: cum[g, k, b] += grouped[m, k, b] for node_ids[m] == g
        let mut cum_shape = vec![plan.num_node_groups, plan.group_size];
        if params.ndim() == 4 {
            cum_shape.push(plan.batch_size);
        }
        let cum = Tensor::try_zeros(&cum_shape, params.dtype(), self.device())?;
        let ids = node_ids.contiguous()?;

        unsafe {
            kernels::normalize::launch_segment_sum(
                self,
                params.dtype(),
                grouped.storage().ptr(),
                ids.storage().ptr(),
                cum.storage().ptr(),
                plan.num_param_blocks,
                plan.group_size * plan.batch_size,
            )?;
        }

        // Every atomic accumulation must land before the rescale reads cum
        self.synchronize();

        // Pass 3: in-place rescale with smoothing
        let nchs =
            Tensor::<CudaRuntime>::try_from_slice(&plan.node_nchs, &[plan.num_node_groups], self.device())?;

        unsafe {
            kernels::normalize::launch_normalize_params(
                self,
                params.dtype(),
                params.storage().ptr(),
                cum.storage().ptr(),
                ids.storage().ptr(),
                nchs.storage().ptr(),
                pseudocount,
                plan.num_param_blocks,
                plan.group_size,
                plan.ch_group_size,
                plan.batch_size,
            )?;
        }

        self.synchronize();
        Ok(())
    }
}
