//! CPU parameter normalization
//!
//! Host strategy: channel sums via the axis reduction, explicit groupby
//! accumulation via segment_sum, then an in-place rescale over blocks.

use crate::dispatch_dtype;
use crate::error::{backend_limitation, Result};
use crate::ops::normalize::plan_normalize;
use crate::ops::traits::{NormalizeOps, ReduceOps, SegmentOps};
use crate::runtime::cpu::{kernels, CpuClient, CpuRuntime};
use crate::tensor::Tensor;

impl NormalizeOps<CpuRuntime> for CpuClient {
    fn normalize_parameters(
        &self,
        params: &mut Tensor<CpuRuntime>,
        node_ids: &Tensor<CpuRuntime>,
        group_size: usize,
        ch_group_size: usize,
        node_nchs: Option<&Tensor<CpuRuntime>>,
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
        if plan.batch_size != 1 {
            return Err(backend_limitation(
                "cpu",
                "normalize_parameters",
                format!(
                    "batched parameters (batch_size = {}) require the CUDA backend",
                    plan.batch_size
                ),
            ));
        }

        // grouped[m, k] = sum over the channel axis
        let grouped = self.sum_dim(params, 2, false)?;
        // cum[g, k] = sum of grouped rows mapping to group g
        let cum = self.segment_sum(&grouped, node_ids, plan.num_node_groups)?;

        dispatch_dtype!(params.dtype(), T => {
            unsafe {
                kernels::normalize_params_kernel::<T>(
                    params.storage().ptr() as *mut T,
                    cum.storage().ptr() as *const T,
                    plan.node_ids.as_ptr(),
                    plan.node_nchs.as_ptr(),
                    pseudocount,
                    plan.num_param_blocks,
                    plan.group_size,
                    plan.ch_group_size,
                    plan.batch_size,
                    plan.num_node_groups,
                );
            }
        });

        Ok(())
    }
}
