//! Parameter normalization

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Grouped parameter normalization for sum-node parameters
pub trait NormalizeOps<R: Runtime> {
    /// Renormalize sum-node parameters in place so that, for every node
    /// group and every node position within the group, the outgoing
    /// parameters sum to one.
    ///
    /// `params` holds one block per edge bundle with shape
    /// `[num_param_blocks, group_size, ch_group_size]`, optionally with a
    /// trailing batch dimension. `node_ids[m]` names the group block `m`
    /// belongs to; groups are numbered densely, `max(node_ids) + 1` in
    /// total.
    ///
    /// With `pseudocount > 0`, Laplace-style smoothing distributes the
    /// pseudocount across each group's children: an element becomes
    /// `(p + pseudocount / node_nchs[g]) / (total + pseudocount)` where
    /// `total` is the group's column sum. `node_nchs` defaults to the
    /// per-group block count times `ch_group_size`.
    ///
    /// A column whose total and pseudocount are both zero normalizes to
    /// zeros, never NaN.
    ///
    /// # Arguments
    ///
    /// * `params` - Float parameter blocks, contiguous, mutated in place.
    ///   The caller must hold the only live view of the storage.
    /// * `node_ids` - I64 block-to-group mapping, rank 1
    /// * `group_size` - Expected size of dimension 1
    /// * `ch_group_size` - Expected size of dimension 2
    /// * `node_nchs` - Optional I64 per-group child counts
    /// * `pseudocount` - Smoothing mass, finite and non-negative
    ///
    /// # Errors
    ///
    /// Validation runs to completion before any write; on error `params`
    /// is unchanged. The host backend rejects batched tensors with
    /// [`BackendLimitation`](crate::error::Error::BackendLimitation).
    #[allow(clippy::too_many_arguments)]
    fn normalize_parameters(
        &self,
        params: &mut Tensor<R>,
        node_ids: &Tensor<R>,
        group_size: usize,
        ch_group_size: usize,
        node_nchs: Option<&Tensor<R>>,
        pseudocount: f64,
    ) -> Result<()>;
}
