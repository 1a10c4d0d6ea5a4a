//! Single-axis reductions

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Reductions along one tensor dimension
pub trait ReduceOps<R: Runtime> {
    /// Sum along dimension `dim`.
    ///
    /// # Arguments
    ///
    /// * `a` - Input tensor
    /// * `dim` - Dimension to reduce
    /// * `keepdim` - Keep the reduced dimension with size 1
    fn sum_dim(&self, a: &Tensor<R>, dim: usize, keepdim: bool) -> Result<Tensor<R>>;

    /// Numerically stable log-sum-exp along dimension `dim`.
    ///
    /// Computed as `max + ln(sum(exp(x - max)))`; a column that is entirely
    /// negative infinity reduces to negative infinity. Float dtypes only.
    fn logsumexp_dim(&self, a: &Tensor<R>, dim: usize, keepdim: bool) -> Result<Tensor<R>>;
}
