//! Matrix multiplication

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Dense 2-D matrix product
pub trait MatmulOps<R: Runtime> {
    /// Compute `a @ b` for rank-2 tensors of matching dtype.
    ///
    /// `a` is `[m, k]`, `b` is `[k, n]`, and the result is `[m, n]`.
    fn matmul(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;
}
