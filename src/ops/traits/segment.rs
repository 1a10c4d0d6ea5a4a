//! Segment (groupby) operations

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Groupby aggregation keyed by an id per leading row
pub trait SegmentOps<R: Runtime> {
    /// Sum rows of `a` into `num_segments` output rows:
    /// `out[segment_ids[i]] += a[i]` over dimension 0.
    ///
    /// Rows not named by any id are zero.
    ///
    /// # Errors
    ///
    /// Negative ids are [`InvalidArgument`](crate::error::Error::InvalidArgument);
    /// ids at or above `num_segments` are
    /// [`IndexOutOfBounds`](crate::error::Error::IndexOutOfBounds).
    fn segment_sum(
        &self,
        a: &Tensor<R>,
        segment_ids: &Tensor<R>,
        num_segments: usize,
    ) -> Result<Tensor<R>>;

    /// Count occurrences of each id in a rank-1 I64 tensor.
    ///
    /// The output length is `max(ids) + 1`, or `minlength` if larger.
    fn bincount(&self, ids: &Tensor<R>, minlength: usize) -> Result<Tensor<R>>;
}
