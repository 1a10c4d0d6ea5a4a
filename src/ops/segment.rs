//! Shared validation for segment operations

use crate::dtype::DType;
use crate::error::{shape_mismatch, unsupported_dtype, Error, Result};
use crate::runtime::{Device, Runtime};
use crate::tensor::Tensor;

/// Validate segment ids against the data tensor and copy them to the host.
///
/// Every id must be a non-negative I64 index below `num_segments`.
pub(crate) fn validate_segment_ids<R: Runtime>(
    a: &Tensor<R>,
    segment_ids: &Tensor<R>,
    num_segments: usize,
    op: &'static str,
) -> Result<Vec<i64>> {
    if segment_ids.dtype() != DType::I64 {
        return Err(unsupported_dtype(segment_ids.dtype(), op));
    }
    if segment_ids.ndim() != 1 {
        return Err(Error::InvalidArgument {
            arg: "segment_ids",
            reason: format!("expected a rank-1 tensor, got rank {}", segment_ids.ndim()),
        });
    }
    if a.ndim() == 0 {
        return Err(Error::InvalidArgument {
            arg: "a",
            reason: "scalar tensors cannot be segmented".to_string(),
        });
    }
    if !a.device().is_same(segment_ids.device()) {
        return Err(Error::DeviceMismatch);
    }

    let rows = a.shape()[0];
    if segment_ids.shape()[0] != rows {
        return Err(shape_mismatch(&[rows], segment_ids.shape()));
    }

    let ids = segment_ids.contiguous()?.to_vec::<i64>();
    for &id in &ids {
        if id < 0 {
            return Err(Error::InvalidArgument {
                arg: "segment_ids",
                reason: format!("negative segment id {}", id),
            });
        }
        if id as usize >= num_segments {
            return Err(Error::IndexOutOfBounds {
                index: id as usize,
                size: num_segments,
            });
        }
    }

    Ok(ids)
}

/// Count id occurrences on the host.
///
/// Shared by both backends: the CUDA path stages ids through host memory
/// anyway to size the output tensor.
pub(crate) fn host_bincount<R: Runtime>(ids: &Tensor<R>, minlength: usize) -> Result<Vec<i64>> {
    if ids.dtype() != DType::I64 {
        return Err(unsupported_dtype(ids.dtype(), "bincount"));
    }
    if ids.ndim() != 1 {
        return Err(Error::InvalidArgument {
            arg: "ids",
            reason: format!("expected a rank-1 tensor, got rank {}", ids.ndim()),
        });
    }

    let host = ids.contiguous()?.to_vec::<i64>();
    let mut len = minlength;
    for &id in &host {
        if id < 0 {
            return Err(Error::InvalidArgument {
                arg: "ids",
                reason: format!("negative id {}", id),
            });
        }
        len = len.max(id as usize + 1);
    }

    let mut counts = vec![0i64; len];
    for &id in &host {
        counts[id as usize] += 1;
    }
    Ok(counts)
}
