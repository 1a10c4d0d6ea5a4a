//! Shared helpers for single-axis reductions

use crate::error::{Error, Result};

/// Validate a reduction dimension against a tensor rank
pub(crate) fn check_reduce_dim(ndim: usize, dim: usize) -> Result<()> {
    if dim >= ndim {
        return Err(Error::InvalidDimension {
            dim: dim as isize,
            ndim,
        });
    }
    Ok(())
}

/// Decompose a shape around a reduced dimension into (outer, reduce, inner)
/// extents, so element `[o, r, i]` of the view lives at linear index
/// `(o * reduce + r) * inner + i` of the contiguous buffer.
pub(crate) fn reduce_dim_extents(shape: &[usize], dim: usize) -> (usize, usize, usize) {
    let outer: usize = shape[..dim].iter().product();
    let reduce = shape[dim];
    let inner: usize = shape[dim + 1..].iter().product();
    (outer, reduce, inner)
}

/// Output shape of a single-axis reduction
pub(crate) fn reduce_dim_output_shape(shape: &[usize], dim: usize, keepdim: bool) -> Vec<usize> {
    let mut out: Vec<usize> = Vec::with_capacity(shape.len());
    for (d, &s) in shape.iter().enumerate() {
        if d == dim {
            if keepdim {
                out.push(1);
            }
        } else {
            out.push(s);
        }
    }
    out
}
