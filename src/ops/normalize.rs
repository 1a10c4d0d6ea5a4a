//! Argument validation for parameter normalization
//!
//! Both backends run the same validate-then-mutate checks before touching
//! the parameter tensor: a failed call leaves `params` bit-identical.

use crate::dtype::DType;
use crate::error::{shape_mismatch, unsupported_dtype, Error, Result};
use crate::runtime::{Device, Runtime};
use crate::tensor::Tensor;

/// Validated, host-resident description of a normalization call
pub(crate) struct NormalizePlan {
    pub num_param_blocks: usize,
    pub group_size: usize,
    pub ch_group_size: usize,
    /// 1 for rank-3 parameter tensors
    pub batch_size: usize,
    /// `max(node_ids) + 1`
    pub num_node_groups: usize,
    /// Host copy of the block-to-group mapping
    pub node_ids: Vec<i64>,
    /// Total child count per group, widened for the smoothing offset
    pub node_nchs: Vec<f64>,
}

/// Check every argument of `normalize_parameters` and assemble the plan.
///
/// Performs no writes; all data needed on the host (ids, child counts) is
/// copied out here exactly once.
pub(crate) fn plan_normalize<R: Runtime>(
    params: &Tensor<R>,
    node_ids: &Tensor<R>,
    group_size: usize,
    ch_group_size: usize,
    node_nchs: Option<&Tensor<R>>,
    pseudocount: f64,
) -> Result<NormalizePlan> {
    if group_size == 0 || ch_group_size == 0 {
        return Err(Error::InvalidArgument {
            arg: "group_size",
            reason: "group_size and ch_group_size must be positive".to_string(),
        });
    }
    if !params.dtype().is_float() {
        return Err(unsupported_dtype(params.dtype(), "normalize_parameters"));
    }

    let shape = params.shape();
    let ndim = shape.len();
    if ndim != 3 && ndim != 4 {
        return Err(Error::InvalidArgument {
            arg: "params",
            reason: format!(
                "expected [blocks, group, channel] or [blocks, group, channel, batch], got rank {}",
                ndim
            ),
        });
    }
    if shape[1] != group_size || shape[2] != ch_group_size {
        let mut expected = vec![shape[0], group_size, ch_group_size];
        if ndim == 4 {
            expected.push(shape[3]);
        }
        return Err(shape_mismatch(&expected, shape));
    }

    let num_param_blocks = shape[0];
    if num_param_blocks == 0 {
        return Err(Error::InvalidArgument {
            arg: "params",
            reason: "at least one parameter block is required".to_string(),
        });
    }
    let batch_size = if ndim == 4 { shape[3] } else { 1 };
    if batch_size == 0 {
        return Err(Error::InvalidArgument {
            arg: "params",
            reason: "batch dimension must be non-empty".to_string(),
        });
    }
    if !params.is_contiguous() {
        return Err(Error::NotContiguous);
    }

    if !pseudocount.is_finite() || pseudocount < 0.0 {
        return Err(Error::InvalidArgument {
            arg: "pseudocount",
            reason: format!("must be finite and non-negative, got {}", pseudocount),
        });
    }

    if node_ids.dtype() != DType::I64 {
        return Err(unsupported_dtype(node_ids.dtype(), "normalize_parameters"));
    }
    if node_ids.ndim() != 1 {
        return Err(Error::InvalidArgument {
            arg: "node_ids",
            reason: format!("expected a rank-1 tensor, got rank {}", node_ids.ndim()),
        });
    }
    if !params.device().is_same(node_ids.device()) {
        return Err(Error::DeviceMismatch);
    }
    if node_ids.shape()[0] != num_param_blocks {
        return Err(shape_mismatch(&[num_param_blocks], node_ids.shape()));
    }

    let ids = node_ids.contiguous()?.to_vec::<i64>();
    let mut max_id = 0i64;
    for &id in &ids {
        if id < 0 {
            return Err(Error::InvalidArgument {
                arg: "node_ids",
                reason: format!("negative node id {}", id),
            });
        }
        max_id = max_id.max(id);
    }
    let num_node_groups = max_id as usize + 1;

    let nchs: Vec<f64> = match node_nchs {
        Some(t) => {
            if t.dtype() != DType::I64 {
                return Err(unsupported_dtype(t.dtype(), "normalize_parameters"));
            }
            if t.ndim() != 1 {
                return Err(Error::InvalidArgument {
                    arg: "node_nchs",
                    reason: format!("expected a rank-1 tensor, got rank {}", t.ndim()),
                });
            }
            if !params.device().is_same(t.device()) {
                return Err(Error::DeviceMismatch);
            }
            if t.shape()[0] != num_node_groups {
                return Err(shape_mismatch(&[num_node_groups], t.shape()));
            }
            t.contiguous()?
                .to_vec::<i64>()
                .into_iter()
                .map(|n| n as f64)
                .collect()
        }
        None => {
            // Derived counts: blocks per group times channels per block
            let mut counts = vec![0f64; num_node_groups];
            for &id in &ids {
                counts[id as usize] += ch_group_size as f64;
            }
            counts
        }
    };

    if pseudocount > 0.0 {
        for &id in &ids {
            if nchs[id as usize] <= 0.0 {
                return Err(Error::InvalidArgument {
                    arg: "node_nchs",
                    reason: format!(
                        "group {} has child count {} but smoothing requires a positive count",
                        id, nchs[id as usize]
                    ),
                });
            }
        }
    }

    Ok(NormalizePlan {
        num_param_blocks,
        group_size,
        ch_group_size,
        batch_size,
        num_node_groups,
        node_ids: ids,
        node_nchs: nchs,
    })
}
