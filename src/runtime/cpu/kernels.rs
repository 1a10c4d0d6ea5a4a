//! Typed CPU kernels over raw pointers
//!
//! All kernels assume contiguous row-major inputs; callers validate shape,
//! dtype, and contiguity before dispatch.

use crate::dtype::Element;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Sum along the middle axis of a `[outer, reduce, inner]` view.
///
/// # Safety
///
/// `a` must be valid for `outer * reduce * inner` reads and `out` for
/// `outer * inner` writes.
pub(crate) unsafe fn sum_dim_kernel<T: Element>(
    a: *const T,
    out: *mut T,
    outer: usize,
    reduce: usize,
    inner: usize,
) {
    for o in 0..outer {
        for i in 0..inner {
            let mut acc = T::zero();
            for r in 0..reduce {
                acc = acc + *a.add((o * reduce + r) * inner + i);
            }
            *out.add(o * inner + i) = acc;
        }
    }
}

/// Log-sum-exp along the middle axis of a `[outer, reduce, inner]` view.
///
/// Max-shifted for stability; a column that is entirely -inf reduces to
/// -inf rather than NaN.
///
/// # Safety
///
/// Same aliasing requirements as [`sum_dim_kernel`].
pub(crate) unsafe fn logsumexp_dim_kernel<T: Element>(
    a: *const T,
    out: *mut T,
    outer: usize,
    reduce: usize,
    inner: usize,
) {
    for o in 0..outer {
        for i in 0..inner {
            let mut max = f64::NEG_INFINITY;
            for r in 0..reduce {
                let v = (*a.add((o * reduce + r) * inner + i)).to_f64();
                if v > max {
                    max = v;
                }
            }

            let result = if max == f64::NEG_INFINITY {
                f64::NEG_INFINITY
            } else {
                let mut sum = 0.0f64;
                for r in 0..reduce {
                    let v = (*a.add((o * reduce + r) * inner + i)).to_f64();
                    sum += (v - max).exp();
                }
                max + sum.ln()
            };

            *out.add(o * inner + i) = T::from_f64(result);
        }
    }
}

/// Scatter-accumulate rows of `a` into `out` by segment id.
///
/// `out` must be zero-initialized; every id must already be validated to
/// lie in range.
///
/// # Safety
///
/// `a` must be valid for `rows * inner` reads, `ids` for `rows` reads, and
/// `out` for `num_segments * inner` read/writes.
pub(crate) unsafe fn segment_sum_kernel<T: Element>(
    a: *const T,
    ids: *const i64,
    out: *mut T,
    rows: usize,
    inner: usize,
) {
    for row in 0..rows {
        let seg = *ids.add(row) as usize;
        for j in 0..inner {
            let dst = out.add(seg * inner + j);
            *dst = *dst + *a.add(row * inner + j);
        }
    }
}

/// Naive matrix product: `out[m, n] = sum_k a[m, k] * b[k, n]`.
///
/// # Safety
///
/// `a` must be valid for `m * k` reads, `b` for `k * n` reads, and `out`
/// for `m * n` writes.
pub(crate) unsafe fn matmul_kernel<T: Element>(
    a: *const T,
    b: *const T,
    out: *mut T,
    m: usize,
    k: usize,
    n: usize,
) {
    for row in 0..m {
        for col in 0..n {
            let mut acc = 0.0f64;
            for x in 0..k {
                acc += (*a.add(row * k + x)).to_f64() * (*b.add(x * n + col)).to_f64();
            }
            *out.add(row * n + col) = T::from_f64(acc);
        }
    }
}

/// In-place parameter rescale, parallelized over parameter blocks.
///
/// For each element of block `m` belonging to group `g = node_ids[m]`:
///
/// ```text
/// denom = cum[g, k, b] + pseudocount
/// out   = denom == 0 ? 0 : (p + pseudocount / node_nchs[g]) / denom
/// ```
///
/// # Safety
///
/// `params` must be valid for `num_blocks * group_size * ch_group_size *
/// batch_size` read/writes and must not alias `cum`. `cum` must hold
/// `num_node_groups * group_size * batch_size` elements, `node_ids`
/// `num_blocks` in-range ids, and `node_nchs` `num_node_groups` counts.
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn normalize_params_kernel<T: Element>(
    params: *mut T,
    cum: *const T,
    node_ids: *const i64,
    node_nchs: *const f64,
    pseudocount: f64,
    num_blocks: usize,
    group_size: usize,
    ch_group_size: usize,
    batch_size: usize,
    num_node_groups: usize,
) {
    let block_len = group_size * ch_group_size * batch_size;
    let params = std::slice::from_raw_parts_mut(params, num_blocks * block_len);
    let cum = std::slice::from_raw_parts(cum, num_node_groups * group_size * batch_size);
    let node_ids = std::slice::from_raw_parts(node_ids, num_blocks);
    let node_nchs = std::slice::from_raw_parts(node_nchs, num_node_groups);

    let rescale = |(m, block): (usize, &mut [T])| {
        let g = node_ids[m] as usize;
        let nch = node_nchs[g];
        rescale_block(
            block,
            cum,
            g,
            group_size,
            ch_group_size,
            batch_size,
            pseudocount,
            nch,
        );
    };

    #[cfg(feature = "rayon")]
    params.par_chunks_mut(block_len).enumerate().for_each(rescale);

    #[cfg(not(feature = "rayon"))]
    params.chunks_mut(block_len).enumerate().for_each(rescale);
}

#[allow(clippy::too_many_arguments)]
fn rescale_block<T: Element>(
    block: &mut [T],
    cum: &[T],
    g: usize,
    group_size: usize,
    ch_group_size: usize,
    batch_size: usize,
    pseudocount: f64,
    nch: f64,
) {
    let offset = if pseudocount > 0.0 {
        pseudocount / nch
    } else {
        0.0
    };

    for k in 0..group_size {
        for b in 0..batch_size {
            let denom = cum[(g * group_size + k) * batch_size + b].to_f64() + pseudocount;
            for c in 0..ch_group_size {
                let idx = (k * ch_group_size + c) * batch_size + b;
                let value = if denom == 0.0 {
                    0.0
                } else {
                    (block[idx].to_f64() + offset) / denom
                };
                block[idx] = T::from_f64(value);
            }
        }
    }
}
