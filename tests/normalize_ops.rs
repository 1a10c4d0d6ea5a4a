//! Parameter normalization tests

mod common;

use common::{assert_allclose_f32, assert_allclose_f64, create_cpu_client};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spnr::error::Error;
use spnr::ops::NormalizeOps;
use spnr::prelude::*;

/// Per-(group, position) totals over all blocks and channels of a group
fn column_sums(
    out: &[f64],
    ids: &[i64],
    num_groups: usize,
    group_size: usize,
    ch_group_size: usize,
) -> Vec<f64> {
    let mut sums = vec![0.0f64; num_groups * group_size];
    let block_len = group_size * ch_group_size;
    for (m, &g) in ids.iter().enumerate() {
        for k in 0..group_size {
            for c in 0..ch_group_size {
                sums[g as usize * group_size + k] += out[m * block_len + k * ch_group_size + c];
            }
        }
    }
    sums
}

#[test]
fn uniform_block_normalizes_to_uniform() {
    let (client, device) = create_cpu_client();
    let mut params = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 1.0, 1.0, 1.0], &[2, 1, 2], &device);
    let node_ids = Tensor::<CpuRuntime>::from_slice(&[0i64, 0], &[2], &device);

    client
        .normalize_parameters(&mut params, &node_ids, 1, 2, None, 0.0)
        .unwrap();

    assert_allclose_f64(
        &params.to_vec::<f64>(),
        &[0.25; 4],
        1e-12,
        0.0,
        "uniform normalization",
    );
}

#[test]
fn columns_sum_to_one_without_smoothing() {
    let (client, device) = create_cpu_client();
    let mut rng = StdRng::seed_from_u64(42);
    let data: Vec<f64> = (0..6 * 2 * 3).map(|_| rng.gen_range(0.1..1.0)).collect();
    let ids = [0i64, 0, 1, 1, 2, 2];

    let mut params = Tensor::<CpuRuntime>::from_slice(&data, &[6, 2, 3], &device);
    let node_ids = Tensor::<CpuRuntime>::from_slice(&ids, &[6], &device);

    client
        .normalize_parameters(&mut params, &node_ids, 2, 3, None, 0.0)
        .unwrap();

    let sums = column_sums(&params.to_vec::<f64>(), &ids, 3, 2, 3);
    assert_allclose_f64(&sums, &[1.0; 6], 1e-12, 1e-12, "column sums");
}

#[test]
fn columns_sum_to_one_with_smoothing() {
    let (client, device) = create_cpu_client();
    let mut rng = StdRng::seed_from_u64(7);
    let data: Vec<f64> = (0..6 * 2 * 3).map(|_| rng.gen_range(0.0..1.0)).collect();
    let ids = [0i64, 1, 1, 2, 2, 2];

    let mut params = Tensor::<CpuRuntime>::from_slice(&data, &[6, 2, 3], &device);
    let node_ids = Tensor::<CpuRuntime>::from_slice(&ids, &[6], &device);

    client
        .normalize_parameters(&mut params, &node_ids, 2, 3, None, 0.7)
        .unwrap();

    let sums = column_sums(&params.to_vec::<f64>(), &ids, 3, 2, 3);
    assert_allclose_f64(&sums, &[1.0; 6], 1e-12, 1e-12, "smoothed column sums");
}

#[test]
fn derived_counts_match_explicit() {
    let (client, device) = create_cpu_client();
    let mut rng = StdRng::seed_from_u64(3);
    let data: Vec<f64> = (0..4 * 1 * 2).map(|_| rng.gen_range(0.1..2.0)).collect();
    let ids = [0i64, 0, 1, 0];

    let mut derived = Tensor::<CpuRuntime>::from_slice(&data, &[4, 1, 2], &device);
    let mut explicit = Tensor::<CpuRuntime>::from_slice(&data, &[4, 1, 2], &device);
    let node_ids = Tensor::<CpuRuntime>::from_slice(&ids, &[4], &device);
    // Three blocks of group 0, one of group 1, two channels each
    let nchs = Tensor::<CpuRuntime>::from_slice(&[6i64, 2], &[2], &device);

    client
        .normalize_parameters(&mut derived, &node_ids, 1, 2, None, 0.5)
        .unwrap();
    client
        .normalize_parameters(&mut explicit, &node_ids, 1, 2, Some(&nchs), 0.5)
        .unwrap();

    assert_allclose_f64(
        &derived.to_vec::<f64>(),
        &explicit.to_vec::<f64>(),
        1e-12,
        0.0,
        "derived vs explicit child counts",
    );
}

#[test]
fn all_zero_group_stays_zero() {
    let (client, device) = create_cpu_client();
    let mut params =
        Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 0.0, 0.0], &[2, 1, 2], &device);
    let node_ids = Tensor::<CpuRuntime>::from_slice(&[0i64, 1], &[2], &device);

    client
        .normalize_parameters(&mut params, &node_ids, 1, 2, None, 0.0)
        .unwrap();

    let out = params.to_vec::<f64>();
    assert!(out.iter().all(|v| v.is_finite()), "no NaN or Inf: {:?}", out);
    assert_allclose_f64(
        &out,
        &[1.0 / 3.0, 2.0 / 3.0, 0.0, 0.0],
        1e-12,
        0.0,
        "degenerate group",
    );
}

#[test]
fn idempotent_without_smoothing() {
    let (client, device) = create_cpu_client();
    let mut rng = StdRng::seed_from_u64(11);
    let data: Vec<f64> = (0..5 * 2 * 2).map(|_| rng.gen_range(0.1..3.0)).collect();
    let ids = [0i64, 0, 0, 1, 1];

    let mut params = Tensor::<CpuRuntime>::from_slice(&data, &[5, 2, 2], &device);
    let node_ids = Tensor::<CpuRuntime>::from_slice(&ids, &[5], &device);

    client
        .normalize_parameters(&mut params, &node_ids, 2, 2, None, 0.0)
        .unwrap();
    let once = params.to_vec::<f64>();

    client
        .normalize_parameters(&mut params, &node_ids, 2, 2, None, 0.0)
        .unwrap();
    let twice = params.to_vec::<f64>();

    assert_allclose_f64(&twice, &once, 1e-12, 1e-12, "idempotence");
}

#[test]
fn scale_invariant_without_smoothing() {
    let (client, device) = create_cpu_client();
    let mut rng = StdRng::seed_from_u64(23);
    let data: Vec<f64> = (0..4 * 1 * 3).map(|_| rng.gen_range(0.1..1.0)).collect();
    let scaled: Vec<f64> = data.iter().map(|&v| 7.0 * v).collect();
    let ids = [0i64, 0, 1, 1];

    let mut a = Tensor::<CpuRuntime>::from_slice(&data, &[4, 1, 3], &device);
    let mut b = Tensor::<CpuRuntime>::from_slice(&scaled, &[4, 1, 3], &device);
    let node_ids = Tensor::<CpuRuntime>::from_slice(&ids, &[4], &device);

    client
        .normalize_parameters(&mut a, &node_ids, 1, 3, None, 0.0)
        .unwrap();
    client
        .normalize_parameters(&mut b, &node_ids, 1, 3, None, 0.0)
        .unwrap();

    assert_allclose_f64(
        &b.to_vec::<f64>(),
        &a.to_vec::<f64>(),
        1e-12,
        1e-12,
        "scale invariance",
    );
}

#[test]
fn smoothing_redistributes_to_zero_blocks() {
    let (client, device) = create_cpu_client();
    // Group total 4, pseudocount 1, four children: offset 0.25, denom 5
    let mut params =
        Tensor::<CpuRuntime>::from_slice(&[3.0f64, 1.0, 0.0, 0.0], &[2, 1, 2], &device);
    let node_ids = Tensor::<CpuRuntime>::from_slice(&[0i64, 0], &[2], &device);

    client
        .normalize_parameters(&mut params, &node_ids, 1, 2, None, 1.0)
        .unwrap();

    let out = params.to_vec::<f64>();
    assert_allclose_f64(&out, &[0.65, 0.25, 0.05, 0.05], 1e-12, 0.0, "smoothing");
    assert!((out.iter().sum::<f64>() - 1.0).abs() < 1e-12);
}

#[test]
fn smoothing_with_explicit_counts() {
    let (client, device) = create_cpu_client();
    let mut params =
        Tensor::<CpuRuntime>::from_slice(&[3.0f64, 1.0, 0.0, 0.0], &[2, 1, 2], &device);
    let node_ids = Tensor::<CpuRuntime>::from_slice(&[0i64, 0], &[2], &device);
    let nchs = Tensor::<CpuRuntime>::from_slice(&[4i64], &[1], &device);

    client
        .normalize_parameters(&mut params, &node_ids, 1, 2, Some(&nchs), 1.0)
        .unwrap();

    assert_allclose_f64(
        &params.to_vec::<f64>(),
        &[0.65, 0.25, 0.05, 0.05],
        1e-12,
        0.0,
        "explicit counts",
    );
}

#[test]
fn groups_normalize_independently() {
    let (client, device) = create_cpu_client();
    let mut params = Tensor::<CpuRuntime>::from_slice(
        &[1.0f64, 1.0, 2.0, 2.0, 3.0, 1.0],
        &[3, 1, 2],
        &device,
    );
    let node_ids = Tensor::<CpuRuntime>::from_slice(&[0i64, 0, 1], &[3], &device);

    client
        .normalize_parameters(&mut params, &node_ids, 1, 2, None, 0.0)
        .unwrap();

    assert_allclose_f64(
        &params.to_vec::<f64>(),
        &[1.0 / 6.0, 1.0 / 6.0, 2.0 / 6.0, 2.0 / 6.0, 0.75, 0.25],
        1e-12,
        0.0,
        "independent groups",
    );
}

#[test]
fn f32_parameters_normalize() {
    let (client, device) = create_cpu_client();
    let mut params =
        Tensor::<CpuRuntime>::from_slice(&[2.0f32, 6.0, 1.0, 1.0], &[2, 1, 2], &device);
    let node_ids = Tensor::<CpuRuntime>::from_slice(&[0i64, 0], &[2], &device);

    client
        .normalize_parameters(&mut params, &node_ids, 1, 2, None, 0.0)
        .unwrap();

    assert_allclose_f32(
        &params.to_vec::<f32>(),
        &[0.2, 0.6, 0.1, 0.1],
        1e-6,
        0.0,
        "f32 path",
    );
}

#[test]
fn rejects_wrong_group_dims() {
    let (client, device) = create_cpu_client();
    let mut params = Tensor::<CpuRuntime>::from_slice(&[1.0f64; 4], &[2, 1, 2], &device);
    let node_ids = Tensor::<CpuRuntime>::from_slice(&[0i64, 0], &[2], &device);

    let err = client
        .normalize_parameters(&mut params, &node_ids, 2, 2, None, 0.0)
        .unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { .. }), "{:?}", err);
}

#[test]
fn rejects_wrong_rank() {
    let (client, device) = create_cpu_client();
    let mut params = Tensor::<CpuRuntime>::from_slice(&[1.0f64; 4], &[2, 2], &device);
    let node_ids = Tensor::<CpuRuntime>::from_slice(&[0i64, 0], &[2], &device);

    let err = client
        .normalize_parameters(&mut params, &node_ids, 2, 2, None, 0.0)
        .unwrap_err();
    assert!(
        matches!(err, Error::InvalidArgument { arg: "params", .. }),
        "{:?}",
        err
    );
}

#[test]
fn rejects_node_ids_length_mismatch() {
    let (client, device) = create_cpu_client();
    let mut params = Tensor::<CpuRuntime>::from_slice(&[1.0f64; 4], &[2, 1, 2], &device);
    let node_ids = Tensor::<CpuRuntime>::from_slice(&[0i64, 0, 1], &[3], &device);

    let err = client
        .normalize_parameters(&mut params, &node_ids, 1, 2, None, 0.0)
        .unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { .. }), "{:?}", err);
}

#[test]
fn rejects_negative_pseudocount_and_ids() {
    let (client, device) = create_cpu_client();
    let mut params = Tensor::<CpuRuntime>::from_slice(&[1.0f64; 4], &[2, 1, 2], &device);
    let node_ids = Tensor::<CpuRuntime>::from_slice(&[0i64, 0], &[2], &device);

    let err = client
        .normalize_parameters(&mut params, &node_ids, 1, 2, None, -0.5)
        .unwrap_err();
    assert!(
        matches!(err, Error::InvalidArgument { arg: "pseudocount", .. }),
        "{:?}",
        err
    );

    let bad_ids = Tensor::<CpuRuntime>::from_slice(&[0i64, -3], &[2], &device);
    let err = client
        .normalize_parameters(&mut params, &bad_ids, 1, 2, None, 0.0)
        .unwrap_err();
    assert!(
        matches!(err, Error::InvalidArgument { arg: "node_ids", .. }),
        "{:?}",
        err
    );
}

#[test]
fn rejects_batched_input_on_host() {
    let (client, device) = create_cpu_client();
    let mut params = Tensor::<CpuRuntime>::from_slice(&[1.0f64; 12], &[2, 1, 2, 3], &device);
    let node_ids = Tensor::<CpuRuntime>::from_slice(&[0i64, 0], &[2], &device);

    let err = client
        .normalize_parameters(&mut params, &node_ids, 1, 2, None, 0.0)
        .unwrap_err();
    match err {
        Error::BackendLimitation {
            backend, operation, ..
        } => {
            assert_eq!(backend, "cpu");
            assert_eq!(operation, "normalize_parameters");
        }
        other => panic!("expected BackendLimitation, got {:?}", other),
    }
}

#[test]
fn rejects_non_contiguous_params() {
    let (client, device) = create_cpu_client();
    let base = Tensor::<CpuRuntime>::from_slice(&[1.0f64; 8], &[2, 2, 2], &device);
    let mut view = base.transpose(1, 2).unwrap();
    let node_ids = Tensor::<CpuRuntime>::from_slice(&[0i64, 0], &[2], &device);

    let err = client
        .normalize_parameters(&mut view, &node_ids, 2, 2, None, 0.0)
        .unwrap_err();
    assert!(matches!(err, Error::NotContiguous), "{:?}", err);
}

#[test]
fn rejects_integer_params_and_float_ids() {
    let (client, device) = create_cpu_client();
    let mut int_params = Tensor::<CpuRuntime>::from_slice(&[1i64; 4], &[2, 1, 2], &device);
    let node_ids = Tensor::<CpuRuntime>::from_slice(&[0i64, 0], &[2], &device);
    let err = client
        .normalize_parameters(&mut int_params, &node_ids, 1, 2, None, 0.0)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedDType { .. }), "{:?}", err);

    let mut params = Tensor::<CpuRuntime>::from_slice(&[1.0f64; 4], &[2, 1, 2], &device);
    let float_ids = Tensor::<CpuRuntime>::from_slice(&[0.0f32, 0.0], &[2], &device);
    let err = client
        .normalize_parameters(&mut params, &float_ids, 1, 2, None, 0.0)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedDType { .. }), "{:?}", err);
}

#[test]
fn failed_call_leaves_params_unchanged() {
    let (client, device) = create_cpu_client();
    let data = [3.0f64, 1.0, 2.0, 4.0];
    let mut params = Tensor::<CpuRuntime>::from_slice(&data, &[2, 1, 2], &device);
    let bad_ids = Tensor::<CpuRuntime>::from_slice(&[0i64, 0, 1], &[3], &device);

    let err = client
        .normalize_parameters(&mut params, &bad_ids, 1, 2, None, 0.0)
        .unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { .. }));
    assert_eq!(params.to_vec::<f64>(), data.to_vec());
}

#[cfg(feature = "cuda")]
#[test]
fn cuda_matches_cpu() {
    use common::create_cuda_client;

    let Some((gpu_client, gpu_device)) = create_cuda_client() else {
        return;
    };
    let (cpu_client, cpu_device) = create_cpu_client();

    let mut rng = StdRng::seed_from_u64(99);
    let data: Vec<f32> = (0..6 * 2 * 3).map(|_| rng.gen_range(0.0..1.0)).collect();
    let ids = [0i64, 1, 1, 0, 2, 2];

    let mut cpu_params = Tensor::<CpuRuntime>::from_slice(&data, &[6, 2, 3], &cpu_device);
    let cpu_ids = Tensor::<CpuRuntime>::from_slice(&ids, &[6], &cpu_device);
    cpu_client
        .normalize_parameters(&mut cpu_params, &cpu_ids, 2, 3, None, 0.3)
        .unwrap();

    let mut gpu_params = Tensor::<CudaRuntime>::from_slice(&data, &[6, 2, 3], &gpu_device);
    let gpu_ids = Tensor::<CudaRuntime>::from_slice(&ids, &[6], &gpu_device);
    gpu_client
        .normalize_parameters(&mut gpu_params, &gpu_ids, 2, 3, None, 0.3)
        .unwrap();

    assert_allclose_f32(
        &gpu_params.to_vec::<f32>(),
        &cpu_params.to_vec::<f32>(),
        1e-5,
        1e-6,
        "cpu/cuda parity",
    );
}

#[cfg(feature = "cuda")]
#[test]
fn cuda_batched_columns_sum_to_one() {
    use common::create_cuda_client;

    let Some((client, device)) = create_cuda_client() else {
        return;
    };

    let mut rng = StdRng::seed_from_u64(5);
    let (m, k, c, b) = (4usize, 2usize, 2usize, 3usize);
    let data: Vec<f64> = (0..m * k * c * b).map(|_| rng.gen_range(0.1..1.0)).collect();
    let ids = [0i64, 0, 1, 1];

    let mut params = Tensor::<CudaRuntime>::from_slice(&data, &[m, k, c, b], &device);
    let node_ids = Tensor::<CudaRuntime>::from_slice(&ids, &[4], &device);
    client
        .normalize_parameters(&mut params, &node_ids, k, c, None, 0.2)
        .unwrap();

    let out = params.to_vec::<f64>();
    for g in 0..2 {
        for kk in 0..k {
            for bb in 0..b {
                let mut sum = 0.0;
                for (mm, &id) in ids.iter().enumerate() {
                    if id as usize != g {
                        continue;
                    }
                    for cc in 0..c {
                        sum += out[((mm * k + kk) * c + cc) * b + bb];
                    }
                }
                assert!(
                    (sum - 1.0).abs() < 1e-9,
                    "column ({}, {}, {}) sums to {}",
                    g,
                    kk,
                    bb,
                    sum
                );
            }
        }
    }
}
