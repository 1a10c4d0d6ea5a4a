//! Single-axis reduction tests

mod common;

use common::{assert_allclose_f64, create_cpu_client};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spnr::error::Error;
use spnr::ops::ReduceOps;
use spnr::prelude::*;

#[test]
fn sum_over_middle_dim() {
    let (client, device) = create_cpu_client();
    let data: Vec<f64> = (0..2 * 3 * 4).map(|i| i as f64).collect();
    let a = Tensor::<CpuRuntime>::from_slice(&data, &[2, 3, 4], &device);

    let out = client.sum_dim(&a, 1, false).unwrap();
    assert_eq!(out.shape(), &[2, 4]);

    let mut expected = vec![0.0f64; 2 * 4];
    for i in 0..2 {
        for j in 0..3 {
            for k in 0..4 {
                expected[i * 4 + k] += data[(i * 3 + j) * 4 + k];
            }
        }
    }
    assert_allclose_f64(&out.to_vec::<f64>(), &expected, 1e-12, 0.0, "middle dim sum");
}

#[test]
fn sum_over_last_dim_keepdim() {
    let (client, device) = create_cpu_client();
    let a = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3], &device);

    let out = client.sum_dim(&a, 1, true).unwrap();
    assert_eq!(out.shape(), &[2, 1]);
    assert_allclose_f64(&out.to_vec::<f64>(), &[6.0, 15.0], 1e-12, 0.0, "keepdim sum");

    let flat = client.sum_dim(&a, 1, false).unwrap();
    assert_eq!(flat.shape(), &[2]);
    assert_eq!(flat.to_vec::<f64>(), out.to_vec::<f64>());
}

#[test]
fn sum_integer_dtype() {
    let (client, device) = create_cpu_client();
    let a = Tensor::<CpuRuntime>::from_slice(&[1i32, -2, 3, 10, 20, 30], &[2, 3], &device);

    let out = client.sum_dim(&a, 1, false).unwrap();
    assert_eq!(out.dtype(), DType::I32);
    assert_eq!(out.to_vec::<i32>(), vec![2i32, 60]);
}

#[test]
fn logsumexp_matches_naive_on_small_values() {
    let (client, device) = create_cpu_client();
    let mut rng = StdRng::seed_from_u64(31);
    let data: Vec<f64> = (0..3 * 5).map(|_| rng.gen_range(-2.0..2.0)).collect();
    let a = Tensor::<CpuRuntime>::from_slice(&data, &[3, 5], &device);

    let out = client.logsumexp_dim(&a, 1, false).unwrap();

    let expected: Vec<f64> = (0..3)
        .map(|i| data[i * 5..(i + 1) * 5].iter().map(|x| x.exp()).sum::<f64>().ln())
        .collect();
    assert_allclose_f64(&out.to_vec::<f64>(), &expected, 1e-12, 1e-12, "logsumexp");
}

#[test]
fn logsumexp_is_stable_for_large_values() {
    let (client, device) = create_cpu_client();
    let a = Tensor::<CpuRuntime>::from_slice(&[1000.0f64, 1001.0], &[1, 2], &device);

    let out = client.logsumexp_dim(&a, 1, false).unwrap();
    let expected = 1001.0 + (1.0 + (-1.0f64).exp()).ln();
    assert_allclose_f64(&out.to_vec::<f64>(), &[expected], 1e-12, 0.0, "large values");
}

#[test]
fn logsumexp_of_all_neg_infinity() {
    let (client, device) = create_cpu_client();
    let a = Tensor::<CpuRuntime>::from_slice(
        &[f64::NEG_INFINITY, f64::NEG_INFINITY, 0.0, f64::NEG_INFINITY],
        &[2, 2],
        &device,
    );

    let out = client.logsumexp_dim(&a, 1, false).unwrap();
    let vals = out.to_vec::<f64>();
    assert_eq!(vals[0], f64::NEG_INFINITY);
    assert_allclose_f64(&vals[1..], &[0.0], 1e-12, 1e-12, "mixed column");
}

#[test]
fn logsumexp_rejects_integer_dtype() {
    let (client, device) = create_cpu_client();
    let a = Tensor::<CpuRuntime>::from_slice(&[1i64, 2, 3, 4], &[2, 2], &device);

    let err = client.logsumexp_dim(&a, 1, false).unwrap_err();
    assert!(matches!(err, Error::UnsupportedDType { .. }), "{:?}", err);
}

#[test]
fn rejects_invalid_dim() {
    let (client, device) = create_cpu_client();
    let a = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2], &device);

    let err = client.sum_dim(&a, 2, false).unwrap_err();
    assert!(matches!(err, Error::InvalidDimension { .. }), "{:?}", err);
}

#[test]
fn sum_of_transposed_view() {
    let (client, device) = create_cpu_client();
    let a = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3], &device);
    let t = a.transpose(0, 1).unwrap();

    let out = client.sum_dim(&t, 1, false).unwrap();
    assert_eq!(out.shape(), &[3]);
    assert_allclose_f64(&out.to_vec::<f64>(), &[5.0, 7.0, 9.0], 1e-12, 0.0, "view sum");
}

#[cfg(feature = "cuda")]
#[test]
fn cuda_reductions_match_cpu() {
    use common::create_cuda_client;

    let Some((gpu_client, gpu_device)) = create_cuda_client() else {
        return;
    };
    let (cpu_client, cpu_device) = create_cpu_client();

    let mut rng = StdRng::seed_from_u64(61);
    let data: Vec<f32> = (0..4 * 3 * 2).map(|_| rng.gen_range(-3.0..3.0)).collect();

    let cpu_a = Tensor::<CpuRuntime>::from_slice(&data, &[4, 3, 2], &cpu_device);
    let gpu_a = Tensor::<CudaRuntime>::from_slice(&data, &[4, 3, 2], &gpu_device);

    let cpu_sum = cpu_client.sum_dim(&cpu_a, 1, false).unwrap();
    let gpu_sum = gpu_client.sum_dim(&gpu_a, 1, false).unwrap();
    common::assert_allclose_f32(
        &gpu_sum.to_vec::<f32>(),
        &cpu_sum.to_vec::<f32>(),
        1e-5,
        1e-6,
        "cuda sum",
    );

    let cpu_lse = cpu_client.logsumexp_dim(&cpu_a, 2, false).unwrap();
    let gpu_lse = gpu_client.logsumexp_dim(&gpu_a, 2, false).unwrap();
    common::assert_allclose_f32(
        &gpu_lse.to_vec::<f32>(),
        &cpu_lse.to_vec::<f32>(),
        1e-5,
        1e-6,
        "cuda logsumexp",
    );
}
