//! Shared test helpers

#![allow(dead_code)]

use spnr::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use spnr::runtime::Runtime;

/// Create a CPU client and device for testing
pub fn create_cpu_client() -> (CpuClient, CpuDevice) {
    let device = CpuRuntime::default_device();
    let client = CpuRuntime::default_client(&device);
    (client, device)
}

/// Assert two f64 slices are element-wise close: |x - y| <= atol + rtol * |y|
pub fn assert_allclose_f64(actual: &[f64], expected: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{}: length mismatch ({} vs {})",
        msg,
        actual.len(),
        expected.len()
    );
    for (i, (&x, &y)) in actual.iter().zip(expected.iter()).enumerate() {
        if x.is_infinite() || y.is_infinite() {
            assert!(
                x == y,
                "{}: element {} differs: {} vs {}",
                msg,
                i,
                x,
                y
            );
            continue;
        }
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff {:e}, tol {:e})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Assert two f32 slices are element-wise close
pub fn assert_allclose_f32(actual: &[f32], expected: &[f32], rtol: f32, atol: f32, msg: &str) {
    let actual: Vec<f64> = actual.iter().map(|&x| x as f64).collect();
    let expected: Vec<f64> = expected.iter().map(|&x| x as f64).collect();
    assert_allclose_f64(&actual, &expected, rtol as f64, atol as f64, msg);
}

/// Create a CUDA client if a device is present, otherwise None
#[cfg(feature = "cuda")]
pub fn create_cuda_client() -> Option<(
    spnr::runtime::cuda::CudaClient,
    spnr::runtime::cuda::CudaDevice,
)> {
    use spnr::runtime::cuda::{is_cuda_available, CudaClient, CudaDevice};

    if !is_cuda_available() {
        return None;
    }
    let device = CudaDevice::new(0);
    let client = std::panic::catch_unwind(|| CudaClient::new(device.clone()))
        .ok()?
        .ok()?;
    Some((client, device))
}
