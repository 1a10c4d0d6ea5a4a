//! CUDA matrix multiplication (host fallback)

use crate::error::Result;
use crate::ops::traits::MatmulOps;
use crate::runtime::cuda::{CudaClient, CudaRuntime};
use crate::runtime::fallback::matmul_fallback;
use crate::runtime::RuntimeClient;
use crate::tensor::Tensor;

impl MatmulOps<CudaRuntime> for CudaClient {
    /// No native GEMM kernel: a probe/reference primitive, not a hot path.
    fn matmul(
        &self,
        a: &Tensor<CudaRuntime>,
        b: &Tensor<CudaRuntime>,
    ) -> Result<Tensor<CudaRuntime>> {
        matmul_fallback(a, b, self.device())
    }
}
