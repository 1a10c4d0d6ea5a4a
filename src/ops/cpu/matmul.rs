//! CPU matrix multiplication

use crate::dispatch_dtype;
use crate::error::{shape_mismatch, Error, Result};
use crate::ops::traits::MatmulOps;
use crate::runtime::cpu::{kernels, CpuClient, CpuRuntime};
use crate::runtime::{Device, RuntimeClient};
use crate::tensor::Tensor;

impl MatmulOps<CpuRuntime> for CpuClient {
    fn matmul(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        if a.ndim() != 2 || b.ndim() != 2 {
            return Err(Error::InvalidArgument {
                arg: "a",
                reason: format!(
                    "matmul expects rank-2 operands, got rank {} and rank {}",
                    a.ndim(),
                    b.ndim()
                ),
            });
        }
        if a.dtype() != b.dtype() {
            return Err(Error::DTypeMismatch {
                lhs: a.dtype(),
                rhs: b.dtype(),
            });
        }
        if !a.device().is_same(b.device()) {
            return Err(Error::DeviceMismatch);
        }

        let (m, k) = (a.shape()[0], a.shape()[1]);
        let (k2, n) = (b.shape()[0], b.shape()[1]);
        if k != k2 {
            return Err(shape_mismatch(&[k, n], b.shape()));
        }

        let a = a.contiguous()?;
        let b = b.contiguous()?;
        let out = Tensor::try_empty(&[m, n], a.dtype(), self.device())?;

        dispatch_dtype!(a.dtype(), T => {
            unsafe {
                kernels::matmul_kernel::<T>(
                    a.storage().ptr() as *const T,
                    b.storage().ptr() as *const T,
                    out.storage().ptr() as *mut T,
                    m,
                    k,
                    n,
                );
            }
        });

        Ok(out)
    }
}
