//! PTX module loading and launch configuration

use crate::dtype::DType;
use crate::error::{unsupported_dtype, Error, Result};
use cudarc::driver::{CudaContext, CudaFunction, CudaModule, LaunchConfig};
use cudarc::nvrtc::Ptx;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Directory holding the PTX files produced by the build script
const KERNEL_DIR: &str = env!("CUDA_KERNEL_DIR");

/// Threads per block for elementwise launches
pub(crate) const BLOCK_SIZE: u32 = 256;

/// Module names, matching the `.cu` file stems
pub(crate) mod kernel_names {
    pub const REDUCE_MODULE: &str = "reduce";
    pub const NORMALIZE_MODULE: &str = "normalize";
    pub const STRIDED_COPY_MODULE: &str = "strided_copy";
}

static MODULE_CACHE: OnceLock<Mutex<HashMap<(usize, &'static str), Arc<CudaModule>>>> =
    OnceLock::new();

/// Load (or fetch from cache) a PTX module for a device
pub(crate) fn get_or_load_module(
    context: &Arc<CudaContext>,
    device_index: usize,
    module_name: &'static str,
) -> Result<Arc<CudaModule>> {
    let cache = MODULE_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(module) = cache.get(&(device_index, module_name)) {
        return Ok(module.clone());
    }

    let path = format!("{}/{}.ptx", KERNEL_DIR, module_name);
    let ptx = Ptx::from_file(&path);
    let module = context.load_module(ptx).map_err(|e| {
        Error::Backend(format!(
            "failed to load PTX module '{}' from {}: {:?}",
            module_name, path, e
        ))
    })?;

    cache.insert((device_index, module_name), module.clone());
    Ok(module)
}

/// Look up a kernel function inside a loaded module
pub(crate) fn get_kernel_function(module: &Arc<CudaModule>, kernel: &str) -> Result<CudaFunction> {
    module
        .load_function(kernel)
        .map_err(|e| Error::Backend(format!("CUDA kernel '{}' not found: {:?}", kernel, e)))
}

/// Dtype-suffixed kernel symbol, e.g. `sum_dim_f32`
pub(crate) fn kernel_name(base: &str, dtype: DType) -> Result<String> {
    let suffix = match dtype {
        DType::F32 => "f32",
        DType::F64 => "f64",
        other => return Err(unsupported_dtype(other, "cuda kernel")),
    };
    Ok(format!("{}_{}", base, suffix))
}

/// One thread per element, BLOCK_SIZE threads per block
pub(crate) fn elementwise_launch_config(numel: usize) -> LaunchConfig {
    let grid = ((numel as u32).div_ceil(BLOCK_SIZE)).max(1);
    LaunchConfig {
        grid_dim: (grid, 1, 1),
        block_dim: (BLOCK_SIZE, 1, 1),
        shared_mem_bytes: 0,
    }
}
