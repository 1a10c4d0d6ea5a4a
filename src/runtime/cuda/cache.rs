//! Per-device CUDA client cache

use super::client::CudaClient;
use super::device::CudaDevice;
use cudarc::driver::sys;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

static CLIENT_CACHE: OnceLock<Mutex<HashMap<usize, CudaClient>>> = OnceLock::new();

fn lock_client_cache() -> MutexGuard<'static, HashMap<usize, CudaClient>> {
    CLIENT_CACHE
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Get the cached client for a device, creating it on first use
pub(crate) fn get_or_create_client(device: &CudaDevice) -> CudaClient {
    let mut cache = lock_client_cache();
    if let Some(client) = cache.get(&device.index) {
        return client.clone();
    }

    let client = CudaClient::new(device.clone())
        .unwrap_or_else(|e| panic!("failed to create CUDA client for {:?}: {}", device, e));
    cache.insert(device.index, client.clone());
    client
}

/// Drop the cached client for a device and build a fresh one.
///
/// Used as a last resort when allocations keep failing on the old stream.
pub(crate) fn reset_client(device: &CudaDevice) -> Option<CudaClient> {
    let mut cache = lock_client_cache();
    cache.remove(&device.index);
    match CudaClient::new(device.clone()) {
        Ok(client) => {
            cache.insert(device.index, client.clone());
            Some(client)
        }
        Err(_) => None,
    }
}

/// Raw stream of the cached client, if one exists.
///
/// Deallocation uses this to avoid creating a client during teardown.
pub(crate) fn try_get_cached_stream(device_index: usize) -> Option<sys::CUstream> {
    let cache = lock_client_cache();
    cache.get(&device_index).map(|c| c.stream().cu_stream())
}

/// Whether the calling thread still has a live CUDA context.
///
/// # Safety
///
/// Calls into the driver; the driver library must be loaded.
pub(crate) unsafe fn is_cuda_context_valid() -> bool {
    let mut ctx: sys::CUcontext = std::ptr::null_mut();
    sys::cuCtxGetCurrent(&mut ctx) == sys::CUresult::CUDA_SUCCESS && !ctx.is_null()
}

#[cold]
pub(crate) fn log_cuda_memory_error(size: usize, detail: &str) {
    eprintln!(
        "[spnr::cuda] failed to allocate {} bytes of device memory: {}",
        size, detail
    );
}
