//! CUDA client: context, stream, and allocator for one device

use super::device::CudaDevice;
use super::runtime::CudaRuntime;
use crate::error::Result;
use crate::runtime::{Allocator, RuntimeClient};
use cudarc::driver::{sys, CudaContext, CudaStream};
use std::sync::Arc;

/// Stream-ordered allocator for a CUDA device
#[derive(Clone)]
pub struct CudaAllocator {
    stream: Arc<CudaStream>,
}

impl Allocator for CudaAllocator {
    fn allocate(&self, size: usize) -> u64 {
        let mut dptr: sys::CUdeviceptr = 0;
        let res = unsafe { sys::cuMemAllocAsync(&mut dptr, size.max(1), self.stream.cu_stream()) };
        if res != sys::CUresult::CUDA_SUCCESS {
            panic!("CUDA allocation of {} bytes failed: {:?}", size, res);
        }
        dptr as u64
    }

    fn deallocate(&self, ptr: u64, _size: usize) {
        if ptr == 0 {
            return;
        }
        // Skip the free when the process is tearing the context down
        if !unsafe { super::cache::is_cuda_context_valid() } {
            return;
        }
        let res =
            unsafe { sys::cuMemFreeAsync(ptr as sys::CUdeviceptr, self.stream.cu_stream()) };
        if res != sys::CUresult::CUDA_SUCCESS
            && res != sys::CUresult::CUDA_ERROR_ILLEGAL_ADDRESS
        {
            eprintln!("[spnr::cuda] cuMemFreeAsync failed: {:?}", res);
        }
    }
}

/// Client for running operations on one CUDA device
#[derive(Clone)]
pub struct CudaClient {
    device: CudaDevice,
    context: Arc<CudaContext>,
    stream: Arc<CudaStream>,
    allocator: CudaAllocator,
}

impl CudaClient {
    /// Create a client, binding the device context to this thread
    pub fn new(device: CudaDevice) -> Result<Self> {
        let context = CudaContext::new(device.index)?;
        context.bind_to_thread()?;
        let stream = context.new_stream()?;
        let allocator = CudaAllocator {
            stream: stream.clone(),
        };

        Ok(Self {
            device,
            context,
            stream,
            allocator,
        })
    }

    /// The stream all work for this client is ordered on
    pub fn stream(&self) -> &Arc<CudaStream> {
        &self.stream
    }

    /// The driver context of this client's device
    pub fn context(&self) -> &Arc<CudaContext> {
        &self.context
    }
}

impl RuntimeClient<CudaRuntime> for CudaClient {
    fn device(&self) -> &CudaDevice {
        &self.device
    }

    fn synchronize(&self) {
        if let Err(e) = self.stream.synchronize() {
            eprintln!("[spnr::cuda] stream synchronize failed: {:?}", e);
        }
    }

    fn allocator(&self) -> &CudaAllocator {
        &self.allocator
    }
}
