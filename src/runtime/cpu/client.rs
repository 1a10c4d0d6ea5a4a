//! CPU client implementation

use super::device::CpuDevice;
use super::runtime::{host_layout, CpuRuntime};
use crate::runtime::{DefaultAllocator, RuntimeClient};
use std::alloc::{alloc_zeroed, dealloc};

/// Allocator used by the CPU client
pub type CpuAllocator = DefaultAllocator<CpuDevice>;

fn cpu_alloc(size: usize, _device: &CpuDevice) -> u64 {
    unsafe { alloc_zeroed(host_layout(size)) as u64 }
}

fn cpu_dealloc(ptr: u64, size: usize, _device: &CpuDevice) {
    if ptr != 0 {
        unsafe { dealloc(ptr as *mut u8, host_layout(size)) };
    }
}

/// Client for running operations on the host CPU
#[derive(Clone)]
pub struct CpuClient {
    device: CpuDevice,
    allocator: CpuAllocator,
}

impl CpuClient {
    /// Create a client for a CPU device
    pub fn new(device: CpuDevice) -> Self {
        let allocator = DefaultAllocator::new(device.clone(), cpu_alloc, cpu_dealloc);
        Self { device, allocator }
    }
}

impl RuntimeClient<CpuRuntime> for CpuClient {
    fn device(&self) -> &CpuDevice {
        &self.device
    }

    fn synchronize(&self) {
        // Host operations complete synchronously
    }

    fn allocator(&self) -> &CpuAllocator {
        &self.allocator
    }
}
