//! CPU runtime implementation

use super::{CpuClient, CpuDevice};
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use std::alloc::{alloc_zeroed, dealloc, Layout};

/// Alignment for host allocations. 64 bytes covers AVX-512 loads.
pub(super) const HOST_ALIGN: usize = 64;

pub(super) fn host_layout(size_bytes: usize) -> Layout {
    // Zero-size allocations get a one-byte layout so the handle is never null
    Layout::from_size_align(size_bytes.max(1), HOST_ALIGN)
        .expect("invalid host allocation layout")
}

/// CPU runtime marker type
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuRuntime;

impl Runtime for CpuRuntime {
    type Device = CpuDevice;
    type Client = CpuClient;
    type Allocator = super::client::CpuAllocator;

    fn name() -> &'static str {
        "cpu"
    }

    fn allocate(size_bytes: usize, _device: &Self::Device) -> Result<u64> {
        let ptr = unsafe { alloc_zeroed(host_layout(size_bytes)) };
        if ptr.is_null() {
            return Err(Error::OutOfMemory { size: size_bytes });
        }
        Ok(ptr as u64)
    }

    fn deallocate(ptr: u64, size_bytes: usize, _device: &Self::Device) {
        if ptr != 0 {
            unsafe { dealloc(ptr as *mut u8, host_layout(size_bytes)) };
        }
    }

    fn copy_to_device(src: &[u8], dst: u64, _device: &Self::Device) -> Result<()> {
        unsafe {
            std::ptr::copy_nonoverlapping(src.as_ptr(), dst as *mut u8, src.len());
        }
        Ok(())
    }

    fn copy_from_device(src: u64, dst: &mut [u8], _device: &Self::Device) -> Result<()> {
        unsafe {
            std::ptr::copy_nonoverlapping(src as *const u8, dst.as_mut_ptr(), dst.len());
        }
        Ok(())
    }

    fn copy_strided(
        src: u64,
        dst: u64,
        shape: &[usize],
        strides: &[isize],
        src_offset: usize,
        elem_size: usize,
        _device: &Self::Device,
    ) -> Result<()> {
        let numel: usize = shape.iter().product();
        if numel == 0 {
            return Ok(());
        }

        let ndim = shape.len();
        let src_ptr = src as *const u8;
        let dst_ptr = dst as *mut u8;
        let mut indices = vec![0usize; ndim];

        for i in 0..numel {
            let mut off = src_offset as isize;
            for d in 0..ndim {
                off += indices[d] as isize * strides[d];
            }
            unsafe {
                std::ptr::copy_nonoverlapping(
                    src_ptr.offset(off * elem_size as isize),
                    dst_ptr.add(i * elem_size),
                    elem_size,
                );
            }

            // Advance the row-major index vector
            for d in (0..ndim).rev() {
                indices[d] += 1;
                if indices[d] < shape[d] {
                    break;
                }
                indices[d] = 0;
            }
        }

        Ok(())
    }

    fn default_device() -> Self::Device {
        CpuDevice::new()
    }

    fn default_client(device: &Self::Device) -> Self::Client {
        CpuClient::new(device.clone())
    }
}
