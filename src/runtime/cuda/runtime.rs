//! CUDA runtime implementation

use super::cache;
use super::client::{CudaAllocator, CudaClient};
use super::device::CudaDevice;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use cudarc::driver::sys;
use std::ffi::c_void;

/// CUDA runtime marker type
#[derive(Clone, Copy, Debug, Default)]
pub struct CudaRuntime;

impl Runtime for CudaRuntime {
    type Device = CudaDevice;
    type Client = CudaClient;
    type Allocator = CudaAllocator;

    fn name() -> &'static str {
        "cuda"
    }

    fn allocate(size_bytes: usize, device: &Self::Device) -> Result<u64> {
        let client = cache::get_or_create_client(device);
        let size = size_bytes.max(1);
        let mut dptr: sys::CUdeviceptr = 0;

        let res = unsafe { sys::cuMemAllocAsync(&mut dptr, size, client.stream().cu_stream()) };
        if res == sys::CUresult::CUDA_SUCCESS {
            return Ok(dptr as u64);
        }

        // Under allocation pressure, pending stream-ordered frees may not
        // have landed yet. Drain the stream and retry once.
        let _ = client.stream().synchronize();
        let res = unsafe { sys::cuMemAllocAsync(&mut dptr, size, client.stream().cu_stream()) };
        if res == sys::CUresult::CUDA_SUCCESS {
            return Ok(dptr as u64);
        }

        // Last resort: the stream may be poisoned by an earlier fault.
        if let Some(fresh) = cache::reset_client(device) {
            let res =
                unsafe { sys::cuMemAllocAsync(&mut dptr, size, fresh.stream().cu_stream()) };
            if res == sys::CUresult::CUDA_SUCCESS {
                return Ok(dptr as u64);
            }
        }

        cache::log_cuda_memory_error(size_bytes, &format!("{:?}", res));
        Err(Error::OutOfMemory { size: size_bytes })
    }

    fn deallocate(ptr: u64, _size_bytes: usize, device: &Self::Device) {
        if ptr == 0 {
            return;
        }
        // During process teardown the context may already be destroyed
        if !unsafe { cache::is_cuda_context_valid() } {
            return;
        }

        match cache::try_get_cached_stream(device.index) {
            Some(stream) => {
                let res = unsafe { sys::cuMemFreeAsync(ptr as sys::CUdeviceptr, stream) };
                if res != sys::CUresult::CUDA_SUCCESS
                    && res != sys::CUresult::CUDA_ERROR_ILLEGAL_ADDRESS
                {
                    eprintln!("[spnr::cuda] cuMemFreeAsync failed: {:?}", res);
                }
            }
            None => {
                // No live client: fall back to a synchronous free
                let _ = unsafe { sys::cuMemFree_v2(ptr as sys::CUdeviceptr) };
            }
        }
    }

    fn copy_to_device(src: &[u8], dst: u64, device: &Self::Device) -> Result<()> {
        let client = cache::get_or_create_client(device);
        let res = unsafe {
            sys::cuMemcpyHtoDAsync_v2(
                dst as sys::CUdeviceptr,
                src.as_ptr() as *const c_void,
                src.len(),
                client.stream().cu_stream(),
            )
        };
        if res != sys::CUresult::CUDA_SUCCESS {
            return Err(Error::Backend(format!(
                "CUDA host-to-device copy failed: {:?}",
                res
            )));
        }
        client.stream().synchronize()?;
        Ok(())
    }

    fn copy_from_device(src: u64, dst: &mut [u8], device: &Self::Device) -> Result<()> {
        let client = cache::get_or_create_client(device);
        let res = unsafe {
            sys::cuMemcpyDtoHAsync_v2(
                dst.as_mut_ptr() as *mut c_void,
                src as sys::CUdeviceptr,
                dst.len(),
                client.stream().cu_stream(),
            )
        };
        if res != sys::CUresult::CUDA_SUCCESS {
            return Err(Error::Backend(format!(
                "CUDA device-to-host copy failed: {:?}",
                res
            )));
        }
        client.stream().synchronize()?;
        Ok(())
    }

    fn copy_strided(
        src: u64,
        dst: u64,
        shape: &[usize],
        strides: &[isize],
        src_offset: usize,
        elem_size: usize,
        device: &Self::Device,
    ) -> Result<()> {
        let numel: usize = shape.iter().product();
        if numel == 0 {
            return Ok(());
        }

        let client = cache::get_or_create_client(device);

        // Stage shape and strides in device memory for the gather kernel
        let shape_u64: Vec<u64> = shape.iter().map(|&s| s as u64).collect();
        let strides_i64: Vec<i64> = strides.iter().map(|&s| s as i64).collect();
        let shape_bytes: &[u8] = bytemuck::cast_slice(&shape_u64);
        let strides_bytes: &[u8] = bytemuck::cast_slice(&strides_i64);

        let shape_dev = Self::allocate(shape_bytes.len(), device)?;
        let strides_dev = match Self::allocate(strides_bytes.len(), device) {
            Ok(p) => p,
            Err(e) => {
                Self::deallocate(shape_dev, shape_bytes.len(), device);
                return Err(e);
            }
        };

        let result = (|| -> Result<()> {
            Self::copy_to_device(shape_bytes, shape_dev, device)?;
            Self::copy_to_device(strides_bytes, strides_dev, device)?;

            let src_base = src + (src_offset * elem_size) as u64;
            unsafe {
                super::kernels::strided_copy::launch_strided_copy(
                    &client,
                    src_base,
                    dst,
                    shape_dev,
                    strides_dev,
                    numel,
                    shape.len(),
                    elem_size,
                )
            }
        })();

        Self::deallocate(shape_dev, shape_bytes.len(), device);
        Self::deallocate(strides_dev, strides_bytes.len(), device);
        result
    }

    fn default_device() -> Self::Device {
        CudaDevice::new(0)
    }

    fn default_client(device: &Self::Device) -> Self::Client {
        cache::get_or_create_client(device)
    }
}
