//! Core tensor type

use super::{Layout, Storage, TensorId};
use crate::dtype::{DType, Element};
use crate::error::{shape_mismatch, Error, Result};
use crate::runtime::{Device, Runtime};

/// N-dimensional array on a device
///
/// A tensor is a storage buffer plus a layout. Views (transpose, reshape)
/// share storage zero-copy; `contiguous` materializes a packed copy.
pub struct Tensor<R: Runtime> {
    id: TensorId,
    storage: Storage<R>,
    layout: Layout,
}

impl<R: Runtime> Tensor<R> {
    /// Build a tensor from existing storage and layout
    pub fn from_parts(storage: Storage<R>, layout: Layout) -> Self {
        Self {
            id: TensorId::new(),
            storage,
            layout,
        }
    }

    /// Create a tensor by copying host data to a device
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not match the shape or allocation fails.
    /// Use [`Tensor::try_from_slice`] for a fallible version.
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize], device: &R::Device) -> Self {
        Self::try_from_slice(data, shape, device).expect("Tensor::from_slice failed")
    }

    /// Fallible version of [`Tensor::from_slice`]
    pub fn try_from_slice<T: Element>(
        data: &[T],
        shape: &[usize],
        device: &R::Device,
    ) -> Result<Self> {
        let numel: usize = shape.iter().product();
        if data.len() != numel {
            return Err(shape_mismatch(shape, &[data.len()]));
        }

        let storage = Storage::from_slice(data, device)?;
        Ok(Self::from_parts(storage, Layout::contiguous(shape)))
    }

    /// Allocate an uninitialized tensor
    pub fn try_empty(shape: &[usize], dtype: DType, device: &R::Device) -> Result<Self> {
        let numel: usize = shape.iter().product();
        let storage = Storage::new(numel, dtype, device)?;
        Ok(Self::from_parts(storage, Layout::contiguous(shape)))
    }

    /// Allocate a tensor filled with zeros
    pub fn try_zeros(shape: &[usize], dtype: DType, device: &R::Device) -> Result<Self> {
        Self::try_full_scalar(shape, dtype, 0.0, device)
    }

    /// Allocate a tensor filled with a scalar value
    pub fn try_full_scalar(
        shape: &[usize],
        dtype: DType,
        value: f64,
        device: &R::Device,
    ) -> Result<Self> {
        let numel: usize = shape.iter().product();
        let bytes = match dtype {
            DType::F64 => typed_to_bytes(vec![value; numel]),
            DType::F32 => typed_to_bytes(vec![value as f32; numel]),
            DType::I64 => typed_to_bytes(vec![value as i64; numel]),
            DType::I32 => typed_to_bytes(vec![value as i32; numel]),
        };
        let storage = Storage::from_bytes(&bytes, dtype, device)?;
        Ok(Self::from_parts(storage, Layout::contiguous(shape)))
    }

    /// Unique id of this tensor
    #[inline]
    pub fn id(&self) -> TensorId {
        self.id
    }

    /// Underlying storage
    #[inline]
    pub fn storage(&self) -> &Storage<R> {
        &self.storage
    }

    /// Memory layout
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Shape of the tensor
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Strides of the tensor (in elements)
    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    /// Number of dimensions
    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.layout.elem_count()
    }

    /// Element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Device the tensor lives on
    #[inline]
    pub fn device(&self) -> &R::Device {
        self.storage.device()
    }

    /// Whether the memory layout is contiguous
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    /// Swap two dimensions (zero-copy view)
    pub fn transpose(&self, dim0: usize, dim1: usize) -> Result<Self> {
        let layout = self
            .layout
            .transpose(dim0, dim1)
            .ok_or(Error::InvalidDimension {
                dim: dim0.max(dim1) as isize,
                ndim: self.ndim(),
            })?;
        Ok(Self::from_parts(self.storage.clone(), layout))
    }

    /// Reshape to a new shape (zero-copy, requires contiguous memory)
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        let layout = self
            .layout
            .reshape(shape)
            .ok_or_else(|| shape_mismatch(shape, self.shape()))?;
        Ok(Self::from_parts(self.storage.clone(), layout))
    }

    /// Return a contiguous tensor, copying only when needed
    pub fn contiguous(&self) -> Result<Self> {
        if self.is_contiguous() {
            return Ok(self.clone());
        }

        let out = Self::try_empty(self.shape(), self.dtype(), self.device())?;
        R::copy_strided(
            self.storage.ptr(),
            out.storage.ptr(),
            self.shape(),
            self.strides(),
            self.layout.offset(),
            self.dtype().size_in_bytes(),
            self.device(),
        )?;
        Ok(out)
    }

    /// Copy the tensor contents to a host Vec
    ///
    /// # Panics
    ///
    /// Panics if the tensor is not contiguous or `T` does not match the dtype.
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        assert!(
            self.is_contiguous(),
            "to_vec requires a contiguous tensor; call contiguous() first"
        );
        assert_eq!(T::DTYPE, self.dtype(), "to_vec called with wrong dtype");

        // Allocate with correct alignment for T, then cast to bytes for the
        // copy. Allocating Vec<u8> and casting would violate alignment for
        // f64/i64.
        let mut result = vec![T::zeroed(); self.numel()];
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut result);
        R::copy_from_device(self.storage.ptr(), bytes, self.device())
            .expect("copy_from_device failed in to_vec()");
        result
    }
}

fn typed_to_bytes<T: Element>(data: Vec<T>) -> Vec<u8> {
    bytemuck::cast_slice(&data).to_vec()
}

impl<R: Runtime> Clone for Tensor<R> {
    /// Clone shares storage but gets a fresh tensor id
    fn clone(&self) -> Self {
        Self {
            id: TensorId::new(),
            storage: self.storage.clone(),
            layout: self.layout.clone(),
        }
    }
}

impl<R: Runtime> std::fmt::Debug for Tensor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("id", &self.id)
            .field("shape", &self.shape())
            .field("dtype", &self.dtype())
            .field("device", &self.device().name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};

    #[test]
    fn from_slice_roundtrip() {
        let device = CpuDevice::new();
        let t = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device);
        assert_eq!(t.shape(), &[2, 2]);
        assert_eq!(t.dtype(), DType::F32);
        assert_eq!(t.to_vec::<f32>(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn from_slice_shape_mismatch() {
        let device = CpuDevice::new();
        let r = Tensor::<CpuRuntime>::try_from_slice(&[1.0f32, 2.0], &[3], &device);
        assert!(matches!(r, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn zeros_are_zero() {
        let device = CpuDevice::new();
        let t = Tensor::<CpuRuntime>::try_zeros(&[2, 3], DType::F64, &device).unwrap();
        assert_eq!(t.to_vec::<f64>(), vec![0.0; 6]);
    }

    #[test]
    fn transpose_then_contiguous() {
        let device = CpuDevice::new();
        let t = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3], &device);
        let tt = t.transpose(0, 1).unwrap();
        assert!(!tt.is_contiguous());
        let packed = tt.contiguous().unwrap();
        assert_eq!(packed.shape(), &[3, 2]);
        assert_eq!(packed.to_vec::<f64>(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn clone_shares_storage() {
        let device = CpuDevice::new();
        let t = Tensor::<CpuRuntime>::from_slice(&[1i64, 2, 3], &[3], &device);
        let u = t.clone();
        assert_ne!(t.id(), u.id());
        assert_eq!(t.storage().ptr(), u.storage().ptr());
        assert!(t.device().is_same(u.device()));
    }
}
