//! CUDA device handle

use crate::runtime::Device;

/// A CUDA device, identified by its driver ordinal
#[derive(Clone, Debug)]
pub struct CudaDevice {
    pub(crate) index: usize,
}

impl CudaDevice {
    /// Create a handle for device `index`
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    /// The driver ordinal of this device
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Device for CudaDevice {
    fn id(&self) -> usize {
        self.index
    }

    fn name(&self) -> String {
        format!("cuda:{}", self.index)
    }
}
