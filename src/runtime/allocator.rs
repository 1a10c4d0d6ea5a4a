//! Memory allocator abstraction

/// Device memory allocator
///
/// Allocators hand out raw `u64` handles; interpretation (host pointer vs
/// GPU address) is backend-specific.
pub trait Allocator: Clone + Send + Sync {
    /// Allocate `size` bytes
    fn allocate(&self, size: usize) -> u64;

    /// Release a previous allocation
    fn deallocate(&self, ptr: u64, size: usize);
}

/// Allocator that delegates to a pair of plain functions
///
/// Suitable for backends whose allocation needs no per-client state beyond
/// the device handle.
#[derive(Clone)]
pub struct DefaultAllocator<D: Clone + Send + Sync> {
    device: D,
    allocate_fn: fn(usize, &D) -> u64,
    deallocate_fn: fn(u64, usize, &D),
}

impl<D: Clone + Send + Sync> DefaultAllocator<D> {
    /// Create a new allocator from delegate functions
    pub fn new(device: D, allocate_fn: fn(usize, &D) -> u64, deallocate_fn: fn(u64, usize, &D)) -> Self {
        Self {
            device,
            allocate_fn,
            deallocate_fn,
        }
    }

    /// The device this allocator serves
    pub fn device(&self) -> &D {
        &self.device
    }
}

impl<D: Clone + Send + Sync> Allocator for DefaultAllocator<D> {
    fn allocate(&self, size: usize) -> u64 {
        (self.allocate_fn)(size, &self.device)
    }

    fn deallocate(&self, ptr: u64, size: usize) {
        (self.deallocate_fn)(ptr, size, &self.device)
    }
}
