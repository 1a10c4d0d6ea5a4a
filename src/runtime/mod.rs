//! Runtime abstraction: devices, clients, and memory movement
//!
//! A [`Runtime`] ties together a device type, a client (per-device handle
//! used to launch operations), and an allocator. Backends are selected
//! statically through generics, never through trait objects.

mod allocator;

pub mod cpu;

#[cfg(feature = "cuda")]
pub mod cuda;

#[cfg(feature = "cuda")]
pub mod fallback;

pub use allocator::{Allocator, DefaultAllocator};

use crate::error::Result;

/// A compute backend
///
/// All memory is addressed through raw `u64` handles so the same tensor
/// machinery works over host pointers and device addresses.
pub trait Runtime: Clone + Send + Sync + 'static {
    /// Device type for this runtime
    type Device: Device;
    /// Client type used to run operations on a device
    type Client: RuntimeClient<Self>;
    /// Allocator type for this runtime
    type Allocator: Allocator;

    /// Human-readable backend name
    fn name() -> &'static str;

    /// Allocate `size_bytes` of device memory, returning a raw handle
    fn allocate(size_bytes: usize, device: &Self::Device) -> Result<u64>;

    /// Release memory previously returned by [`Runtime::allocate`]
    fn deallocate(ptr: u64, size_bytes: usize, device: &Self::Device);

    /// Copy host bytes into device memory
    fn copy_to_device(src: &[u8], dst: u64, device: &Self::Device) -> Result<()>;

    /// Copy device memory into a host buffer
    fn copy_from_device(src: u64, dst: &mut [u8], device: &Self::Device) -> Result<()>;

    /// Gather a strided view into a packed destination buffer
    ///
    /// `src_offset` is in elements; `strides` are in elements.
    fn copy_strided(
        src: u64,
        dst: u64,
        shape: &[usize],
        strides: &[isize],
        src_offset: usize,
        elem_size: usize,
        device: &Self::Device,
    ) -> Result<()>;

    /// The default device for this runtime
    fn default_device() -> Self::Device;

    /// Get (or create) the client for a device
    fn default_client(device: &Self::Device) -> Self::Client;
}

/// A compute device
pub trait Device: Clone + Send + Sync + std::fmt::Debug + 'static {
    /// Device index within its backend
    fn id(&self) -> usize;

    /// Whether two device handles refer to the same physical device
    fn is_same(&self, other: &Self) -> bool {
        self.id() == other.id()
    }

    /// Human-readable device name, e.g. "cpu" or "cuda:0"
    fn name(&self) -> String;
}

/// Per-device handle used to run operations
pub trait RuntimeClient<R: Runtime>: Clone + Send + Sync {
    /// Device this client is bound to
    fn device(&self) -> &R::Device;

    /// Block until all queued work on this device has completed
    fn synchronize(&self);

    /// Allocator for this client
    fn allocator(&self) -> &R::Allocator;
}
