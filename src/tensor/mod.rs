//! Tensor types: storage, layout, and the tensor facade

mod core;
mod id;
mod layout;
mod storage;

pub use self::core::Tensor;
pub use id::TensorId;
pub use layout::{Layout, Shape, Strides};
pub use storage::Storage;
