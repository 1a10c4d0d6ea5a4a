//! CUDA kernel modules: PTX loading and typed launchers

pub(crate) mod loader;
pub(crate) mod normalize;
pub(crate) mod reduce;
pub(crate) mod strided_copy;
