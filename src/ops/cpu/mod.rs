//! CPU implementations of the operation traits

mod matmul;
mod normalize;
mod reduce;
mod segment;
