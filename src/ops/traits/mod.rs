//! Operation trait definitions

mod matmul;
mod normalize;
mod reduce;
mod segment;

pub use matmul::MatmulOps;
pub use normalize::NormalizeOps;
pub use reduce::ReduceOps;
pub use segment::SegmentOps;
