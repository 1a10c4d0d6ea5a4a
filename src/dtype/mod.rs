//! Data type definitions for tensors

mod element;

pub use element::Element;

/// Runtime data type of tensor elements
///
/// Discriminants are stable so dtype codes can cross FFI or serialization
/// boundaries without re-mapping.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DType {
    /// 64-bit floating point
    F64 = 0,
    /// 32-bit floating point
    F32 = 1,
    /// 64-bit signed integer
    I64 = 10,
    /// 32-bit signed integer
    I32 = 11,
}

impl DType {
    /// Size of one element in bytes
    pub const fn size_in_bytes(&self) -> usize {
        match self {
            DType::F64 | DType::I64 => 8,
            DType::F32 | DType::I32 => 4,
        }
    }

    /// Whether this is a floating point type
    pub const fn is_float(&self) -> bool {
        matches!(self, DType::F64 | DType::F32)
    }

    /// Whether this is an integer type
    pub const fn is_int(&self) -> bool {
        matches!(self, DType::I64 | DType::I32)
    }

    /// Short lowercase name, as used in kernel symbol suffixes
    pub const fn short_name(&self) -> &'static str {
        match self {
            DType::F64 => "f64",
            DType::F32 => "f32",
            DType::I64 => "i64",
            DType::I32 => "i32",
        }
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(DType::F64.size_in_bytes(), 8);
        assert_eq!(DType::F32.size_in_bytes(), 4);
        assert_eq!(DType::I64.size_in_bytes(), 8);
        assert_eq!(DType::I32.size_in_bytes(), 4);
    }

    #[test]
    fn classification() {
        assert!(DType::F32.is_float());
        assert!(!DType::I64.is_float());
        assert!(DType::I32.is_int());
        assert!(!DType::F64.is_int());
    }

    #[test]
    fn display_matches_kernel_suffix() {
        assert_eq!(DType::F64.to_string(), "f64");
        assert_eq!(DType::I32.to_string(), "i32");
    }
}
