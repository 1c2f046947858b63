//! Pixel scalar types the native reader supports.
//!
//! The native library exports one function group per pixel type; instead of
//! four duplicated reader classes, [`crate::reader::ImageReader`] is generic
//! over a [`PixelType`] that selects the group and names the data type code.

use crate::ffi::api::{PixelFns, ReaderFns};
use crate::types::DataType;

mod sealed {
    pub trait Sealed {}

    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
    impl Sealed for f32 {}
}

/// A scalar type with a native function group.
///
/// Implemented exactly for the four types the native ABI covers: `u8`, `u16`,
/// `u32`, `f32`. The trait is sealed; the native library will never gain
/// function groups this crate doesn't know about without a new release here.
pub trait PixelType: sealed::Sealed + Copy + Default + 'static {
    /// The data type this scalar reads.
    const DATA_TYPE: DataType;

    /// Select this type's function group from the resolved call table.
    fn fns(fns: &ReaderFns) -> &PixelFns;
}

impl PixelType for u8 {
    const DATA_TYPE: DataType = DataType::UInt8;

    fn fns(fns: &ReaderFns) -> &PixelFns {
        &fns.uint8
    }
}

impl PixelType for u16 {
    const DATA_TYPE: DataType = DataType::UInt16;

    fn fns(fns: &ReaderFns) -> &PixelFns {
        &fns.uint16
    }
}

impl PixelType for u32 {
    const DATA_TYPE: DataType = DataType::UInt32;

    fn fns(fns: &ReaderFns) -> &PixelFns {
        &fns.uint32
    }
}

impl PixelType for f32 {
    const DATA_TYPE: DataType = DataType::Float32;

    fn fns(fns: &ReaderFns) -> &PixelFns {
        &fns.float32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_types_name_their_data_type() {
        assert_eq!(<u8 as PixelType>::DATA_TYPE, DataType::UInt8);
        assert_eq!(<u16 as PixelType>::DATA_TYPE, DataType::UInt16);
        assert_eq!(<u32 as PixelType>::DATA_TYPE, DataType::UInt32);
        assert_eq!(<f32 as PixelType>::DATA_TYPE, DataType::Float32);
    }

    #[test]
    fn test_sample_sizes_match_scalars() {
        assert_eq!(DataType::UInt8.bytes_per_sample(), std::mem::size_of::<u8>());
        assert_eq!(
            DataType::UInt16.bytes_per_sample(),
            std::mem::size_of::<u16>()
        );
        assert_eq!(
            DataType::UInt32.bytes_per_sample(),
            std::mem::size_of::<u32>()
        );
        assert_eq!(
            DataType::Float32.bytes_per_sample(),
            std::mem::size_of::<f32>()
        );
    }
}
