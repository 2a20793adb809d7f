//! Big-endian reading and writing helpers for 68000 data.
//!
//! Every multi-byte quantity in the ROM image and in the asset streams is stored
//! most-significant byte first. This module provides the small set of bounds-checked
//! primitives that the codecs and the ROM accessor build on.
//!
//! # Key Components
//!
//! - [`crate::utils::RomIO`] - Trait for primitive types with a fixed big-endian encoding
//! - [`crate::utils::read_be`] / [`crate::utils::read_be_at`] - Read from a buffer start or an advancing offset
//! - [`crate::utils::write_be`] / [`crate::utils::write_be_at`] - Write to a buffer start or an advancing offset
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use romkit::utils::{read_be_at, write_be_at};
//!
//! let mut data = [0u8; 6];
//! let mut offset = 0;
//! write_be_at(&mut data, &mut offset, 0x1234u16)?;
//! write_be_at(&mut data, &mut offset, 0xDEAD_BEEFu32)?;
//! assert_eq!(data, [0x12, 0x34, 0xDE, 0xAD, 0xBE, 0xEF]);
//!
//! offset = 0;
//! let word: u16 = read_be_at(&data, &mut offset)?;
//! assert_eq!(word, 0x1234);
//! # Ok::<(), romkit::Error>(())
//! ```
//!
//! # Error Handling
//!
//! All functions return [`crate::Error::OutOfBounds`] if the buffer is too short.
//! Decoders that need a [`crate::Error::CorruptData`] instead go through
//! [`crate::codec::Parser`], which translates the failure.

use crate::{Error::OutOfBounds, Result};

/// Primitive types with a fixed-size big-endian byte representation.
pub trait RomIO: Sized + Copy {
    /// Byte array holding the encoded value
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Decode from big-endian bytes
    fn from_be_bytes(bytes: Self::Bytes) -> Self;

    /// Encode to big-endian bytes
    fn to_be_bytes(self) -> Self::Bytes;
}

macro_rules! impl_rom_io {
    ($($ty:ty),*) => {
        $(
            impl RomIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }

                fn to_be_bytes(self) -> Self::Bytes {
                    <$ty>::to_be_bytes(self)
                }
            }
        )*
    };
}

impl_rom_io!(u8, i8, u16, i16, u32, i32);

/// Read a big-endian value from the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than `T`.
pub fn read_be<T: RomIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_be_at(data, &mut offset)
}

/// Read a big-endian value at `offset` and advance the offset past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the value extends past the end of `data`.
pub fn read_be_at<T: RomIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;
    Ok(T::from_be_bytes(read))
}

/// Write a big-endian value to the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than `T`.
pub fn write_be<T: RomIO>(data: &mut [u8], value: T) -> Result<()> {
    let mut offset = 0_usize;
    write_be_at(data, &mut offset, value)
}

/// Write a big-endian value at `offset` and advance the offset past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the value would extend past the end of `data`.
pub fn write_be_at<T: RomIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    data[*offset..end].copy_from_slice(value.to_be_bytes().as_ref());
    *offset = end;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_BUFFER: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    #[test]
    fn read_be_u8() {
        let result = read_be::<u8>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x01);
    }

    #[test]
    fn read_be_u16() {
        let result = read_be::<u16>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0102);
    }

    #[test]
    fn read_be_i16_negative() {
        let result = read_be::<i16>(&[0xFF, 0xFE]).unwrap();
        assert_eq!(result, -2);
    }

    #[test]
    fn read_be_u32() {
        let result = read_be::<u32>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0102_0304);
    }

    #[test]
    fn read_be_at_advances() {
        let mut offset = 2;
        let first: u16 = read_be_at(&TEST_BUFFER, &mut offset).unwrap();
        let second: u32 = read_be_at(&TEST_BUFFER, &mut offset).unwrap();
        assert_eq!(first, 0x0304);
        assert_eq!(second, 0x0506_0708);
        assert_eq!(offset, 8);
    }

    #[test]
    fn read_past_end() {
        let mut offset = 6;
        assert!(matches!(
            read_be_at::<u32>(&TEST_BUFFER, &mut offset),
            Err(OutOfBounds)
        ));
        assert_eq!(offset, 6);

        let mut offset = usize::MAX;
        assert!(read_be_at::<u8>(&TEST_BUFFER, &mut offset).is_err());
    }

    #[test]
    fn write_be_roundtrip() {
        let mut data = [0u8; 7];
        let mut offset = 0;
        write_be_at(&mut data, &mut offset, 0xABu8).unwrap();
        write_be_at(&mut data, &mut offset, 0x1234u16).unwrap();
        write_be_at(&mut data, &mut offset, 0xDEAD_BEEFu32).unwrap();
        assert_eq!(data, [0xAB, 0x12, 0x34, 0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(write_be(&mut data[6..], 0u16).is_err());
    }
}
