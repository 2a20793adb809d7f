//! Byte cursor for the byte-oriented asset decoders.
//!
//! [`Parser`] walks a borrowed byte slice and reports every premature end of input as
//! [`crate::Error::CorruptData`] with the offset at which the read failed. The tilemap
//! RLE decoder, the LZ77 decoder and the palette decoder all read through it, so a
//! truncated stream can never cause an out-of-bounds access or a short result.
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use romkit::codec::Parser;
//!
//! let data = [0x10, 0x12, 0x34];
//! let mut parser = Parser::new(&data);
//! assert_eq!(parser.read_be::<u8>()?, 0x10);
//! assert_eq!(parser.read_be::<u16>()?, 0x1234);
//! assert!(!parser.has_more_data());
//! assert!(parser.read_be::<u8>().is_err());
//! # Ok::<(), romkit::Error>(())
//! ```

use crate::{
    utils::{read_be_at, RomIO},
    Result,
};

/// A forward-only cursor over a byte slice with bounds-checked big-endian reads.
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Total length of the underlying data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the underlying data is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true if unread bytes remain.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Current offset; after a completed decode this is the number of bytes consumed.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Number of unread bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Read a big-endian value and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::CorruptData`] if the input ends before the value.
    pub fn read_be<T: RomIO>(&mut self) -> Result<T> {
        let at = self.position;
        read_be_at::<T>(self.data, &mut self.position).map_err(|_| {
            corrupt_data!(
                "unexpected end of data at offset {} (need {} bytes, {} available)",
                at,
                std::mem::size_of::<T>(),
                self.data.len().saturating_sub(at)
            )
        })
    }

    /// Read the next `len` bytes as a slice.
    ///
    /// # Errors
    /// Returns [`crate::Error::CorruptData`] if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(corrupt_data!(
                "unexpected end of data at offset {} (need {} bytes, {} available)",
                self.position,
                len,
                self.remaining()
            ));
        }

        let slice = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }
}
