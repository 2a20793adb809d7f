//! MSB-first bit streams.
//!
//! The block codec packs its masks and tile references without byte alignment. Bits are
//! consumed and produced starting at bit 7 of each byte. The final partial byte of a
//! written stream is zero-padded, and a reader reports consumption rounded up to whole
//! bytes.

use crate::Result;

/// Reads bits most-significant first from a byte slice.
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_position: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at the first bit of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        BitReader {
            data,
            bit_position: 0,
        }
    }

    /// Read a single bit.
    ///
    /// # Errors
    /// Returns [`crate::Error::CorruptData`] when the stream is exhausted.
    pub fn read_bit(&mut self) -> Result<bool> {
        let byte = self.bit_position / 8;
        if byte >= self.data.len() {
            return Err(corrupt_data!(
                "bit stream exhausted after {} bytes",
                self.data.len()
            ));
        }

        let bit = 7 - (self.bit_position % 8);
        self.bit_position += 1;
        Ok((self.data[byte] >> bit) & 1 != 0)
    }

    /// Read `count` bits (at most 32) as an unsigned value, first bit most significant.
    ///
    /// # Errors
    /// Returns [`crate::Error::CorruptData`] when the stream ends before `count` bits.
    pub fn read_bits(&mut self, count: u32) -> Result<u32> {
        debug_assert!(count <= 32);

        let mut value = 0u32;
        for _ in 0..count {
            value = (value << 1) | u32::from(self.read_bit()?);
        }
        Ok(value)
    }

    /// Number of whole or partial bytes consumed so far.
    #[must_use]
    pub fn byte_position(&self) -> usize {
        self.bit_position.div_ceil(8)
    }
}

/// Writes bits most-significant first into a growable buffer.
#[derive(Debug, Default)]
pub struct BitWriter {
    data: Vec<u8>,
    bit_position: usize,
}

impl BitWriter {
    /// Create an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        let shift = 7 - (self.bit_position % 8);
        if shift == 7 {
            self.data.push(0);
        }
        if bit {
            if let Some(last) = self.data.last_mut() {
                *last |= 1 << shift;
            }
        }
        self.bit_position += 1;
    }

    /// Append the low `count` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u32, count: u32) {
        debug_assert!(count <= 32);

        for bit in (0..count).rev() {
            self.write_bit((value >> bit) & 1 != 0);
        }
    }

    /// Number of bits written.
    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.bit_position
    }

    /// Finish the stream, zero-padding the last byte.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl From<BitWriter> for Vec<u8> {
    fn from(writer: BitWriter) -> Self {
        writer.into_bytes()
    }
}
