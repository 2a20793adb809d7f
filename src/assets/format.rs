//! Serialisation of asset values to and from their stored bytes.
//!
//! A [`Codec`] binds an asset value type to its on-disk and in-ROM byte format. Entries hold
//! their codec by value, so per-asset parameters (a raw tilemap's dimensions, a palette's
//! kind) travel with the entry.

use std::fmt::Debug;

use crate::{
    assets::palette::{Palette, PaletteKind},
    codec::{BlockCodec, Blockset, Tilemap2D, TilemapCodec},
    Result,
};

/// Byte format of one asset type.
///
/// Implementations must round-trip: for every value `v` that `serialize` accepts,
/// `deserialize(&serialize(v)?)` yields `(v', n)` with `v' == v` and `n` equal to the
/// serialised length.
pub trait Codec: Debug + Send + Sync {
    /// The decoded asset value.
    type Value: Clone + PartialEq + Debug + Send + Sync;

    /// Decode a value, returning it with the number of bytes consumed.
    ///
    /// # Errors
    /// Returns [`crate::Error::CorruptData`] for malformed input.
    fn deserialize(&self, bytes: &[u8]) -> Result<(Self::Value, usize)>;

    /// Encode a value.
    ///
    /// # Errors
    /// Returns an error if the value cannot be represented by the format.
    fn serialize(&self, value: &Self::Value) -> Result<Vec<u8>>;
}

/// Compressed blocksets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlocksetFormat;

impl Codec for BlocksetFormat {
    type Value = Blockset;

    fn deserialize(&self, bytes: &[u8]) -> Result<(Blockset, usize)> {
        BlockCodec::decode(bytes)
    }

    fn serialize(&self, value: &Blockset) -> Result<Vec<u8>> {
        BlockCodec::encode(value)
    }
}

impl Codec for TilemapCodec {
    type Value = Tilemap2D;

    fn deserialize(&self, bytes: &[u8]) -> Result<(Tilemap2D, usize)> {
        self.decode(bytes)
    }

    fn serialize(&self, value: &Tilemap2D) -> Result<Vec<u8>> {
        self.encode(value)
    }
}

/// Palettes of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteFormat(pub PaletteKind);

impl Codec for PaletteFormat {
    type Value = Palette;

    fn deserialize(&self, bytes: &[u8]) -> Result<(Palette, usize)> {
        Palette::from_bytes(self.0, bytes)
    }

    fn serialize(&self, value: &Palette) -> Result<Vec<u8>> {
        value.to_bytes()
    }
}

/// Opaque bytes, such as uncompressed tile graphics or script banks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawFormat;

impl Codec for RawFormat {
    type Value = Vec<u8>;

    fn deserialize(&self, bytes: &[u8]) -> Result<(Vec<u8>, usize)> {
        Ok((bytes.to_vec(), bytes.len()))
    }

    fn serialize(&self, value: &Vec<u8>) -> Result<Vec<u8>> {
        Ok(value.clone())
    }
}
