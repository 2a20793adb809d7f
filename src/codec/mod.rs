//! Binary codecs for the game's compressed asset formats.
//!
//! Every codec in this module is a pure, synchronous transformation between bytes and a
//! typed value. No codec keeps state between calls, so distinct assets can be encoded or
//! decoded in parallel.
//!
//! # Architecture
//!
//! - [`crate::codec::Parser`] and the bit reader/writer provide bounds-checked access to
//!   the input. A premature end of input is always [`crate::Error::CorruptData`].
//! - [`crate::codec::BlockCodec`] handles bit-packed blocksets.
//! - [`crate::codec::TilemapCodec`] handles raw, RLE and LZ77 tilemaps.
//! - [`crate::codec::lz77`] is the byte-level LZ77 compressor used by LZ77 tilemaps.
//!
//! # Key Components
//!
//! - [`crate::codec::Tile`], [`crate::codec::TileAttributes`] - 16-bit tile references
//! - [`crate::codec::Block`], [`crate::codec::Blockset`] - 2x2 tile blocks
//! - [`crate::codec::Tilemap2D`] - editable tile grid
//!
//! # Round-trip Guarantee
//!
//! For every value an encoder accepts, decoding its output yields an equal value and
//! reports the whole output as consumed.
//!
//! # Thread Safety
//!
//! All types are `Send + Sync`; all functions are reentrant.

mod bits;
mod blockset;
pub mod lz77;
mod parser;
mod tile;
mod tilemap;

pub use bits::{BitReader, BitWriter};
pub use blockset::BlockCodec;
pub use parser::Parser;
pub use tile::{Block, Blockset, Tile, TileAttributes};
pub use tilemap::{
    decode_lz77, decode_raw, decode_rle, encode_lz77, encode_raw, encode_rle, Tilemap2D,
    TilemapCodec, TilemapCompression,
};
