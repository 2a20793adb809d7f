//! Bit-packed blockset compression.
//!
//! Tilesets are assembled from 2x2 [`Block`]s, and the game stores each blockset as a
//! single bit stream with three parts:
//!
//! 1. The block count, 16 bits.
//! 2. Three run-length coded masks, one each for priority, v-flip and h-flip, covering
//!    every tile of every block in order.
//! 3. The tile index stream, coded in even/odd pairs with a 16-entry move-to-front cache.
//!
//! # Run Lengths
//!
//! Each mask is a sequence of alternating runs starting with "clear". A run is stored as
//! a self-terminating number: `E` zero bits, a one bit, then `E` mantissa bits. The stored
//! number `w = 2^E + mantissa` is the length of the run, except for the first run of a
//! mask, which stores its length plus one so that it may be empty.
//!
//! # Tile Pairs
//!
//! The second tile of each row in a block is frequently the neighbour of the first. If it
//! equals `first + 1` (or `first - 1` when the first tile is h-flipped) a single `1` bit is
//! written; otherwise a `0` bit followed by the tile itself. Each explicit tile is either a
//! `1` bit and a 4-bit cache slot, or a `0` bit and the 11-bit index.
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use romkit::codec::{Block, BlockCodec, Tile};
//!
//! let blocks = vec![Block::new([Tile::new(1), Tile::new(2), Tile::new(3), Tile::new(4)])];
//! let bytes = BlockCodec::encode(&blocks)?;
//! let (decoded, consumed) = BlockCodec::decode(&bytes)?;
//! assert_eq!(decoded, blocks);
//! assert_eq!(consumed, bytes.len());
//! # Ok::<(), romkit::Error>(())
//! ```

use crate::{
    codec::{
        bits::{BitReader, BitWriter},
        tile::{Block, Blockset, Tile, TileAttributes},
    },
    Error, Result,
};

const CACHE_SIZE: usize = 16;
const CACHE_SLOT_BITS: u32 = 4;
const INDEX_BITS: u32 = 11;
const COUNT_BITS: u32 = 16;
// A run can never exceed 0xFFFF * 4 + 1 tiles, so anything wider is garbage.
const MAX_EXPONENT: u32 = 20;

/// Mask order within the stream.
const MASKS: [TileAttributes; 3] = [
    TileAttributes::PRIORITY,
    TileAttributes::VFLIP,
    TileAttributes::HFLIP,
];

/// Move-to-front cache of recently used tile indices.
struct TileCache {
    entries: [u16; CACHE_SIZE],
}

impl TileCache {
    fn new() -> Self {
        TileCache {
            entries: [0; CACHE_SIZE],
        }
    }

    fn find(&self, index: u16) -> Option<usize> {
        self.entries.iter().position(|&entry| entry == index)
    }

    fn promote(&mut self, slot: usize) {
        if slot != 0 {
            self.entries[..=slot].rotate_right(1);
        }
    }

    fn push(&mut self, index: u16) {
        self.entries.rotate_right(1);
        self.entries[0] = index;
    }

    fn front(&self) -> u16 {
        self.entries[0]
    }
}

/// Encoder and decoder for compressed blocksets.
pub struct BlockCodec;

impl BlockCodec {
    /// Largest number of blocks the 16-bit count field can describe.
    pub const MAX_BLOCKS: usize = 0xFFFF;

    /// Compress `blocks` into a new buffer.
    ///
    /// # Errors
    /// - [`crate::Error::CapacityExceeded`] if there are more than [`Self::MAX_BLOCKS`] blocks
    /// - [`crate::Error::InvalidInput`] if a tile carries palette bits, which the format cannot store
    pub fn encode(blocks: &[Block]) -> Result<Vec<u8>> {
        if blocks.len() > Self::MAX_BLOCKS {
            return Err(Error::CapacityExceeded {
                required: blocks.len(),
                available: Self::MAX_BLOCKS,
            });
        }

        let tiles: Vec<Tile> = blocks.iter().flat_map(|block| block.tiles).collect();
        if let Some(position) = tiles
            .iter()
            .position(|tile| tile.attributes().intersects(TileAttributes::PALETTE))
        {
            return Err(Error::InvalidInput(format!(
                "blockset tile {} carries palette bits (0x{:04X})",
                position,
                tiles[position].value()
            )));
        }

        let mut writer = BitWriter::new();
        #[allow(clippy::cast_possible_truncation)]
        writer.write_bits(blocks.len() as u32, COUNT_BITS);

        for mask in MASKS {
            write_mask(&mut writer, &tiles, mask);
        }

        let mut cache = TileCache::new();
        for pair in tiles.chunks_exact(2) {
            let (first, second) = (pair[0], pair[1]);
            write_tile(&mut writer, &mut cache, first.index());

            if implicit_successor(first) == Some(second.index()) {
                writer.write_bit(true);
            } else {
                writer.write_bit(false);
                write_tile(&mut writer, &mut cache, second.index());
            }
        }

        let bytes = writer.into_bytes();
        log::trace!("encoded {} blocks into {} bytes", blocks.len(), bytes.len());
        Ok(bytes)
    }

    /// Compress `blocks` into a caller-provided buffer and return the number of bytes used.
    ///
    /// Nothing is written to `out` unless the whole stream fits.
    ///
    /// # Errors
    /// - [`crate::Error::CapacityExceeded`] if `out` is smaller than the encoded stream
    /// - Any error of [`BlockCodec::encode`]
    pub fn encode_into(blocks: &[Block], out: &mut [u8]) -> Result<usize> {
        let bytes = Self::encode(blocks)?;
        if bytes.len() > out.len() {
            return Err(Error::CapacityExceeded {
                required: bytes.len(),
                available: out.len(),
            });
        }

        out[..bytes.len()].copy_from_slice(&bytes);
        Ok(bytes.len())
    }

    /// Decompress a blockset, returning the blocks and the number of bytes consumed.
    ///
    /// # Errors
    /// Returns [`crate::Error::CorruptData`] if the stream is truncated, a mask run
    /// overruns the tile count, or a tile reference leaves the 11-bit index range.
    pub fn decode(data: &[u8]) -> Result<(Blockset, usize)> {
        if data.len() < 2 {
            return Err(corrupt_data!(
                "blockset needs at least 2 bytes, got {}",
                data.len()
            ));
        }

        let mut reader = BitReader::new(data);
        let block_count = reader.read_bits(COUNT_BITS)? as usize;
        let mut tiles = vec![Tile::default(); block_count * Block::TILE_COUNT];

        for mask in MASKS {
            read_mask(&mut reader, &mut tiles, mask)?;
        }

        let mut cache = TileCache::new();
        for pair in tiles.chunks_exact_mut(2) {
            let first = read_tile(&mut reader, &mut cache)?;
            pair[0].set_index(first);

            let second = if reader.read_bit()? {
                implicit_successor(pair[0]).ok_or_else(|| {
                    corrupt_data!(
                        "implicit neighbour of tile 0x{:03X} is outside the index range",
                        first
                    )
                })?
            } else {
                read_tile(&mut reader, &mut cache)?
            };
            pair[1].set_index(second);
        }

        let blocks = tiles
            .chunks_exact(Block::TILE_COUNT)
            .map(|chunk| Block::new([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        Ok((blocks, reader.byte_position()))
    }
}

/// The index implied for the second tile of a pair.
fn implicit_successor(first: Tile) -> Option<u16> {
    if first.has(TileAttributes::HFLIP) {
        first.index().checked_sub(1)
    } else {
        Some(first.index() + 1).filter(|&index| index <= Tile::MAX_INDEX)
    }
}

fn write_run(writer: &mut BitWriter, value: u32) {
    debug_assert!(value >= 1);

    let exponent = 31 - value.leading_zeros();
    writer.write_bits(0, exponent);
    writer.write_bit(true);
    writer.write_bits(value - (1 << exponent), exponent);
}

fn read_run(reader: &mut BitReader) -> Result<u32> {
    let mut exponent = 0;
    while !reader.read_bit()? {
        exponent += 1;
        if exponent > MAX_EXPONENT {
            return Err(corrupt_data!("run length exponent exceeds {}", MAX_EXPONENT));
        }
    }

    if exponent == 0 {
        return Ok(0);
    }

    let mantissa = reader.read_bits(exponent)?;
    Ok((1 << exponent) + mantissa - 1)
}

fn write_mask(writer: &mut BitWriter, tiles: &[Tile], mask: TileAttributes) {
    let mut state = false;
    let mut run = 0u32;
    let mut first = true;

    for tile in tiles {
        if tile.has(mask) == state {
            run += 1;
        } else {
            write_run(writer, if first { run + 1 } else { run });
            first = false;
            state = !state;
            run = 1;
        }
    }

    write_run(writer, if first { run + 1 } else { run });
}

fn read_mask(reader: &mut BitReader, tiles: &mut [Tile], mask: TileAttributes) -> Result<()> {
    let mut position = 0usize;
    let mut state = false;
    let mut first = true;

    loop {
        let mut run = read_run(reader)? as usize;
        if !first {
            run += 1;
        }

        let end = position + run;
        if end > tiles.len() {
            return Err(corrupt_data!(
                "{:?} run of {} tiles at tile {} overruns the {} tiles of the blockset",
                mask,
                run,
                position,
                tiles.len()
            ));
        }

        if state {
            for tile in &mut tiles[position..end] {
                *tile.attributes_mut() |= mask;
            }
        }

        position = end;
        first = false;
        state = !state;

        if position == tiles.len() {
            return Ok(());
        }
    }
}

fn write_tile(writer: &mut BitWriter, cache: &mut TileCache, index: u16) {
    if let Some(slot) = cache.find(index) {
        writer.write_bit(true);
        #[allow(clippy::cast_possible_truncation)]
        writer.write_bits(slot as u32, CACHE_SLOT_BITS);
        cache.promote(slot);
    } else {
        writer.write_bit(false);
        writer.write_bits(u32::from(index), INDEX_BITS);
        cache.push(index);
    }
}

fn read_tile(reader: &mut BitReader, cache: &mut TileCache) -> Result<u16> {
    if reader.read_bit()? {
        let slot = reader.read_bits(CACHE_SLOT_BITS)? as usize;
        cache.promote(slot);
    } else {
        #[allow(clippy::cast_possible_truncation)]
        let index = reader.read_bits(INDEX_BITS)? as u16;
        cache.push(index);
    }
    Ok(cache.front())
}
