//! Tile and block value types shared by the codecs.
//!
//! A [`Tile`] is a single 16-bit video-memory tile reference: an 11-bit pattern index
//! plus the attribute bits the console's plane hardware understands. A [`Block`] is the
//! 2x2 arrangement of tiles that tilesets are built from.
//!
//! # Bit Layout
//!
//! ```text
//!  15  14  13  12  11  10 .. 0
//! PRI PAL PAL VF  HF   index
//! ```

use bitflags::bitflags;
use std::ops::{Index, IndexMut};

bitflags! {
    /// Attribute bits of a tile, stored in their hardware positions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TileAttributes: u16 {
        /// Mirror the tile horizontally
        const HFLIP = 0x0800;
        /// Mirror the tile vertically
        const VFLIP = 0x1000;
        /// Low bit of the palette line
        const PALETTE_LOW = 0x2000;
        /// High bit of the palette line
        const PALETTE_HIGH = 0x4000;
        /// Draw above sprites and the low-priority plane
        const PRIORITY = 0x8000;
    }
}

impl TileAttributes {
    /// Both palette bits.
    pub const PALETTE: TileAttributes = TileAttributes::PALETTE_LOW.union(TileAttributes::PALETTE_HIGH);
}

/// A tile reference: pattern index plus attributes.
///
/// # Examples
///
/// ```rust,ignore
/// use romkit::codec::{Tile, TileAttributes};
///
/// let tile = Tile::new(0x123).with_attributes(TileAttributes::HFLIP);
/// assert_eq!(tile.value(), 0x0923);
/// assert_eq!(Tile::from_value(0x0923), tile);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Tile {
    index: u16,
    attributes: TileAttributes,
}

impl Tile {
    /// Mask selecting the pattern index from a tile value.
    pub const INDEX_MASK: u16 = 0x07FF;
    /// Largest representable pattern index.
    pub const MAX_INDEX: u16 = 0x07FF;

    /// Create a tile without attributes. The index is masked to 11 bits.
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Tile {
            index: index & Self::INDEX_MASK,
            attributes: TileAttributes::empty(),
        }
    }

    /// Split a raw 16-bit tile value into index and attributes.
    #[must_use]
    pub const fn from_value(value: u16) -> Self {
        Tile {
            index: value & Self::INDEX_MASK,
            attributes: TileAttributes::from_bits_truncate(value),
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attributes(mut self, attributes: TileAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// The packed 16-bit value.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.index | self.attributes.bits()
    }

    /// The 11-bit pattern index.
    #[must_use]
    pub const fn index(&self) -> u16 {
        self.index
    }

    /// Replace the pattern index, masked to 11 bits.
    pub fn set_index(&mut self, index: u16) {
        self.index = index & Self::INDEX_MASK;
    }

    /// The attribute bits.
    #[must_use]
    pub const fn attributes(&self) -> TileAttributes {
        self.attributes
    }

    /// Mutable access to the attribute bits.
    pub fn attributes_mut(&mut self) -> &mut TileAttributes {
        &mut self.attributes
    }

    /// Returns true if every bit of `attribute` is set.
    #[must_use]
    pub fn has(&self, attribute: TileAttributes) -> bool {
        self.attributes.contains(attribute)
    }

    /// Palette line (0..=3).
    #[must_use]
    pub const fn palette(&self) -> u8 {
        ((self.attributes.bits() & TileAttributes::PALETTE.bits()) >> 13) as u8
    }

    /// Select a palette line; only the low two bits of `line` are used.
    pub fn set_palette(&mut self, line: u8) {
        self.attributes.remove(TileAttributes::PALETTE);
        self.attributes |= TileAttributes::from_bits_truncate(u16::from(line & 0x03) << 13);
    }
}

impl From<u16> for Tile {
    fn from(value: u16) -> Self {
        Tile::from_value(value)
    }
}

impl From<Tile> for u16 {
    fn from(tile: Tile) -> Self {
        tile.value()
    }
}

/// A 2x2 tile arrangement in the order top-left, top-right, bottom-left, bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Block {
    /// The four tiles of the block
    pub tiles: [Tile; 4],
}

impl Block {
    /// Number of tiles per block.
    pub const TILE_COUNT: usize = 4;
    /// Width of a block in tiles.
    pub const WIDTH: usize = 2;

    /// Create a block from its four tiles.
    #[must_use]
    pub const fn new(tiles: [Tile; 4]) -> Self {
        Block { tiles }
    }

    /// Tile at column `x`, row `y` within the block.
    #[must_use]
    pub fn at(&self, x: usize, y: usize) -> Option<&Tile> {
        if x >= Self::WIDTH || y >= Self::WIDTH {
            return None;
        }
        self.tiles.get(y * Self::WIDTH + x)
    }
}

impl Index<usize> for Block {
    type Output = Tile;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tiles[index]
    }
}

impl IndexMut<usize> for Block {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.tiles[index]
    }
}

/// An ordered set of blocks, as stored in a compressed blockset.
pub type Blockset = Vec<Block>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_roundtrip() {
        for value in [0x0000, 0x07FF, 0x8000, 0x0923, 0xFFFF, 0x6001] {
            assert_eq!(Tile::from_value(value).value(), value);
        }
    }

    #[test]
    fn index_is_masked() {
        let tile = Tile::new(0x0FFF);
        assert_eq!(tile.index(), 0x07FF);
        assert!(tile.attributes().is_empty());

        let mut tile = Tile::default();
        tile.set_index(0x1801);
        assert_eq!(tile.index(), 0x0001);
    }

    #[test]
    fn attributes() {
        let tile = Tile::from_value(0x9800);
        assert!(tile.has(TileAttributes::PRIORITY));
        assert!(tile.has(TileAttributes::VFLIP));
        assert!(tile.has(TileAttributes::HFLIP));
        assert_eq!(tile.palette(), 0);
    }

    #[test]
    fn palette_line() {
        let mut tile = Tile::new(5);
        tile.set_palette(2);
        assert_eq!(tile.palette(), 2);
        assert_eq!(tile.value(), 0x4005);
        tile.set_palette(7);
        assert_eq!(tile.palette(), 3);
        tile.set_palette(0);
        assert_eq!(tile.value(), 0x0005);
    }

    #[test]
    fn block_access() {
        let mut block = Block::new([Tile::new(1), Tile::new(2), Tile::new(3), Tile::new(4)]);
        assert_eq!(block.at(1, 0), Some(&Tile::new(2)));
        assert_eq!(block.at(0, 1), Some(&Tile::new(3)));
        assert_eq!(block.at(2, 0), None);

        block[3] = Tile::new(9);
        assert_eq!(block[3].index(), 9);
    }
}
