//! Two-dimensional tilemaps and their three storage formats.
//!
//! A [`Tilemap2D`] is a row-major grid of [`Tile`]s with an optional on-screen origin
//! (`left`, `top`). The game stores such maps for its HUD, title screens and island map in
//! one of three formats, selected by [`TilemapCompression`]:
//!
//! - **None**: two big-endian bytes per tile. The dimensions are not stored and must be
//!   known by the caller.
//! - **Rle**: a width/height header, an attribute-run section and a tile-index command
//!   stream.
//! - **Lz77**: a 4 byte `left, top, width, height` header followed by the uncompressed
//!   tile bytes, all passed through [`crate::codec::lz77`].
//!
//! # RLE Stream
//!
//! ```text
//! width:u8 height:u8
//! attribute runs ... 00 00
//! tile commands ... 07 FF
//! ```
//!
//! An attribute run covers consecutive tiles sharing their high five bits. Runs of 1-4
//! tiles use one byte `attr | 0x04 | (run - 1)`. Longer runs use two bytes
//! `attr | (run - 1) >> 8, (run - 1) & 0xFF`, up to 0x400 tiles.
//!
//! Tile commands are tagged by their top two bits:
//!
//! | Tag | Bytes | Meaning |
//! |-----|-------|---------|
//! | `00` | 2 | literal 11-bit index; `0x7FF` ends the stream |
//! | `01` | 2 | index repeated `1 + bits 3..=5` times; sets the last register, and the increment register if unset |
//! | `10` | 1 | last register repeated `1 + low 6 bits` times |
//! | `11` | 1 | `1 + low 6 bits` successive increments of the increment register |
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use romkit::codec::{Tile, Tilemap2D, TilemapCodec};
//!
//! let mut map = Tilemap2D::new(4, 2);
//! map.fill_incrementing(Tile::new(0x100));
//!
//! let codec = TilemapCodec::rle();
//! let bytes = codec.encode(&map)?;
//! let (decoded, consumed) = codec.decode(&bytes)?;
//! assert_eq!(decoded, map);
//! assert_eq!(consumed, bytes.len());
//! # Ok::<(), romkit::Error>(())
//! ```

use std::path::Path;

use strum::{Display, EnumIter, EnumString};

use crate::{
    codec::{lz77, tile::Tile, Parser},
    Error, Result,
};

const ATTRIBUTE_MASK: u16 = 0xF800;
const MAX_ATTRIBUTE_RUN: usize = 0x400;
const MAX_FILL_REPEATS: usize = 7;
const MAX_RUN_REPEATS: usize = 0x3F;
const END_OF_TILES: u16 = 0x07FF;
const LZ77_HEADER_SIZE: usize = 4;
const MIN_RLE_SIZE: usize = 6;

/// A rectangular grid of tiles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tilemap2D {
    width: usize,
    height: usize,
    left: u8,
    top: u8,
    tiles: Vec<Tile>,
}

impl Tilemap2D {
    /// Create a `width` x `height` map of blank tiles.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Tilemap2D {
            width,
            height,
            left: 0,
            top: 0,
            tiles: vec![Tile::default(); width * height],
        }
    }

    /// Create a map from row-major tiles.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidInput`] if `tiles.len() != width * height`.
    pub fn with_tiles(width: usize, height: usize, tiles: Vec<Tile>) -> Result<Self> {
        if tiles.len() != width * height {
            return Err(Error::InvalidInput(format!(
                "{} tiles supplied for a {}x{} map",
                tiles.len(),
                width,
                height
            )));
        }

        Ok(Tilemap2D {
            width,
            height,
            left: 0,
            top: 0,
            tiles,
        })
    }

    /// Width in tiles.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in tiles.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Horizontal screen origin in tiles.
    #[must_use]
    pub fn left(&self) -> u8 {
        self.left
    }

    /// Vertical screen origin in tiles.
    #[must_use]
    pub fn top(&self) -> u8 {
        self.top
    }

    /// Set the screen origin.
    pub fn set_origin(&mut self, left: u8, top: u8) {
        self.left = left;
        self.top = top;
    }

    /// All tiles in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Mutable access to the tiles; the grid size cannot change through it.
    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    fn offset(&self, x: usize, y: usize) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(out_of_bounds_error!());
        }
        Ok(y * self.width + x)
    }

    /// The tile at column `x`, row `y`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] outside the grid.
    pub fn tile(&self, x: usize, y: usize) -> Result<Tile> {
        let offset = self.offset(x, y)?;
        Ok(self.tiles[offset])
    }

    /// Replace the tile at column `x`, row `y`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] outside the grid.
    pub fn set_tile(&mut self, x: usize, y: usize, tile: Tile) -> Result<()> {
        let offset = self.offset(x, y)?;
        self.tiles[offset] = tile;
        Ok(())
    }

    /// Set every cell to `tile`.
    pub fn fill(&mut self, tile: Tile) {
        self.tiles.fill(tile);
    }

    /// Set cells in row-major order to `first`, `first + 1`, ... keeping the attributes
    /// of `first`. Indices wrap within 11 bits.
    pub fn fill_incrementing(&mut self, first: Tile) {
        for (step, cell) in self.tiles.iter_mut().enumerate() {
            let mut tile = first;
            #[allow(clippy::cast_possible_truncation)]
            tile.set_index(first.index().wrapping_add(step as u16));
            *cell = tile;
        }
    }

    /// Insert a row filled with `fill` before row `at`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `at > height`.
    pub fn insert_row(&mut self, at: usize, fill: Tile) -> Result<()> {
        if at > self.height {
            return Err(out_of_bounds_error!());
        }

        let tail = self.tiles.split_off(at * self.width);
        self.tiles
            .extend(std::iter::repeat(fill).take(self.width).chain(tail));
        self.height += 1;
        Ok(())
    }

    /// Remove row `at`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `at >= height`.
    pub fn delete_row(&mut self, at: usize) -> Result<()> {
        if at >= self.height {
            return Err(out_of_bounds_error!());
        }

        let start = at * self.width;
        self.tiles.drain(start..start + self.width);
        self.height -= 1;
        Ok(())
    }

    /// Insert a column filled with `fill` before column `at`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `at > width`.
    pub fn insert_column(&mut self, at: usize, fill: Tile) -> Result<()> {
        if at > self.width {
            return Err(out_of_bounds_error!());
        }

        for row in (0..self.height).rev() {
            self.tiles.insert(row * self.width + at, fill);
        }
        self.width += 1;
        Ok(())
    }

    /// Remove column `at`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `at >= width`.
    pub fn delete_column(&mut self, at: usize) -> Result<()> {
        if at >= self.width {
            return Err(out_of_bounds_error!());
        }

        for row in (0..self.height).rev() {
            self.tiles.remove(row * self.width + at);
        }
        self.width -= 1;
        Ok(())
    }

    /// Change the grid size, keeping the top-left overlap and filling new cells with `fill`.
    pub fn resize(&mut self, width: usize, height: usize, fill: Tile) {
        let mut tiles = vec![fill; width * height];
        for y in 0..height.min(self.height) {
            for x in 0..width.min(self.width) {
                tiles[y * width + x] = self.tiles[y * self.width + x];
            }
        }

        self.tiles = tiles;
        self.width = width;
        self.height = height;
    }
}

/// Storage format of a tilemap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TilemapCompression {
    /// Two bytes per tile, dimensions supplied externally
    #[default]
    None,
    /// Attribute runs plus tile-index commands
    Rle,
    /// Header and raw tiles wrapped in LZ77
    Lz77,
}

impl TilemapCompression {
    /// File extension (without the dot) used when the map is saved to a source tree.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            TilemapCompression::None => "bin",
            TilemapCompression::Rle => "rle",
            TilemapCompression::Lz77 => "lz77",
        }
    }

    /// Pick the format from a file extension (with or without the dot).
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "bin" => Some(TilemapCompression::None),
            "rle" => Some(TilemapCompression::Rle),
            "lz77" => Some(TilemapCompression::Lz77),
            _ => None,
        }
    }

    /// Pick the format from a file name.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|extension| extension.to_str())
            .and_then(Self::from_extension)
    }
}

/// Encoder/decoder for one tilemap storage format.
///
/// The raw format does not record its dimensions, so a raw codec carries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TilemapCodec {
    compression: TilemapCompression,
    width: usize,
    height: usize,
}

impl TilemapCodec {
    /// Codec for uncompressed maps of a fixed size.
    #[must_use]
    pub const fn raw(width: usize, height: usize) -> Self {
        TilemapCodec {
            compression: TilemapCompression::None,
            width,
            height,
        }
    }

    /// Codec for RLE maps.
    #[must_use]
    pub const fn rle() -> Self {
        TilemapCodec {
            compression: TilemapCompression::Rle,
            width: 0,
            height: 0,
        }
    }

    /// Codec for LZ77 maps.
    #[must_use]
    pub const fn lz77() -> Self {
        TilemapCodec {
            compression: TilemapCompression::Lz77,
            width: 0,
            height: 0,
        }
    }

    /// Codec for `compression`; `width`/`height` are only used by the raw format.
    #[must_use]
    pub const fn new(compression: TilemapCompression, width: usize, height: usize) -> Self {
        TilemapCodec {
            compression,
            width,
            height,
        }
    }

    /// The storage format.
    #[must_use]
    pub const fn compression(&self) -> TilemapCompression {
        self.compression
    }

    /// Encode `map`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidInput`] if the map dimensions cannot be stored, or
    /// for the raw format if they differ from the codec's.
    pub fn encode(&self, map: &Tilemap2D) -> Result<Vec<u8>> {
        match self.compression {
            TilemapCompression::None => {
                if map.width() != self.width || map.height() != self.height {
                    return Err(Error::InvalidInput(format!(
                        "raw tilemap is {}x{}, expected {}x{}",
                        map.width(),
                        map.height(),
                        self.width,
                        self.height
                    )));
                }
                Ok(encode_raw(map))
            }
            TilemapCompression::Rle => encode_rle(map),
            TilemapCompression::Lz77 => encode_lz77(map),
        }
    }

    /// Decode a map, returning it with the number of bytes consumed.
    ///
    /// # Errors
    /// Returns [`crate::Error::CorruptData`] for truncated or malformed input.
    pub fn decode(&self, data: &[u8]) -> Result<(Tilemap2D, usize)> {
        match self.compression {
            TilemapCompression::None => decode_raw(data, self.width, self.height),
            TilemapCompression::Rle => decode_rle(data),
            TilemapCompression::Lz77 => decode_lz77(data),
        }
    }
}

fn dimension_byte(value: usize, what: &str) -> Result<u8> {
    u8::try_from(value)
        .map_err(|_| Error::InvalidInput(format!("tilemap {what} {value} exceeds 255")))
}

/// Pack every tile as two big-endian bytes.
#[must_use]
pub fn encode_raw(map: &Tilemap2D) -> Vec<u8> {
    map.tiles()
        .iter()
        .flat_map(|tile| tile.value().to_be_bytes())
        .collect()
}

/// Unpack a `width` x `height` raw map.
///
/// # Errors
/// Returns [`crate::Error::CorruptData`] if `data` holds fewer than `width * height * 2` bytes.
pub fn decode_raw(data: &[u8], width: usize, height: usize) -> Result<(Tilemap2D, usize)> {
    let size = width * height * 2;
    if data.len() < size {
        return Err(corrupt_data!(
            "raw {}x{} tilemap needs {} bytes, got {}",
            width,
            height,
            size,
            data.len()
        ));
    }

    let tiles = data[..size]
        .chunks_exact(2)
        .map(|pair| Tile::from_value(u16::from_be_bytes([pair[0], pair[1]])))
        .collect();

    Ok((
        Tilemap2D {
            width,
            height,
            left: 0,
            top: 0,
            tiles,
        },
        size,
    ))
}

/// Compress `map` with the RLE format.
///
/// # Errors
/// Returns [`crate::Error::InvalidInput`] if either dimension exceeds 255.
pub fn encode_rle(map: &Tilemap2D) -> Result<Vec<u8>> {
    let mut out = vec![
        dimension_byte(map.width(), "width")?,
        dimension_byte(map.height(), "height")?,
    ];

    encode_attribute_runs(map.tiles(), &mut out);
    encode_index_commands(map.tiles(), &mut out);

    log::trace!(
        "rle: {}x{} tilemap -> {} bytes",
        map.width(),
        map.height(),
        out.len()
    );
    Ok(out)
}

#[allow(clippy::cast_possible_truncation)]
fn encode_attribute_runs(tiles: &[Tile], out: &mut Vec<u8>) {
    let mut position = 0;
    while position < tiles.len() {
        let attributes = tiles[position].value() & ATTRIBUTE_MASK;
        let run = tiles[position..]
            .iter()
            .take(MAX_ATTRIBUTE_RUN)
            .take_while(|tile| tile.value() & ATTRIBUTE_MASK == attributes)
            .count();
        let stored = run - 1;
        let high = (attributes >> 8) as u8;

        if run <= 4 {
            out.push(high | 0x04 | stored as u8);
        } else {
            out.push(high | (stored >> 8) as u8);
            out.push((stored & 0xFF) as u8);
        }
        position += run;
    }

    out.extend_from_slice(&[0x00, 0x00]);
}

fn count_repeats(rest: &[u16], value: u16, limit: usize) -> usize {
    rest.iter().take(limit).take_while(|&&v| v == value).count()
}

#[allow(clippy::cast_possible_truncation)]
fn push_fill(out: &mut Vec<u8>, value: u16, repeats: usize) {
    out.push(0x40 | ((repeats as u8 & 0x07) << 3) | ((value >> 8) as u8 & 0x07));
    out.push((value & 0xFF) as u8);
}

#[allow(clippy::cast_possible_truncation)]
fn encode_index_commands(tiles: &[Tile], out: &mut Vec<u8>) {
    let indices: Vec<u16> = tiles.iter().map(Tile::index).collect();

    if let Some(&first) = indices.first() {
        let repeats = count_repeats(&indices[1..], first, MAX_FILL_REPEATS);
        push_fill(out, first, repeats);

        let mut last = first;
        let mut increment = first;
        let mut position = 1 + repeats;

        while position < indices.len() {
            let value = indices[position];
            let rest = &indices[position + 1..];

            if value == last {
                let repeats = count_repeats(rest, value, MAX_RUN_REPEATS);
                out.push(0x80 | repeats as u8);
                position += 1 + repeats;
            } else if value == increment + 1 {
                let run = rest
                    .iter()
                    .take(MAX_RUN_REPEATS)
                    .zip(value + 1..)
                    .take_while(|(&actual, expected)| actual == *expected)
                    .count();
                out.push(0xC0 | run as u8);
                increment = value + run as u16;
                position += 1 + run;
            } else if value == END_OF_TILES || rest.first() == Some(&value) {
                let repeats = count_repeats(rest, value, MAX_FILL_REPEATS);
                push_fill(out, value, repeats);
                last = value;
                position += 1 + repeats;
            } else {
                out.push((value >> 8) as u8);
                out.push((value & 0xFF) as u8);
                position += 1;
            }
        }
    }

    out.extend_from_slice(&END_OF_TILES.to_be_bytes());
}

/// Decompress an RLE map, returning it with the number of bytes consumed.
///
/// # Errors
/// Returns [`crate::Error::CorruptData`] if the stream is truncated, the attribute runs do
/// not cover the grid exactly, a command runs past the last tile or uses an unset
/// register, or the stream ends before every tile has an index.
pub fn decode_rle(data: &[u8]) -> Result<(Tilemap2D, usize)> {
    if data.len() < MIN_RLE_SIZE {
        return Err(corrupt_data!(
            "RLE tilemap needs at least {} bytes, got {}",
            MIN_RLE_SIZE,
            data.len()
        ));
    }

    let mut parser = Parser::new(data);
    let width = usize::from(parser.read_be::<u8>()?);
    let height = usize::from(parser.read_be::<u8>()?);
    let count = width * height;

    let mut tiles = decode_attribute_runs(&mut parser, count)?;
    decode_index_commands(&mut parser, &mut tiles)?;

    Ok((
        Tilemap2D {
            width,
            height,
            left: 0,
            top: 0,
            tiles,
        },
        parser.pos(),
    ))
}

fn decode_attribute_runs(parser: &mut Parser, count: usize) -> Result<Vec<Tile>> {
    let mut tiles = Vec::with_capacity(count);

    loop {
        let command = parser.read_be::<u8>()?;
        let attributes = u16::from(command & 0xF8) << 8;
        let mut length = usize::from(command & 0x03);

        if command & 0x04 == 0 {
            length = (length << 8) | usize::from(parser.read_be::<u8>()?);
            if length == 0 {
                break;
            }
        }

        if tiles.len() + length + 1 > count {
            return Err(corrupt_data!(
                "attribute run of {} tiles at tile {} overruns the {} tile map",
                length + 1,
                tiles.len(),
                count
            ));
        }
        tiles.extend(std::iter::repeat(Tile::from_value(attributes)).take(length + 1));
    }

    if tiles.len() != count {
        return Err(corrupt_data!(
            "attribute runs cover {} of {} tiles",
            tiles.len(),
            count
        ));
    }
    Ok(tiles)
}

fn assign(tiles: &mut [Tile], position: &mut usize, index: u16, repeats: usize) -> Result<()> {
    if *position + repeats + 1 > tiles.len() {
        return Err(corrupt_data!(
            "tile command of {} tiles at tile {} overruns the {} tile map",
            repeats + 1,
            position,
            tiles.len()
        ));
    }

    for tile in &mut tiles[*position..=*position + repeats] {
        tile.set_index(index);
    }
    *position += repeats + 1;
    Ok(())
}

fn decode_index_commands(parser: &mut Parser, tiles: &mut [Tile]) -> Result<()> {
    let mut position = 0usize;
    let mut last: Option<u16> = None;
    let mut increment: Option<u16> = None;

    loop {
        let command = parser.read_be::<u8>()?;
        match command >> 6 {
            0 => {
                let value = u16::from_be_bytes([command, parser.read_be::<u8>()?]) & Tile::INDEX_MASK;
                if value == END_OF_TILES {
                    break;
                }
                assign(tiles, &mut position, value, 0)?;
            }
            1 => {
                let repeats = usize::from((command & 0x38) >> 3);
                let value = u16::from_be_bytes([command, parser.read_be::<u8>()?]) & Tile::INDEX_MASK;
                assign(tiles, &mut position, value, repeats)?;
                last = Some(value);
                increment.get_or_insert(value);
            }
            2 => {
                let repeats = usize::from(command & 0x3F);
                let Some(value) = last else {
                    return Err(corrupt_data!(
                        "repeat command at tile {} before any fill command",
                        position
                    ));
                };
                assign(tiles, &mut position, value, repeats)?;
            }
            _ => {
                let repeats = usize::from(command & 0x3F);
                let Some(mut value) = increment else {
                    return Err(corrupt_data!(
                        "increment command at tile {} before any fill command",
                        position
                    ));
                };
                for _ in 0..=repeats {
                    value += 1;
                    if value > Tile::MAX_INDEX {
                        return Err(corrupt_data!(
                            "increment run passes the largest tile index at tile {}",
                            position
                        ));
                    }
                    assign(tiles, &mut position, value, 0)?;
                }
                increment = Some(value);
            }
        }
    }

    if position != tiles.len() {
        return Err(corrupt_data!(
            "tile stream ended after {} of {} tiles",
            position,
            tiles.len()
        ));
    }
    Ok(())
}

/// Compress `map` with the LZ77 format.
///
/// # Errors
/// Returns [`crate::Error::InvalidInput`] if either dimension exceeds 255.
pub fn encode_lz77(map: &Tilemap2D) -> Result<Vec<u8>> {
    let mut payload = Vec::with_capacity(LZ77_HEADER_SIZE + map.tiles().len() * 2);
    payload.push(map.left());
    payload.push(map.top());
    payload.push(dimension_byte(map.width(), "width")?);
    payload.push(dimension_byte(map.height(), "height")?);
    payload.extend(encode_raw(map));

    Ok(lz77::encode(&payload))
}

/// Decompress an LZ77 map, returning it with the number of compressed bytes consumed.
///
/// # Errors
/// Returns [`crate::Error::CorruptData`] if the LZ77 stream is invalid or the payload is
/// shorter than its header and declared tiles.
pub fn decode_lz77(data: &[u8]) -> Result<(Tilemap2D, usize)> {
    let (payload, consumed) = lz77::decode(data)?;
    if payload.len() < LZ77_HEADER_SIZE {
        return Err(corrupt_data!(
            "LZ77 tilemap payload of {} bytes has no header",
            payload.len()
        ));
    }

    let (left, top) = (payload[0], payload[1]);
    let (width, height) = (usize::from(payload[2]), usize::from(payload[3]));
    let (mut map, _) = decode_raw(&payload[LZ77_HEADER_SIZE..], width, height)?;
    map.set_origin(left, top);

    Ok((map, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::TileAttributes;
    use strum::IntoEnumIterator;

    fn indexed(width: usize, height: usize, indices: &[u16]) -> Tilemap2D {
        Tilemap2D::with_tiles(width, height, indices.iter().map(|&i| Tile::new(i)).collect())
            .unwrap()
    }

    #[test]
    fn increment_then_repeat() {
        let map = indexed(5, 1, &[0x100, 0x101, 0x102, 0x102, 0x102]);
        let bytes = encode_rle(&map).unwrap();
        assert_eq!(
            bytes,
            vec![
                0x05, 0x01, // header
                0x00, 0x04, 0x00, 0x00, // 5 tiles without attributes
                0x41, 0x00, // fill 0x100
                0xC1, // two increments
                0x49, 0x02, // 0x102 twice
                0x07, 0xFF,
            ]
        );

        let (decoded, consumed) = decode_rle(&bytes).unwrap();
        assert_eq!(decoded, map);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn literal_path_decodes_identically() {
        // Same grid written with literals only.
        let bytes = [
            0x05, 0x01, 0x00, 0x04, 0x00, 0x00, 0x41, 0x00, 0x01, 0x01, 0x01, 0x02, 0x01, 0x02,
            0x01, 0x02, 0x07, 0xFF,
        ];
        let (decoded, _) = decode_rle(&bytes).unwrap();
        assert_eq!(decoded, indexed(5, 1, &[0x100, 0x101, 0x102, 0x102, 0x102]));
    }

    #[test]
    fn attributes_survive() {
        let mut map = Tilemap2D::new(6, 3);
        map.fill_incrementing(Tile::new(0x20));
        for x in 0..6 {
            let mut tile = map.tile(x, 1).unwrap();
            *tile.attributes_mut() |= TileAttributes::PRIORITY;
            tile.set_palette(3);
            map.set_tile(x, 1, tile).unwrap();
        }
        map.set_tile(2, 2, Tile::new(0x7FF).with_attributes(TileAttributes::HFLIP))
            .unwrap();

        for codec in [TilemapCodec::rle(), TilemapCodec::lz77(), TilemapCodec::raw(6, 3)] {
            let bytes = codec.encode(&map).unwrap();
            let (decoded, consumed) = codec.decode(&bytes).unwrap();
            assert_eq!(decoded, map, "{:?}", codec.compression());
            assert_eq!(consumed, bytes.len());
        }
    }

    #[test]
    fn long_attribute_runs() {
        let mut map = Tilemap2D::new(40, 30);
        map.fill(Tile::new(1).with_attributes(TileAttributes::VFLIP));
        let bytes = encode_rle(&map).unwrap();
        // 1200 tiles need two runs: 0x400 and 0xB0
        assert_eq!(&bytes[2..8], &[0x13, 0xFF, 0x10, 0xAF, 0x00, 0x00]);
        assert_eq!(decode_rle(&bytes).unwrap().0, map);
    }

    #[test]
    fn four_tile_attribute_run() {
        let map = indexed(4, 1, &[9, 8, 7, 6]);
        let bytes = encode_rle(&map).unwrap();
        assert_eq!(bytes[2], 0x07);
        assert_eq!(decode_rle(&bytes).unwrap().0, map);
    }

    #[test]
    fn sentinel_index_is_not_a_terminator() {
        let map = indexed(3, 1, &[5, 0x7FF, 5]);
        let bytes = encode_rle(&map).unwrap();
        assert_eq!(decode_rle(&bytes).unwrap().0, map);
    }

    #[test]
    fn empty_map() {
        let map = Tilemap2D::new(0, 0);
        let bytes = encode_rle(&map).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0, 0x07, 0xFF]);
        assert_eq!(decode_rle(&bytes).unwrap(), (map, 6));
    }

    #[test]
    fn repeat_before_fill_is_corrupt() {
        let bytes = [0x02, 0x01, 0x05, 0x00, 0x00, 0x81, 0x07, 0xFF];
        assert!(matches!(decode_rle(&bytes), Err(Error::CorruptData { .. })));

        let bytes = [0x02, 0x01, 0x05, 0x00, 0x00, 0xC1, 0x07, 0xFF];
        assert!(matches!(decode_rle(&bytes), Err(Error::CorruptData { .. })));
    }

    #[test]
    fn incomplete_tile_stream_is_corrupt() {
        let bytes = [0x02, 0x01, 0x05, 0x00, 0x00, 0x40, 0x01, 0x07, 0xFF];
        assert!(matches!(decode_rle(&bytes), Err(Error::CorruptData { .. })));
    }

    #[test]
    fn overrunning_commands_are_corrupt() {
        // attribute run of 3 tiles in a 2 tile map
        let bytes = [0x02, 0x01, 0x06, 0x00, 0x00, 0x49, 0x01, 0x07, 0xFF];
        assert!(decode_rle(&bytes).is_err());
        // fill of 2 tiles after one tile was set
        let bytes = [0x02, 0x01, 0x05, 0x00, 0x00, 0x00, 0x01, 0x48, 0x01, 0x07, 0xFF];
        assert!(decode_rle(&bytes).is_err());
    }

    #[test]
    fn truncated_rle() {
        let map = indexed(3, 2, &[1, 2, 3, 10, 10, 10]);
        let bytes = encode_rle(&map).unwrap();
        for cut in 0..bytes.len() {
            assert!(decode_rle(&bytes[..cut]).is_err());
        }
    }

    #[test]
    fn lz77_keeps_origin() {
        let mut map = indexed(2, 2, &[1, 2, 3, 4]);
        map.set_origin(3, 7);
        let bytes = encode_lz77(&map).unwrap();
        assert_eq!(decode_lz77(&bytes).unwrap().0, map);
    }

    #[test]
    fn raw_size_checks() {
        let map = indexed(2, 1, &[0x0123, 0x0001]);
        assert_eq!(encode_raw(&map), vec![0x01, 0x23, 0x00, 0x01]);
        assert!(decode_raw(&[0x00, 0x01, 0x02], 2, 1).is_err());
        assert!(TilemapCodec::raw(3, 1).encode(&map).is_err());
    }

    #[test]
    fn oversized_maps_rejected() {
        let map = Tilemap2D::new(256, 1);
        assert!(matches!(encode_rle(&map), Err(Error::InvalidInput(_))));
        assert!(matches!(encode_lz77(&map), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn editing() {
        let mut map = indexed(3, 2, &[1, 2, 3, 4, 5, 6]);
        let fill = Tile::new(9);

        map.insert_row(1, fill).unwrap();
        assert_eq!(map.height(), 3);
        assert_eq!(map.tile(0, 1).unwrap(), fill);
        assert_eq!(map.tile(2, 2).unwrap(), Tile::new(6));

        map.delete_row(1).unwrap();
        assert_eq!(map, indexed(3, 2, &[1, 2, 3, 4, 5, 6]));

        map.insert_column(3, fill).unwrap();
        assert_eq!(map.width(), 4);
        assert_eq!(map.tile(3, 0).unwrap(), fill);
        assert_eq!(map.tile(0, 1).unwrap(), Tile::new(4));

        map.delete_column(0).unwrap();
        assert_eq!(map, indexed(3, 2, &[2, 3, 9, 5, 6, 9]));

        map.resize(2, 3, fill);
        assert_eq!(map, indexed(2, 3, &[2, 3, 5, 6, 9, 9]));

        assert!(map.tile(2, 0).is_err());
        assert!(map.delete_row(3).is_err());
        assert!(map.insert_column(4, fill).is_err());
    }

    #[test]
    fn compression_extensions() {
        for compression in TilemapCompression::iter() {
            assert_eq!(
                TilemapCompression::from_extension(compression.extension()),
                Some(compression)
            );
        }
        assert_eq!(
            TilemapCompression::from_path(Path::new("maps/title.LZ77")),
            Some(TilemapCompression::Lz77)
        );
        assert_eq!("rle".parse::<TilemapCompression>().unwrap(), TilemapCompression::Rle);
        assert_eq!(TilemapCompression::from_extension("png"), None);
    }
}
