// Copyright 2025 The romkit developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
// - 'rom/backend.rs' uses mmap to map a ROM image into memory

//! # romkit
//!
//! Asset editing core for a 16-bit console action RPG. `romkit` loads the game's assets
//! either from a disassembled assembly project or straight from a ROM image, tracks every
//! edit against the loaded original, and writes the result back, either as project files
//! or as a ROM patch that is checked for fit before anything is overwritten.
//!
//! ## Features
//!
//! - **Bit-exact codecs** - the game's blockset compressor and its RLE/LZ77 tilemap formats
//! - **Value-based change tracking** - an asset edited back to its loaded value is unchanged
//! - **Byte-for-byte fidelity** - untouched assets are written back exactly as read
//! - **Dry-run injection** - itemised fit reports before any ROM byte is patched
//! - **Thread-shareable sessions** - progress polling and busy rejection for UI front ends
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use romkit::prelude::*;
//!
//! let layout = RomLayout::default()
//!     .with_section("Blocksets", Section::new(0x1E_0000, 0x1E_8000))
//!     .with_section("BlocksetPtrs", Section::new(0x1D_FF00, 0x1D_FF40));
//! let catalog = GameCatalog::default().with_rooms(RoomCatalog::default().with_blockset(
//!     AssetSpec::new("Blockset00", "blocksets/bs00.cbs", Placement::in_table("Blocksets", "BlocksetPtrs", 0)),
//! ));
//!
//! let mut rom = Rom::from_file("game.bin", layout)?;
//! let session = Session::new();
//! session.open_rom(&rom, &catalog)?;
//!
//! session.with_data(|data| {
//!     let blockset = data.rooms_mut()?.blockset_mut("Blockset00").ok_or(Error::NotReady)?;
//!     blockset.current_mut()[0].tiles[0] = Tile::new(0x123);
//!     Ok::<(), Error>(())
//! })??;
//!
//! session.refresh_pending_writes(&rom)?;
//! let report = session.fit_report(&rom)?;
//! print!("{report}");
//! if report.fits() {
//!     session.inject_into_rom(&mut rom)?;
//!     rom.write_to_file("patched.bin")?;
//! }
//! # Ok::<(), romkit::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`codec`] - pure byte codecs: blocksets, tilemaps, LZ77
//! - [`assets`] - typed assets, [`assets::VersionedEntry`] change tracking, pending writes
//! - [`rom`] - the ROM accessor with named sections and addresses
//! - [`source`] - label resolution in an assembly project
//! - [`manager`] - the [`manager::AssetManager`] contract and the concrete managers
//! - [`GameData`] and [`Session`] - aggregation, lifecycle and the busy guard
//! - [`Error`] and [`Result`] - error handling
//!
//! ## Logging
//!
//! `romkit` logs through the [`log`] facade and never installs a logger. ROM writes and
//! fit verdicts are logged at `debug`, checksum mismatches and failed fits at `warn`.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Asset types, codecs binding them to bytes, and versioned change tracking.
pub mod assets;

/// The game's binary formats.
pub mod codec;

/// The top-level aggregator and its lifecycle.
pub mod gamedata;

/// Asset managers and their ROM layout.
pub mod manager;

/// Convenient re-exports of the most frequently used types.
///
/// ```rust,ignore
/// use romkit::prelude::*;
///
/// let blocks = vec![Block::default(); 4];
/// let bytes = BlockCodec::encode(&blocks)?;
/// # Ok::<(), romkit::Error>(())
/// ```
pub mod prelude;

/// The ROM image accessor.
pub mod rom;

/// Thread-shareable sessions.
pub mod session;

/// Assembly project trees.
pub mod source;

/// Big-endian IO and progress reporting.
pub mod utils;

/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
///
/// ```rust,ignore
/// use romkit::{codec::BlockCodec, Result};
///
/// fn count_blocks(data: &[u8]) -> Result<usize> {
///     Ok(BlockCodec::decode(data)?.0.len())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `romkit` Error type
///
/// ```rust,ignore
/// use romkit::{codec::TilemapCodec, Error};
///
/// match TilemapCodec::rle().decode(&data) {
///     Ok((map, _)) => println!("{}x{}", map.width(), map.height()),
///     Err(Error::CorruptData { message, .. }) => println!("Corrupt: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

pub use gamedata::{GameData, SessionState};
pub use manager::{AssetManager, GameCatalog};
pub use rom::{Rom, RomLayout, Section};
pub use session::Session;
