//! # romkit Prelude
//!
//! The most commonly used types and traits of the romkit library. Import this module to
//! get quick access to everything needed to load, edit and write back game assets.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all romkit operations
pub use crate::Error;

/// The result type used throughout romkit
pub use crate::Result;

// ================================================================================================
// Sessions
// ================================================================================================

/// Aggregated game data and its lifecycle
pub use crate::gamedata::{GameData, SessionState};

/// Thread-shareable session with progress reporting
pub use crate::session::Session;

/// Progress pair polled by front ends
pub use crate::utils::Progress;

// ================================================================================================
// ROM and Project Access
// ================================================================================================

/// ROM accessor and layout
pub use crate::rom::{Rom, RomLayout, Section};

/// Assembly project resolution
pub use crate::source::{IncbinIndex, SourceTree};

// ================================================================================================
// Managers and Catalogs
// ================================================================================================

/// Asset manager contract and concrete managers
pub use crate::manager::{AssetManager, GraphicsData, RoomData, ScriptData};

/// Catalog types describing what to load
pub use crate::manager::{
    AssetSpec, GameCatalog, GraphicsCatalog, PaletteSpec, Placement, RoomCatalog, ScriptCatalog,
    TilemapSpec,
};

// ================================================================================================
// Assets
// ================================================================================================

/// Change tracking
pub use crate::assets::{Codec, RawEntry, TrackedEntry, VersionedEntry};

/// Asset formats
pub use crate::assets::{BlocksetFormat, PaletteFormat, RawFormat};

/// Palettes
pub use crate::assets::{Colour, Palette, PaletteKind};

/// ROM injection queue and fit check
pub use crate::assets::{FitReport, FitStatus, PendingWrite, PendingWrites};

// ================================================================================================
// Codecs
// ================================================================================================

/// Tiles and blocks
pub use crate::codec::{Block, Blockset, Tile, TileAttributes};

/// Blockset and tilemap codecs
pub use crate::codec::{BlockCodec, Tilemap2D, TilemapCodec, TilemapCompression};
