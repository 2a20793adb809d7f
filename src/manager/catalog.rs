//! Typed descriptions of the assets each manager loads.
//!
//! A catalog lists, per asset, its label, the file it is saved to, where it lives in the
//! ROM and any format parameters. Catalogs are plain data built with the `with_*` methods;
//! the game revision supplies them together with its [`crate::rom::RomLayout`].
//!
//! ```rust,ignore
//! use romkit::manager::{AssetSpec, GameCatalog, Placement, RoomCatalog};
//!
//! let rooms = RoomCatalog::default().with_blockset(AssetSpec::new(
//!     "Blockset00",
//!     "blocksets/blockset00.cbs",
//!     Placement::in_table("Blocksets", "BlocksetPtrs", 0),
//! ));
//! let catalog = GameCatalog::default().with_rooms(rooms);
//! ```

use std::path::PathBuf;

use crate::{
    assets::PaletteKind,
    codec::{TilemapCodec, TilemapCompression},
    manager::Placement,
};

/// Label, default file and ROM placement of one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSpec {
    /// Asset label, also used to resolve the asset in an assembly tree
    pub name: String,
    /// File the asset is saved to when loaded from a ROM
    pub file: PathBuf,
    /// Location in the ROM
    pub placement: Placement,
}

impl AssetSpec {
    /// Describe an asset.
    pub fn new(name: impl Into<String>, file: impl Into<PathBuf>, placement: Placement) -> Self {
        AssetSpec {
            name: name.into(),
            file: file.into(),
            placement,
        }
    }
}

/// A tilemap and its compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilemapSpec {
    /// Label, file and placement
    pub asset: AssetSpec,
    /// Stored format
    pub compression: TilemapCompression,
    /// Width for uncompressed maps
    pub width: usize,
    /// Height for uncompressed maps
    pub height: usize,
}

impl TilemapSpec {
    /// A compressed tilemap; its dimensions are stored in the stream.
    #[must_use]
    pub fn compressed(asset: AssetSpec, compression: TilemapCompression) -> Self {
        TilemapSpec {
            asset,
            compression,
            width: 0,
            height: 0,
        }
    }

    /// An uncompressed `width` x `height` tilemap.
    #[must_use]
    pub fn raw(asset: AssetSpec, width: usize, height: usize) -> Self {
        TilemapSpec {
            asset,
            compression: TilemapCompression::None,
            width,
            height,
        }
    }

    /// Codec for this tilemap.
    #[must_use]
    pub fn codec(&self) -> TilemapCodec {
        TilemapCodec::new(self.compression, self.width, self.height)
    }
}

/// A palette and its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteSpec {
    /// Label, file and placement
    pub asset: AssetSpec,
    /// Palette family
    pub kind: PaletteKind,
}

impl PaletteSpec {
    /// Describe a palette.
    #[must_use]
    pub fn new(asset: AssetSpec, kind: PaletteKind) -> Self {
        PaletteSpec { asset, kind }
    }
}

/// Assets of [`crate::manager::RoomData`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomCatalog {
    /// Compressed blocksets
    pub blocksets: Vec<AssetSpec>,
    /// Room palettes
    pub palettes: Vec<PaletteSpec>,
}

impl RoomCatalog {
    /// Add a blockset.
    #[must_use]
    pub fn with_blockset(mut self, spec: AssetSpec) -> Self {
        self.blocksets.push(spec);
        self
    }

    /// Add a room palette.
    #[must_use]
    pub fn with_palette(mut self, spec: PaletteSpec) -> Self {
        self.palettes.push(spec);
        self
    }
}

/// Assets of [`crate::manager::GraphicsData`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphicsCatalog {
    /// Tilemaps
    pub tilemaps: Vec<TilemapSpec>,
    /// Uncompressed tile graphics
    pub tilesets: Vec<AssetSpec>,
    /// UI and sprite palettes
    pub palettes: Vec<PaletteSpec>,
}

impl GraphicsCatalog {
    /// Add a tilemap.
    #[must_use]
    pub fn with_tilemap(mut self, spec: TilemapSpec) -> Self {
        self.tilemaps.push(spec);
        self
    }

    /// Add a tileset.
    #[must_use]
    pub fn with_tileset(mut self, spec: AssetSpec) -> Self {
        self.tilesets.push(spec);
        self
    }

    /// Add a palette.
    #[must_use]
    pub fn with_palette(mut self, spec: PaletteSpec) -> Self {
        self.palettes.push(spec);
        self
    }
}

/// Assets of [`crate::manager::ScriptData`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptCatalog {
    /// Script banks
    pub banks: Vec<AssetSpec>,
}

impl ScriptCatalog {
    /// Add a script bank.
    #[must_use]
    pub fn with_bank(mut self, spec: AssetSpec) -> Self {
        self.banks.push(spec);
        self
    }
}

/// Everything a [`crate::GameData`] session loads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameCatalog {
    /// Room assets
    pub rooms: RoomCatalog,
    /// Graphics assets
    pub graphics: GraphicsCatalog,
    /// Script assets
    pub scripts: ScriptCatalog,
}

impl GameCatalog {
    /// Replace the room catalog.
    #[must_use]
    pub fn with_rooms(mut self, rooms: RoomCatalog) -> Self {
        self.rooms = rooms;
        self
    }

    /// Replace the graphics catalog.
    #[must_use]
    pub fn with_graphics(mut self, graphics: GraphicsCatalog) -> Self {
        self.graphics = graphics;
        self
    }

    /// Replace the script catalog.
    #[must_use]
    pub fn with_scripts(mut self, scripts: ScriptCatalog) -> Self {
        self.scripts = scripts;
        self
    }
}
