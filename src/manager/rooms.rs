//! Room blocksets and room palettes.

use crate::{
    assets::{BlocksetFormat, PaletteFormat, PendingWrites, TrackedEntry, VersionedEntry},
    manager::{
        plan_writes,
        tracked::{self, Placed},
        AssetManager, RoomCatalog,
    },
    rom::Rom,
    source::SourceTree,
    Result,
};

/// Manager for the blocksets and palettes rooms are drawn with.
#[derive(Debug, Default)]
pub struct RoomData {
    blocksets: Vec<Placed<BlocksetFormat>>,
    palettes: Vec<Placed<PaletteFormat>>,
    pending: PendingWrites,
}

impl RoomData {
    /// Load every catalogued room asset from `rom`.
    ///
    /// # Errors
    /// Fails if any asset cannot be located or decoded.
    pub fn from_rom(rom: &Rom, catalog: &RoomCatalog) -> Result<Self> {
        let blocksets: Vec<_> = catalog
            .blocksets
            .iter()
            .map(|spec| (spec.clone(), BlocksetFormat))
            .collect();
        let palettes: Vec<_> = catalog
            .palettes
            .iter()
            .map(|spec| (spec.asset.clone(), PaletteFormat(spec.kind)))
            .collect();

        let [blockset_ranges, palette_ranges] = tracked::locate_groups(
            rom,
            [tracked::placements(&blocksets), tracked::placements(&palettes)],
        )?;

        Ok(RoomData {
            blocksets: tracked::from_rom(rom, blocksets, blockset_ranges)?,
            palettes: tracked::from_rom(rom, palettes, palette_ranges)?,
            pending: PendingWrites::new(),
        })
    }

    /// Load every catalogued room asset from an assembly tree.
    ///
    /// # Errors
    /// Fails if any label is unknown or any file cannot be read or decoded.
    pub fn from_source(tree: &dyn SourceTree, catalog: &RoomCatalog) -> Result<Self> {
        let blocksets = tracked::from_source(
            tree,
            catalog.blocksets.iter().map(|spec| (spec.clone(), BlocksetFormat)),
        )?;
        let palettes = tracked::from_source(
            tree,
            catalog
                .palettes
                .iter()
                .map(|spec| (spec.asset.clone(), PaletteFormat(spec.kind))),
        )?;

        Ok(RoomData {
            blocksets,
            palettes,
            pending: PendingWrites::new(),
        })
    }

    /// Blockset entries in catalog order.
    pub fn blocksets(&self) -> impl Iterator<Item = &VersionedEntry<BlocksetFormat>> {
        self.blocksets.iter().map(|placed| &placed.entry)
    }

    /// The blockset labelled `name`.
    #[must_use]
    pub fn blockset(&self, name: &str) -> Option<&VersionedEntry<BlocksetFormat>> {
        self.blocksets().find(|entry| entry.name() == name)
    }

    /// Mutable access to the blockset labelled `name`.
    pub fn blockset_mut(&mut self, name: &str) -> Option<&mut VersionedEntry<BlocksetFormat>> {
        self.blocksets
            .iter_mut()
            .map(|placed| &mut placed.entry)
            .find(|entry| entry.name() == name)
    }

    /// Room palette entries in catalog order.
    pub fn palettes(&self) -> impl Iterator<Item = &VersionedEntry<PaletteFormat>> {
        self.palettes.iter().map(|placed| &placed.entry)
    }

    /// The room palette labelled `name`.
    #[must_use]
    pub fn palette(&self, name: &str) -> Option<&VersionedEntry<PaletteFormat>> {
        self.palettes().find(|entry| entry.name() == name)
    }

    /// Mutable access to the room palette labelled `name`.
    pub fn palette_mut(&mut self, name: &str) -> Option<&mut VersionedEntry<PaletteFormat>> {
        self.palettes
            .iter_mut()
            .map(|placed| &mut placed.entry)
            .find(|entry| entry.name() == name)
    }
}

impl AssetManager for RoomData {
    fn description(&self) -> &str {
        "Room Data"
    }

    fn entries(&self) -> Vec<&dyn TrackedEntry> {
        self.blocksets
            .iter()
            .map(|placed| &placed.entry as &dyn TrackedEntry)
            .chain(
                self.palettes
                    .iter()
                    .map(|placed| &placed.entry as &dyn TrackedEntry),
            )
            .collect()
    }

    fn entries_mut(&mut self) -> Vec<&mut dyn TrackedEntry> {
        self.blocksets
            .iter_mut()
            .map(|placed| &mut placed.entry as &mut dyn TrackedEntry)
            .chain(
                self.palettes
                    .iter_mut()
                    .map(|placed| &mut placed.entry as &mut dyn TrackedEntry),
            )
            .collect()
    }

    fn pending(&self) -> &PendingWrites {
        &self.pending
    }

    fn pending_mut(&mut self) -> &mut PendingWrites {
        &mut self.pending
    }

    fn prepare_writes(&mut self, rom: &Rom) -> Result<PendingWrites> {
        let slots = self
            .blocksets
            .iter_mut()
            .map(Placed::slot)
            .chain(self.palettes.iter_mut().map(Placed::slot))
            .collect();
        plan_writes(rom, slots)
    }
}
