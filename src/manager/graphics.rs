//! Tilemaps, uncompressed tile graphics and UI palettes.

use crate::{
    assets::{PaletteFormat, PendingWrites, RawFormat, TrackedEntry, VersionedEntry},
    codec::TilemapCodec,
    manager::{
        plan_writes,
        tracked::{self, Placed},
        AssetManager, GraphicsCatalog,
    },
    rom::Rom,
    source::SourceTree,
    Result,
};

/// Manager for the game's UI graphics.
#[derive(Debug, Default)]
pub struct GraphicsData {
    tilemaps: Vec<Placed<TilemapCodec>>,
    tilesets: Vec<Placed<RawFormat>>,
    palettes: Vec<Placed<PaletteFormat>>,
    pending: PendingWrites,
}

fn find<'a, C: crate::assets::Codec + 'a>(
    mut entries: impl Iterator<Item = &'a VersionedEntry<C>>,
    name: &str,
) -> Option<&'a VersionedEntry<C>> {
    entries.find(|entry| entry.name() == name)
}

fn find_mut<'a, C: crate::assets::Codec>(
    placed: &'a mut [Placed<C>],
    name: &str,
) -> Option<&'a mut VersionedEntry<C>> {
    placed
        .iter_mut()
        .map(|placed| &mut placed.entry)
        .find(|entry| entry.name() == name)
}

impl GraphicsData {
    /// Load every catalogued graphics asset from `rom`.
    ///
    /// # Errors
    /// Fails if any asset cannot be located or decoded.
    pub fn from_rom(rom: &Rom, catalog: &GraphicsCatalog) -> Result<Self> {
        let tilemaps: Vec<_> = catalog
            .tilemaps
            .iter()
            .map(|spec| (spec.asset.clone(), spec.codec()))
            .collect();
        let tilesets: Vec<_> = catalog
            .tilesets
            .iter()
            .map(|spec| (spec.clone(), RawFormat))
            .collect();
        let palettes: Vec<_> = catalog
            .palettes
            .iter()
            .map(|spec| (spec.asset.clone(), PaletteFormat(spec.kind)))
            .collect();

        let [tilemap_ranges, tileset_ranges, palette_ranges] = tracked::locate_groups(
            rom,
            [
                tracked::placements(&tilemaps),
                tracked::placements(&tilesets),
                tracked::placements(&palettes),
            ],
        )?;

        Ok(GraphicsData {
            tilemaps: tracked::from_rom(rom, tilemaps, tilemap_ranges)?,
            tilesets: tracked::from_rom(rom, tilesets, tileset_ranges)?,
            palettes: tracked::from_rom(rom, palettes, palette_ranges)?,
            pending: PendingWrites::new(),
        })
    }

    /// Load every catalogued graphics asset from an assembly tree.
    ///
    /// # Errors
    /// Fails if any label is unknown or any file cannot be read or decoded.
    pub fn from_source(tree: &dyn SourceTree, catalog: &GraphicsCatalog) -> Result<Self> {
        Ok(GraphicsData {
            tilemaps: tracked::from_source(
                tree,
                catalog
                    .tilemaps
                    .iter()
                    .map(|spec| (spec.asset.clone(), spec.codec())),
            )?,
            tilesets: tracked::from_source(
                tree,
                catalog.tilesets.iter().map(|spec| (spec.clone(), RawFormat)),
            )?,
            palettes: tracked::from_source(
                tree,
                catalog
                    .palettes
                    .iter()
                    .map(|spec| (spec.asset.clone(), PaletteFormat(spec.kind))),
            )?,
            pending: PendingWrites::new(),
        })
    }

    /// Tilemap entries in catalog order.
    pub fn tilemaps(&self) -> impl Iterator<Item = &VersionedEntry<TilemapCodec>> {
        self.tilemaps.iter().map(|placed| &placed.entry)
    }

    /// The tilemap labelled `name`.
    #[must_use]
    pub fn tilemap(&self, name: &str) -> Option<&VersionedEntry<TilemapCodec>> {
        find(self.tilemaps(), name)
    }

    /// Mutable access to the tilemap labelled `name`.
    pub fn tilemap_mut(&mut self, name: &str) -> Option<&mut VersionedEntry<TilemapCodec>> {
        find_mut(&mut self.tilemaps, name)
    }

    /// Tileset entries in catalog order.
    pub fn tilesets(&self) -> impl Iterator<Item = &VersionedEntry<RawFormat>> {
        self.tilesets.iter().map(|placed| &placed.entry)
    }

    /// The tileset labelled `name`.
    #[must_use]
    pub fn tileset(&self, name: &str) -> Option<&VersionedEntry<RawFormat>> {
        find(self.tilesets(), name)
    }

    /// Mutable access to the tileset labelled `name`.
    pub fn tileset_mut(&mut self, name: &str) -> Option<&mut VersionedEntry<RawFormat>> {
        find_mut(&mut self.tilesets, name)
    }

    /// Palette entries in catalog order.
    pub fn palettes(&self) -> impl Iterator<Item = &VersionedEntry<PaletteFormat>> {
        self.palettes.iter().map(|placed| &placed.entry)
    }

    /// The palette labelled `name`.
    #[must_use]
    pub fn palette(&self, name: &str) -> Option<&VersionedEntry<PaletteFormat>> {
        find(self.palettes(), name)
    }

    /// Mutable access to the palette labelled `name`.
    pub fn palette_mut(&mut self, name: &str) -> Option<&mut VersionedEntry<PaletteFormat>> {
        find_mut(&mut self.palettes, name)
    }
}

impl AssetManager for GraphicsData {
    fn description(&self) -> &str {
        "Graphics Data"
    }

    fn entries(&self) -> Vec<&dyn TrackedEntry> {
        let tilemaps = self
            .tilemaps
            .iter()
            .map(|placed| &placed.entry as &dyn TrackedEntry);
        let tilesets = self
            .tilesets
            .iter()
            .map(|placed| &placed.entry as &dyn TrackedEntry);
        let palettes = self
            .palettes
            .iter()
            .map(|placed| &placed.entry as &dyn TrackedEntry);
        tilemaps.chain(tilesets).chain(palettes).collect()
    }

    fn entries_mut(&mut self) -> Vec<&mut dyn TrackedEntry> {
        let tilemaps = self
            .tilemaps
            .iter_mut()
            .map(|placed| &mut placed.entry as &mut dyn TrackedEntry);
        let tilesets = self
            .tilesets
            .iter_mut()
            .map(|placed| &mut placed.entry as &mut dyn TrackedEntry);
        let palettes = self
            .palettes
            .iter_mut()
            .map(|placed| &mut placed.entry as &mut dyn TrackedEntry);
        tilemaps.chain(tilesets).chain(palettes).collect()
    }

    fn pending(&self) -> &PendingWrites {
        &self.pending
    }

    fn pending_mut(&mut self) -> &mut PendingWrites {
        &mut self.pending
    }

    fn prepare_writes(&mut self, rom: &Rom) -> Result<PendingWrites> {
        let slots = self
            .tilemaps
            .iter_mut()
            .map(Placed::slot)
            .chain(self.tilesets.iter_mut().map(Placed::slot))
            .chain(self.palettes.iter_mut().map(Placed::slot))
            .collect();
        plan_writes(rom, slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assets::{Colour, PaletteKind},
        manager::{AssetSpec, PaletteSpec, Placement},
        rom::{RomLayout, Section},
    };

    /// An 8-byte tileset and a 4-byte palette packed into one section through a table.
    fn shared_section() -> (Rom, GraphicsCatalog) {
        let mut data = vec![0u8; 0x400];
        data[0x100..0x104].copy_from_slice(&0x200u32.to_be_bytes());
        data[0x104..0x108].copy_from_slice(&0x208u32.to_be_bytes());
        data[0x200..0x208].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        data[0x208..0x20C].copy_from_slice(&[0x0E, 0xEE, 0x00, 0x22]);

        let layout = RomLayout::default()
            .with_section("Gfx", Section::new(0x200, 0x20C))
            .with_section("GfxPtrs", Section::new(0x100, 0x108));
        let catalog = GraphicsCatalog::default()
            .with_tileset(AssetSpec::new(
                "Tiles",
                "gfx/tiles.bin",
                Placement::in_table("Gfx", "GfxPtrs", 0),
            ))
            .with_palette(PaletteSpec::new(
                AssetSpec::new("Sword", "gfx/sword.pal", Placement::in_table("Gfx", "GfxPtrs", 1)),
                PaletteKind::Sword,
            ));
        (Rom::from_mem(data, layout), catalog)
    }

    #[test]
    fn groups_sharing_a_section_bound_each_other() {
        let (rom, catalog) = shared_section();
        let graphics = GraphicsData::from_rom(&rom, &catalog).unwrap();

        let tiles = graphics.tileset("Tiles").unwrap();
        assert_eq!(tiles.current(), &vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(tiles.raw_bytes().len(), 8);

        let sword = graphics.palette("Sword").unwrap();
        assert_eq!(sword.start_address(), Some(0x208));
        assert_eq!(sword.current().colour(13), Some(Colour(0x0EEE)));
        assert_eq!(sword.current().colour(14), Some(Colour(0x0022)));
    }

    #[test]
    fn untouched_shared_section_reinjects_unchanged() {
        let (rom, catalog) = shared_section();
        let mut graphics = GraphicsData::from_rom(&rom, &catalog).unwrap();

        graphics.refresh_pending_writes(&rom).unwrap();
        let report = graphics.fit_report(&rom);
        assert!(report.fits(), "{report}");
        assert_eq!(report.entries()[0].required, 12);

        let mut patched = rom.clone();
        graphics.inject_into_rom(&mut patched).unwrap();
        assert_eq!(patched.data(), rom.data());
    }
}
