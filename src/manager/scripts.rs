//! Binary script banks, each stored verbatim in its own section.

use crate::{
    assets::{PendingWrites, RawFormat, TrackedEntry, VersionedEntry},
    manager::{
        plan_writes,
        tracked::{self, Placed},
        AssetManager, ScriptCatalog,
    },
    rom::Rom,
    source::SourceTree,
    Result,
};

/// Manager for the binary script banks.
#[derive(Debug, Default)]
pub struct ScriptData {
    banks: Vec<Placed<RawFormat>>,
    pending: PendingWrites,
}

impl ScriptData {
    /// Load every catalogued script bank from `rom`.
    ///
    /// # Errors
    /// Fails if any bank cannot be located.
    pub fn from_rom(rom: &Rom, catalog: &ScriptCatalog) -> Result<Self> {
        let banks: Vec<_> = catalog
            .banks
            .iter()
            .map(|spec| (spec.clone(), RawFormat))
            .collect();
        let [ranges] = tracked::locate_groups(rom, [tracked::placements(&banks)])?;

        Ok(ScriptData {
            banks: tracked::from_rom(rom, banks, ranges)?,
            pending: PendingWrites::new(),
        })
    }

    /// Load every catalogued script bank from an assembly tree.
    ///
    /// # Errors
    /// Fails if any label is unknown or any file cannot be read.
    pub fn from_source(tree: &dyn SourceTree, catalog: &ScriptCatalog) -> Result<Self> {
        Ok(ScriptData {
            banks: tracked::from_source(
                tree,
                catalog.banks.iter().map(|spec| (spec.clone(), RawFormat)),
            )?,
            pending: PendingWrites::new(),
        })
    }

    /// Script banks in catalog order.
    pub fn banks(&self) -> impl Iterator<Item = &VersionedEntry<RawFormat>> {
        self.banks.iter().map(|placed| &placed.entry)
    }

    /// The bank labelled `name`.
    #[must_use]
    pub fn bank(&self, name: &str) -> Option<&VersionedEntry<RawFormat>> {
        self.banks().find(|entry| entry.name() == name)
    }

    /// Mutable access to the bank labelled `name`.
    pub fn bank_mut(&mut self, name: &str) -> Option<&mut VersionedEntry<RawFormat>> {
        self.banks
            .iter_mut()
            .map(|placed| &mut placed.entry)
            .find(|entry| entry.name() == name)
    }
}

impl AssetManager for ScriptData {
    fn description(&self) -> &str {
        "Script Data"
    }

    fn entries(&self) -> Vec<&dyn TrackedEntry> {
        self.banks
            .iter()
            .map(|placed| &placed.entry as &dyn TrackedEntry)
            .collect()
    }

    fn entries_mut(&mut self) -> Vec<&mut dyn TrackedEntry> {
        self.banks
            .iter_mut()
            .map(|placed| &mut placed.entry as &mut dyn TrackedEntry)
            .collect()
    }

    fn pending(&self) -> &PendingWrites {
        &self.pending
    }

    fn pending_mut(&mut self) -> &mut PendingWrites {
        &mut self.pending
    }

    fn prepare_writes(&mut self, rom: &Rom) -> Result<PendingWrites> {
        let slots = self.banks.iter_mut().map(Placed::slot).collect();
        plan_writes(rom, slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        manager::{AssetSpec, Placement},
        rom::{RomLayout, Section},
        source::IncbinIndex,
        Error,
    };

    fn setup() -> (Rom, ScriptCatalog) {
        let mut data = vec![0u8; 0x400];
        data[0x100..0x108].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let layout = RomLayout::default().with_section("Script", Section::new(0x100, 0x108));
        let catalog = ScriptCatalog::default().with_bank(AssetSpec::new(
            "Script",
            "script/script.bin",
            Placement::in_section("Script"),
        ));
        (Rom::from_mem(data, layout), catalog)
    }

    #[test]
    fn load_edit_inject() {
        let (mut rom, catalog) = setup();
        let mut scripts = ScriptData::from_rom(&rom, &catalog).unwrap();
        assert_eq!(scripts.bank("Script").unwrap().current().len(), 8);
        assert!(!scripts.has_been_modified());

        scripts.bank_mut("Script").unwrap().current_mut()[0] = 0xAA;
        assert!(scripts.has_been_modified());
        assert!(scripts.has_unsaved_changes());

        scripts.refresh_pending_writes(&rom).unwrap();
        assert_eq!(scripts.pending_writes().len(), 1);
        assert!(scripts.will_fit_in_rom(&rom));

        scripts.inject_into_rom(&mut rom).unwrap();
        assert_eq!(rom.read::<u8>(0x100).unwrap(), 0xAA);
        assert!(scripts.pending().is_empty());
        assert!(!scripts.has_unsaved_changes());
        assert!(scripts.has_been_modified());
    }

    #[test]
    fn oversized_bank_does_not_fit() {
        let (mut rom, catalog) = setup();
        let mut scripts = ScriptData::from_rom(&rom, &catalog).unwrap();
        scripts.bank_mut("Script").unwrap().current_mut().push(9);
        scripts.refresh_pending_writes(&rom).unwrap();

        let before = rom.clone();
        assert!(!scripts.will_fit_in_rom(&rom));
        assert!(!scripts.will_fit_in_rom(&rom));
        assert_eq!(rom, before);

        scripts.abandon_rom_injection();
        assert!(scripts.pending().is_empty());
        scripts.inject_into_rom(&mut rom).unwrap();
        assert_eq!(rom, before);
    }

    #[test]
    fn save_goes_through_the_tree() {
        let (rom, catalog) = setup();
        let mut scripts = ScriptData::from_rom(&rom, &catalog).unwrap();
        scripts.bank_mut("Script").unwrap().current_mut()[7] = 0x77;

        let dir = tempfile::tempdir().unwrap();
        let tree = IncbinIndex::new(dir.path()).with_label("Script", "script/script.bin");
        scripts.save(&tree, tree.root()).unwrap();

        assert!(!scripts.has_unsaved_changes());
        assert_eq!(
            tree.read_label("Script").unwrap(),
            vec![1, 2, 3, 4, 5, 6, 7, 0x77]
        );
        let reloaded = ScriptData::from_source(&tree, &catalog).unwrap();
        assert_eq!(reloaded.bank("Script").unwrap().current()[7], 0x77);
    }

    #[test]
    fn abandon_all_reverts() {
        let (rom, catalog) = setup();
        let mut scripts = ScriptData::from_rom(&rom, &catalog).unwrap();
        scripts.bank_mut("Script").unwrap().set_current(vec![0]);
        scripts.abandon_all();
        assert!(!scripts.has_been_modified());
    }

    #[test]
    fn missing_section_is_fatal() {
        let (rom, _) = setup();
        let catalog = ScriptCatalog::default().with_bank(AssetSpec::new(
            "Other",
            "other.bin",
            Placement::in_section("Other"),
        ));
        assert!(matches!(
            ScriptData::from_rom(&rom, &catalog),
            Err(Error::SectionNotFound(_))
        ));
    }
}
