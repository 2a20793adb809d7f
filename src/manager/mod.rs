//! Asset managers: families of versioned entries with uniform bulk operations.
//!
//! Each manager owns every entry of one asset family together with its ROM placement, and
//! implements [`AssetManager`] by exposing its entries and packing them into pending writes.
//! Everything else, from saving to a project tree to patching a ROM, is provided by the
//! trait.
//!
//! # Architecture
//!
//! ```text
//! GameData ──owns──> RoomData, GraphicsData, ScriptData
//!                        │
//!                        ├── Placed<C> { placement, VersionedEntry<C> } ...
//!                        └── PendingWrites (valid until the next refresh)
//! ```
//!
//! # Key Components
//!
//! - [`AssetManager`] - the bulk-operation contract
//! - [`Placement`], [`layout::pack`], [`layout::locate`] - ROM layout of shared sections
//! - [`RoomData`], [`GraphicsData`], [`ScriptData`] - the concrete managers
//! - [`GameCatalog`] and friends - what each manager loads
//!
//! # ROM Injection
//!
//! ```text
//! refresh_pending_writes(rom) ──> fit_report(rom) / will_fit_in_rom(rom) ──> inject_into_rom(rom)
//!                                             └──> abandon_rom_injection()
//! ```
//!
//! The fit check only reads the ROM layout. Injection writes every pending write, commits
//! every entry and clears the queue.
//!
//! # Failure Semantics
//!
//! Bulk operations stop at the first failing entry. Entries already written or committed
//! in the same pass stay that way.

mod catalog;
mod graphics;
pub mod layout;
mod rooms;
mod scripts;
mod tracked;

pub use catalog::{
    AssetSpec, GameCatalog, GraphicsCatalog, PaletteSpec, RoomCatalog, ScriptCatalog,
    TilemapSpec,
};
pub use graphics::GraphicsData;
pub use layout::Placement;
pub use rooms::RoomData;
pub use scripts::ScriptData;
pub use tracked::Placed;

use std::path::Path;

use crate::{
    assets::{FitReport, PendingWrites, TrackedEntry},
    manager::layout::{pack, serialize_all, Slot},
    rom::Rom,
    source::SourceTree,
    Result,
};

/// Bulk operations over a family of versioned entries.
pub trait AssetManager: Send {
    /// Human-readable name used in progress messages.
    fn description(&self) -> &str;

    /// Every entry, in catalog order.
    fn entries(&self) -> Vec<&dyn TrackedEntry>;

    /// Every entry, in catalog order.
    fn entries_mut(&mut self) -> Vec<&mut dyn TrackedEntry>;

    /// The most recently refreshed pending writes.
    fn pending(&self) -> &PendingWrites;

    /// Mutable access to the pending writes.
    fn pending_mut(&mut self) -> &mut PendingWrites;

    /// Serialise and lay out every entry against `rom`, assigning start addresses.
    ///
    /// # Errors
    /// Returns encode errors or layout errors.
    fn prepare_writes(&mut self, rom: &Rom) -> Result<PendingWrites>;

    /// Write every entry through `tree` under `dir` and commit it.
    ///
    /// # Errors
    /// Stops at the first entry that fails; entries saved before it stay saved and committed.
    fn save(&mut self, tree: &dyn SourceTree, dir: &Path) -> Result<()> {
        let description = self.description().to_string();
        let mut count = 0;
        for entry in self.entries_mut() {
            entry.save(tree, dir)?;
            entry.commit()?;
            count += 1;
        }

        log::info!("{description}: saved {count} entries to {}", dir.display());
        Ok(())
    }

    /// Returns true if any entry differs from its loaded value.
    fn has_been_modified(&self) -> bool {
        self.entries().iter().any(|entry| entry.has_changed())
    }

    /// Returns true if any entry differs from its last committed value.
    fn has_unsaved_changes(&self) -> bool {
        self.entries().iter().any(|entry| entry.has_unsaved_changes())
    }

    /// Recompute the pending writes against `rom`.
    ///
    /// # Errors
    /// See [`AssetManager::prepare_writes`]; the previous list is kept on failure.
    fn refresh_pending_writes(&mut self, rom: &Rom) -> Result<()> {
        let writes = self.prepare_writes(rom)?;
        log::debug!("{}: {} pending writes", self.description(), writes.len());
        *self.pending_mut() = writes;
        Ok(())
    }

    /// A copy of the most recently refreshed pending writes.
    fn pending_writes(&self) -> PendingWrites {
        self.pending().clone()
    }

    /// Itemised fit check of the pending writes against `rom`.
    fn fit_report(&self, rom: &Rom) -> FitReport {
        FitReport::check(rom, self.pending())
    }

    /// Returns true if every pending write fits its region.
    fn will_fit_in_rom(&self, rom: &Rom) -> bool {
        let fits = self.fit_report(rom).fits();
        log::debug!("{}: fit check {}", self.description(), if fits { "passed" } else { "failed" });
        fits
    }

    /// Write every pending write into `rom`, then commit all entries and clear the queue.
    ///
    /// # Errors
    /// Returns [`crate::Error::SectionNotFound`] or [`crate::Error::OutOfBounds`] at the
    /// first write that cannot be placed; earlier writes remain in `rom`.
    fn inject_into_rom(&mut self, rom: &mut Rom) -> Result<()> {
        for write in self.pending() {
            let location = rom.label_location(&write.label)?;
            rom.write_array(location.begin, &write.bytes)?;
            log::debug!(
                "ROM WRITE @ 0x{:06X} - {} bytes (finish 0x{:06X})",
                location.begin,
                write.len(),
                location.begin as usize + write.len()
            );
        }

        self.commit_all()?;
        self.pending_mut().clear();
        log::info!("{}: injected into ROM", self.description());
        Ok(())
    }

    /// Drop the pending writes without touching any ROM.
    fn abandon_rom_injection(&mut self) {
        self.pending_mut().clear();
    }

    /// Commit every entry.
    ///
    /// # Errors
    /// Stops at the first entry that fails to serialise.
    fn commit_all(&mut self) -> Result<()> {
        for entry in self.entries_mut() {
            entry.commit()?;
        }
        Ok(())
    }

    /// Revert every entry to its last committed value.
    fn abandon_all(&mut self) {
        for entry in self.entries_mut() {
            entry.abandon();
        }
    }
}

/// Serialise `slots` in parallel and lay them out against `rom`.
pub(crate) fn plan_writes(rom: &Rom, mut slots: Vec<Slot<'_>>) -> Result<PendingWrites> {
    let bytes = serialize_all(&mut slots)?;
    pack(rom, &mut slots, &bytes)
}
