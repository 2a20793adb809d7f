//! The top-level aggregator of all asset managers.
//!
//! [`GameData`] owns one instance of every manager and fans each bulk operation out to
//! them in registration order: rooms, graphics, scripts. Predicates are combined with
//! OR (modified?) or AND (fits?), lists are concatenated, and the first failing child
//! aborts an operation.
//!
//! # State Machine
//!
//! ```text
//! Uninitialised ──open──> Loading ──ok──> Ready ──save──> Saving ──> Ready
//!       ^                    │              │
//!       └──────error─────────┘              └──close──> Closed ──open──> Loading
//! ```
//!
//! Editing happens while `Ready`. Opening a `Ready` session fails with
//! [`crate::Error::AlreadyLoaded`]; every other operation requires `Ready` and fails with
//! [`crate::Error::NotReady`] otherwise.
//!
//! # Progress
//!
//! Loads and saves report a status line and a fraction through a shared
//! [`crate::utils::Progress`]. A failed load leaves `Error: <message>` as the status.

use std::{path::Path, sync::Arc};

use strum::Display;

use crate::{
    assets::{FitReport, PendingWrites},
    manager::{AssetManager, GameCatalog, GraphicsData, RoomData, ScriptData},
    rom::Rom,
    source::SourceTree,
    utils::Progress,
    Error, Result,
};

/// Lifecycle of a [`GameData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SessionState {
    /// Nothing loaded yet, or the last load failed
    Uninitialised,
    /// A load is running
    Loading,
    /// Data is loaded and may be edited
    Ready,
    /// A save or injection is running
    Saving,
    /// Data was unloaded
    Closed,
}

#[derive(Debug)]
struct Children {
    rooms: RoomData,
    graphics: GraphicsData,
    scripts: ScriptData,
}

impl Children {
    fn managers(&self) -> [&dyn AssetManager; 3] {
        [&self.rooms, &self.graphics, &self.scripts]
    }

    fn managers_mut(&mut self) -> [&mut dyn AssetManager; 3] {
        [&mut self.rooms, &mut self.graphics, &mut self.scripts]
    }
}

/// All game data of an editing session.
#[derive(Debug)]
pub struct GameData {
    state: SessionState,
    progress: Arc<Progress>,
    children: Option<Children>,
}

impl Default for GameData {
    fn default() -> Self {
        Self::new(Arc::new(Progress::new()))
    }
}

impl GameData {
    /// Create an empty aggregator reporting to `progress`.
    #[must_use]
    pub fn new(progress: Arc<Progress>) -> Self {
        GameData {
            state: SessionState::Uninitialised,
            progress,
            children: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns true once data is loaded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// The shared progress pair.
    #[must_use]
    pub fn progress(&self) -> &Arc<Progress> {
        &self.progress
    }

    /// Load every manager from a ROM image.
    ///
    /// # Errors
    /// - [`crate::Error::AlreadyLoaded`] if data is already loaded
    /// - any locate or decode error of a child; nothing stays loaded in that case
    pub fn open_rom(&mut self, rom: &Rom, catalog: &GameCatalog) -> Result<()> {
        self.load("ROM", |progress| {
            progress.set("Loading Room data from ROM...", 0.0);
            let rooms = RoomData::from_rom(rom, &catalog.rooms)?;
            progress.set("Loading Graphics data from ROM...", 1.0 / 3.0);
            let graphics = GraphicsData::from_rom(rom, &catalog.graphics)?;
            progress.set("Loading Script data from ROM...", 2.0 / 3.0);
            let scripts = ScriptData::from_rom(rom, &catalog.scripts)?;
            Ok(Children {
                rooms,
                graphics,
                scripts,
            })
        })
    }

    /// Load every manager from an assembly tree.
    ///
    /// # Errors
    /// - [`crate::Error::AlreadyLoaded`] if data is already loaded
    /// - any resolve, read or decode error of a child; nothing stays loaded in that case
    pub fn open_source(&mut self, tree: &dyn SourceTree, catalog: &GameCatalog) -> Result<()> {
        self.load("ASM", |progress| {
            progress.set("Loading Room data from ASM...", 0.0);
            let rooms = RoomData::from_source(tree, &catalog.rooms)?;
            progress.set("Loading Graphics data from ASM...", 1.0 / 3.0);
            let graphics = GraphicsData::from_source(tree, &catalog.graphics)?;
            progress.set("Loading Script data from ASM...", 2.0 / 3.0);
            let scripts = ScriptData::from_source(tree, &catalog.scripts)?;
            Ok(Children {
                rooms,
                graphics,
                scripts,
            })
        })
    }

    fn load(
        &mut self,
        origin: &str,
        loader: impl FnOnce(&Progress) -> Result<Children>,
    ) -> Result<()> {
        if self.state == SessionState::Ready {
            return Err(Error::AlreadyLoaded);
        }

        self.state = SessionState::Loading;
        self.progress.set(format!("Opening {origin} project..."), 0.0);

        match loader(&self.progress) {
            Ok(children) => {
                self.children = Some(children);
                self.state = SessionState::Ready;
                self.progress.set("Done", 1.0);
                log::info!("opened {origin} project");
                Ok(())
            }
            Err(error) => {
                self.children = None;
                self.state = SessionState::Uninitialised;
                self.progress.set_status(format!("Error: {error}"));
                log::error!("failed to open {origin} project: {error}");
                Err(error)
            }
        }
    }

    fn children(&self) -> Result<&Children> {
        match (&self.children, self.state) {
            (Some(children), SessionState::Ready) => Ok(children),
            _ => Err(Error::NotReady),
        }
    }

    fn children_mut(&mut self) -> Result<&mut Children> {
        match (&mut self.children, self.state) {
            (Some(children), SessionState::Ready) => Ok(children),
            _ => Err(Error::NotReady),
        }
    }

    /// Run `operation` on every manager while in the `Saving` state.
    fn fan_out_saving(
        &mut self,
        verb: &str,
        mut operation: impl FnMut(&mut dyn AssetManager) -> Result<()>,
    ) -> Result<()> {
        if self.state != SessionState::Ready {
            return Err(Error::NotReady);
        }
        let Some(children) = self.children.as_mut() else {
            return Err(Error::NotReady);
        };

        self.state = SessionState::Saving;
        let mut result = Ok(());
        for (index, manager) in children.managers_mut().into_iter().enumerate() {
            self.progress.set(
                format!("{verb} {}", manager.description()),
                index as f64 / 3.0,
            );
            result = operation(manager);
            if result.is_err() {
                break;
            }
        }
        self.state = SessionState::Ready;

        match &result {
            Ok(()) => self.progress.set("Done", 1.0),
            Err(error) => {
                self.progress.set_status(format!("Error: {error}"));
                log::error!("{verb} failed: {error}");
            }
        }
        result
    }

    /// Save every manager through `tree`, writing under `dir`.
    ///
    /// `dir` is usually `tree.root()` to save in place. A session loaded from a ROM saves
    /// into a fresh tree such as [`crate::source::IncbinIndex::new`].
    ///
    /// # Errors
    /// [`crate::Error::NotReady`], or the first child failure. Children saved before the
    /// failure stay saved.
    pub fn save(&mut self, tree: &dyn SourceTree, dir: &Path) -> Result<()> {
        self.fan_out_saving("Saving", |manager| manager.save(tree, dir))?;
        log::info!("saved project to {}", dir.display());
        Ok(())
    }

    /// Returns true if any manager has an entry that differs from its loaded value.
    #[must_use]
    pub fn has_been_modified(&self) -> bool {
        self.children().is_ok_and(|children| {
            children
                .managers()
                .iter()
                .any(|manager| manager.has_been_modified())
        })
    }

    /// Returns true if any manager has uncommitted edits.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.children().is_ok_and(|children| {
            children
                .managers()
                .iter()
                .any(|manager| manager.has_unsaved_changes())
        })
    }

    /// Recompute the pending writes of every manager.
    ///
    /// # Errors
    /// [`crate::Error::NotReady`], or the first child failure.
    pub fn refresh_pending_writes(&mut self, rom: &Rom) -> Result<()> {
        for manager in self.children_mut()?.managers_mut() {
            manager.refresh_pending_writes(rom)?;
        }
        Ok(())
    }

    /// Pending writes of every manager, in registration order.
    ///
    /// # Errors
    /// [`crate::Error::NotReady`].
    pub fn pending_writes(&self) -> Result<PendingWrites> {
        Ok(self
            .children()?
            .managers()
            .iter()
            .flat_map(|manager| manager.pending_writes())
            .collect())
    }

    /// Fit check of every pending write.
    ///
    /// # Errors
    /// [`crate::Error::NotReady`].
    pub fn fit_report(&self, rom: &Rom) -> Result<FitReport> {
        let mut report = FitReport::default();
        for manager in self.children()?.managers() {
            report.merge(manager.fit_report(rom));
        }
        Ok(report)
    }

    /// Returns true if every pending write of every manager fits.
    #[must_use]
    pub fn will_fit_in_rom(&self, rom: &Rom) -> bool {
        self.children().is_ok_and(|children| {
            children
                .managers()
                .iter()
                .all(|manager| manager.will_fit_in_rom(rom))
        })
    }

    /// Inject every manager's pending writes into `rom`.
    ///
    /// # Errors
    /// [`crate::Error::NotReady`], or the first child failure. Writes made before the
    /// failure stay in `rom`.
    pub fn inject_into_rom(&mut self, rom: &mut Rom) -> Result<()> {
        self.fan_out_saving("Injecting", |manager| manager.inject_into_rom(rom))
    }

    /// Drop every manager's pending writes.
    ///
    /// # Errors
    /// [`crate::Error::NotReady`].
    pub fn abandon_rom_injection(&mut self) -> Result<()> {
        for manager in self.children_mut()?.managers_mut() {
            manager.abandon_rom_injection();
        }
        Ok(())
    }

    /// Unload all data.
    pub fn close(&mut self) {
        self.children = None;
        self.state = SessionState::Closed;
        self.progress.set("Closed", 0.0);
    }

    /// Room manager.
    ///
    /// # Errors
    /// [`crate::Error::NotReady`].
    pub fn rooms(&self) -> Result<&RoomData> {
        Ok(&self.children()?.rooms)
    }

    /// Mutable room manager.
    ///
    /// # Errors
    /// [`crate::Error::NotReady`].
    pub fn rooms_mut(&mut self) -> Result<&mut RoomData> {
        Ok(&mut self.children_mut()?.rooms)
    }

    /// Graphics manager.
    ///
    /// # Errors
    /// [`crate::Error::NotReady`].
    pub fn graphics(&self) -> Result<&GraphicsData> {
        Ok(&self.children()?.graphics)
    }

    /// Mutable graphics manager.
    ///
    /// # Errors
    /// [`crate::Error::NotReady`].
    pub fn graphics_mut(&mut self) -> Result<&mut GraphicsData> {
        Ok(&mut self.children_mut()?.graphics)
    }

    /// Script manager.
    ///
    /// # Errors
    /// [`crate::Error::NotReady`].
    pub fn scripts(&self) -> Result<&ScriptData> {
        Ok(&self.children()?.scripts)
    }

    /// Mutable script manager.
    ///
    /// # Errors
    /// [`crate::Error::NotReady`].
    pub fn scripts_mut(&mut self) -> Result<&mut ScriptData> {
        Ok(&mut self.children_mut()?.scripts)
    }
}
