//! Thread-shareable editing session.
//!
//! A [`Session`] lets a worker thread run a long load, save or injection while other
//! threads poll the shared [`Progress`]. The game data sits behind a mutex that is only
//! ever *tried*: a call that arrives while another operation holds it fails with
//! [`crate::Error::Busy`] instead of waiting.
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use std::{sync::Arc, thread};
//! use romkit::{GameCatalog, Rom, RomLayout, Session};
//!
//! let session = Arc::new(Session::new());
//! let progress = session.progress();
//!
//! let worker = {
//!     let session = Arc::clone(&session);
//!     thread::spawn(move || {
//!         let rom = Rom::from_file("game.bin", RomLayout::default())?;
//!         session.open_rom(&rom, &GameCatalog::default())
//!     })
//! };
//!
//! let (status, fraction) = progress.get();
//! println!("{status} ({:.0}%)", fraction * 100.0);
//! worker.join().unwrap()?;
//! # Ok::<(), romkit::Error>(())
//! ```

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard, TryLockError},
};

use crate::{
    assets::{FitReport, PendingWrites},
    gamedata::{GameData, SessionState},
    manager::GameCatalog,
    rom::Rom,
    source::SourceTree,
    utils::Progress,
    Error, Result,
};

/// Game data guarded against re-entrant operations.
#[derive(Debug)]
pub struct Session {
    data: Mutex<GameData>,
    progress: Arc<Progress>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a session with nothing loaded.
    #[must_use]
    pub fn new() -> Self {
        let progress = Arc::new(Progress::new());
        Session {
            data: Mutex::new(GameData::new(Arc::clone(&progress))),
            progress,
        }
    }

    /// The shared `(status, fraction)` pair.
    #[must_use]
    pub fn progress(&self) -> Arc<Progress> {
        Arc::clone(&self.progress)
    }

    fn acquire(&self) -> Result<MutexGuard<'_, GameData>> {
        match self.data.try_lock() {
            Ok(guard) => Ok(guard),
            Err(TryLockError::WouldBlock) => Err(Error::Busy),
            Err(TryLockError::Poisoned(_)) => Err(Error::LockError),
        }
    }

    /// Run `f` with exclusive access to the game data.
    ///
    /// # Errors
    /// [`crate::Error::Busy`] if another operation is running.
    pub fn with_data<R>(&self, f: impl FnOnce(&mut GameData) -> R) -> Result<R> {
        let mut data = self.acquire()?;
        Ok(f(&mut data))
    }

    /// Current lifecycle state.
    ///
    /// # Errors
    /// [`crate::Error::Busy`] if another operation is running.
    pub fn state(&self) -> Result<SessionState> {
        Ok(self.acquire()?.state())
    }

    /// See [`GameData::open_rom`].
    ///
    /// # Errors
    /// [`crate::Error::Busy`], or the load error.
    pub fn open_rom(&self, rom: &Rom, catalog: &GameCatalog) -> Result<()> {
        self.acquire()?.open_rom(rom, catalog)
    }

    /// See [`GameData::open_source`].
    ///
    /// # Errors
    /// [`crate::Error::Busy`], or the load error.
    pub fn open_source(&self, tree: &dyn SourceTree, catalog: &GameCatalog) -> Result<()> {
        self.acquire()?.open_source(tree, catalog)
    }

    /// See [`GameData::save`].
    ///
    /// # Errors
    /// [`crate::Error::Busy`], or the save error.
    pub fn save(&self, tree: &dyn SourceTree, dir: &Path) -> Result<()> {
        self.acquire()?.save(tree, dir)
    }

    /// See [`GameData::has_been_modified`].
    ///
    /// # Errors
    /// [`crate::Error::Busy`] if another operation is running.
    pub fn has_been_modified(&self) -> Result<bool> {
        Ok(self.acquire()?.has_been_modified())
    }

    /// See [`GameData::has_unsaved_changes`].
    ///
    /// # Errors
    /// [`crate::Error::Busy`] if another operation is running.
    pub fn has_unsaved_changes(&self) -> Result<bool> {
        Ok(self.acquire()?.has_unsaved_changes())
    }

    /// See [`GameData::refresh_pending_writes`].
    ///
    /// # Errors
    /// [`crate::Error::Busy`], or the refresh error.
    pub fn refresh_pending_writes(&self, rom: &Rom) -> Result<()> {
        self.acquire()?.refresh_pending_writes(rom)
    }

    /// See [`GameData::pending_writes`].
    ///
    /// # Errors
    /// [`crate::Error::Busy`] or [`crate::Error::NotReady`].
    pub fn pending_writes(&self) -> Result<PendingWrites> {
        self.acquire()?.pending_writes()
    }

    /// See [`GameData::fit_report`].
    ///
    /// # Errors
    /// [`crate::Error::Busy`] or [`crate::Error::NotReady`].
    pub fn fit_report(&self, rom: &Rom) -> Result<FitReport> {
        self.acquire()?.fit_report(rom)
    }

    /// See [`GameData::will_fit_in_rom`].
    ///
    /// # Errors
    /// [`crate::Error::Busy`] if another operation is running.
    pub fn will_fit_in_rom(&self, rom: &Rom) -> Result<bool> {
        Ok(self.acquire()?.will_fit_in_rom(rom))
    }

    /// See [`GameData::inject_into_rom`].
    ///
    /// # Errors
    /// [`crate::Error::Busy`], or the injection error.
    pub fn inject_into_rom(&self, rom: &mut Rom) -> Result<()> {
        self.acquire()?.inject_into_rom(rom)
    }

    /// See [`GameData::abandon_rom_injection`].
    ///
    /// # Errors
    /// [`crate::Error::Busy`] or [`crate::Error::NotReady`].
    pub fn abandon_rom_injection(&self) -> Result<()> {
        self.acquire()?.abandon_rom_injection()
    }

    /// See [`GameData::close`].
    ///
    /// # Errors
    /// [`crate::Error::Busy`] if another operation is running.
    pub fn close(&self) -> Result<()> {
        self.acquire()?.close();
        Ok(())
    }
}
