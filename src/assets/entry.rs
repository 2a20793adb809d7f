//! Change tracking for a single asset.
//!
//! A [`VersionedEntry`] owns one decoded asset together with the three versions an editor
//! needs to reason about it:
//!
//! - `original`: decoded once at load time and never changed; the baseline for
//!   [`VersionedEntry::has_changed`].
//! - `last_saved`: the version most recently committed after a successful save.
//! - `current`: the working copy edited by the user.
//!
//! The entry also keeps the raw bytes of `last_saved` so that an untouched asset is written
//! back byte for byte, and a memoised serialisation of `current` that is dropped whenever
//! `current` is mutably borrowed.
//!
//! # Lifecycle
//!
//! ```text
//! RawEntry::new(bytes) --initialise()--> VersionedEntry --current_mut()/set_current()-->
//!     bytes() / save(tree, dir) --commit()--> last_saved = current
//!     abandon() --> current = last_saved
//! ```
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use romkit::assets::{RawEntry, RawFormat};
//!
//! let mut entry = RawEntry::new("Script0", "script/script0.bin", vec![1, 2, 3], RawFormat)
//!     .initialise()?;
//! assert!(!entry.has_changed());
//!
//! entry.current_mut().push(4);
//! assert!(entry.has_changed());
//! assert_eq!(&*entry.bytes()?, &[1, 2, 3, 4]);
//!
//! entry.current_mut().pop();
//! assert!(!entry.has_changed());
//! # Ok::<(), romkit::Error>(())
//! ```

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{assets::format::Codec, source::SourceTree, Result};

/// Immutable, cheaply clonable byte buffer.
pub type SharedBytes = Arc<[u8]>;

/// An asset whose bytes have been read but not yet decoded.
#[derive(Debug)]
pub struct RawEntry<C: Codec> {
    name: String,
    path: PathBuf,
    start_address: Option<u32>,
    codec: C,
    bytes: Vec<u8>,
}

impl<C: Codec> RawEntry<C> {
    /// Wrap the bytes read for asset `name`, which is saved to the relative `path`.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        bytes: impl Into<Vec<u8>>,
        codec: C,
    ) -> Self {
        RawEntry {
            name: name.into(),
            path: path.into(),
            start_address: None,
            codec,
            bytes: bytes.into(),
        }
    }

    /// Record the ROM address the bytes were read from.
    #[must_use]
    pub fn at_address(mut self, address: u32) -> Self {
        self.start_address = Some(address);
        self
    }

    /// Decode the bytes and start tracking changes.
    ///
    /// Bytes after the end of the encoded stream (section padding) are dropped.
    ///
    /// # Errors
    /// Propagates the codec's decode error.
    pub fn initialise(mut self) -> Result<VersionedEntry<C>> {
        let (original, consumed) = self.codec.deserialize(&self.bytes)?;
        self.bytes.truncate(consumed);

        Ok(VersionedEntry {
            name: self.name,
            path: self.path,
            start_address: self.start_address,
            codec: self.codec,
            current: original.clone(),
            last_saved: original.clone(),
            original,
            raw_bytes: self.bytes.into(),
            cached: None,
        })
    }
}

/// A decoded asset with original, last-saved and current versions.
#[derive(Debug)]
pub struct VersionedEntry<C: Codec> {
    name: String,
    path: PathBuf,
    start_address: Option<u32>,
    codec: C,
    original: C::Value,
    current: C::Value,
    last_saved: C::Value,
    // Always the serialisation of `last_saved`.
    raw_bytes: SharedBytes,
    // Serialisation of `current`; cleared on every mutable access.
    cached: Option<SharedBytes>,
}

impl<C: Codec> VersionedEntry<C> {
    /// Create an entry for a newly authored asset. Its original version is `value`.
    ///
    /// # Errors
    /// Propagates the codec's encode error.
    pub fn from_value(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        value: C::Value,
        codec: C,
    ) -> Result<Self> {
        let raw_bytes: SharedBytes = codec.serialize(&value)?.into();
        Ok(VersionedEntry {
            name: name.into(),
            path: path.into(),
            start_address: None,
            codec,
            current: value.clone(),
            last_saved: value.clone(),
            original: value,
            raw_bytes,
            cached: None,
        })
    }

    /// The asset label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the asset.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Path of the asset file, relative to the project root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Change the asset file path.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    /// The codec used for this entry.
    #[must_use]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// ROM address of the asset, once known.
    #[must_use]
    pub fn start_address(&self) -> Option<u32> {
        self.start_address
    }

    /// Assign the ROM address of the asset.
    pub fn set_start_address(&mut self, address: u32) {
        self.start_address = Some(address);
    }

    /// The value decoded at load time.
    #[must_use]
    pub fn original(&self) -> &C::Value {
        &self.original
    }

    /// The value committed by the last successful save.
    #[must_use]
    pub fn last_saved(&self) -> &C::Value {
        &self.last_saved
    }

    /// The working value.
    #[must_use]
    pub fn current(&self) -> &C::Value {
        &self.current
    }

    /// Mutable access to the working value.
    pub fn current_mut(&mut self) -> &mut C::Value {
        self.cached = None;
        &mut self.current
    }

    /// Replace the working value.
    pub fn set_current(&mut self, value: C::Value) {
        self.cached = None;
        self.current = value;
    }

    /// True if the working value differs from the value loaded at the start of the session.
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.current != self.original
    }

    /// True if the working value differs from the last committed value.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.current != self.last_saved
    }

    /// The bytes of the working value.
    ///
    /// Returns the stored bytes unchanged while the working value equals the last committed
    /// one, so an unedited asset is reproduced exactly. Otherwise serialises the working
    /// value once and reuses the result until the next mutable access.
    ///
    /// # Errors
    /// Propagates the codec's encode error.
    pub fn bytes(&mut self) -> Result<SharedBytes> {
        if !self.has_unsaved_changes() {
            return Ok(Arc::clone(&self.raw_bytes));
        }

        if let Some(cached) = &self.cached {
            return Ok(Arc::clone(cached));
        }

        let bytes: SharedBytes = self.codec.serialize(&self.current)?.into();
        self.cached = Some(Arc::clone(&bytes));
        Ok(bytes)
    }

    /// The bytes originally read from the source, or last committed.
    #[must_use]
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    /// Length of the stored (unedited) bytes.
    #[must_use]
    pub fn original_data_length(&self) -> usize {
        self.raw_bytes.len()
    }

    /// Length of the bytes of the working value.
    ///
    /// # Errors
    /// Propagates the codec's encode error.
    pub fn data_length(&mut self) -> Result<usize> {
        Ok(self.bytes()?.len())
    }

    /// Address one past the last byte of the working value, once a start address is known.
    ///
    /// # Errors
    /// Propagates the codec's encode error.
    pub fn end_address(&mut self) -> Result<Option<u32>> {
        let Some(start) = self.start_address else {
            return Ok(None);
        };
        let length = u32::try_from(self.data_length()?).map_err(|_| out_of_bounds_error!())?;
        start
            .checked_add(length)
            .map(Some)
            .ok_or(out_of_bounds_error!())
    }

    /// Promote the working value to the last committed value.
    ///
    /// # Errors
    /// Propagates the codec's encode error; the entry is unchanged on failure.
    pub fn commit(&mut self) -> Result<()> {
        if !self.has_unsaved_changes() {
            return Ok(());
        }

        let bytes = self.bytes()?;
        self.last_saved = self.current.clone();
        self.raw_bytes = bytes;
        self.cached = None;
        Ok(())
    }

    /// Discard edits made since the last commit.
    pub fn abandon(&mut self) {
        self.current = self.last_saved.clone();
        self.cached = None;
    }

    /// Write the bytes of the working value through `tree`, to the entry path under `dir`.
    ///
    /// The entry is not committed.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] on I/O failure, or the codec's encode error.
    pub fn save(&mut self, tree: &dyn SourceTree, dir: &Path) -> Result<()> {
        let bytes = self.bytes()?;
        tree.write(dir, &self.path, &bytes)?;

        log::debug!(
            "saved {} ({} bytes) to {}",
            self.name,
            bytes.len(),
            dir.join(&self.path).display()
        );
        Ok(())
    }
}

/// Type-erased view of an entry for bulk operations across asset types.
pub trait TrackedEntry: Send {
    /// The asset label.
    fn name(&self) -> &str;
    /// Path of the asset file, relative to the project root.
    fn path(&self) -> &Path;
    /// ROM address of the asset, once known.
    fn start_address(&self) -> Option<u32>;
    /// Assign the ROM address of the asset.
    fn set_start_address(&mut self, address: u32);
    /// See [`VersionedEntry::has_changed`].
    fn has_changed(&self) -> bool;
    /// See [`VersionedEntry::has_unsaved_changes`].
    fn has_unsaved_changes(&self) -> bool;
    /// See [`VersionedEntry::bytes`].
    ///
    /// # Errors
    /// Propagates the codec's encode error.
    fn bytes(&mut self) -> Result<SharedBytes>;
    /// See [`VersionedEntry::commit`].
    ///
    /// # Errors
    /// Propagates the codec's encode error.
    fn commit(&mut self) -> Result<()>;
    /// See [`VersionedEntry::abandon`].
    fn abandon(&mut self);
    /// See [`VersionedEntry::save`].
    ///
    /// # Errors
    /// Returns an error if the bytes cannot be produced or written.
    fn save(&mut self, tree: &dyn SourceTree, dir: &Path) -> Result<()>;
}

impl<C: Codec> TrackedEntry for VersionedEntry<C> {
    fn name(&self) -> &str {
        VersionedEntry::name(self)
    }

    fn path(&self) -> &Path {
        VersionedEntry::path(self)
    }

    fn start_address(&self) -> Option<u32> {
        VersionedEntry::start_address(self)
    }

    fn set_start_address(&mut self, address: u32) {
        VersionedEntry::set_start_address(self, address);
    }

    fn has_changed(&self) -> bool {
        VersionedEntry::has_changed(self)
    }

    fn has_unsaved_changes(&self) -> bool {
        VersionedEntry::has_unsaved_changes(self)
    }

    fn bytes(&mut self) -> Result<SharedBytes> {
        VersionedEntry::bytes(self)
    }

    fn commit(&mut self) -> Result<()> {
        VersionedEntry::commit(self)
    }

    fn abandon(&mut self) {
        VersionedEntry::abandon(self);
    }

    fn save(&mut self, tree: &dyn SourceTree, dir: &Path) -> Result<()> {
        VersionedEntry::save(self, tree, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assets::format::{BlocksetFormat, RawFormat},
        codec::{Block, BlockCodec, Tile},
    };
    use crate::source::IncbinIndex;
    use std::fs;
    use tempfile::tempdir;

    fn raw_entry(bytes: &[u8]) -> VersionedEntry<RawFormat> {
        RawEntry::new("Raw", "data/raw.bin", bytes.to_vec(), RawFormat)
            .initialise()
            .unwrap()
    }

    fn blockset_entry() -> (VersionedEntry<BlocksetFormat>, Vec<u8>) {
        let blocks = vec![
            Block::new([Tile::new(1), Tile::new(2), Tile::new(3), Tile::new(4)]),
            Block::default(),
        ];
        let bytes = BlockCodec::encode(&blocks).unwrap();
        let entry = RawEntry::new("Blockset", "blocksets/b.cbs", bytes.clone(), BlocksetFormat)
            .at_address(0x1000)
            .initialise()
            .unwrap();
        (entry, bytes)
    }

    #[test]
    fn untouched_entry_returns_original_bytes() {
        let (mut entry, bytes) = blockset_entry();
        assert!(!entry.has_changed());
        assert!(!entry.has_unsaved_changes());
        assert_eq!(&*entry.bytes().unwrap(), bytes.as_slice());
        assert_eq!(entry.data_length().unwrap(), bytes.len());
        assert_eq!(
            entry.end_address().unwrap(),
            Some(0x1000 + bytes.len() as u32)
        );
    }

    #[test]
    fn end_address_past_address_space() {
        let mut entry = raw_entry(&[0; 8]);
        entry.set_start_address(u32::MAX - 2);
        assert!(matches!(entry.end_address(), Err(crate::Error::OutOfBounds)));
    }

    #[test]
    fn padding_is_trimmed() {
        let blocks = vec![Block::default()];
        let mut bytes = BlockCodec::encode(&blocks).unwrap();
        let length = bytes.len();
        bytes.extend_from_slice(&[0xFF; 16]);

        let entry = RawEntry::new("B", "b.cbs", bytes, BlocksetFormat)
            .initialise()
            .unwrap();
        assert_eq!(entry.original_data_length(), length);
    }

    #[test]
    fn change_detection_is_by_value() {
        let (mut entry, _) = blockset_entry();
        entry.current_mut()[1].tiles[0] = Tile::new(0x55);
        assert!(entry.has_changed());

        entry.current_mut()[1].tiles[0] = Tile::new(0);
        assert!(!entry.has_changed());
    }

    #[test]
    fn edited_bytes_are_memoised() {
        let mut entry = raw_entry(&[1, 2, 3]);
        entry.current_mut().push(4);

        let first = entry.bytes().unwrap();
        let second = entry.bytes().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(&*first, &[1, 2, 3, 4]);

        entry.current_mut().push(5);
        assert_eq!(&*entry.bytes().unwrap(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn commit_then_abandon_keeps_current() {
        let mut entry = raw_entry(&[1, 2, 3]);
        entry.set_current(vec![9, 9]);
        entry.commit().unwrap();

        assert!(entry.has_changed());
        assert!(!entry.has_unsaved_changes());
        assert_eq!(entry.raw_bytes(), &[9, 9]);

        entry.abandon();
        assert_eq!(entry.current(), &vec![9, 9]);
        assert_eq!(entry.original(), &vec![1, 2, 3]);
    }

    #[test]
    fn abandon_reverts_to_last_saved() {
        let mut entry = raw_entry(&[1, 2, 3]);
        entry.current_mut().clear();
        entry.abandon();
        assert_eq!(entry.current(), &vec![1, 2, 3]);
        assert!(!entry.has_changed());
    }

    #[test]
    fn reverting_after_commit_writes_reverted_bytes() {
        let mut entry = raw_entry(&[1, 2, 3]);
        entry.set_current(vec![7]);
        entry.commit().unwrap();

        entry.set_current(vec![1, 2, 3]);
        assert!(!entry.has_changed());
        assert!(entry.has_unsaved_changes());
        assert_eq!(&*entry.bytes().unwrap(), &[1, 2, 3]);
    }

    #[test]
    fn commit_without_changes_is_noop() {
        let mut entry = raw_entry(&[4, 5]);
        entry.commit().unwrap();
        assert_eq!(entry.raw_bytes(), &[4, 5]);
        assert_eq!(entry.last_saved(), &vec![4, 5]);
    }

    #[test]
    fn save_writes_file() {
        let dir = tempdir().unwrap();
        let mut entry = raw_entry(&[0xAA, 0xBB]);
        let tree = IncbinIndex::new(dir.path()).with_label("Raw", "data/raw.bin");
        entry.save(&tree, dir.path()).unwrap();
        assert_eq!(tree.read_label("Raw").unwrap(), vec![0xAA, 0xBB]);

        let written = fs::read(dir.path().join("data/raw.bin")).unwrap();
        assert_eq!(written, vec![0xAA, 0xBB]);
    }

    #[test]
    fn new_asset_from_value() {
        let mut entry =
            VersionedEntry::from_value("New", "new.bin", vec![1u8, 2], RawFormat).unwrap();
        assert!(!entry.has_changed());
        assert_eq!(entry.end_address().unwrap(), None);
        entry.set_start_address(0x200);
        assert_eq!(entry.end_address().unwrap(), Some(0x202));
    }

    #[test]
    fn decode_errors_propagate() {
        let result = RawEntry::new("Bad", "bad.cbs", vec![0x00], BlocksetFormat).initialise();
        assert!(matches!(result, Err(crate::Error::CorruptData { .. })));
    }

    #[test]
    fn trait_object_view() {
        let (entry, _) = blockset_entry();
        let mut boxed: Box<dyn TrackedEntry> = Box::new(entry);
        assert_eq!(boxed.name(), "Blockset");
        assert_eq!(boxed.start_address(), Some(0x1000));
        boxed.set_start_address(0x2000);
        assert_eq!(boxed.start_address(), Some(0x2000));
        assert!(!boxed.has_changed());
        assert!(!boxed.bytes().unwrap().is_empty());
    }
}
