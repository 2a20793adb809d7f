//! Byte-addressable ROM image with named sections and addresses.
//!
//! [`Rom`] is the accessor every loader, fit check and injector goes through. It owns a
//! mutable copy of the image plus a [`RomLayout`] naming the regions of interest for the
//! particular game revision.
//!
//! # Architecture
//!
//! - [`backend`] - read-only sources an image is loaded from (memory-mapped file or buffer)
//! - [`layout`] - named [`Section`]s and 4-byte address slots
//! - this module - the accessor, the header checksum and PC-relative pointer helpers
//!
//! All multi-byte values are big-endian, matching the console's 68000 CPU.
//!
//! # Header Checksum
//!
//! The cartridge header stores at `0x18E` the 16-bit wrapping sum of every big-endian word
//! from `0x200` to the end of the image. [`Rom::from_file`] warns when it does not match;
//! [`Rom::write_to_file`] recomputes it before writing.
//!
//! # PC-relative Pointers
//!
//! Many assets are referenced by a 4-byte instruction such as `lea (d16,pc),a0`, whose low
//! word is a signed displacement from the address of the extension word. Use
//! [`Rom::read_offset16`] to resolve such a reference and [`Rom::offset16_instruction`] to
//! re-target it.
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use romkit::rom::{Rom, RomLayout, Section};
//!
//! let layout = RomLayout::default().with_section("Script", Section::new(0x4_0000, 0x4_8000));
//! let mut rom = Rom::from_file("game.bin", layout)?;
//!
//! let section = rom.section("Script")?;
//! let bytes = rom.read_array(section.begin, section.size() as usize)?.to_vec();
//! rom.write_array(section.begin, &bytes)?;
//! rom.write_to_file("patched.bin")?;
//! # Ok::<(), romkit::Error>(())
//! ```

mod backend;
mod layout;

pub use backend::{Backend, Memory, Physical};
pub use layout::{RomLayout, Section};

use std::{fs, path::Path};

use crate::{
    utils::{read_be, write_be, RomIO},
    Error, Result,
};

/// Location of the stored header checksum.
pub const CHECKSUM_ADDRESS: u32 = 0x18E;

/// First byte covered by the header checksum.
pub const CHECKSUM_START: u32 = 0x200;

/// Size of an address slot.
pub const ADDRESS_SLOT_SIZE: u32 = 4;

/// A loaded ROM image and its layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rom {
    data: Vec<u8>,
    layout: RomLayout,
}

impl Rom {
    /// Load the image at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>, layout: RomLayout) -> Result<Self> {
        let path = path.as_ref();
        let backend = Physical::new(path)?;
        let rom = Self::from_backend(Box::new(backend), layout);

        log::info!("loaded ROM {} ({} bytes)", path.display(), rom.len());
        if let (Ok(stored), Ok(calculated)) = (rom.stored_checksum(), rom.calculate_checksum()) {
            if stored != calculated {
                log::warn!(
                    "ROM checksum mismatch: stored 0x{stored:04X}, calculated 0x{calculated:04X}"
                );
            }
        }

        Ok(rom)
    }

    /// Build an image from an in-memory buffer.
    #[must_use]
    pub fn from_mem(data: Vec<u8>, layout: RomLayout) -> Self {
        Self::from_backend(Box::new(Memory::new(data)), layout)
    }

    /// Build an image from any backend.
    #[must_use]
    pub fn from_backend(backend: Box<dyn Backend>, layout: RomLayout) -> Self {
        Rom {
            data: backend.into_data(),
            layout,
        }
    }

    /// The layout this image was loaded with.
    #[must_use]
    pub fn layout(&self) -> &RomLayout {
        &self.layout
    }

    /// The whole image.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Image size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true for an empty image.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn range(&self, address: u32, len: usize) -> Result<std::ops::Range<usize>> {
        let start = address as usize;
        let Some(end) = start.checked_add(len) else {
            return Err(out_of_bounds_error!());
        };
        if end > self.data.len() {
            return Err(out_of_bounds_error!());
        }
        Ok(start..end)
    }

    /// Borrow `len` bytes at `address`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range leaves the image.
    pub fn read_array(&self, address: u32, len: usize) -> Result<&[u8]> {
        let range = self.range(address, len)?;
        Ok(&self.data[range])
    }

    /// Read a big-endian value at `address`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value leaves the image.
    pub fn read<T: RomIO>(&self, address: u32) -> Result<T> {
        let start = address as usize;
        if start > self.data.len() {
            return Err(out_of_bounds_error!());
        }
        read_be(&self.data[start..])
    }

    /// Read a big-endian value at the address named `label`.
    ///
    /// # Errors
    /// Returns [`crate::Error::SectionNotFound`] for an unknown label, or
    /// [`crate::Error::OutOfBounds`].
    pub fn read_at_label<T: RomIO>(&self, label: &str) -> Result<T> {
        self.read(self.address(label)?)
    }

    /// Overwrite bytes at `address`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range leaves the image; nothing is
    /// written in that case.
    pub fn write_array(&mut self, address: u32, bytes: &[u8]) -> Result<()> {
        let range = self.range(address, bytes.len())?;
        self.data[range].copy_from_slice(bytes);
        Ok(())
    }

    /// Write a big-endian value at `address`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value leaves the image.
    pub fn write<T: RomIO>(&mut self, address: u32, value: T) -> Result<()> {
        let start = address as usize;
        if start > self.data.len() {
            return Err(out_of_bounds_error!());
        }
        write_be(&mut self.data[start..], value)
    }

    /// Returns true if the layout defines section `name`.
    #[must_use]
    pub fn section_exists(&self, name: &str) -> bool {
        self.layout.section(name).is_some()
    }

    /// Look up section `name`.
    ///
    /// # Errors
    /// Returns [`crate::Error::SectionNotFound`] if the layout has no such section.
    pub fn section(&self, name: &str) -> Result<Section> {
        self.layout
            .section(name)
            .ok_or_else(|| Error::SectionNotFound(name.to_string()))
    }

    /// Returns true if the layout defines address `name`.
    #[must_use]
    pub fn address_exists(&self, name: &str) -> bool {
        self.layout.address(name).is_some()
    }

    /// Look up address `name`.
    ///
    /// # Errors
    /// Returns [`crate::Error::SectionNotFound`] if the layout has no such address.
    pub fn address(&self, name: &str) -> Result<u32> {
        self.layout
            .address(name)
            .ok_or_else(|| Error::SectionNotFound(name.to_string()))
    }

    /// Region a pending write for `label` may occupy.
    ///
    /// A section yields its full extent; an address yields its 4-byte slot. Sections take
    /// precedence when a label names both.
    ///
    /// # Errors
    /// Returns [`crate::Error::SectionNotFound`] if the label is unknown.
    pub fn label_location(&self, label: &str) -> Result<Section> {
        if let Some(section) = self.layout.section(label) {
            return Ok(section);
        }
        if let Some(address) = self.layout.address(label) {
            return Ok(Section::new(address, address.saturating_add(ADDRESS_SLOT_SIZE)));
        }
        Err(Error::SectionNotFound(label.to_string()))
    }

    /// Sum of the big-endian words from [`CHECKSUM_START`] to the end of the image.
    ///
    /// A trailing odd byte is ignored.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the image is shorter than the header.
    pub fn calculate_checksum(&self) -> Result<u16> {
        let start = CHECKSUM_START as usize;
        if self.data.len() < start {
            return Err(out_of_bounds_error!());
        }

        Ok(self.data[start..]
            .chunks_exact(2)
            .fold(0u16, |sum, word| {
                sum.wrapping_add(u16::from_be_bytes([word[0], word[1]]))
            }))
    }

    /// The checksum stored in the header.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the image has no header.
    pub fn stored_checksum(&self) -> Result<u16> {
        self.read(CHECKSUM_ADDRESS)
    }

    /// Recompute and store the header checksum, returning it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the image is shorter than the header.
    pub fn fix_checksum(&mut self) -> Result<u16> {
        let checksum = self.calculate_checksum()?;
        self.write(CHECKSUM_ADDRESS, checksum)?;
        Ok(checksum)
    }

    /// Fix the checksum and write the image to `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] on I/O failure or
    /// [`crate::Error::OutOfBounds`] for an image without a header.
    pub fn write_to_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let checksum = self.fix_checksum()?;
        fs::write(path.as_ref(), &self.data)?;
        log::info!(
            "wrote ROM {} ({} bytes, checksum 0x{checksum:04X})",
            path.as_ref().display(),
            self.data.len()
        );
        Ok(())
    }

    /// Resolve the PC-relative instruction at address `label`.
    ///
    /// Returns `address + 2 + displacement`, where the displacement is the signed low word
    /// of the instruction.
    ///
    /// # Errors
    /// Returns [`crate::Error::SectionNotFound`] or [`crate::Error::OutOfBounds`].
    pub fn read_offset16(&self, label: &str) -> Result<u32> {
        let address = self.address(label)?;
        let operand = address.checked_add(2).ok_or(out_of_bounds_error!())?;
        let displacement = self.read::<i16>(operand)?;
        let target = i64::from(address) + 2 + i64::from(displacement);
        u32::try_from(target).map_err(|_| out_of_bounds_error!())
    }

    /// The instruction at address `label` re-targeted to `target`.
    ///
    /// The opcode word is kept; only the displacement changes. Nothing is written.
    ///
    /// # Errors
    /// - [`crate::Error::DisplacementOutOfRange`] if `target` is not reachable with a
    ///   signed 16-bit displacement
    /// - [`crate::Error::SectionNotFound`] or [`crate::Error::OutOfBounds`]
    pub fn offset16_instruction(&self, label: &str, target: u32) -> Result<[u8; 4]> {
        let address = self.address(label)?;
        let opcode = self.read::<u16>(address)?;
        let displacement = i64::from(target) - (i64::from(address) + 2);
        let displacement = i16::try_from(displacement).map_err(|_| {
            Error::DisplacementOutOfRange {
                from: address,
                to: target,
            }
        })?;

        let [op_hi, op_lo] = opcode.to_be_bytes();
        let [disp_hi, disp_lo] = displacement.to_be_bytes();
        Ok([op_hi, op_lo, disp_hi, disp_lo])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> Rom {
        let mut data = vec![0u8; 0x400];
        data[0x200] = 0x12;
        data[0x201] = 0x34;
        data[0x3FE] = 0x00;
        data[0x3FF] = 0x01;
        // lea (-0x10,pc),a0 at 0x300
        data[0x300..0x304].copy_from_slice(&[0x41, 0xFA, 0xFF, 0xF0]);

        let layout = RomLayout::default()
            .with_section("Data", Section::new(0x280, 0x2C0))
            .with_address("Ptr", 0x300);
        Rom::from_mem(data, layout)
    }

    #[test]
    fn read_write() {
        let mut rom = image();
        assert_eq!(rom.read::<u16>(0x200).unwrap(), 0x1234);
        rom.write::<u32>(0x280, 0xDEAD_BEEF).unwrap();
        assert_eq!(rom.read_array(0x280, 4).unwrap(), &[0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(rom.write_array(0x3FE, &[1, 2, 3]).is_err());
        assert_eq!(rom.read::<u16>(0x3FE).unwrap(), 0x0001);
        assert!(rom.read::<u32>(0x3FE).is_err());
        assert!(rom.read::<u8>(0x1000).is_err());
    }

    #[test]
    fn labels() {
        let rom = image();
        assert!(rom.section_exists("Data"));
        assert!(!rom.section_exists("Ptr"));
        assert!(rom.address_exists("Ptr"));
        assert_eq!(rom.section("Data").unwrap().size(), 0x40);
        assert_eq!(rom.label_location("Ptr").unwrap(), Section::new(0x300, 0x304));
        assert!(matches!(
            rom.label_location("Nope"),
            Err(Error::SectionNotFound(label)) if label == "Nope"
        ));
        assert_eq!(rom.read_at_label::<u16>("Ptr").unwrap(), 0x41FA);
    }

    #[test]
    fn checksum() {
        let mut rom = image();
        let expected = 0x1234u16
            .wrapping_add(0x41FA)
            .wrapping_add(0xFFF0)
            .wrapping_add(0x0001);
        assert_eq!(rom.calculate_checksum().unwrap(), expected);
        assert_eq!(rom.stored_checksum().unwrap(), 0);

        rom.fix_checksum().unwrap();
        assert_eq!(rom.stored_checksum().unwrap(), expected);

        let short = Rom::from_mem(vec![0; 0x100], RomLayout::default());
        assert!(short.calculate_checksum().is_err());
    }

    #[test]
    fn offset16() {
        let rom = image();
        assert_eq!(rom.read_offset16("Ptr").unwrap(), 0x302 - 0x10);
        assert_eq!(
            rom.offset16_instruction("Ptr", 0x380).unwrap(),
            [0x41, 0xFA, 0x00, 0x7E]
        );
        assert_eq!(
            rom.offset16_instruction("Ptr", 0).unwrap(),
            [0x41, 0xFA, 0xFC, 0xFE]
        );
        assert!(matches!(
            rom.offset16_instruction("Ptr", 0x30_0000),
            Err(Error::DisplacementOutOfRange { from: 0x300, to: 0x30_0000 })
        ));
    }

    #[test]
    fn offset16_at_address_limit() {
        let rom = Rom::from_mem(
            vec![0; 0x10],
            RomLayout::default().with_address("Edge", u32::MAX - 1),
        );
        assert!(matches!(rom.read_offset16("Edge"), Err(Error::OutOfBounds)));
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");

        let mut rom = image();
        rom.write_to_file(&path).unwrap();

        let reloaded = Rom::from_file(&path, rom.layout().clone()).unwrap();
        assert_eq!(reloaded, rom);
        assert_eq!(
            reloaded.stored_checksum().unwrap(),
            reloaded.calculate_checksum().unwrap()
        );
    }
}
