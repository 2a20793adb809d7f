//! Named regions of a ROM image.

use std::collections::HashMap;

/// A contiguous region `[begin, end)` of the ROM reserved for one or more assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Section {
    /// First byte of the region
    pub begin: u32,
    /// One past the last byte of the region
    pub end: u32,
}

impl Section {
    /// Create a section spanning `[begin, end)`.
    #[must_use]
    pub const fn new(begin: u32, end: u32) -> Self {
        Section { begin, end }
    }

    /// Number of bytes in the section.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.end.saturating_sub(self.begin)
    }

    /// Returns true if `address` lies inside the section.
    #[must_use]
    pub const fn contains(&self, address: u32) -> bool {
        address >= self.begin && address < self.end
    }
}

/// Labels of the sections and fixed addresses of a particular ROM revision.
///
/// Sections hold asset data; addresses are 4-byte slots holding either an absolute pointer
/// or a PC-relative instruction.
///
/// ```rust,ignore
/// use romkit::rom::{RomLayout, Section};
///
/// let layout = RomLayout::default()
///     .with_section("Blocksets", Section::new(0x1E_0000, 0x1E_8000))
///     .with_address("BlocksetPtr", 0x0A_1234);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RomLayout {
    sections: HashMap<String, Section>,
    addresses: HashMap<String, u32>,
}

impl RomLayout {
    /// Add or replace a section.
    #[must_use]
    pub fn with_section(mut self, name: impl Into<String>, section: Section) -> Self {
        self.sections.insert(name.into(), section);
        self
    }

    /// Add or replace an address.
    #[must_use]
    pub fn with_address(mut self, name: impl Into<String>, address: u32) -> Self {
        self.addresses.insert(name.into(), address);
        self
    }

    /// Look up a section.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<Section> {
        self.sections.get(name).copied()
    }

    /// Look up an address.
    #[must_use]
    pub fn address(&self, name: &str) -> Option<u32> {
        self.addresses.get(name).copied()
    }

    /// Iterate over all sections.
    pub fn sections(&self) -> impl Iterator<Item = (&str, Section)> {
        self.sections.iter().map(|(name, section)| (name.as_str(), *section))
    }
}
