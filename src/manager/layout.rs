//! Placement of assets in the ROM and the packing of edited assets back into it.
//!
//! Several assets usually share one section. The game finds each of them either through a
//! PC-relative instruction or through a table of absolute pointers, so moving an asset
//! means patching its reference too. [`pack`] lays out the serialised assets of a manager
//! and emits the section writes together with the reference patches; [`locate`] performs
//! the inverse lookup when loading.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::{
    assets::{PendingWrite, PendingWrites, SharedBytes, TrackedEntry},
    rom::{Rom, Section},
    Error, Result,
};

/// Size of one pointer-table slot.
pub const TABLE_SLOT_SIZE: u32 = 4;

/// Where an asset lives in the ROM.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Sole occupant of a section.
    Section(String),
    /// Packed into `section`; referenced by the PC-relative instruction at address `pointer`.
    Pointer {
        /// Shared data section
        section: String,
        /// Address label of the referencing instruction
        pointer: String,
    },
    /// Packed into `section`; referenced by slot `index` of the pointer table `table`.
    Table {
        /// Shared data section
        section: String,
        /// Section holding big-endian 32-bit pointers
        table: String,
        /// Slot number in the table
        index: usize,
    },
}

impl Placement {
    /// The section holding the asset data.
    #[must_use]
    pub fn section(&self) -> &str {
        match self {
            Placement::Section(section)
            | Placement::Pointer { section, .. }
            | Placement::Table { section, .. } => section,
        }
    }

    /// Shorthand for [`Placement::Section`].
    pub fn in_section(section: impl Into<String>) -> Self {
        Placement::Section(section.into())
    }

    /// Shorthand for [`Placement::Pointer`].
    pub fn by_pointer(section: impl Into<String>, pointer: impl Into<String>) -> Self {
        Placement::Pointer {
            section: section.into(),
            pointer: pointer.into(),
        }
    }

    /// Shorthand for [`Placement::Table`].
    pub fn in_table(section: impl Into<String>, table: impl Into<String>, index: usize) -> Self {
        Placement::Table {
            section: section.into(),
            table: table.into(),
            index,
        }
    }

    fn start(&self, rom: &Rom) -> Result<u32> {
        match self {
            Placement::Section(section) => Ok(rom.section(section)?.begin),
            Placement::Pointer { pointer, .. } => rom.read_offset16(pointer),
            Placement::Table { table, index, .. } => rom.read::<u32>(table_slot(rom, table, *index)?),
        }
    }
}

/// An entry of a manager together with its placement.
pub struct Slot<'a> {
    /// Where the entry goes
    pub placement: &'a Placement,
    /// The entry
    pub entry: &'a mut dyn TrackedEntry,
}

impl<'a> Slot<'a> {
    /// Pair an entry with its placement.
    pub fn new(placement: &'a Placement, entry: &'a mut dyn TrackedEntry) -> Self {
        Slot { placement, entry }
    }
}

fn table_slot(rom: &Rom, table: &str, index: usize) -> Result<u32> {
    let section = rom.section(table)?;
    let offset = u32::try_from(index)
        .ok()
        .and_then(|index| index.checked_mul(TABLE_SLOT_SIZE))
        .filter(|offset| offset + TABLE_SLOT_SIZE <= section.size())
        .ok_or_else(|| {
            Error::InvalidInput(format!("slot {index} is outside pointer table {table}"))
        })?;
    Ok(section.begin + offset)
}

/// Serialise every entry, in parallel.
///
/// # Errors
/// Returns the first encode error reported.
pub fn serialize_all(slots: &mut [Slot<'_>]) -> Result<Vec<SharedBytes>> {
    slots
        .par_iter_mut()
        .map(|slot| slot.entry.bytes())
        .collect()
}

/// Lay out `slots` in their sections and produce the writes that install them.
///
/// Entries sharing a section are concatenated in slot order starting at the section begin,
/// and each entry is assigned its new start address. The result holds, in order:
/// one write per section, one instruction patch per [`Placement::Pointer`] entry, and one
/// rebuilt table per pointer table. Table slots without an entry keep their current value.
///
/// `bytes[i]` must be the serialisation of `slots[i]`.
///
/// # Errors
/// - [`crate::Error::SectionNotFound`] for an unknown section or label
/// - [`crate::Error::DisplacementOutOfRange`] if a moved asset is out of reach of its
///   instruction
/// - [`crate::Error::InvalidInput`] for a table slot outside its table
pub fn pack(rom: &Rom, slots: &mut [Slot<'_>], bytes: &[SharedBytes]) -> Result<PendingWrites> {
    if slots.len() != bytes.len() {
        return Err(Error::InvalidInput(format!(
            "{} entries but {} serialisations",
            slots.len(),
            bytes.len()
        )));
    }

    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
    for (index, slot) in slots.iter().enumerate() {
        let section = slot.placement.section();
        match groups.iter_mut().find(|(name, _)| *name == section) {
            Some((_, members)) => members.push(index),
            None => groups.push((section, vec![index])),
        }
    }

    let mut starts = vec![0u32; slots.len()];
    let mut section_writes = Vec::with_capacity(groups.len());
    for (name, members) in &groups {
        let section = rom.section(name)?;
        let mut buffer = Vec::new();
        let mut offset = section.begin;
        for &index in members {
            starts[index] = offset;
            buffer.extend_from_slice(&bytes[index]);
            let length = u32::try_from(bytes[index].len()).map_err(|_| out_of_bounds_error!())?;
            offset = offset.checked_add(length).ok_or(out_of_bounds_error!())?;
        }
        section_writes.push(PendingWrite::new(*name, buffer));
    }

    let mut writes = section_writes;
    let mut tables: Vec<(&str, Vec<(usize, u32)>)> = Vec::new();
    for (slot, &start) in slots.iter_mut().zip(&starts) {
        slot.entry.set_start_address(start);
        let placement = slot.placement;
        match placement {
            Placement::Section(_) => {}
            Placement::Pointer { pointer, .. } => {
                let instruction = rom.offset16_instruction(pointer, start)?;
                writes.push(PendingWrite::new(pointer.as_str(), instruction.to_vec()));
            }
            Placement::Table { table, index, .. } => {
                match tables.iter_mut().find(|(name, _)| *name == table.as_str()) {
                    Some((_, slots)) => slots.push((*index, start)),
                    None => tables.push((table.as_str(), vec![(*index, start)])),
                }
            }
        }
    }

    for (table, entries) in tables {
        let section = rom.section(table)?;
        let mut contents = rom.read_array(section.begin, section.size() as usize)?.to_vec();
        for (index, start) in entries {
            let offset = (table_slot(rom, table, index)? - section.begin) as usize;
            contents[offset..offset + TABLE_SLOT_SIZE as usize]
                .copy_from_slice(&start.to_be_bytes());
        }
        writes.push(PendingWrite::new(table, contents));
    }

    Ok(writes)
}

/// Resolve the ROM range of each placement.
///
/// The start comes from the section begin, the referencing instruction, or the pointer
/// table. The end is the next distinct start in the same section, or the section end.
///
/// # Errors
/// - [`crate::Error::SectionNotFound`] for an unknown section or label
/// - [`crate::Error::CorruptData`] if a reference points outside its section
pub fn locate(rom: &Rom, placements: &[&Placement]) -> Result<Vec<Section>> {
    let mut starts = Vec::with_capacity(placements.len());
    let mut by_section: HashMap<&str, Vec<u32>> = HashMap::new();

    for placement in placements {
        let section = rom.section(placement.section())?;
        let start = placement.start(rom)?;
        if start < section.begin || start > section.end {
            return Err(corrupt_data!(
                "asset start 0x{:06X} lies outside section {} (0x{:06X}-0x{:06X})",
                start,
                placement.section(),
                section.begin,
                section.end
            ));
        }
        starts.push((start, section));
        by_section
            .entry(placement.section())
            .or_default()
            .push(start);
    }

    Ok(placements
        .iter()
        .zip(starts)
        .map(|(placement, (start, section))| {
            let end = match placement {
                Placement::Section(_) => section.end,
                _ => by_section[placement.section()]
                    .iter()
                    .copied()
                    .filter(|&other| other > start)
                    .min()
                    .unwrap_or(section.end),
            };
            Section::new(start, end)
        })
        .collect())
}
