//! Loading of catalogued assets into placed, versioned entries.

use crate::{
    assets::{Codec, RawEntry, VersionedEntry},
    manager::{
        layout::{locate, Slot},
        AssetSpec, Placement,
    },
    rom::{Rom, Section},
    source::SourceTree,
    Result,
};

/// A versioned entry and where it lives in the ROM.
#[derive(Debug)]
pub struct Placed<C: Codec> {
    /// ROM placement
    pub placement: Placement,
    /// The asset
    pub entry: VersionedEntry<C>,
}

impl<C: Codec> Placed<C> {
    pub(crate) fn slot(&mut self) -> Slot<'_> {
        Slot::new(&self.placement, &mut self.entry)
    }
}

/// The placements of a group of specs, in catalog order.
pub(crate) fn placements<C>(specs: &[(AssetSpec, C)]) -> Vec<&Placement> {
    specs.iter().map(|(spec, _)| &spec.placement).collect()
}

/// Resolve the ROM ranges of every asset group of one manager in a single pass.
///
/// Groups of different formats may share a section, and [`crate::manager::layout::pack`]
/// packs them back together, so each asset is bounded by the next start of any group.
pub(crate) fn locate_groups<const N: usize>(
    rom: &Rom,
    groups: [Vec<&Placement>; N],
) -> Result<[Vec<Section>; N]> {
    let lengths = groups.each_ref().map(Vec::len);
    let all: Vec<&Placement> = groups.into_iter().flatten().collect();
    let mut ranges = locate(rom, &all)?.into_iter();
    Ok(lengths.map(|length| ranges.by_ref().take(length).collect()))
}

/// Read each asset from its resolved ROM range.
pub(crate) fn from_rom<C: Codec>(
    rom: &Rom,
    specs: Vec<(AssetSpec, C)>,
    ranges: Vec<Section>,
) -> Result<Vec<Placed<C>>> {
    specs
        .into_iter()
        .zip(ranges)
        .map(|((spec, codec), range)| {
            let bytes = rom.read_array(range.begin, range.size() as usize)?;
            let entry = RawEntry::new(spec.name, spec.file, bytes, codec)
                .at_address(range.begin)
                .initialise()?;
            log::trace!(
                "{} at 0x{:06X}: {} of {} bytes",
                entry.name(),
                range.begin,
                entry.original_data_length(),
                range.size()
            );
            Ok(Placed {
                placement: spec.placement,
                entry,
            })
        })
        .collect()
}

/// Read each asset from the file its label includes.
pub(crate) fn from_source<C: Codec>(
    tree: &dyn SourceTree,
    specs: impl IntoIterator<Item = (AssetSpec, C)>,
) -> Result<Vec<Placed<C>>> {
    specs
        .into_iter()
        .map(|(spec, codec)| {
            let path = tree.resolve(&spec.name)?;
            let bytes = tree.read(&path)?;
            let entry = RawEntry::new(spec.name, path, bytes, codec).initialise()?;
            Ok(Placed {
                placement: spec.placement,
                entry,
            })
        })
        .collect()
}
