//! Colour palettes and their partial on-ROM layouts.
//!
//! The console has four 16-colour palette lines, but most palettes in the game only own a
//! slice of a line: the remaining entries are fixed by the engine (transparent colour,
//! outline black, shared HUD colours) and are never stored. [`PaletteKind`] describes, for
//! each palette family, which entries are locked and how many colours are stored.
//!
//! A stored palette is the sequence of its unlocked colours, each a big-endian 16-bit
//! console colour word. [`PaletteKind::TitleBlueFade`] is the one variable-length kind; it
//! stores a 16-bit count followed by that many colours.

use strum::{Display, EnumIter};

use crate::{codec::Parser, Error, Result};

/// Number of entries in a palette line.
pub const PALETTE_LINE_SIZE: usize = 16;

/// A console colour word (`0000 BBB0 GGG0 RRR0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Colour(pub u16);

impl Colour {
    /// Light grey the engine keeps in entry 1 of every line.
    pub const OUTLINE: Colour = Colour(0x0CCC);

    /// Build a colour from 3-bit channel intensities.
    #[must_use]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Colour(((b as u16 & 7) << 9) | ((g as u16 & 7) << 5) | ((r as u16 & 7) << 1))
    }

    /// 3-bit `(r, g, b)` intensities.
    #[must_use]
    pub const fn rgb(&self) -> (u8, u8, u8) {
        (
            ((self.0 >> 1) & 7) as u8,
            ((self.0 >> 5) & 7) as u8,
            ((self.0 >> 9) & 7) as u8,
        )
    }
}

/// Palette family; determines which entries are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum PaletteKind {
    /// All 16 entries
    Full,
    /// Entries 0-7
    Low8,
    /// Room palettes; 0, 1 and 15 are fixed
    Room,
    /// Status bar; entries 10-14
    Hud,
    /// Sprite entries 2-7
    SpriteLow,
    /// Sprite entries 8-14
    SpriteHigh,
    /// Sprite entries 2-14
    SpriteFull,
    /// Projectile entries 8-9
    Projectile,
    /// Projectile entries 4-7
    Projectile2,
    /// Sword effect entries 13-14
    Sword,
    /// Armour entries 11-12
    Armour,
    /// Lava cycle entries 8-9
    Lava,
    /// Warp cycle entries 13-14
    Warp,
    /// Publisher logo entries 0-6
    SegaLogo,
    /// Developer logo entries 0-3
    ClimaxLogo,
    /// Title text entries 1-5
    TitleYellow,
    /// Title single colour, entry 1
    TitleSingleColour,
    /// Title fade sequence with a stored colour count
    TitleBlueFade,
    /// Credits entries 0-3
    EndCredits,
}

impl PaletteKind {
    /// Bit `n` set means entry `n` is locked and not stored.
    #[must_use]
    pub const fn locked_mask(self) -> u16 {
        match self {
            PaletteKind::Full | PaletteKind::TitleBlueFade => 0x0000,
            PaletteKind::Low8 => 0xFF00,
            PaletteKind::Room | PaletteKind::SpriteFull => 0x8003,
            PaletteKind::Hud => 0x83FF,
            PaletteKind::SpriteLow => 0xFF03,
            PaletteKind::SpriteHigh => 0x80FF,
            PaletteKind::Projectile | PaletteKind::Lava => 0xFCFF,
            PaletteKind::Projectile2 => 0xFF0F,
            PaletteKind::Sword | PaletteKind::Warp => 0x9FFF,
            PaletteKind::Armour => 0xE7FF,
            PaletteKind::SegaLogo => 0xFF80,
            PaletteKind::ClimaxLogo | PaletteKind::EndCredits => 0xFFF0,
            PaletteKind::TitleYellow => 0xFFC1,
            PaletteKind::TitleSingleColour => 0xFFFD,
        }
    }

    /// Number of stored colours, or `None` for the variable-length kind.
    #[must_use]
    pub const fn size(self) -> Option<usize> {
        match self {
            PaletteKind::TitleBlueFade => None,
            PaletteKind::Full => Some(16),
            PaletteKind::Room | PaletteKind::SpriteFull => Some(13),
            PaletteKind::Low8 => Some(8),
            PaletteKind::SpriteHigh | PaletteKind::SegaLogo => Some(7),
            PaletteKind::SpriteLow => Some(6),
            PaletteKind::Hud | PaletteKind::TitleYellow => Some(5),
            PaletteKind::Projectile2 | PaletteKind::ClimaxLogo | PaletteKind::EndCredits => {
                Some(4)
            }
            PaletteKind::Projectile
            | PaletteKind::Sword
            | PaletteKind::Armour
            | PaletteKind::Lava
            | PaletteKind::Warp => Some(2),
            PaletteKind::TitleSingleColour => Some(1),
        }
    }

    /// Returns true if entry `index` is fixed by the engine.
    #[must_use]
    pub const fn is_locked(self, index: usize) -> bool {
        index < PALETTE_LINE_SIZE && self.locked_mask() & (1 << index) != 0
    }

    fn unlocked(self) -> impl Iterator<Item = usize> {
        (0..PALETTE_LINE_SIZE).filter(move |&index| !self.is_locked(index))
    }
}

/// A palette of a given kind.
///
/// Fixed kinds always hold 16 entries; locked entries keep their default colours and are
/// ignored when serialising. The variable kind holds exactly its stored colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    kind: PaletteKind,
    colours: Vec<Colour>,
}

impl Palette {
    /// Create a cleared palette of `kind`.
    ///
    /// Fixed kinds start black except for entry 1, which holds [`Colour::OUTLINE`].
    #[must_use]
    pub fn new(kind: PaletteKind) -> Self {
        let colours = if kind.size().is_some() {
            let mut colours = vec![Colour::default(); PALETTE_LINE_SIZE];
            colours[1] = Colour::OUTLINE;
            colours
        } else {
            Vec::new()
        };
        Palette { kind, colours }
    }

    /// The palette family.
    #[must_use]
    pub fn kind(&self) -> PaletteKind {
        self.kind
    }

    /// All entries, including locked ones.
    #[must_use]
    pub fn colours(&self) -> &[Colour] {
        &self.colours
    }

    /// The colour at `index`.
    #[must_use]
    pub fn colour(&self, index: usize) -> Option<Colour> {
        self.colours.get(index).copied()
    }

    /// Replace an unlocked entry.
    ///
    /// # Errors
    /// - [`crate::Error::OutOfBounds`] if `index` is past the last entry
    /// - [`crate::Error::InvalidInput`] if the entry is locked
    pub fn set_colour(&mut self, index: usize, colour: Colour) -> Result<()> {
        if index >= self.colours.len() {
            return Err(out_of_bounds_error!());
        }
        if self.kind.is_locked(index) {
            return Err(Error::InvalidInput(format!(
                "entry {index} of a {} palette is locked",
                self.kind
            )));
        }

        self.colours[index] = colour;
        Ok(())
    }

    /// Append a colour to a variable-length palette.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidInput`] for fixed-size kinds.
    pub fn push_colour(&mut self, colour: Colour) -> Result<()> {
        if self.kind.size().is_some() {
            return Err(Error::InvalidInput(format!(
                "a {} palette has a fixed size",
                self.kind
            )));
        }

        self.colours.push(colour);
        Ok(())
    }

    /// Serialise the stored colours.
    ///
    /// # Errors
    /// Returns [`crate::Error::CapacityExceeded`] if a variable palette holds more than
    /// `u16::MAX` colours.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(2 + self.colours.len() * 2);

        if self.kind.size().is_some() {
            for index in self.kind.unlocked() {
                out.extend_from_slice(&self.colours[index].0.to_be_bytes());
            }
        } else {
            let count = u16::try_from(self.colours.len()).map_err(|_| Error::CapacityExceeded {
                required: self.colours.len(),
                available: usize::from(u16::MAX),
            })?;
            out.extend_from_slice(&count.to_be_bytes());
            for colour in &self.colours {
                out.extend_from_slice(&colour.0.to_be_bytes());
            }
        }

        Ok(out)
    }

    /// Deserialise a palette of `kind`, returning it with the number of bytes consumed.
    ///
    /// # Errors
    /// Returns [`crate::Error::CorruptData`] if `data` is too short.
    pub fn from_bytes(kind: PaletteKind, data: &[u8]) -> Result<(Self, usize)> {
        let mut parser = Parser::new(data);
        let mut palette = Palette::new(kind);

        if kind.size().is_some() {
            for index in kind.unlocked() {
                palette.colours[index] = Colour(parser.read_be::<u16>()?);
            }
        } else {
            let count = parser.read_be::<u16>()?;
            for _ in 0..count {
                palette.colours.push(Colour(parser.read_be::<u16>()?));
            }
        }

        Ok((palette, parser.pos()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn sizes_match_unlocked_entries() {
        for kind in PaletteKind::iter() {
            if let Some(size) = kind.size() {
                assert_eq!(kind.unlocked().count(), size, "{kind}");
            }
        }
    }

    #[test]
    fn locked_tables() {
        assert!(PaletteKind::Room.is_locked(0));
        assert!(PaletteKind::Room.is_locked(1));
        assert!(!PaletteKind::Room.is_locked(2));
        assert!(PaletteKind::Room.is_locked(15));
        assert_eq!(PaletteKind::Hud.unlocked().collect::<Vec<_>>(), vec![10, 11, 12, 13, 14]);
        assert_eq!(PaletteKind::Low8.unlocked().collect::<Vec<_>>(), (0..8).collect::<Vec<_>>());
        assert!(!PaletteKind::Full.is_locked(16));
    }

    #[test]
    fn hud_roundtrip() {
        let data = [0x0E, 0xEE, 0x00, 0x02, 0x00, 0x20, 0x02, 0x00, 0x00, 0x00];
        let (palette, consumed) = Palette::from_bytes(PaletteKind::Hud, &data).unwrap();
        assert_eq!(consumed, 10);
        assert_eq!(palette.colour(10), Some(Colour(0x0EEE)));
        assert_eq!(palette.colour(0), Some(Colour(0)));
        assert_eq!(palette.colour(1), Some(Colour(0x0CCC)));
        assert_eq!(palette.to_bytes().unwrap(), data);
    }

    #[test]
    fn cleared_palette_defaults() {
        let palette = Palette::new(PaletteKind::Room);
        assert_eq!(palette.colour(0), Some(Colour(0)));
        assert_eq!(palette.colour(1), Some(Colour::OUTLINE));
        assert!(palette.colours()[2..].iter().all(|&colour| colour == Colour(0)));
        assert!(Palette::new(PaletteKind::TitleBlueFade).colours().is_empty());
    }

    #[test]
    fn variable_roundtrip() {
        let mut palette = Palette::new(PaletteKind::TitleBlueFade);
        palette.push_colour(Colour::from_rgb(1, 2, 3)).unwrap();
        palette.push_colour(Colour(0x0E00)).unwrap();

        let bytes = palette.to_bytes().unwrap();
        assert_eq!(bytes.len(), 6);
        assert_eq!(&bytes[..2], &[0x00, 0x02]);
        assert_eq!(Palette::from_bytes(PaletteKind::TitleBlueFade, &bytes).unwrap(), (palette, 6));
    }

    #[test]
    fn locked_entries_rejected() {
        let mut palette = Palette::new(PaletteKind::Room);
        assert!(palette.set_colour(0, Colour(0x0EEE)).is_err());
        assert!(palette.set_colour(16, Colour(0x0EEE)).is_err());
        palette.set_colour(5, Colour(0x0EEE)).unwrap();
        assert!(palette.push_colour(Colour(0)).is_err());
    }

    #[test]
    fn truncated_palette() {
        assert!(matches!(
            Palette::from_bytes(PaletteKind::Room, &[0; 25]),
            Err(Error::CorruptData { .. })
        ));
    }

    #[test]
    fn colour_channels() {
        let colour = Colour::from_rgb(7, 3, 5);
        assert_eq!(colour.rgb(), (7, 3, 5));
        assert_eq!(colour.0, 0x0A6E);
    }
}
