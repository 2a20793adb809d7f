//! Typed game assets and their change tracking.
//!
//! # Key Components
//!
//! - [`crate::assets::Codec`] - binds an asset value type to its byte format
//! - [`crate::assets::VersionedEntry`] - one asset with original, last-saved and current
//!   versions
//! - [`crate::assets::TrackedEntry`] - object-safe view used for bulk operations
//! - [`crate::assets::PendingWrite`], [`crate::assets::FitReport`] - ROM injection queue
//!   and its dry run
//! - [`crate::assets::Palette`] - partial palettes with engine-locked entries

mod entry;
mod format;
mod palette;
mod pending;

pub use entry::{RawEntry, SharedBytes, TrackedEntry, VersionedEntry};
pub use format::{BlocksetFormat, Codec, PaletteFormat, RawFormat};
pub use palette::{Colour, Palette, PaletteKind, PALETTE_LINE_SIZE};
pub use pending::{FitReport, FitReportEntry, FitStatus, PendingWrite, PendingWrites};
