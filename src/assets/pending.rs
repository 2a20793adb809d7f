//! Writes queued for injection into a ROM image, and the fit check run before them.
//!
//! A [`PendingWrite`] pairs a ROM label with the bytes destined for it. Managers produce
//! them in `refresh_pending_writes`; they stay valid until the next refresh.
//!
//! [`FitReport::check`] compares each write against the region its label resolves to. It
//! only reads the ROM layout, so it can be run any number of times before deciding whether
//! to inject.
//!
//! ```text
//! Label                      Address   Available   Required  Status
//! Blocksets                 0x1E0000       32768      31004  OK
//! Tilemap0                  0x0A0000        1024       1290  BAD
//! ```

use std::fmt;

use crate::{
    assets::entry::SharedBytes,
    rom::{Rom, Section},
};

/// Bytes destined for a labelled ROM region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    /// Section or address label
    pub label: String,
    /// Payload
    pub bytes: SharedBytes,
}

impl PendingWrite {
    /// Queue `bytes` for `label`.
    pub fn new(label: impl Into<String>, bytes: impl Into<SharedBytes>) -> Self {
        PendingWrite {
            label: label.into(),
            bytes: bytes.into(),
        }
    }

    /// Payload size.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true for an empty payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Ordered list of pending writes.
pub type PendingWrites = Vec<PendingWrite>;

/// Verdict for one pending write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitStatus {
    /// The payload fits its region
    Ok,
    /// The payload is larger than its region
    Bad,
    /// The label names no section or address
    Missing,
}

impl fmt::Display for FitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FitStatus::Ok => "OK",
            FitStatus::Bad => "BAD",
            FitStatus::Missing => "MISSING",
        })
    }
}

/// One row of a [`FitReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitReportEntry {
    /// Label of the pending write
    pub label: String,
    /// Start of the target region; 0 when missing
    pub address: u32,
    /// Size of the target region; 0 when missing
    pub available: usize,
    /// Payload size
    pub required: usize,
    /// Verdict
    pub status: FitStatus,
}

impl FitReportEntry {
    fn evaluate(rom: &Rom, write: &PendingWrite) -> Self {
        match rom.label_location(&write.label) {
            Ok(Section { begin, end }) => {
                let available = end.saturating_sub(begin) as usize;
                let status = if write.len() <= available {
                    FitStatus::Ok
                } else {
                    FitStatus::Bad
                };
                FitReportEntry {
                    label: write.label.clone(),
                    address: begin,
                    available,
                    required: write.len(),
                    status,
                }
            }
            Err(_) => FitReportEntry {
                label: write.label.clone(),
                address: 0,
                available: 0,
                required: write.len(),
                status: FitStatus::Missing,
            },
        }
    }

    /// Returns true if the payload fits.
    #[must_use]
    pub fn fits(&self) -> bool {
        self.status == FitStatus::Ok
    }
}

/// Itemised result of a fit check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FitReport {
    entries: Vec<FitReportEntry>,
}

impl FitReport {
    /// Evaluate every write against the layout of `rom`.
    #[must_use]
    pub fn check(rom: &Rom, writes: &[PendingWrite]) -> Self {
        let entries: Vec<FitReportEntry> = writes
            .iter()
            .map(|write| FitReportEntry::evaluate(rom, write))
            .collect();

        for entry in entries.iter().filter(|entry| !entry.fits()) {
            log::warn!(
                "{} does not fit: {} ({} bytes required, {} available)",
                entry.label,
                entry.status,
                entry.required,
                entry.available
            );
        }

        FitReport { entries }
    }

    /// Returns true if every write fits.
    #[must_use]
    pub fn fits(&self) -> bool {
        self.entries.iter().all(FitReportEntry::fits)
    }

    /// All rows, in pending-write order.
    #[must_use]
    pub fn entries(&self) -> &[FitReportEntry] {
        &self.entries
    }

    /// Rows that do not fit.
    pub fn failures(&self) -> impl Iterator<Item = &FitReportEntry> {
        self.entries.iter().filter(|entry| !entry.fits())
    }

    /// Append the rows of `other`.
    pub fn merge(&mut self, other: FitReport) {
        self.entries.extend(other.entries);
    }
}

impl fmt::Display for FitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<24} {:>9} {:>11} {:>10}  Status",
            "Label", "Address", "Available", "Required"
        )?;
        for entry in &self.entries {
            writeln!(
                f,
                "{:<24} 0x{:06X} {:>11} {:>10}  {}",
                entry.label, entry.address, entry.available, entry.required, entry.status
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rom::RomLayout;

    fn rom() -> Rom {
        let layout = RomLayout::default()
            .with_section("Small", Section::new(0x100, 0x104))
            .with_section("Large", Section::new(0x200, 0x300))
            .with_address("Pointer", 0x20);
        Rom::from_mem(vec![0; 0x400], layout)
    }

    #[test]
    fn verdicts() {
        let rom = rom();
        let writes = vec![
            PendingWrite::new("Large", vec![0u8; 0x100]),
            PendingWrite::new("Small", vec![0u8; 5]),
            PendingWrite::new("Pointer", vec![0u8; 4]),
            PendingWrite::new("Unknown", vec![0u8; 1]),
        ];

        let report = FitReport::check(&rom, &writes);
        assert!(!report.fits());

        let statuses: Vec<FitStatus> = report.entries().iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![FitStatus::Ok, FitStatus::Bad, FitStatus::Ok, FitStatus::Missing]
        );

        let failing: Vec<&str> = report.failures().map(|e| e.label.as_str()).collect();
        assert_eq!(failing, vec!["Small", "Unknown"]);
        assert_eq!(report.entries()[1].address, 0x100);
        assert_eq!(report.entries()[1].available, 4);
        assert_eq!(report.entries()[1].required, 5);
    }

    #[test]
    fn empty_report_fits() {
        let report = FitReport::check(&rom(), &[]);
        assert!(report.fits());
        assert!(report.entries().is_empty());
    }

    #[test]
    fn display_marks_failures() {
        let rom = rom();
        let report = FitReport::check(
            &rom,
            &[
                PendingWrite::new("Small", vec![0u8; 2]),
                PendingWrite::new("Large", vec![0u8; 0x101]),
            ],
        );
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Small"));
        assert!(lines[1].ends_with("OK"));
        assert!(lines[2].contains("0x000200"));
        assert!(lines[2].ends_with("BAD"));
    }

    #[test]
    fn merge_keeps_order() {
        let rom = rom();
        let mut first = FitReport::check(&rom, &[PendingWrite::new("Small", vec![1u8])]);
        let second = FitReport::check(&rom, &[PendingWrite::new("Missing", vec![1u8])]);
        first.merge(second);
        assert_eq!(first.entries().len(), 2);
        assert_eq!(first.entries()[1].status, FitStatus::Missing);
    }
}
