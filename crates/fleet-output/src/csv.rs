//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `boat_snapshots.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{BoatSnapshotRow, OutputResult, TickSummaryRow};

pub const SNAPSHOT_HEADER: [&str; 12] = [
    "tick",
    "agent_id",
    "state",
    "x",
    "y",
    "heading",
    "speed",
    "spadjust",
    "semi_major",
    "semi_minor",
    "cursor",
    "path_len",
];

pub const SUMMARY_HEADER: [&str; 5] = ["tick", "approaching", "following", "docked", "planning"];

/// Writes a simulation trace to two CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create the output directory if needed, open both files and write the
    /// header rows.  Existing files are truncated.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut snapshots = Writer::from_path(dir.join("boat_snapshots.csv"))?;
        snapshots.write_record(SNAPSHOT_HEADER)?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(SUMMARY_HEADER)?;

        tracing::debug!(dir = %dir.display(), "CSV trace opened");
        Ok(Self { snapshots, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[BoatSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.tick.to_string(),
                row.agent_id.to_string(),
                row.state.to_owned(),
                row.x.to_string(),
                row.y.to_string(),
                row.heading.to_string(),
                row.speed.to_string(),
                row.spadjust.to_string(),
                row.semi_major.to_string(),
                row.semi_minor.to_string(),
                row.cursor.to_string(),
                row.path_len.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.approaching.to_string(),
            row.following.to_string(),
            row.docked.to_string(),
            (row.planning as u8).to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
