//! Replay drivetrain
//!
//! Plays back recorded range readings and records every command it is given.
//! Each read of the left sensor moves on to the next recorded row.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::VecDeque;
use std::path::Path;
use serde::Deserialize;

use super::{Drivetrain, DrivetrainError, SensorChannel};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One recorded set of readings, `None` for a failed read.
pub type ReplayRow = [Option<f64>; 3];

/// A command received by the replay drivetrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplayCmd {
    Throttle(f64, f64),
    EnableMotors(bool),
    Stop,
}

/// Replay drivetrain
#[derive(Debug, Default)]
pub struct ReplayDrivetrain {
    rows: VecDeque<ReplayRow>,
    current: Option<ReplayRow>,
    cmds: Vec<ReplayCmd>,
}

#[derive(Deserialize)]
struct CsvRow {
    left: Option<f64>,
    front: Option<f64>,
    right: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ReplayDrivetrain {
    pub fn from_rows(rows: Vec<ReplayRow>) -> Self {
        Self {
            rows: rows.into(),
            ..Default::default()
        }
    }

    /// Load the readings from a CSV file with `left`, `front` and `right`
    /// columns. Empty cells are failed reads.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, DrivetrainError> {
        let mut reader = csv::Reader::from_path(path)?;

        let mut rows = Vec::new();
        for row in reader.deserialize() {
            let row: CsvRow = row?;
            rows.push([row.left, row.front, row.right]);
        }

        Ok(Self::from_rows(rows))
    }

    /// All commands received so far, in order.
    pub fn cmds(&self) -> &[ReplayCmd] {
        &self.cmds
    }

    /// The throttle demands received so far, in order.
    pub fn throttles(&self) -> Vec<(f64, f64)> {
        self.cmds
            .iter()
            .filter_map(|c| match c {
                ReplayCmd::Throttle(l, r) => Some((*l, *r)),
                _ => None
            })
            .collect()
    }

    /// Number of rows not yet played back.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl Drivetrain for ReplayDrivetrain {
    fn read_sensor(&mut self, channel: SensorChannel) -> Result<f64, DrivetrainError> {
        if channel == SensorChannel::Left {
            self.current = self.rows.pop_front();
        }

        let row = self.current.ok_or(DrivetrainError::ReplayExhausted)?;

        row[channel as usize].ok_or(DrivetrainError::SensorUnavailable(channel))
    }

    fn throttle(&mut self, left: f64, right: f64) -> Result<(), DrivetrainError> {
        self.cmds.push(ReplayCmd::Throttle(left, right));
        Ok(())
    }

    fn enable_motors(&mut self, enable: bool) -> Result<(), DrivetrainError> {
        self.cmds.push(ReplayCmd::EnableMotors(enable));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DrivetrainError> {
        self.cmds.push(ReplayCmd::Stop);
        Ok(())
    }
}
