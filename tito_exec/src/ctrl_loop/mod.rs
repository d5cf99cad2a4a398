//! Control loop module
//!
//! Runs a wall follow session: a fixed period loop which reads the range
//! sensors, runs the decision engine and forwards the resulting wheel speeds
//! to the drivetrain until the course is left, the time limit is reached or a
//! stop is requested.
//!
//! The loop does not spawn any threads. The application runs
//! [`CtrlLoop::run`] on a thread of its choosing and uses a
//! [`SessionHandle`] to stop it and read its status.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod handle;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::drivetrain::DrivetrainError;

pub use handle::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Lifecycle of a control loop. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

/// Why a session ended normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// A stop was requested through the session handle
    StopRequested,

    /// Neither side sensor could see a wall
    OutOfCourse,

    /// The session's tick budget was used up
    TimeLimit,
}

/// Possible errors that can occur during a session.
#[derive(Debug, thiserror::Error)]
pub enum CtrlLoopError {
    #[error("The control loop has already been run")]
    AlreadyRun,

    #[error("Invalid control loop parameters: {0}")]
    InvalidParams(String),

    #[error("Sensor reads failed on {consecutive} consecutive ticks, last error: {last}")]
    SensorFault {
        consecutive: u32,
        last: DrivetrainError
    },

    #[error("Drivetrain error: {0}")]
    Drivetrain(DrivetrainError),
}
