//! Wall follow module
//!
//! Converts the three range readings of each tick into a pair of normalised wheel speeds which
//! keep the robot at a fixed offset from the tracked wall.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;
mod calc_linear;
mod calc_expo;
mod calc_pid;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Initial value of the previous side proximity, large enough that the first
/// tick can never trigger a wall switch.
pub const PREV_PROX_SENTINEL_MM: f64 = f64::INFINITY;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The strategy used to turn the tracked proximity into wheel speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    /// Clamped linear response to the deviation.
    Linear,

    /// Sign-preserving square of the deviation, unclamped.
    Expo,

    /// PID controller on the raw distance error.
    Pid,
}

/// Possible errors in the wall follow parameters.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("Expected {0} to be positive, found {1}")]
    NonPositiveRange(&'static str, f64),

    #[error("Unknown control mode \"{0}\", expected one of linear, expo, pid")]
    UnknownMode(String),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Normalised speed demands for the two sides of the drivetrain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WheelSpeeds {
    pub left: f64,
    pub right: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FromStr for ControlMode {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(ControlMode::Linear),
            "expo" => Ok(ControlMode::Expo),
            "pid" => Ok(ControlMode::Pid),
            _ => Err(ParamsError::UnknownMode(s.to_string()))
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlMode::Linear => "LINEAR",
            ControlMode::Expo => "EXPO",
            ControlMode::Pid => "PID",
        };
        write!(f, "{}", name)
    }
}
