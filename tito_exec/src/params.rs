//! # TITO Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;
use tito_lib::{ctrl_loop, drivetrain::sim::SimParams, wall_follow::ControlMode};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug)]
pub struct TitoExecParams {

    /// Calibration file, relative to the params directory
    pub calibration_file: String,

    /// Control mode used if none is given on the command line
    pub default_control_mode: ControlMode,

    /// Wall followed if none is given on the command line
    pub default_follow_left_wall: bool,

    /// Period at which the session status is logged.
    ///
    /// Units: seconds
    pub status_period_s: f64,

    /// Parameters for the control loop
    pub ctrl_loop: ctrl_loop::Params,

    /// Parameters for the simulated drivetrain
    pub sim: SimParams,
}
