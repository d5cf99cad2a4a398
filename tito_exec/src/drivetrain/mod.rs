//! # Drivetrain module
//!
//! The drivetrain is the control core's only collaborator: it reads the three range sensors and
//! turns normalised wheel speeds into actuator commands.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod servo;
pub mod sim;
pub mod replay;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::servo_ctrl::ServoError;

pub use servo::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Interface to the robot's drivetrain.
pub trait Drivetrain {
    /// Read the distance measured by a range sensor.
    ///
    /// Units: millimeters
    fn read_sensor(&mut self, channel: SensorChannel) -> Result<f64, DrivetrainError>;

    /// Demand normalised speeds on the left and right drive channels.
    ///
    /// Speeds are nominally in [-1, 1] but are not checked.
    fn throttle(&mut self, left: f64, right: f64) -> Result<(), DrivetrainError>;

    /// Enable or disable the drive motors.
    fn enable_motors(&mut self, enable: bool) -> Result<(), DrivetrainError>;

    /// Bring the drive motors to neutral.
    fn stop(&mut self) -> Result<(), DrivetrainError>;
}

/// A source of range readings.
pub trait RangeSensors {
    /// Read the distance measured by a sensor.
    ///
    /// Units: millimeters
    fn read_mm(&mut self, channel: SensorChannel) -> Result<f64, DrivetrainError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The three range readings of a single tick.
///
/// Units: millimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeSample {
    pub left_mm: f64,
    pub front_mm: f64,
    pub right_mm: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The range sensor channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorChannel {
    Left = 0,
    Front = 1,
    Right = 2,
}

/// Possible errors raised by a drivetrain.
#[derive(Debug, thiserror::Error)]
pub enum DrivetrainError {
    #[error("No reading available from the {0:?} sensor")]
    SensorUnavailable(SensorChannel),

    #[error("The {0:?} sensor returned an invalid reading ({1})")]
    InvalidReading(SensorChannel, f64),

    #[error("Servo driver error: {0}")]
    Servo(#[from] ServoError),

    #[error("No more samples to replay")]
    ReplayExhausted,

    #[error("Cannot load the replay file: {0}")]
    ReplayLoad(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Read all three range sensors.
///
/// A reading that is negative or not finite is rejected as invalid, the
/// sensors report `-1` when ranging fails.
pub fn read_sample<D>(drivetrain: &mut D) -> Result<RangeSample, DrivetrainError>
where
    D: Drivetrain + ?Sized
{
    let mut read = |channel: SensorChannel| -> Result<f64, DrivetrainError> {
        let mm = drivetrain.read_sensor(channel)?;
        if !mm.is_finite() || mm < 0.0 {
            return Err(DrivetrainError::InvalidReading(channel, mm))
        }
        Ok(mm)
    };

    Ok(RangeSample {
        left_mm: read(SensorChannel::Left)?,
        front_mm: read(SensorChannel::Front)?,
        right_mm: read(SensorChannel::Right)?,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use replay::ReplayDrivetrain;

    #[test]
    fn test_read_sample() {
        let mut dt = ReplayDrivetrain::from_rows(vec![
            [Some(210.0), Some(900.0), Some(190.0)],
            [Some(-1.0), Some(900.0), Some(190.0)],
            [Some(200.0), Some(f64::NAN), Some(190.0)],
        ]);

        assert_eq!(
            read_sample(&mut dt).unwrap(),
            RangeSample { left_mm: 210.0, front_mm: 900.0, right_mm: 190.0 }
        );
        assert!(matches!(
            read_sample(&mut dt),
            Err(DrivetrainError::InvalidReading(SensorChannel::Left, _))
        ));
        assert!(matches!(
            read_sample(&mut dt),
            Err(DrivetrainError::InvalidReading(SensorChannel::Front, _))
        ));
        assert!(matches!(read_sample(&mut dt), Err(DrivetrainError::ReplayExhausted)));
    }
}
