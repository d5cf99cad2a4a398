//! # Servo Controller Module
//!
//! This module converts normalised speed demands into servo pulse widths and
//! provides a unified interface over the boards which generate those pulses.
//!
//! The pulse mapper itself ([`pulse`]) only ever reads a calibration. All
//! calibration changes go through the [`CalibrationSet`] which owns them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Calibration ownership and persistence.
mod calib;

/// [`ServoDriver`] implementation for the Adafruit PCA9685 16 channel servo driver board.
pub mod pca9685;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};
use util::maths::lin_map;

pub use calib::*;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Period of the servo PWM signal at 50 Hz.
///
/// Units: microseconds
pub const SERVO_PERIOD_US: f64 = 20_000.0;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for accessing servo driver boards.
pub trait ServoDriver {

    /// The type that the underlying driver uses for channel identification
    type Channel: Copy;

    /// Set the duty cycle of a channel.
    ///
    /// ## Arguments
    /// - `channel` - The channel to set the duty cycle for
    /// - `duty_cycle` - The duty cycle to set. Must be a value between 0.0 and 1.0. Values outside
    ///   this range will be rejected.
    fn set_duty_cycle(&mut self, channel: Self::Channel, duty_cycle: f64) -> Result<(), ServoError>;

}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Calibrated pulse bounds of a single actuator channel.
///
/// `min <= mid <= max` is enforced by [`CalibrationSet`], not here.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoCalibration {
    /// Pulse at full reverse (or full forward if reversed).
    ///
    /// Units: microseconds
    pub min: i32,

    /// Neutral pulse.
    ///
    /// Units: microseconds
    pub mid: i32,

    /// Pulse at full forward (or full reverse if reversed).
    ///
    /// Units: microseconds
    pub max: i32,

    /// If true increasing speed decreases the pulse.
    #[serde(default)]
    pub reversed: bool
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum ServoError {
    #[error("An I2C error occured")]
    I2c,

    #[error("Duty cycle must be between 0.0 and 1.0")]
    InvalidDutyCycle
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ServoCalibration {
    pub const fn new(min: i32, mid: i32, max: i32, reversed: bool) -> Self {
        Self { min, mid, max, reversed }
    }

    /// True if `min <= mid <= max`.
    pub fn is_valid(&self) -> bool {
        self.min <= self.mid && self.mid <= self.max
    }
}

impl Default for ServoCalibration {
    fn default() -> Self {
        Self::new(1000, 1500, 2000, false)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Map a normalised speed in `[-1, 1]` to a pulse width using the given calibration.
///
/// The speed is not clamped, values outside `[-1, 1]` extrapolate past the calibrated bounds.
/// The result is truncated towards zero.
pub fn pulse(speed: f64, cal: &ServoCalibration) -> i32 {
    let target = if cal.reversed {
        (cal.max as f64, cal.min as f64)
    }
    else {
        (cal.min as f64, cal.max as f64)
    };

    lin_map((-1f64, 1f64), target, speed) as i32
}

/// Convert a pulse width into a duty cycle of the servo PWM period.
pub fn pulse_to_duty_cycle(pulse_us: i32) -> f64 {
    pulse_us as f64 / SERVO_PERIOD_US
}

#[cfg(test)]
mod test {
    use super::*;

    const CALS: [ServoCalibration; 4] = [
        ServoCalibration::new(1000, 1500, 2000, false),
        ServoCalibration::new(1000, 1500, 2000, true),
        ServoCalibration::new(1120, 1480, 1910, false),
        ServoCalibration::new(1500, 1500, 1500, true),
    ];

    #[test]
    fn test_pulse_endpoints() {
        for cal in CALS.iter() {
            let (lo, hi) = if cal.reversed {
                (cal.max, cal.min)
            } else {
                (cal.min, cal.max)
            };
            assert_eq!(pulse(-1.0, cal), lo);
            assert_eq!(pulse(1.0, cal), hi);
        }
    }

    #[test]
    fn test_pulse_monotonic() {
        for cal in CALS.iter() {
            let mut prev = pulse(-1.0, cal);
            for i in 1..=40 {
                let p = pulse(-1.0 + i as f64 * 0.05, cal);
                if cal.reversed {
                    assert!(p <= prev, "{:?} not non-increasing at step {}", cal, i);
                } else {
                    assert!(p >= prev, "{:?} not non-decreasing at step {}", cal, i);
                }
                prev = p;
            }
        }
    }

    #[test]
    fn test_pulse_truncates() {
        let cal = ServoCalibration::new(1000, 1500, 2001, false);

        // 1000 + 1.5 * 1001 / 2 = 1750.75
        assert_eq!(pulse(0.5, &cal), 1750);

        // 1000 + 0.001 * 1001 / 2 = 1000.5005 
        assert_eq!(pulse(-0.999, &cal), 1000);
    }

    #[test]
    fn test_pulse_extrapolates() {
        let cal = ServoCalibration::default();
        assert_eq!(pulse(1.5, &cal), 2250);
        assert_eq!(pulse(-2.0, &cal), 500);

        let rev = ServoCalibration { reversed: true, ..cal };
        assert_eq!(pulse(1.5, &rev), 750);
    }

    #[test]
    fn test_duty_cycle() {
        assert_eq!(pulse_to_duty_cycle(1500), 0.075);
        assert_eq!(pulse_to_duty_cycle(0), 0.0);
    }
}
