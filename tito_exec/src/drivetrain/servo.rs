//! Servo driven drivetrain

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, trace};

use super::{Drivetrain, DrivetrainError, RangeSensors, SensorChannel};
use crate::servo_ctrl::{
    pulse, pulse_to_duty_cycle, CalibrationSet, ServoChannel, ServoDriver
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Board channels of the two drive servos.
#[derive(Debug, Clone, Copy)]
pub struct DriveChannels<C> {
    pub left: C,
    pub right: C,
}

/// A drivetrain whose drive motors are commanded through a servo driver
/// board.
///
/// The drivetrain owns the calibrations of its channels, external code must go
/// through [`ServoDrivetrain::calibration_mut`] to change them.
pub struct ServoDrivetrain<S, R>
where
    S: ServoDriver,
    R: RangeSensors
{
    driver: S,
    sensors: R,
    channels: DriveChannels<S::Channel>,
    calib: CalibrationSet,
    motors_enabled: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<S, R> ServoDrivetrain<S, R>
where
    S: ServoDriver,
    R: RangeSensors
{
    /// Create a new drivetrain with the motors disabled.
    pub fn new(
        driver: S, 
        sensors: R, 
        channels: DriveChannels<S::Channel>,
        calib: CalibrationSet
    ) -> Self {
        Self {
            driver,
            sensors,
            channels,
            calib,
            motors_enabled: false,
        }
    }

    pub fn calibration(&self) -> &CalibrationSet {
        &self.calib
    }

    pub fn calibration_mut(&mut self) -> &mut CalibrationSet {
        &mut self.calib
    }

    pub fn motors_enabled(&self) -> bool {
        self.motors_enabled
    }

    pub fn driver(&self) -> &S {
        &self.driver
    }

    /// Write a pulse width to a board channel.
    fn write_pulse(&mut self, channel: S::Channel, pulse_us: i32) -> Result<(), DrivetrainError> {
        self.driver.set_duty_cycle(channel, pulse_to_duty_cycle(pulse_us))?;
        Ok(())
    }

    /// Write the calibrated neutral pulse to both drive channels.
    fn write_neutral(&mut self) -> Result<(), DrivetrainError> {
        let left = self.calib.get(ServoChannel::LeftDrive).mid;
        let right = self.calib.get(ServoChannel::RightDrive).mid;

        self.write_pulse(self.channels.left, left)?;
        self.write_pulse(self.channels.right, right)
    }
}

impl<S, R> Drivetrain for ServoDrivetrain<S, R>
where
    S: ServoDriver,
    R: RangeSensors
{
    fn read_sensor(&mut self, channel: SensorChannel) -> Result<f64, DrivetrainError> {
        self.sensors.read_mm(channel)
    }

    fn throttle(&mut self, left: f64, right: f64) -> Result<(), DrivetrainError> {
        if !self.motors_enabled {
            return self.write_neutral()
        }

        let left_us = pulse(left, &self.calib.get(ServoChannel::LeftDrive));
        let right_us = pulse(right, &self.calib.get(ServoChannel::RightDrive));

        trace!("Drive pulses: left {} us, right {} us", left_us, right_us);

        self.write_pulse(self.channels.left, left_us)?;
        self.write_pulse(self.channels.right, right_us)
    }

    fn enable_motors(&mut self, enable: bool) -> Result<(), DrivetrainError> {
        debug!("Motors {}", if enable { "enabled" } else { "disabled" });

        self.motors_enabled = enable;
        if !enable {
            self.write_neutral()?;
        }

        Ok(())
    }

    fn stop(&mut self) -> Result<(), DrivetrainError> {
        self.write_neutral()
    }
}
