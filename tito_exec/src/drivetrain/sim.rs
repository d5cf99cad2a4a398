//! Simulated drivetrain
//!
//! A differential drive robot in a straight corridor, with range sensors
//! pointing left, forward and right. The corridor is open at its far end, so
//! once the robot drives out of it both side sensors stop seeing a wall.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use serde::Deserialize;

use super::{Drivetrain, DrivetrainError, SensorChannel};
use crate::servo_ctrl::{pulse, CalibrationSet, ServoChannel};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Below this the sensor rays are considered parallel to a wall.
const PARALLEL_EPSILON: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the simulated world and robot.
#[derive(Debug, Clone, Deserialize)]
pub struct SimParams {
    /// Width of the corridor.
    ///
    /// Units: millimeters
    pub corridor_width_mm: f64,

    /// Length of the corridor, past which there are no walls.
    ///
    /// Units: millimeters
    pub corridor_length_mm: f64,

    /// Initial distance from the left wall.
    ///
    /// Units: millimeters
    pub start_left_dist_mm: f64,

    /// Initial heading, positive towards the left wall.
    ///
    /// Units: radians
    pub start_heading_rad: f64,

    /// Ground speed of a wheel at full demand.
    ///
    /// Units: millimeters/second
    pub max_wheel_speed_mms: f64,

    /// Distance between the wheels.
    ///
    /// Units: millimeters
    pub wheel_base_mm: f64,

    /// Sign of a normalised speed which drives forwards. The motors are
    /// mounted such that negative demands drive forwards.
    pub forward_sign: f64,

    /// Reading returned when no target is in range.
    ///
    /// Units: millimeters
    pub sensor_max_mm: f64,
}

/// Pose of the simulated robot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimPose {
    /// Distance travelled along the corridor.
    ///
    /// Units: millimeters
    pub along_mm: f64,

    /// Distance from the left wall.
    ///
    /// Units: millimeters
    pub left_dist_mm: f64,

    /// Heading relative to the corridor, positive towards the left wall.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

/// Simulated drivetrain
pub struct SimDrivetrain {
    params: SimParams,
    calib: CalibrationSet,
    pose: SimPose,
    dt_s: f64,
    motors_enabled: bool,
    last_pulses_us: (i32, i32),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            corridor_width_mm: 500.0,
            corridor_length_mm: 3000.0,
            start_left_dist_mm: 200.0,
            start_heading_rad: 0.0,
            max_wheel_speed_mms: 1000.0,
            wheel_base_mm: 150.0,
            forward_sign: -1.0,
            sensor_max_mm: 8190.0,
        }
    }
}

impl SimDrivetrain {
    /// Create a new simulation, integrated over `dt_s` seconds on every
    /// throttle demand.
    pub fn new(params: SimParams, calib: CalibrationSet, dt_s: f64) -> Self {
        let pose = SimPose {
            along_mm: 0.0,
            left_dist_mm: params.start_left_dist_mm,
            heading_rad: params.start_heading_rad,
        };

        Self {
            params,
            calib,
            pose,
            dt_s,
            motors_enabled: false,
            last_pulses_us: (0, 0),
        }
    }

    pub fn pose(&self) -> SimPose {
        self.pose
    }

    /// The pulses the drive servos would have been given by the last demand.
    pub fn last_pulses_us(&self) -> (i32, i32) {
        self.last_pulses_us
    }

    fn in_corridor(&self) -> bool {
        self.pose.along_mm <= self.params.corridor_length_mm
    }

    /// Distance along a ray at `angle_rad` from the corridor axis to the
    /// nearest wall, limited to the sensor range.
    fn ray_mm(&self, angle_rad: f64) -> f64 {
        if !self.in_corridor() {
            return self.params.sensor_max_mm
        }

        let lateral = angle_rad.sin();
        let dist = if lateral > PARALLEL_EPSILON {
            self.pose.left_dist_mm / lateral
        }
        else if lateral < -PARALLEL_EPSILON {
            (self.params.corridor_width_mm - self.pose.left_dist_mm) / -lateral
        }
        else {
            self.params.sensor_max_mm
        };

        dist.max(0.0).min(self.params.sensor_max_mm)
    }

    /// Advance the pose using the given normalised wheel speeds.
    fn integrate(&mut self, left: f64, right: f64) {
        let v_left = self.params.forward_sign * left * self.params.max_wheel_speed_mms;
        let v_right = self.params.forward_sign * right * self.params.max_wheel_speed_mms;

        let v = 0.5 * (v_left + v_right);
        let omega = (v_right - v_left) / self.params.wheel_base_mm;

        self.pose.heading_rad += omega * self.dt_s;
        self.pose.along_mm += v * self.pose.heading_rad.cos() * self.dt_s;
        self.pose.left_dist_mm -= v * self.pose.heading_rad.sin() * self.dt_s;
        self.pose.left_dist_mm = self.pose.left_dist_mm
            .max(0.0)
            .min(self.params.corridor_width_mm);

        trace!("Sim pose: {:?}", self.pose);
    }
}

impl Drivetrain for SimDrivetrain {
    fn read_sensor(&mut self, channel: SensorChannel) -> Result<f64, DrivetrainError> {
        let heading = self.pose.heading_rad;
        let mm = match channel {
            SensorChannel::Left => self.ray_mm(heading + std::f64::consts::FRAC_PI_2),
            SensorChannel::Front => self.ray_mm(heading),
            SensorChannel::Right => self.ray_mm(heading - std::f64::consts::FRAC_PI_2),
        };

        Ok(mm)
    }

    fn throttle(&mut self, left: f64, right: f64) -> Result<(), DrivetrainError> {
        let (left, right) = if self.motors_enabled {
            (left, right)
        } else {
            (0.0, 0.0)
        };

        self.last_pulses_us = (
            pulse(left, &self.calib.get(ServoChannel::LeftDrive)),
            pulse(right, &self.calib.get(ServoChannel::RightDrive)),
        );
        self.integrate(left, right);

        Ok(())
    }

    fn enable_motors(&mut self, enable: bool) -> Result<(), DrivetrainError> {
        self.motors_enabled = enable;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DrivetrainError> {
        self.last_pulses_us = (
            self.calib.get(ServoChannel::LeftDrive).mid,
            self.calib.get(ServoChannel::RightDrive).mid,
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sim() -> SimDrivetrain {
        SimDrivetrain::new(SimParams::default(), CalibrationSet::default(), 0.1)
    }

    #[test]
    fn test_sensors_straight() {
        let mut s = sim();
        assert!((s.read_sensor(SensorChannel::Left).unwrap() - 200.0).abs() < 1e-9);
        assert!((s.read_sensor(SensorChannel::Right).unwrap() - 300.0).abs() < 1e-9);
        assert_eq!(s.read_sensor(SensorChannel::Front).unwrap(), 8190.0);
    }

    #[test]
    fn test_drives_forward_on_negative() {
        let mut s = sim();
        s.enable_motors(true).unwrap();
        s.throttle(-0.1, -0.1).unwrap();

        // 0.1 * 1000 mm/s for 0.1 s
        assert!((s.pose().along_mm - 10.0).abs() < 1e-9);
        assert_eq!(s.pose().heading_rad, 0.0);
    }

    #[test]
    fn test_disabled_does_not_move() {
        let mut s = sim();
        s.throttle(-0.5, -0.5).unwrap();
        assert_eq!(s.pose().along_mm, 0.0);
        assert_eq!(s.last_pulses_us(), (1500, 1500));
    }

    #[test]
    fn test_faster_right_turns_left() {
        let mut s = sim();
        s.enable_motors(true).unwrap();
        s.throttle(-0.1, -0.2).unwrap();

        assert!(s.pose().heading_rad > 0.0);
        s.throttle(-0.15, -0.15).unwrap();
        assert!(s.pose().left_dist_mm < 200.0);
    }

    #[test]
    fn test_exit_opens_both_sides() {
        let mut s = sim();
        s.enable_motors(true).unwrap();
        while s.pose().along_mm <= 3000.0 {
            s.throttle(-1.0, -1.0).unwrap();
        }

        assert_eq!(s.read_sensor(SensorChannel::Left).unwrap(), 8190.0);
        assert_eq!(s.read_sensor(SensorChannel::Right).unwrap(), 8190.0);
    }
}
