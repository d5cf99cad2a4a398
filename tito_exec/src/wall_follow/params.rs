//! Parameters structure for WallFollow

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::pid::PidGains;
use super::ParamsError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for wall following.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- GEOMETRY ----

    /// Target distance to the tracked wall.
    ///
    /// Units: millimeters
    pub target_dist_mm: f64,

    /// Distance from the target which gives a deviation of 1 in the linear
    /// and expo modes.
    ///
    /// Units: millimeters
    pub dist_norm_range_mm: f64,

    /// Offset subtracted from the front reading before it is compared with
    /// the side reading.
    ///
    /// Units: millimeters
    pub front_offset_mm: f64,

    // ---- WALL SWITCH ----

    /// The tracked distance must exceed this to switch walls.
    ///
    /// Units: millimeters
    pub switch_abs_threshold_mm: f64,

    /// The tracked distance must have grown by more than this since the last
    /// tick to switch walls.
    ///
    /// Units: millimeters
    pub switch_growth_threshold_mm: f64,

    // ---- MODES ----

    /// Speeds for `ControlMode::Linear`
    pub linear: ModeSpeeds,

    /// Speeds for `ControlMode::Expo`
    pub expo: ModeSpeeds,

    /// Speeds for `ControlMode::Pid`
    pub pid: ModeSpeeds,

    /// Divisor turning the PID output into a deviation.
    ///
    /// Units: millimeters
    pub pid_dist_range_mm: f64,

    /// Gains of the PID mode controller
    pub pid_gains: PidGains,
}

/// Mid point and range of the wheel speeds of a mode.
///
/// A deviation of `d` gives speeds of `speed_mid -/+ d * speed_range`.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct ModeSpeeds {
    pub speed_mid: f64,
    pub speed_range: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check that the parameters can be used.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.dist_norm_range_mm <= 0.0 {
            return Err(ParamsError::NonPositiveRange(
                "dist_norm_range_mm", self.dist_norm_range_mm
            ))
        }
        if self.pid_dist_range_mm <= 0.0 {
            return Err(ParamsError::NonPositiveRange(
                "pid_dist_range_mm", self.pid_dist_range_mm
            ))
        }

        Ok(())
    }
}

impl Default for Params {
    /// The values tuned on the maze course.
    fn default() -> Self {
        Self {
            target_dist_mm: 200.0,
            dist_norm_range_mm: 100.0,
            front_offset_mm: 150.0,
            switch_abs_threshold_mm: 350.0,
            switch_growth_threshold_mm: 100.0,
            linear: ModeSpeeds { speed_mid: -0.2, speed_range: 0.06 },
            expo: ModeSpeeds { speed_mid: 0.05, speed_range: 0.05 },
            pid: ModeSpeeds { speed_mid: -0.14, speed_range: -0.2 },
            pid_dist_range_mm: 150.0,
            pid_gains: PidGains { k_p: 0.5, k_i: 0.0, k_d: 0.1 },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params_file_matches_default() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../params/wall_follow.toml");
        let p: Params = util::params::load_from_path(path).unwrap();
        let d = Params::default();

        assert_eq!(p.target_dist_mm, d.target_dist_mm);
        assert_eq!(p.linear, d.linear);
        assert_eq!(p.expo, d.expo);
        assert_eq!(p.pid, d.pid);
        assert_eq!(p.pid_gains, d.pid_gains);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let mut p = Params::default();
        p.pid_dist_range_mm = 0.0;
        assert!(matches!(
            p.validate(),
            Err(ParamsError::NonPositiveRange("pid_dist_range_mm", _))
        ));
    }
}
