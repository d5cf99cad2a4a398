//! Expo mode calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::signed_square;

use super::{WallFollower, WheelSpeeds};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WallFollower {

    /// Perform the expo mode calculations.
    ///
    /// The deviation is squared keeping its sign, which softens small
    /// deviations and sharpens large ones. It is not limited.
    pub(crate) fn calc_expo(&self, tracked_prox_mm: f64) -> WheelSpeeds {
        let deviation = signed_square(self.norm_deviation(tracked_prox_mm));

        self.side_speeds(self.params.expo, deviation)
    }
}

#[cfg(test)]
mod test {
    use crate::wall_follow::{ControlMode, Params, WallFollower};

    #[test]
    fn test_expo_shape() {
        let mut wf = WallFollower::new(Params::default(), ControlMode::Expo, true);

        // 250 mm is a deviation of 0.5, squared to 0.25
        let s = wf.decide_speeds(250.0, false);
        assert!((s.left - (0.05 - 0.25 * 0.05)).abs() < 1e-12);
        assert!((s.right - (0.05 + 0.25 * 0.05)).abs() < 1e-12);

        // Sign is kept for negative deviations
        let s = wf.decide_speeds(150.0, false);
        assert!((s.left - (0.05 + 0.25 * 0.05)).abs() < 1e-12);
    }

    #[test]
    fn test_expo_not_clamped() {
        let mut wf = WallFollower::new(Params::default(), ControlMode::Expo, true);

        // 500 mm is a deviation of 3, squared to 9
        let s = wf.decide_speeds(500.0, false);
        assert!((s.right - (0.05 + 9.0 * 0.05)).abs() < 1e-12);
        assert!(wf.decide_speeds(1000.0, false).right > s.right);
    }
}
