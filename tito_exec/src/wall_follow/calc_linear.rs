//! Linear mode calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::clamp;

use super::{WallFollower, WheelSpeeds};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WallFollower {

    /// Perform the linear mode calculations.
    ///
    /// The deviation is limited to [-1, 1] so that the robot is never
    /// commanded to drive backwards.
    pub(crate) fn calc_linear(&self, tracked_prox_mm: f64) -> WheelSpeeds {
        let deviation = clamp(self.norm_deviation(tracked_prox_mm), -1.0, 1.0);

        self.side_speeds(self.params.linear, deviation)
    }
}

#[cfg(test)]
mod test {
    use crate::wall_follow::{ControlMode, Params, WallFollower};

    #[test]
    fn test_linear_on_target() {
        let mut wf = WallFollower::new(Params::default(), ControlMode::Linear, true);
        let s = wf.decide_speeds(200.0, false);

        assert_eq!(s.left, -0.2);
        assert_eq!(s.right, -0.2);
    }

    #[test]
    fn test_linear_saturates() {
        let mut wf = WallFollower::new(Params::default(), ControlMode::Linear, true);

        assert_eq!(wf.decide_speeds(1000.0, false), wf.decide_speeds(300.0, false));
        assert_eq!(wf.decide_speeds(-500.0, false), wf.decide_speeds(100.0, false));
    }

    #[test]
    fn test_linear_side_convention() {
        // Too far from the left wall steers back towards it
        let mut left = WallFollower::new(Params::default(), ControlMode::Linear, true);
        let s = left.decide_speeds(250.0, false);
        assert!(s.left < s.right);
        assert!((s.left - (-0.2 - 0.5 * 0.06)).abs() < 1e-12);

        // Mirrored when following the right wall
        let mut right = WallFollower::new(Params::default(), ControlMode::Linear, false);
        let m = right.decide_speeds(250.0, false);
        assert_eq!(m.left, s.right);
        assert_eq!(m.right, s.left);
    }
}
