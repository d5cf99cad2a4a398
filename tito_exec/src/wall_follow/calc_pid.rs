//! PID mode calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use util::maths::clamp;

use super::{WallFollower, WheelSpeeds};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WallFollower {

    /// Perform the PID mode calculations.
    ///
    /// The raw distance error is fed to the controller, whose output is
    /// scaled by the PID distance range and limited to [-1, 1].
    pub(crate) fn calc_pid(
        &mut self, 
        tracked_prox_mm: f64, 
        suppress_derivative: bool
    ) -> WheelSpeeds {
        let error_mm = tracked_prox_mm - self.params.target_dist_mm;
        self.pid.update(error_mm, suppress_derivative);

        let deviation = self.pid.output() / self.params.pid_dist_range_mm;

        trace!("PID out: {:.4}", deviation);

        self.side_speeds(self.params.pid, clamp(deviation, -1.0, 1.0))
    }
}

#[cfg(test)]
mod test {
    use crate::wall_follow::{ControlMode, Params, WallFollower};

    #[test]
    fn test_pid_on_target() {
        let mut wf = WallFollower::new(Params::default(), ControlMode::Pid, true);
        let s = wf.decide_speeds(200.0, false);

        assert_eq!(s.left, -0.14);
        assert_eq!(s.right, -0.14);
    }

    #[test]
    fn test_pid_clamped() {
        let mut wf = WallFollower::new(Params::default(), ControlMode::Pid, true);

        // Output 0.5 * 800 + 0.1 * 800 = 480, far past the range of 150
        let s = wf.decide_speeds(1000.0, false);
        assert!((s.left - (-0.14 + 0.2)).abs() < 1e-12);
        assert!((s.right - (-0.14 - 0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_pid_suppressed_derivative() {
        let mut a = WallFollower::new(Params::default(), ControlMode::Pid, true);
        let mut b = WallFollower::new(Params::default(), ControlMode::Pid, true);

        // With suppression only the proportional term remains: 0.5 * 30 = 15
        let sa = a.decide_speeds(230.0, true);
        let sb = b.decide_speeds(230.0, false);
        assert!((sa.left - (-0.14 - 0.1 * -0.2)).abs() < 1e-12);

        // Without it the first update sees a step of 30, adding 0.1 * 30
        assert!((sb.left - (-0.14 - 0.12 * -0.2)).abs() < 1e-12);
    }
}
