//! Implementations for the WallFollower state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use serde::Serialize;

// Internal
use super::{ControlMode, ModeSpeeds, Params, WheelSpeeds, PREV_PROX_SENTINEL_MM};
use crate::drivetrain::RangeSample;
use crate::pid::PidController;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Wall follow decision engine.
///
/// One instance lives for a single control session. It owns the session's
/// wall-follow state and PID controller, neither of which are reset between
/// ticks.
#[derive(Debug, Clone)]
pub struct WallFollower {
    pub(crate) params: Params,

    pub(crate) mode: ControlMode,

    pub(crate) state: WallFollowState,

    pub(crate) pid: PidController,

    pub(crate) report: StatusReport,
}

/// Per-session mutable wall-follow state.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WallFollowState {
    /// Which wall is being tracked
    pub following_left_wall: bool,

    /// Latched once the robot has switched to the opposite wall
    pub has_switched_wall: bool,

    /// Number of ticks processed this session, including skipped ones
    pub tick_count: u64,

    /// Tracked side distance of the last tick.
    ///
    /// Units: millimeters
    pub prev_side_prox_mm: f64,
}

/// Status report for a single wall follow tick.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// Distance to the tracked wall before any switch on this tick.
    ///
    /// Units: millimeters
    pub side_prox_mm: f64,

    /// Proximity passed into the decision engine.
    ///
    /// Units: millimeters
    pub tracked_prox_mm: f64,

    /// True if the tracked wall was switched on this tick
    pub wall_switched: bool,

    /// True if the derivative term was suppressed on this tick
    pub derivative_suppressed: bool,

    /// The demanded wheel speeds
    pub speeds: WheelSpeeds,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WallFollowState {
    pub fn new(following_left_wall: bool) -> Self {
        Self {
            following_left_wall,
            has_switched_wall: false,
            tick_count: 0,
            prev_side_prox_mm: PREV_PROX_SENTINEL_MM,
        }
    }
}

impl WallFollower {

    /// Start a new wall follow session.
    pub fn new(params: Params, mode: ControlMode, follow_left_wall: bool) -> Self {
        let pid = PidController::new(params.pid_gains);

        Self {
            params,
            mode,
            state: WallFollowState::new(follow_left_wall),
            pid,
            report: StatusReport::default(),
        }
    }

    pub fn set_control_mode(&mut self, mode: ControlMode) {
        self.mode = mode;
    }

    pub fn control_mode(&self) -> ControlMode {
        self.mode
    }

    pub fn state(&self) -> &WallFollowState {
        &self.state
    }

    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    /// Process one tick's range sample into wheel speeds.
    ///
    /// Evaluates the wall switch, selects the tracked proximity and runs the
    /// decision engine.
    pub fn proc(&mut self, sample: &RangeSample) -> WheelSpeeds {
        self.report = StatusReport::default();

        // Bookkeeping for the switch check
        let prev_side_prox_mm = self.state.prev_side_prox_mm;
        let side_prox_mm = self.side_prox(sample);
        self.state.prev_side_prox_mm = side_prox_mm;
        self.report.side_prox_mm = side_prox_mm;

        let suppress_derivative = self.check_wall_switch(side_prox_mm, prev_side_prox_mm);

        // A close frontal obstacle looks like a close tracked wall, which
        // turns the robot away from it.
        let tracked_prox_mm = self.side_prox(sample)
            .min(sample.front_mm - self.params.front_offset_mm);
        self.report.tracked_prox_mm = tracked_prox_mm;

        trace!(
            "Tracked proximity {:.1} mm ({} wall)", 
            tracked_prox_mm,
            if self.state.following_left_wall { "left" } else { "right" }
        );

        let speeds = self.decide_speeds(tracked_prox_mm, suppress_derivative);
        self.report.speeds = speeds;

        self.state.tick_count += 1;

        speeds
    }

    /// Count a tick on which no sample could be processed.
    pub fn skip_tick(&mut self) {
        self.state.tick_count += 1;
    }

    /// Compute the wheel speeds for the given tracked proximity using the
    /// current control mode.
    pub fn decide_speeds(
        &mut self, 
        tracked_prox_mm: f64, 
        suppress_derivative: bool
    ) -> WheelSpeeds {
        self.report.derivative_suppressed = suppress_derivative;

        match self.mode {
            ControlMode::Linear => self.calc_linear(tracked_prox_mm),
            ControlMode::Expo => self.calc_expo(tracked_prox_mm),
            ControlMode::Pid => self.calc_pid(tracked_prox_mm, suppress_derivative),
        }
    }

    /// Switch to the right wall if the left one has receded.
    ///
    /// The switch fires at most once per session. Returns true if the
    /// derivative should be suppressed for this tick.
    fn check_wall_switch(&mut self, side_prox_mm: f64, prev_side_prox_mm: f64) -> bool {
        if self.state.has_switched_wall {
            return false
        }

        if side_prox_mm > self.params.switch_abs_threshold_mm
            && side_prox_mm - self.params.switch_growth_threshold_mm > prev_side_prox_mm
        {
            info!(
                "Tracked wall receded ({:.1} mm -> {:.1} mm), following right wall", 
                prev_side_prox_mm, side_prox_mm
            );

            self.state.following_left_wall = false;
            self.state.has_switched_wall = true;
            self.report.wall_switched = true;

            return true
        }

        false
    }

    /// Distance to the currently tracked wall.
    fn side_prox(&self, sample: &RangeSample) -> f64 {
        if self.state.following_left_wall {
            sample.left_mm
        }
        else {
            sample.right_mm
        }
    }

    /// Linear deviation of the proximity from the target, not limited.
    pub(crate) fn norm_deviation(&self, tracked_prox_mm: f64) -> f64 {
        (tracked_prox_mm - self.params.target_dist_mm) / self.params.dist_norm_range_mm
    }

    /// Apply a deviation to a mode's speeds.
    ///
    /// Following the left wall the correction is subtracted from the left
    /// speed and added to the right. Following the right wall it is mirrored.
    pub(crate) fn side_speeds(&self, speeds: ModeSpeeds, deviation: f64) -> WheelSpeeds {
        let correction = deviation * speeds.speed_range;

        if self.state.following_left_wall {
            WheelSpeeds {
                left: speeds.speed_mid - correction,
                right: speeds.speed_mid + correction,
            }
        }
        else {
            WheelSpeeds {
                left: speeds.speed_mid + correction,
                right: speeds.speed_mid - correction,
            }
        }
    }
}
