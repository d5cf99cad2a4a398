//! Implementations for the CtrlLoop state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::thread;
use std::time::{Duration, Instant};
use log::{info, trace, warn};
use serde::Serialize;

// Internal
use super::{CtrlLoopError, LoopState, Params, SessionHandle, SessionStatus, StopReason};
use crate::drivetrain::{read_sample, Drivetrain, RangeSample};
use crate::wall_follow::{self, ControlMode, WallFollower, WheelSpeeds};
use util::{
    archive::{ArchiveError, Archiver},
    session::Session,
    time,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Session-relative path of the tick archive.
const TICK_ARCHIVE_PATH: &str = "ctrl_loop/ticks.csv";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Control loop driver for a single wall follow session.
pub struct CtrlLoop<D: Drivetrain> {
    params: Params,

    drivetrain: D,

    follower: WallFollower,

    state: LoopState,

    handle: SessionHandle,

    /// Number of consecutive ticks on which the sensors could not be read
    consecutive_faults: u32,

    last_speeds: WheelSpeeds,

    arch_ticks: Option<Archiver>,

    start_time: Option<Instant>,
}

/// A single row of the tick archive.
#[derive(Debug, Serialize)]
struct TickRecord {
    time_s: f64,
    tick: u64,
    left_mm: f64,
    front_mm: f64,
    right_mm: f64,
    tracked_prox_mm: f64,
    following_left_wall: bool,
    derivative_suppressed: bool,
    left_speed: f64,
    right_speed: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<D: Drivetrain> CtrlLoop<D> {

    /// Create a new session in the `Idle` state.
    pub fn new(
        params: Params,
        wf_params: wall_follow::Params,
        drivetrain: D,
        mode: ControlMode,
        follow_left_wall: bool,
    ) -> Result<Self, CtrlLoopError> {
        params.validate()?;
        wf_params.validate()
            .map_err(|e| CtrlLoopError::InvalidParams(e.to_string()))?;

        let follower = WallFollower::new(wf_params, mode, follow_left_wall);

        let handle = SessionHandle::new(SessionStatus {
            state: LoopState::Idle,
            control_mode: mode,
            tick_count: 0,
            following_left_wall: follow_left_wall,
            has_switched_wall: false,
            speeds: WheelSpeeds::default(),
        });

        Ok(Self {
            params,
            drivetrain,
            follower,
            state: LoopState::Idle,
            handle,
            consecutive_faults: 0,
            last_speeds: WheelSpeeds::default(),
            arch_ticks: None,
            start_time: None,
        })
    }

    /// Archive every actuated tick into the given session.
    pub fn with_archive(mut self, session: &Session) -> Result<Self, ArchiveError> {
        self.arch_ticks = Some(Archiver::from_path(session, TICK_ARCHIVE_PATH)?);
        Ok(self)
    }

    /// Get a handle onto this session.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn follower(&self) -> &WallFollower {
        &self.follower
    }

    pub fn drivetrain(&self) -> &D {
        &self.drivetrain
    }

    /// Run the session to completion, blocking the calling thread.
    ///
    /// Whatever the outcome the drivetrain is stopped and its motors disabled
    /// before returning. A session can only be run once.
    pub fn run(&mut self) -> Result<StopReason, CtrlLoopError> {
        if self.state != LoopState::Idle {
            return Err(CtrlLoopError::AlreadyRun)
        }

        info!(
            "Starting wall follow session in {} mode, following the {} wall",
            self.follower.control_mode(),
            if self.follower.state().following_left_wall { "left" } else { "right" }
        );

        self.state = LoopState::Running;
        self.start_time = Some(Instant::now());
        self.publish_status();

        let mut result = match self.drivetrain.enable_motors(true) {
            Ok(_) => self.run_loop(),
            Err(e) => Err(CtrlLoopError::Drivetrain(e))
        };

        // Final stop, issued for every exit path
        if let Err(e) = self.drivetrain.stop() {
            warn!("Could not stop the drivetrain: {}", e);
            if result.is_ok() {
                result = Err(CtrlLoopError::Drivetrain(e));
            }
        }
        if let Err(e) = self.drivetrain.enable_motors(false) {
            warn!("Could not disable the motors: {}", e);
        }

        self.state = LoopState::Stopped;
        self.last_speeds = WheelSpeeds::default();
        self.publish_status();

        match &result {
            Ok(r) => info!(
                "Wall follow session ended after {} ticks: {:?}", 
                self.follower.state().tick_count, r
            ),
            Err(e) => warn!(
                "Wall follow session aborted after {} ticks: {}",
                self.follower.state().tick_count, e
            )
        }

        result
    }

    /// The fixed period loop.
    fn run_loop(&mut self) -> Result<StopReason, CtrlLoopError> {
        let period = Duration::from_secs_f64(self.params.tick_period_s);
        let tick_limit = self.params.tick_limit();

        loop {
            let tick_start = Instant::now();

            if self.handle.is_stop_requested() {
                return Ok(StopReason::StopRequested)
            }
            if self.follower.state().tick_count >= tick_limit {
                return Ok(StopReason::TimeLimit)
            }

            if let Some(reason) = self.tick()? {
                return Ok(reason)
            }

            self.publish_status();

            // No catch-up, a slow tick simply delays the next one
            thread::sleep(time::remaining(period, tick_start.elapsed()));
        }
    }

    /// Process a single tick.
    ///
    /// Returns the stop reason if the session should end on this tick.
    fn tick(&mut self) -> Result<Option<StopReason>, CtrlLoopError> {
        let sample = match read_sample(&mut self.drivetrain) {
            Ok(s) => {
                self.consecutive_faults = 0;
                s
            },
            Err(e) => {
                self.consecutive_faults += 1;
                self.follower.skip_tick();

                warn!(
                    "Sensor read failed ({} consecutive), holding previous command: {}",
                    self.consecutive_faults, e
                );

                if self.consecutive_faults > self.params.max_sensor_faults {
                    return Err(CtrlLoopError::SensorFault {
                        consecutive: self.consecutive_faults,
                        last: e
                    })
                }

                return Ok(None)
            }
        };

        trace!(
            "Ranges: left {:.1} mm, front {:.1} mm, right {:.1} mm",
            sample.left_mm, sample.front_mm, sample.right_mm
        );

        // Have we fallen out of the end of the course?
        if sample.left_mm > self.params.out_of_course_mm 
            && sample.right_mm > self.params.out_of_course_mm 
        {
            info!(
                "No walls in range (left {:.1} mm, right {:.1} mm), leaving the course",
                sample.left_mm, sample.right_mm
            );
            return Ok(Some(StopReason::OutOfCourse))
        }

        let speeds = self.follower.proc(&sample);

        self.drivetrain
            .throttle(speeds.left, speeds.right)
            .map_err(CtrlLoopError::Drivetrain)?;
        self.last_speeds = speeds;

        trace!("Motors {:.4}, {:.4}", speeds.left, speeds.right);

        self.archive_tick(&sample);

        Ok(None)
    }

    fn archive_tick(&mut self, sample: &RangeSample) {
        let arch = match self.arch_ticks {
            Some(ref mut a) => a,
            None => return
        };

        let report = self.follower.report();
        let record = TickRecord {
            time_s: self.start_time
                .map(|t| t.elapsed().as_secs_f64())
                .unwrap_or_default(),
            tick: self.follower.state().tick_count,
            left_mm: sample.left_mm,
            front_mm: sample.front_mm,
            right_mm: sample.right_mm,
            tracked_prox_mm: report.tracked_prox_mm,
            following_left_wall: self.follower.state().following_left_wall,
            derivative_suppressed: report.derivative_suppressed,
            left_speed: report.speeds.left,
            right_speed: report.speeds.right,
        };

        if let Err(e) = arch.serialise(record) {
            warn!("Could not archive tick: {}", e);
        }
    }

    fn publish_status(&self) {
        let wf_state = self.follower.state();

        self.handle.publish(SessionStatus {
            state: self.state,
            control_mode: self.follower.control_mode(),
            tick_count: wf_state.tick_count,
            following_left_wall: wf_state.following_left_wall,
            has_switched_wall: wf_state.has_switched_wall,
            speeds: self.last_speeds,
        });
    }
}
