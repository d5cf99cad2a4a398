//! # TITO Wall Follow Executable
//!
//! Runs a single wall follow session and exits when it ends.
//!
//! The drivetrain is either the corridor simulator or, with `--replay`, a
//! playback of range readings recorded to CSV.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Parameters for the executable.
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use std::path::PathBuf;
use std::str::FromStr;
use std::thread;
use std::time::Duration;
use color_eyre::{Result, eyre::{WrapErr, eyre}};
use log::{info, warn};
use structopt::StructOpt;

// Internal
use params::TitoExecParams;
use tito_lib::{
    ctrl_loop::{CtrlLoop, StopReason},
    drivetrain::{Drivetrain, replay::ReplayDrivetrain, sim::SimDrivetrain},
    servo_ctrl::CalibrationSet,
    wall_follow::{self, ControlMode},
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "tito_exec", about = "Wall following control session")]
struct Opts {
    /// Control mode, one of linear, expo or pid
    #[structopt(short, long)]
    mode: Option<ControlMode>,

    /// Wall to follow at the start of the session, left or right
    #[structopt(short, long)]
    follow: Option<Wall>,

    /// Replay range readings from a CSV file instead of simulating
    #[structopt(long, parse(from_os_str))]
    replay: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wall {
    Left,
    Right
}

impl FromStr for Wall {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Wall::Left),
            "right" => Ok(Wall::Right),
            _ => Err(format!("Expected left or right, found \"{}\"", s))
        }
    }
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "tito_exec", 
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("TITO Wall Follow Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: TitoExecParams = util::params::load("tito_exec.toml")
        .wrap_err("Could not load exec params")?;
    let wf_params: wall_follow::Params = util::params::load("wall_follow.toml")
        .wrap_err("Could not load wall follow params")?;

    info!("Parameters loaded");

    let mode = opts.mode.unwrap_or(params.default_control_mode);
    let follow_left_wall = opts.follow
        .map(|w| w == Wall::Left)
        .unwrap_or(params.default_follow_left_wall);

    // ---- RUN SESSION ----

    let reason = match opts.replay {
        Some(ref path) => {
            let drivetrain = ReplayDrivetrain::from_csv(path)
                .wrap_err_with(|| format!("Could not load replay file {:?}", path))?;

            info!("Replaying {} samples from {:?}", drivetrain.remaining(), path);

            let ctrl = CtrlLoop::new(
                params.ctrl_loop.clone(), wf_params, drivetrain, mode, follow_left_wall
            )?.with_archive(&session)?;

            run_session(ctrl, params.status_period_s)?
        },
        None => {
            let calib = load_calibration(&params.calibration_file);
            let drivetrain = SimDrivetrain::new(
                params.sim.clone(), calib, params.ctrl_loop.tick_period_s
            );

            info!("Simulating a {} mm wide corridor", params.sim.corridor_width_mm);

            let ctrl = CtrlLoop::new(
                params.ctrl_loop.clone(), wf_params, drivetrain, mode, follow_left_wall
            )?.with_archive(&session)?;

            run_session(ctrl, params.status_period_s)?
        }
    };

    info!("Session complete: {:?}", reason);

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Load the servo calibration, falling back to the defaults if it can't be loaded.
fn load_calibration(file: &str) -> CalibrationSet {
    let path = match util::params::params_path(file) {
        Ok(p) => p,
        Err(e) => {
            warn!("Cannot locate the calibration file, using defaults: {}", e);
            return CalibrationSet::default()
        }
    };

    match CalibrationSet::load(&path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Cannot load the calibration from {:?}, using defaults: {}", path, e);
            CalibrationSet::default()
        }
    }
}

/// Run the control loop on its own thread, logging its status until it ends.
fn run_session<D>(mut ctrl: CtrlLoop<D>, status_period_s: f64) -> Result<StopReason>
where
    D: Drivetrain + Send + 'static
{
    let handle = ctrl.handle();

    let join = thread::Builder::new()
        .name(String::from("ctrl_loop"))
        .spawn(move || ctrl.run())
        .wrap_err("Failed to spawn the control loop thread")?;

    let status_period = Duration::from_secs_f64(status_period_s);

    while !join.is_finished() {
        thread::sleep(status_period);

        let status = handle.status();
        info!(
            "Tick {:4} | {} wall | speeds {:+.3}, {:+.3}",
            status.tick_count,
            if status.following_left_wall { "left " } else { "right" },
            status.speeds.left,
            status.speeds.right
        );
    }

    let reason = join
        .join()
        .map_err(|_| eyre!("The control loop thread panicked"))?
        .wrap_err("Wall follow session failed")?;

    Ok(reason)
}
