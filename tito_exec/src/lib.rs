//! # TITO robot library.
//!
//! The navigation and control core of the robot. A wall follow session reads three range sensors
//! every tick, decides a pair of wheel speeds which hold the robot at a fixed offset from a wall,
//! and hands them to the drivetrain which converts them into servo pulses.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Control loop driver - runs a wall follow session at a fixed period
pub mod ctrl_loop;

/// Drivetrain interface, and the servo, simulated and replay drivetrains
pub mod drivetrain;

/// Scalar PID controller
pub mod pid;

/// Servo control - pulse mapping, calibration and servo driver boards
pub mod servo_ctrl;

/// Wall follow decision engine - turns range readings into wheel speeds
pub mod wall_follow;
