//! # PID controller module
//!
//! A tick-based PID controller over a scalar error. There is no time
//! awareness, the integral and derivative are per-update sums and differences,
//! so the gains are tuned for a fixed update period.
//!
//! The integral is not limited in any way. The wall follower's gains were
//! tuned against this behaviour so adding anti-windup would change them.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains of a PID controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Dervative gain
    pub k_d: f64,
}

/// A PID controller
#[derive(Debug, Clone, Serialize)]
pub struct PidController {
    gains: PidGains,

    /// Previous error, zero before the first update
    prev_error: f64,

    /// The integral accumulation
    integral: f64,

    /// Output of the last update
    output: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains and zeroed accumulators.
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            prev_error: 0f64,
            integral: 0f64,
            output: 0f64,
        }
    }

    /// Update the controller with a new error.
    ///
    /// If `suppress_derivative` is set the derivative term is zero for this
    /// update only. The previous error is still updated so the next update
    /// differentiates against this one.
    pub fn update(&mut self, error: f64, suppress_derivative: bool) {
        self.integral += error;

        let deriv = if suppress_derivative {
            0f64
        } else {
            error - self.prev_error
        };

        self.output = 
            self.gains.k_p * error 
            + self.gains.k_i * self.integral 
            + self.gains.k_d * deriv;

        self.prev_error = error;
    }

    /// The output computed by the last update.
    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const GAINS: PidGains = PidGains { k_p: 0.5, k_i: 0.125, k_d: 2.0 };

    #[test]
    fn test_constant_error() {
        let e = 8.0;

        for n in 2..10 {
            let mut pid = PidController::new(GAINS);
            for _ in 0..n {
                pid.update(e, false);
            }

            // Derivative has vanished, only P and the accumulated I remain
            let expected = GAINS.k_p * e + GAINS.k_i * n as f64 * e;
            assert!((pid.output() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_first_update_derivative() {
        // Previous error starts at zero so the first update sees the full step
        let mut pid = PidController::new(GAINS);
        pid.update(4.0, false);

        assert_eq!(pid.output(), 0.5 * 4.0 + 0.125 * 4.0 + 2.0 * 4.0);
    }

    #[test]
    fn test_suppressed_derivative() {
        let mut pid = PidController::new(GAINS);
        pid.update(10.0, false);

        // A large jump with the derivative suppressed has no D contribution
        pid.update(250.0, true);
        assert_eq!(pid.output(), 0.5 * 250.0 + 0.125 * 260.0);

        // The previous error was still updated, so the next normal update
        // differentiates against 250 rather than 10
        pid.update(240.0, false);
        assert_eq!(pid.output(), 0.5 * 240.0 + 0.125 * 500.0 + 2.0 * -10.0);
    }

    #[test]
    fn test_integral_unbounded() {
        let mut pid = PidController::new(PidGains { k_p: 0.0, k_i: 1.0, k_d: 0.0 });
        for _ in 0..10_000 {
            pid.update(100.0, false);
        }

        assert_eq!(pid.integral(), 1_000_000.0);
        assert_eq!(pid.output(), 1_000_000.0);
    }
}
