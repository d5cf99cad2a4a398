//! Control loop parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::CtrlLoopError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance on the tick budget so that float error in the period does not
/// add an extra tick to an exact budget.
const TICK_LIMIT_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the control loop
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Period of a single tick.
    ///
    /// Units: seconds
    pub tick_period_s: f64,

    /// Maximum duration of a session.
    ///
    /// Units: seconds
    pub time_limit_s: f64,

    /// The session ends once both side readings exceed this.
    ///
    /// Units: millimeters
    pub out_of_course_mm: f64,

    /// Number of consecutive failed sensor reads tolerated before the
    /// session is aborted.
    pub max_sensor_faults: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Number of ticks a session may run for.
    ///
    /// A session keeps ticking while its tick count is below
    /// `time_limit_s / tick_period_s`, so a fractional budget rounds up.
    pub fn tick_limit(&self) -> u64 {
        let budget = self.time_limit_s / self.tick_period_s;
        (budget - TICK_LIMIT_EPSILON).ceil().max(0.0) as u64
    }

    pub fn validate(&self) -> Result<(), CtrlLoopError> {
        if !(self.tick_period_s > 0.0 && self.tick_period_s.is_finite()) {
            return Err(CtrlLoopError::InvalidParams(format!(
                "tick_period_s must be positive and finite, found {}", self.tick_period_s
            )))
        }
        if !(self.time_limit_s >= 0.0 && self.time_limit_s.is_finite()) {
            return Err(CtrlLoopError::InvalidParams(format!(
                "time_limit_s must be finite and not negative, found {}", self.time_limit_s
            )))
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            tick_period_s: 0.1,
            time_limit_s: 16.0,
            out_of_course_mm: 400.0,
            max_sensor_faults: 10,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tick_limit() {
        assert_eq!(Params::default().tick_limit(), 160);

        // Exact budgets from inexact periods
        let p = Params { tick_period_s: 0.001, time_limit_s: 0.003, ..Params::default() };
        assert_eq!(p.tick_limit(), 3);
        let p = Params { tick_period_s: 0.1, time_limit_s: 0.3, ..Params::default() };
        assert_eq!(p.tick_limit(), 3);

        let p = Params { time_limit_s: 0.0, ..Params::default() };
        assert_eq!(p.tick_limit(), 0);
    }

    #[test]
    fn test_fractional_tick_limit() {
        // Ticks 0, 1 and 2 all start before 2.4 periods have elapsed
        let p = Params { tick_period_s: 0.1, time_limit_s: 0.24, ..Params::default() };
        assert_eq!(p.tick_limit(), 3);

        let p = Params { tick_period_s: 0.1, time_limit_s: 0.21, ..Params::default() };
        assert_eq!(p.tick_limit(), 3);
    }

    #[test]
    fn test_validate() {
        assert!(Params::default().validate().is_ok());

        let p = Params { tick_period_s: 0.0, ..Params::default() };
        assert!(matches!(p.validate(), Err(CtrlLoopError::InvalidParams(_))));

        let p = Params { tick_period_s: f64::INFINITY, ..Params::default() };
        assert!(matches!(p.validate(), Err(CtrlLoopError::InvalidParams(_))));

        let p = Params { tick_period_s: f64::NAN, ..Params::default() };
        assert!(matches!(p.validate(), Err(CtrlLoopError::InvalidParams(_))));

        let p = Params { time_limit_s: f64::INFINITY, ..Params::default() };
        assert!(matches!(p.validate(), Err(CtrlLoopError::InvalidParams(_))));
    }
}
