//! Session handle shared between the control loop and the application

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use serde::Serialize;

use super::LoopState;
use crate::wall_follow::{ControlMode, WheelSpeeds};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Snapshot of a session's status, for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionStatus {
    pub state: LoopState,
    pub control_mode: ControlMode,
    pub tick_count: u64,
    pub following_left_wall: bool,
    pub has_switched_wall: bool,
    pub speeds: WheelSpeeds,
}

/// A handle onto a running session.
///
/// Clones refer to the same session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    stop: AtomicBool,
    status: Mutex<SessionStatus>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SessionHandle {
    pub(crate) fn new(status: SessionStatus) -> Self {
        Self {
            shared: Arc::new(Shared {
                stop: AtomicBool::new(false),
                status: Mutex::new(status),
            })
        }
    }

    /// Ask the session to stop. It will do so within one tick period.
    pub fn request_stop(&self) {
        self.shared.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.shared.stop.load(Ordering::Relaxed)
    }

    /// Get the latest status of the session.
    pub fn status(&self) -> SessionStatus {
        // A poisoned lock still holds the last status written
        match self.shared.status.lock() {
            Ok(s) => *s,
            Err(e) => *e.into_inner(),
        }
    }

    pub(crate) fn publish(&self, status: SessionStatus) {
        match self.shared.status.lock() {
            Ok(mut s) => *s = status,
            Err(e) => *e.into_inner() = status,
        }
    }
}
