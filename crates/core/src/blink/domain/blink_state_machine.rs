//! Debounces noisy per-frame eye observations into discrete blinks.
//!
//! ```text
//!          Closed                     Open x threshold
//!   OPEN ─────────▶ CLOSING(count) ───────────────────▶ OPEN  (emit BlinkEvent)
//!                    │   ▲
//!                    └───┘ Open: count += 1
//!                          Closed / Inconclusive: unchanged
//! ```

use crate::blink::domain::eye_closure_classifier::EyeObservation;
use crate::shared::constants::BLINK_CONFIRM_FRAMES;

/// Emitted once per confirmed blink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlinkEvent;

/// Snapshot of the machine. `consecutive_closed_frames` counts the open
/// frames seen since the closure began and is 0 whenever `is_closed` is
/// false.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlinkState {
    pub is_closed: bool,
    pub consecutive_closed_frames: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Open,
    Closing { confirming: u32 },
}

pub struct BlinkStateMachine {
    threshold: u32,
    phase: Phase,
}

impl BlinkStateMachine {
    pub fn new(threshold: u32) -> Result<Self, &'static str> {
        if threshold < 1 {
            return Err("blink threshold must be >= 1");
        }
        Ok(Self {
            threshold,
            phase: Phase::Open,
        })
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn state(&self) -> BlinkState {
        match self.phase {
            Phase::Open => BlinkState::default(),
            Phase::Closing { confirming } => BlinkState {
                is_closed: true,
                consecutive_closed_frames: confirming,
            },
        }
    }

    pub fn update(&mut self, observation: EyeObservation) -> Option<BlinkEvent> {
        match (self.phase, observation) {
            (Phase::Open, EyeObservation::Closed) => {
                log::debug!("Closed eyes detected");
                self.phase = Phase::Closing { confirming: 0 };
                None
            }
            (Phase::Closing { confirming }, EyeObservation::Open) => {
                let confirming = confirming + 1;
                if confirming >= self.threshold {
                    self.phase = Phase::Open;
                    Some(BlinkEvent)
                } else {
                    self.phase = Phase::Closing { confirming };
                    None
                }
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.phase = Phase::Open;
    }
}

impl Default for BlinkStateMachine {
    fn default() -> Self {
        Self {
            threshold: BLINK_CONFIRM_FRAMES,
            phase: Phase::Open,
        }
    }
}
