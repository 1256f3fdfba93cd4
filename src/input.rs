//! The input normalizer: raw key signals in, one validated command out.
//!
//! Hosts deliver key repeats and duplicate events faster than the simulation
//! ticks; a short debounce window coalesces each burst down to its last
//! signal. Reversal and repeat suppression happens against the last signal
//! actually accepted, not merely offered.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::engine::{Engine, GameState};
use crate::field::Vector;

/// Window for coalescing key bursts that land between two ticks.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(20);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    Left,
    Up,
    Right,
    Down,
    PauseToggle,
    SmoothToggle,
}

impl Signal {
    pub fn is_directional(self) -> bool {
        matches!(
            self,
            Signal::Left | Signal::Up | Signal::Right | Signal::Down
        )
    }

    pub fn opposite(self) -> Option<Signal> {
        match self {
            Signal::Left => Some(Signal::Right),
            Signal::Right => Some(Signal::Left),
            Signal::Up => Some(Signal::Down),
            Signal::Down => Some(Signal::Up),
            Signal::PauseToggle | Signal::SmoothToggle => None,
        }
    }

    /// The axis step this signal steers, at the given magnitude. `None` for
    /// control signals.
    fn axis_vector(self, delta: f64) -> Option<Vector> {
        match self {
            Signal::Left => Some(Vector { x: -delta, y: 0.0 }),
            Signal::Up => Some(Vector { x: 0.0, y: -delta }),
            Signal::Right => Some(Vector { x: delta, y: 0.0 }),
            Signal::Down => Some(Vector { x: 0.0, y: delta }),
            Signal::PauseToggle | Signal::SmoothToggle => None,
        }
    }
}

/// What applying a signal did; the driver's pacer reacts to this.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Steered { resumed: bool },
    Paused,
    Resumed,
    Restarted,
    SmoothEnabled,
    SmoothDisabled,
    Ignored,
}

#[derive(Clone, Copy, Debug)]
struct Pending {
    signal: Signal,
    ready_at: Instant,
}

#[derive(Debug)]
pub struct Normalizer {
    window: Duration,
    pending: Option<Pending>,
    last_direction: Option<Signal>,
}

impl Normalizer {
    pub fn new() -> Normalizer {
        Normalizer::with_window(DEBOUNCE_WINDOW)
    }

    pub fn with_window(window: Duration) -> Normalizer {
        Normalizer {
            window,
            pending: None,
            last_direction: None,
        }
    }

    /// Queues a raw signal. While the game runs, a reversal or repeat of the
    /// last accepted direction is dropped; anything else replaces the pending
    /// signal and restarts the debounce window.
    pub fn offer(&mut self, signal: Signal, state: GameState, now: Instant) {
        if signal.is_directional() && state == GameState::Running {
            if let Some(last) = self.last_direction {
                if signal == last || Some(signal) == last.opposite() {
                    return;
                }
            }
        }

        self.pending = Some(Pending {
            signal,
            ready_at: now + self.window,
        });
    }

    /// Takes the pending signal once its window has elapsed, recording it as
    /// the last accepted direction if it steers.
    pub fn take_ready(&mut self, now: Instant) -> Option<Signal> {
        let pending = self.pending?;
        if now < pending.ready_at {
            return None;
        }
        self.pending = None;
        if pending.signal.is_directional() {
            self.last_direction = Some(pending.signal);
        }
        Some(pending.signal)
    }

    /// When the pending signal becomes ready, for driver poll timeouts.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|pending| pending.ready_at)
    }
}

impl Default for Normalizer {
    fn default() -> Normalizer {
        Normalizer::new()
    }
}

/// Applies an accepted signal against the engine's current state.
///
/// Steering builds the vector at the engine's current delta and resumes a
/// paused or unstarted game; any signal restarts a finished one.
pub fn apply(signal: Signal, engine: &mut Engine, rng: &mut impl Rng) -> Applied {
    match signal {
        Signal::PauseToggle => match engine.state() {
            GameState::Paused => {
                engine.resume();
                Applied::Resumed
            }
            GameState::Running => {
                engine.pause();
                Applied::Paused
            }
            GameState::GameOver => {
                engine.reinitialize(rng);
                engine.resume();
                Applied::Restarted
            }
            GameState::Init => Applied::Ignored,
        },
        Signal::SmoothToggle => {
            if engine.is_smooth() {
                engine.disable_smooth_mode();
                Applied::SmoothDisabled
            } else {
                engine.enable_smooth_mode();
                Applied::SmoothEnabled
            }
        }
        direction => {
            if engine.state() == GameState::GameOver {
                engine.reinitialize(rng);
            }
            let Some(vector) = direction.axis_vector(engine.vector_delta()) else {
                return Applied::Ignored;
            };
            engine.set_vector(vector);

            let resumed = engine.state() != GameState::Running;
            if resumed {
                engine.resume();
            }
            Applied::Steered { resumed }
        }
    }
}
