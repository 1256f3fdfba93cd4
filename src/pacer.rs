//! Tick cadence for drivers: one owned value holding the active mode, halt
//! flag, and next deadline, so no scheduling state leaks into globals.

use std::time::{Duration, Instant};

/// Stepped interval cadence vs. smooth frame cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Stepped,
    Smooth,
}

impl Mode {
    pub fn period(self) -> Duration {
        match self {
            Mode::Stepped => Duration::from_millis(1000 / 15),
            Mode::Smooth => Duration::from_millis(1000 / 60),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Pacer {
    mode: Mode,
    halted: bool,
    next_tick: Instant,
}

impl Pacer {
    pub fn new(now: Instant) -> Pacer {
        Pacer {
            mode: Mode::Stepped,
            halted: false,
            next_tick: now + Mode::Stepped.period(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Cancels the previous cadence and arms the new one in one step. A
    /// halted pacer stays halted across the switch.
    pub fn switch_mode(&mut self, mode: Mode, now: Instant) {
        self.mode = mode;
        self.next_tick = now + mode.period();
    }

    /// Stops the cadence until [`Pacer::restart`].
    pub fn halt(&mut self) {
        self.halted = true;
    }

    pub fn restart(&mut self, now: Instant) {
        self.halted = false;
        self.next_tick = now + self.mode.period();
    }

    /// True at most once per period while running; re-arms the deadline.
    pub fn due(&mut self, now: Instant) -> bool {
        if self.halted || now < self.next_tick {
            return false;
        }
        self.next_tick = now + self.mode.period();
        true
    }

    /// The next firing time, for driver poll timeouts. `None` while halted.
    pub fn deadline(&self) -> Option<Instant> {
        if self.halted {
            None
        } else {
            Some(self.next_tick)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_fires_once_per_period() {
        let t0 = Instant::now();
        let mut pacer = Pacer::new(t0);
        let period = Mode::Stepped.period();

        assert!(!pacer.due(t0));
        assert!(!pacer.due(t0 + period / 2));
        assert!(pacer.due(t0 + period));
        // Re-armed relative to the firing time.
        assert!(!pacer.due(t0 + period));
        assert!(pacer.due(t0 + period + period));
    }

    #[test]
    fn test_switch_mode_cancels_then_arms() {
        let t0 = Instant::now();
        let mut pacer = Pacer::new(t0);
        let stepped = Mode::Stepped.period();
        let smooth = Mode::Smooth.period();

        // Switch just before the stepped deadline: the old deadline must not
        // fire; the smooth cadence starts from the switch instant.
        let t1 = t0 + stepped - Duration::from_millis(1);
        pacer.switch_mode(Mode::Smooth, t1);
        assert_eq!(pacer.mode(), Mode::Smooth);
        assert!(!pacer.due(t0 + stepped));
        assert!(pacer.due(t1 + smooth));
    }

    #[test]
    fn test_halt_and_restart() {
        let t0 = Instant::now();
        let mut pacer = Pacer::new(t0);
        let period = Mode::Stepped.period();

        pacer.halt();
        assert!(pacer.is_halted());
        assert_eq!(pacer.deadline(), None);
        assert!(!pacer.due(t0 + period * 10));

        let t1 = t0 + period * 10;
        pacer.restart(t1);
        assert!(!pacer.due(t1));
        assert!(pacer.due(t1 + period));
        assert_eq!(pacer.deadline(), Some(t1 + period + period));
    }

    #[test]
    fn test_halted_pacer_survives_mode_switch() {
        let t0 = Instant::now();
        let mut pacer = Pacer::new(t0);

        pacer.halt();
        pacer.switch_mode(Mode::Smooth, t0);
        assert!(pacer.is_halted());
        assert!(!pacer.due(t0 + Mode::Smooth.period()));

        pacer.restart(t0);
        assert!(pacer.due(t0 + Mode::Smooth.period()));
    }
}
