//! Generation-tagged debounce.
//!
//! Each [`DebounceGate::arm`] bumps the generation and hands back a token; the
//! caller schedules a delayed "settled" event carrying it. Only the token from
//! the latest `arm()` is accepted by [`DebounceGate::settle`], so a burst of
//! triggers inside the delay collapses into one action.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceToken {
    /// Which gate armed it, so one screen can own several gates.
    pub family: &'static str,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct DebounceGate {
    family: &'static str,
    delay: Duration,
    generation: u64,
    pending: bool,
}

impl DebounceGate {
    pub fn new(family: &'static str, delay: Duration) -> Self {
        Self {
            family,
            delay,
            generation: 0,
            pending: false,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Restarts the window. Any earlier token becomes stale.
    pub fn arm(&mut self) -> DebounceToken {
        self.generation += 1;
        self.pending = true;
        DebounceToken {
            family: self.family,
            generation: self.generation,
        }
    }

    /// Accepts `token` at most once, and only if nothing was armed since.
    pub fn settle(&mut self, token: DebounceToken) -> bool {
        if self.pending && token.family == self.family && token.generation == self.generation {
            self.pending = false;
            true
        } else {
            false
        }
    }

    /// Drops whatever is pending; the in-flight token will be rejected.
    pub fn cancel(&mut self) {
        self.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_last_of_burst_is_accepted() {
        let mut gate = DebounceGate::new("filter", Duration::from_millis(300));
        let tokens: Vec<_> = (0..5).map(|_| gate.arm()).collect();

        let accepted: Vec<_> = tokens.into_iter().filter(|t| gate.settle(*t)).collect();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].generation, 5);
        assert!(!gate.is_pending());
    }

    #[test]
    fn test_settle_is_one_shot() {
        let mut gate = DebounceGate::new("list", Duration::from_millis(250));
        let token = gate.arm();
        assert!(gate.settle(token));
        assert!(!gate.settle(token));
    }

    #[test]
    fn test_foreign_family_rejected() {
        let mut gate = DebounceGate::new("list", Duration::from_millis(250));
        let token = gate.arm();
        let foreign = DebounceToken {
            family: "filter",
            generation: token.generation,
        };
        assert!(!gate.settle(foreign));
        assert!(gate.settle(token));
    }

    #[test]
    fn test_cancel_rejects_pending_token() {
        let mut gate = DebounceGate::new("filter", Duration::from_millis(300));
        let token = gate.arm();
        gate.cancel();
        assert!(!gate.settle(token));
    }
}
