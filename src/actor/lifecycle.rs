//! Actor lifecycle state machine and transition tracking.

// Layer 1: Standard library imports
use std::time::Instant;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
use crate::supervision::SupervisionStrategy;

/// Where an actor is in its life.
///
/// ```text
///            start
///  (new) ──────────▶ Started ──── stop ────▶ Stopping ──▶ Stopped
///                      │  ▲
///              failure │  │ transition complete
///                      ▼  │
///            Restarting / Resuming
/// ```
///
/// `Restarting` and `Resuming` are transient supervision states; both
/// return to `Started`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeCycleState {
    /// Receiving and processing messages.
    Started,
    /// A supervisor is replacing the actor body.
    Restarting,
    /// A supervisor is resuming the actor after a failure.
    Resuming,
    /// Shutting down: children first, then hooks, then the mailbox.
    Stopping,
    /// Terminal. The mailbox is closed; new sends become dead letters.
    Stopped,
}

impl LifeCycleState {
    /// True for the terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Tracks an actor's lifecycle state, transition times, and restarts.
#[derive(Debug, Clone)]
pub struct LifeCycle {
    state: LifeCycleState,
    last_transition: DateTime<Utc>,
    restart_count: u32,
    restart_window: Vec<Instant>,
}

impl LifeCycle {
    /// A freshly started lifecycle.
    pub fn new() -> Self {
        Self {
            state: LifeCycleState::Started,
            last_transition: Utc::now(),
            restart_count: 0,
            restart_window: Vec::new(),
        }
    }

    /// Move to a new state, stamping the transition time.
    pub fn transition_to(&mut self, state: LifeCycleState) {
        self.state = state;
        self.last_transition = Utc::now();
    }

    /// Current state.
    pub fn state(&self) -> LifeCycleState {
        self.state
    }

    /// When the last transition happened.
    pub fn last_transition(&self) -> DateTime<Utc> {
        self.last_transition
    }

    /// How many times the body has been replaced.
    pub fn restart_count(&self) -> u32 {
        self.restart_count
    }

    /// True once stopped.
    pub fn is_stopped(&self) -> bool {
        self.state == LifeCycleState::Stopped
    }

    /// Enter `Stopping` exactly once. Returns false if a stop is already
    /// underway or done, which is what makes `stop` idempotent.
    pub fn begin_stopping(&mut self) -> bool {
        match self.state {
            LifeCycleState::Stopping | LifeCycleState::Stopped => false,
            _ => {
                self.transition_to(LifeCycleState::Stopping);
                true
            }
        }
    }

    /// Check the restart-intensity bound and, when allowed, record the
    /// restart into the sliding window.
    pub fn restart_allowed(&mut self, strategy: &SupervisionStrategy) -> bool {
        match strategy.intensity() {
            None => {
                self.restart_count += 1;
                true
            }
            Some(limit) => {
                let now = Instant::now();
                let period = strategy.period();
                self.restart_window
                    .retain(|at| now.duration_since(*at) <= period);
                if self.restart_window.len() as u32 >= limit {
                    false
                } else {
                    self.restart_window.push(now);
                    self.restart_count += 1;
                    true
                }
            }
        }
    }
}

impl Default for LifeCycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervision::SupervisionScope;
    use std::time::Duration;

    #[test]
    fn test_new_lifecycle_is_started() {
        let life_cycle = LifeCycle::new();
        assert_eq!(life_cycle.state(), LifeCycleState::Started);
        assert_eq!(life_cycle.restart_count(), 0);
        assert!(!life_cycle.is_stopped());
    }

    #[test]
    fn test_transitions_update_state() {
        let mut life_cycle = LifeCycle::new();
        life_cycle.transition_to(LifeCycleState::Restarting);
        assert_eq!(life_cycle.state(), LifeCycleState::Restarting);
        life_cycle.transition_to(LifeCycleState::Started);
        assert_eq!(life_cycle.state(), LifeCycleState::Started);
    }

    #[test]
    fn test_begin_stopping_is_idempotent() {
        let mut life_cycle = LifeCycle::new();
        assert!(life_cycle.begin_stopping());
        assert!(!life_cycle.begin_stopping());
        life_cycle.transition_to(LifeCycleState::Stopped);
        assert!(!life_cycle.begin_stopping());
        assert!(life_cycle.is_stopped());
    }

    #[test]
    fn test_terminal_state() {
        assert!(LifeCycleState::Stopped.is_terminal());
        assert!(!LifeCycleState::Started.is_terminal());
        assert!(!LifeCycleState::Stopping.is_terminal());
    }

    #[test]
    fn test_unbounded_intensity_always_allows() {
        let mut life_cycle = LifeCycle::new();
        let strategy = SupervisionStrategy::forever(SupervisionScope::One);
        for _ in 0..100 {
            assert!(life_cycle.restart_allowed(&strategy));
        }
        assert_eq!(life_cycle.restart_count(), 100);
    }

    #[test]
    fn test_intensity_bound_within_period() {
        let mut life_cycle = LifeCycle::new();
        let strategy =
            SupervisionStrategy::new(Some(2), Duration::from_secs(60), SupervisionScope::One);
        assert!(life_cycle.restart_allowed(&strategy));
        assert!(life_cycle.restart_allowed(&strategy));
        assert!(!life_cycle.restart_allowed(&strategy));
        assert_eq!(life_cycle.restart_count(), 2);
    }

    #[test]
    fn test_intensity_window_expires() {
        let mut life_cycle = LifeCycle::new();
        let strategy =
            SupervisionStrategy::new(Some(1), Duration::from_millis(20), SupervisionScope::One);
        assert!(life_cycle.restart_allowed(&strategy));
        assert!(!life_cycle.restart_allowed(&strategy));
        std::thread::sleep(Duration::from_millis(40));
        assert!(life_cycle.restart_allowed(&strategy));
    }
}
