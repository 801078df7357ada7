//! Supervision directives, scopes, and strategies.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

/// Default restart intensity: restarts allowed inside one period.
pub const DEFAULT_INTENSITY: u32 = 5;

/// Default intensity period.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(5);

/// A supervisor's decision about a failed actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Directive {
    /// Keep the body and its state; resume the mailbox.
    Resume,
    /// Replace the body with a fresh instance from the original
    /// definition; the environment and mailbox carry over.
    Restart,
    /// Stop the actor (children first, hooks, close the mailbox).
    Stop,
    /// Hand the failure to the supervisor's own supervisor.
    Escalate,
}

/// Which actors a directive applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupervisionScope {
    /// Only the failing actor.
    One,
    /// Every actor in the deciding supervisor's roster.
    All,
}

/// Bounds and scope of a supervisor's authority.
///
/// `intensity` is the maximum number of restarts allowed within `period`;
/// exceeding the bound demotes a Restart directive to Stop. `None` means
/// unbounded, which is the strategy both root guardians run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisionStrategy {
    intensity: Option<u32>,
    period: Duration,
    scope: SupervisionScope,
}

impl SupervisionStrategy {
    /// Build a strategy.
    pub fn new(intensity: Option<u32>, period: Duration, scope: SupervisionScope) -> Self {
        Self {
            intensity,
            period,
            scope,
        }
    }

    /// Unbounded restarts with the given scope.
    pub fn forever(scope: SupervisionScope) -> Self {
        Self {
            intensity: None,
            period: DEFAULT_PERIOD,
            scope,
        }
    }

    /// Maximum restarts per period, if bounded.
    pub fn intensity(&self) -> Option<u32> {
        self.intensity
    }

    /// The sliding window the intensity is measured over.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Which actors directives apply to.
    pub fn scope(&self) -> SupervisionScope {
        self.scope
    }
}

impl Default for SupervisionStrategy {
    fn default() -> Self {
        Self {
            intensity: Some(DEFAULT_INTENSITY),
            period: DEFAULT_PERIOD,
            scope: SupervisionScope::One,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_strategy() {
        let strategy = SupervisionStrategy::default();
        assert_eq!(strategy.intensity(), Some(DEFAULT_INTENSITY));
        assert_eq!(strategy.period(), DEFAULT_PERIOD);
        assert_eq!(strategy.scope(), SupervisionScope::One);
    }

    #[test]
    fn test_forever_is_unbounded() {
        let strategy = SupervisionStrategy::forever(SupervisionScope::All);
        assert_eq!(strategy.intensity(), None);
        assert_eq!(strategy.scope(), SupervisionScope::All);
    }

    #[test]
    fn test_directive_equality() {
        assert_eq!(Directive::Resume, Directive::Resume);
        assert_ne!(Directive::Restart, Directive::Stop);
        assert_ne!(Directive::Stop, Directive::Escalate);
    }
}
