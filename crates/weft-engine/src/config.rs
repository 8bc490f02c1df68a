//! Engine configuration and validation.

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Configuration for the tick engine: worker pool size and the timer's
/// target cycle duration.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Number of worker threads in the tick coordinator's pool.
    /// Default: 8.
    pub worker_threads: usize,
    /// Target duration of one timer cycle (one tick plus its pacing
    /// sleep). Default: 2 ms.
    pub target_cycle: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: 8,
            target_cycle: Duration::from_millis(2),
        }
    }
}

impl EngineConfig {
    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the worker pool would be empty or
    /// the cycle duration is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_threads == 0 {
            return Err(ConfigError::NoWorkerThreads);
        }
        if self.target_cycle.is_zero() {
            return Err(ConfigError::ZeroCycleDuration);
        }
        Ok(())
    }
}

/// Errors from [`EngineConfig::validate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `worker_threads` was zero; the barrier phases would never drain.
    NoWorkerThreads,
    /// `target_cycle` was zero; the timer would spin without pacing.
    ZeroCycleDuration,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWorkerThreads => write!(f, "worker pool must have at least one thread"),
            Self::ZeroCycleDuration => write!(f, "target cycle duration must be non-zero"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_workers_rejected() {
        let config = EngineConfig {
            worker_threads: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoWorkerThreads));
    }

    #[test]
    fn zero_cycle_rejected() {
        let config = EngineConfig {
            target_cycle: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroCycleDuration));
    }
}
