use super::clock::{Clock, SystemClock};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Trip after this many consecutive failures.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
/// How long a tripped breaker rejects calls.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30);

/// Observable breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerStatus {
    Closed,
    Open,
    /// Cooldown elapsed; the next permission check resets to closed.
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerSnapshot {
    pub failure_threshold: u32,
    pub cooldown_ms: u64,
    pub consecutive_failures: u32,
    /// Remaining open time in ms, if currently open.
    pub open_remaining_ms: Option<u64>,
    pub status: BreakerStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

impl CircuitBreakerConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the failure threshold
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Set the cooldown duration
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }
}

#[derive(Debug)]
struct State {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Consecutive-failure circuit breaker for a single upstream.
///
/// - Counts consecutive failures
/// - Opens for a cooldown after reaching the threshold
/// - The first permission check after the cooldown resets to closed
///
/// Never returns errors; callers decide what a rejected permission means.
#[derive(Debug)]
pub struct CircuitBreaker {
    cfg: CircuitBreakerConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<State>,
}

impl CircuitBreaker {
    pub fn new(cfg: CircuitBreakerConfig) -> Self {
        Self::with_clock(cfg, Arc::new(SystemClock))
    }

    pub fn with_clock(cfg: CircuitBreakerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            cfg,
            clock,
            state: Mutex::new(State {
                consecutive_failures: 0,
                opened_at: None,
            }),
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.cfg
    }

    // State is plain counters, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether a call may go through right now.
    pub fn can_proceed(&self) -> bool {
        let mut st = self.lock();
        if let Some(opened_at) = st.opened_at {
            if self.clock.now().saturating_duration_since(opened_at) < self.cfg.cooldown {
                return false;
            }
            // cooldown expired
            st.opened_at = None;
            st.consecutive_failures = 0;
        }
        true
    }

    /// Returns `true` if this failure tripped the breaker.
    pub fn record_failure(&self) -> bool {
        let mut st = self.lock();
        st.consecutive_failures = st.consecutive_failures.saturating_add(1);
        if st.consecutive_failures >= self.cfg.failure_threshold {
            st.opened_at = Some(self.clock.now());
            return true;
        }
        false
    }

    pub fn record_success(&self) {
        let mut st = self.lock();
        st.consecutive_failures = 0;
        st.opened_at = None;
    }

    pub fn snapshot(&self) -> CircuitBreakerSnapshot {
        let now = self.clock.now();
        let st = self.lock();
        let (status, open_remaining_ms) = match st.opened_at {
            None => (BreakerStatus::Closed, None),
            Some(opened_at) => {
                let elapsed = now.saturating_duration_since(opened_at);
                if elapsed < self.cfg.cooldown {
                    let remaining = self.cfg.cooldown - elapsed;
                    (BreakerStatus::Open, Some(remaining.as_millis() as u64))
                } else {
                    (BreakerStatus::HalfOpen, None)
                }
            }
        };
        CircuitBreakerSnapshot {
            failure_threshold: self.cfg.failure_threshold,
            cooldown_ms: self.cfg.cooldown.as_millis() as u64,
            consecutive_failures: st.consecutive_failures,
            open_remaining_ms,
            status,
        }
    }
}
