//! Keyed circuit breakers, one per provider endpoint.

use super::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerSnapshot};
use super::clock::{Clock, SystemClock};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Owns one [`CircuitBreaker`] per key.
///
/// Breakers are created on first reference and live as long as the registry.
/// Every key shares the registry's policy. Share the registry between call
/// sites with an `Arc`.
#[derive(Debug)]
pub struct BreakerRegistry {
    cfg: CircuitBreakerConfig,
    clock: Arc<dyn Clock>,
    breakers: RwLock<HashMap<String, Arc<CircuitBreaker>>>,
}

impl BreakerRegistry {
    pub fn new(cfg: CircuitBreakerConfig) -> Self {
        Self::with_clock(cfg, Arc::new(SystemClock))
    }

    pub fn with_clock(cfg: CircuitBreakerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            cfg,
            clock,
            breakers: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.cfg
    }

    fn breaker(&self, key: &str) -> Arc<CircuitBreaker> {
        {
            let breakers = self.breakers.read().unwrap_or_else(|e| e.into_inner());
            if let Some(b) = breakers.get(key) {
                return Arc::clone(b);
            }
        }
        let mut breakers = self.breakers.write().unwrap_or_else(|e| e.into_inner());
        let b = breakers.entry(key.to_string()).or_insert_with(|| {
            Arc::new(CircuitBreaker::with_clock(
                self.cfg.clone(),
                Arc::clone(&self.clock),
            ))
        });
        Arc::clone(b)
    }

    /// `false` while the key's breaker is open. An expired cooldown resets
    /// the breaker and admits the call.
    pub fn can_proceed(&self, key: &str) -> bool {
        let breaker = self.breaker(key);
        let was_tripped = breaker.snapshot().consecutive_failures >= self.cfg.failure_threshold;
        let allowed = breaker.can_proceed();
        if !allowed {
            debug!(key, "circuit open, rejecting call");
        } else if was_tripped {
            info!(key, "circuit cooldown elapsed, closing");
        }
        allowed
    }

    pub fn record_failure(&self, key: &str) {
        let breaker = self.breaker(key);
        if breaker.record_failure() {
            warn!(
                key,
                failures = breaker.snapshot().consecutive_failures,
                cooldown_ms = self.cfg.cooldown.as_millis() as u64,
                "circuit tripped"
            );
        }
    }

    pub fn record_success(&self, key: &str) {
        self.breaker(key).record_success();
    }

    pub fn snapshot(&self, key: &str) -> CircuitBreakerSnapshot {
        self.breaker(key).snapshot()
    }

    /// Keys referenced so far, sorted.
    pub fn keys(&self) -> Vec<String> {
        let breakers = self.breakers.read().unwrap_or_else(|e| e.into_inner());
        let mut keys: Vec<String> = breakers.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for BreakerRegistry {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}
