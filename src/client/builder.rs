use crate::client::core::ResilientClient;
use crate::config::ResilienceConfig;
use crate::resilience::{BreakerRegistry, Clock, SystemClock};
use crate::transport::HttpTransport;
use crate::Result;
use std::sync::Arc;

/// Builder for [`ResilientClient`].
///
/// Without a config the defaults are used; call [`config`](Self::config) with
/// [`ResilienceConfig::from_env`] to pick up `XP_*` overrides.
pub struct ResilientClientBuilder {
    config: ResilienceConfig,
    breakers: Option<Arc<BreakerRegistry>>,
    clock: Arc<dyn Clock>,
}

impl ResilientClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ResilienceConfig::default(),
            breakers: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn config(mut self, config: ResilienceConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing registry, e.g. between clients for different
    /// providers. The config's breaker policy is then ignored.
    pub fn breakers(mut self, breakers: Arc<BreakerRegistry>) -> Self {
        self.breakers = Some(breakers);
        self
    }

    /// Time source for a registry created by this builder.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Result<ResilientClient> {
        self.config.validate()?;
        let transport = HttpTransport::new(&self.config.http, self.config.timeouts.clone())?;
        let breakers = match self.breakers {
            Some(b) => b,
            None => Arc::new(BreakerRegistry::with_clock(
                self.config.breaker.clone(),
                self.clock,
            )),
        };
        Ok(ResilientClient::new(transport, breakers))
    }
}

impl Default for ResilientClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
