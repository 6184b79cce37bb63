//! 运行时配置：熔断策略、按负载区分的超时与 HTTP 客户端参数。
//!
//! Runtime configuration: breaker policy, per-workload timeouts, HTTP client knobs.
//!
//! Defaults are usable as-is. [`ResilienceConfig::from_env`] applies `XP_*`
//! environment overrides; [`ResilienceConfig::from_yaml_str`] reads a YAML
//! document where every field is optional.

use crate::resilience::CircuitBreakerConfig;
use crate::transport::Workload;
use crate::{Error, ErrorContext, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Deadline per workload. These differ only in value, never in code path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutConfig {
    pub default: Duration,
    pub analysis: Duration,
    pub osint_search: Duration,
    pub image_generation: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            default: Duration::from_secs(30),
            analysis: Duration::from_secs(60),
            osint_search: Duration::from_secs(180),
            image_generation: Duration::from_secs(45),
        }
    }
}

impl TimeoutConfig {
    pub fn for_workload(&self, workload: Workload) -> Duration {
        match workload {
            Workload::Default => self.default,
            Workload::Analysis => self.analysis,
            Workload::OsintSearch => self.osint_search,
            Workload::ImageGeneration => self.image_generation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    pub connect_timeout: Duration,
    pub proxy_url: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
            connect_timeout: Duration::from_secs(10),
            proxy_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResilienceConfig {
    pub breaker: CircuitBreakerConfig,
    pub timeouts: TimeoutConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    breaker: BreakerSection,
    #[serde(default)]
    timeouts: TimeoutSection,
    #[serde(default)]
    http: HttpSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BreakerSection {
    failure_threshold: Option<u32>,
    cooldown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TimeoutSection {
    default_secs: Option<u64>,
    analysis_secs: Option<u64>,
    osint_search_secs: Option<u64>,
    image_generation_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct HttpSection {
    pool_max_idle_per_host: Option<usize>,
    pool_idle_timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
    proxy_url: Option<String>,
}

fn secs(v: Option<u64>, fallback: Duration) -> Duration {
    v.map(Duration::from_secs).unwrap_or(fallback)
}

impl ResilienceConfig {
    /// Defaults with `XP_*` environment overrides applied.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    ///
    /// Values that fail to parse are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed_u64 = |name: &str| lookup(name).and_then(|s| s.trim().parse::<u64>().ok());

        let mut cfg = Self::default();
        if let Some(t) = lookup("XP_BREAKER_THRESHOLD").and_then(|s| s.trim().parse::<u32>().ok()) {
            cfg.breaker.failure_threshold = t;
        }
        cfg.breaker.cooldown = secs(parsed_u64("XP_BREAKER_COOLDOWN_SECS"), cfg.breaker.cooldown);
        cfg.timeouts.default = secs(parsed_u64("XP_HTTP_TIMEOUT_SECS"), cfg.timeouts.default);
        if let Some(n) = lookup("XP_HTTP_POOL_MAX_IDLE_PER_HOST")
            .and_then(|s| s.trim().parse::<usize>().ok())
        {
            cfg.http.pool_max_idle_per_host = n;
        }
        cfg.http.pool_idle_timeout = secs(
            parsed_u64("XP_HTTP_POOL_IDLE_TIMEOUT_SECS"),
            cfg.http.pool_idle_timeout,
        );
        if let Some(proxy) = lookup("XP_PROXY_URL").filter(|s| !s.trim().is_empty()) {
            cfg.http.proxy_url = Some(proxy);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a YAML document. Missing fields keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: FileConfig = serde_yaml::from_str(yaml).map_err(|e| {
            Error::configuration_with_context(
                "invalid resilience config",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("config_loader"),
            )
        })?;

        let d = Self::default();
        let cfg = Self {
            breaker: CircuitBreakerConfig {
                failure_threshold: file
                    .breaker
                    .failure_threshold
                    .unwrap_or(d.breaker.failure_threshold),
                cooldown: secs(file.breaker.cooldown_secs, d.breaker.cooldown),
            },
            timeouts: TimeoutConfig {
                default: secs(file.timeouts.default_secs, d.timeouts.default),
                analysis: secs(file.timeouts.analysis_secs, d.timeouts.analysis),
                osint_search: secs(file.timeouts.osint_search_secs, d.timeouts.osint_search),
                image_generation: secs(
                    file.timeouts.image_generation_secs,
                    d.timeouts.image_generation,
                ),
            },
            http: HttpConfig {
                pool_max_idle_per_host: file
                    .http
                    .pool_max_idle_per_host
                    .unwrap_or(d.http.pool_max_idle_per_host),
                pool_idle_timeout: secs(file.http.pool_idle_timeout_secs, d.http.pool_idle_timeout),
                connect_timeout: secs(file.http.connect_timeout_secs, d.http.connect_timeout),
                proxy_url: file.http.proxy_url,
            },
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.breaker.failure_threshold == 0 {
            return Err(Error::configuration_with_context(
                "failure threshold must be at least 1",
                ErrorContext::new()
                    .with_field_path("breaker.failure_threshold")
                    .with_source("config_validator"),
            ));
        }
        let timeouts = [
            ("timeouts.default", self.timeouts.default),
            ("timeouts.analysis", self.timeouts.analysis),
            ("timeouts.osint_search", self.timeouts.osint_search),
            ("timeouts.image_generation", self.timeouts.image_generation),
        ];
        for (path, value) in timeouts {
            if value.is_zero() {
                return Err(Error::configuration_with_context(
                    "timeout must be non-zero",
                    ErrorContext::new()
                        .with_field_path(path)
                        .with_source("config_validator"),
                ));
            }
        }
        Ok(())
    }
}
