//! Process configuration
//!
//! Settings come from the environment (a `.env` file is loaded first by the
//! binary). Global command-line flags override the matching variables.

use crate::error::{CliError, Result};
use a2p_engine::config::{
    DEFAULT_BRAND_POLL_ATTEMPTS, DEFAULT_BRAND_POLL_INTERVAL, DEFAULT_CONCURRENCY,
    DEFAULT_PROFILE_ASSIGNMENT_DELAY, DEFAULT_TRUST_ASSIGNMENT_DELAY,
};
use a2p_engine::remote::http::{
    DEFAULT_API_HOST, DEFAULT_API_TIMEOUT_SECS, DEFAULT_MESSAGING_HOST, DEFAULT_TRUSTHUB_HOST,
};
use a2p_engine::remote::{ApiHosts, Credentials, Provider, TwilioProvider};
use a2p_engine::{EngineConfig, Timings};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Environment Variables
// ============================================================================

pub const ACCOUNT_SID_VAR: &str = "TWILIO_ACCOUNT_SID";
pub const AUTH_TOKEN_VAR: &str = "TWILIO_AUTH_TOKEN";
pub const PRIMARY_PROFILE_VAR: &str = "PRIMARY_CUSTOMER_PROFILE";
pub const MOCK_VAR: &str = "IS_MOCK";
pub const CONCURRENCY_VAR: &str = "A2P_CONCURRENCY";
pub const API_TIMEOUT_VAR: &str = "A2P_API_TIMEOUT_SECS";
pub const POLL_ATTEMPTS_VAR: &str = "A2P_BRAND_POLL_ATTEMPTS";
pub const POLL_INTERVAL_VAR: &str = "A2P_BRAND_POLL_INTERVAL_SECS";
pub const PROFILE_DELAY_VAR: &str = "A2P_PROFILE_ASSIGNMENT_DELAY_MS";
pub const TRUST_DELAY_VAR: &str = "A2P_TRUST_ASSIGNMENT_DELAY_MS";
pub const API_URL_VAR: &str = "TWILIO_API_URL";
pub const TRUSTHUB_URL_VAR: &str = "TWILIO_TRUSTHUB_URL";
pub const MESSAGING_URL_VAR: &str = "TWILIO_MESSAGING_URL";

#[derive(Debug, Clone)]
pub struct Settings {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub primary_profile_sid: Option<String>,
    pub mock_brands: bool,
    pub concurrency: usize,
    pub api_timeout: Duration,
    pub timings: Timings,
    pub hosts: ApiHosts,
}

impl Settings {
    /// Load settings from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through `lookup`; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timings = Timings {
            profile_assignment_delay: parse_var::<u64>(&var, PROFILE_DELAY_VAR)?
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_PROFILE_ASSIGNMENT_DELAY),
            trust_assignment_delay: parse_var::<u64>(&var, TRUST_DELAY_VAR)?
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TRUST_ASSIGNMENT_DELAY),
            brand_poll_interval: parse_var::<u64>(&var, POLL_INTERVAL_VAR)?
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_BRAND_POLL_INTERVAL),
            brand_poll_attempts: parse_var(&var, POLL_ATTEMPTS_VAR)?
                .unwrap_or(DEFAULT_BRAND_POLL_ATTEMPTS),
        };

        let hosts = ApiHosts {
            api: host(&var, API_URL_VAR, DEFAULT_API_HOST),
            trusthub: host(&var, TRUSTHUB_URL_VAR, DEFAULT_TRUSTHUB_HOST),
            messaging: host(&var, MESSAGING_URL_VAR, DEFAULT_MESSAGING_HOST),
        };

        Ok(Self {
            account_sid: var(ACCOUNT_SID_VAR),
            auth_token: var(AUTH_TOKEN_VAR),
            primary_profile_sid: var(PRIMARY_PROFILE_VAR),
            mock_brands: var(MOCK_VAR).is_some_and(|v| parse_flag(&v)),
            concurrency: parse_var(&var, CONCURRENCY_VAR)?.unwrap_or(DEFAULT_CONCURRENCY),
            api_timeout: Duration::from_secs(
                parse_var(&var, API_TIMEOUT_VAR)?.unwrap_or(DEFAULT_API_TIMEOUT_SECS),
            ),
            timings,
            hosts,
        })
    }

    /// Apply global flags
    pub fn with_overrides(mut self, concurrency: Option<usize>, mock: bool) -> Self {
        if let Some(concurrency) = concurrency {
            self.concurrency = concurrency;
        }
        if mock {
            self.mock_brands = true;
        }
        self
    }

    pub fn credentials(&self) -> Result<Credentials> {
        match (&self.account_sid, &self.auth_token) {
            (Some(sid), Some(token)) => Ok(Credentials::new(sid.clone(), token.clone())),
            _ => Err(CliError::config(format!(
                "{} and {} must both be set",
                ACCOUNT_SID_VAR, AUTH_TOKEN_VAR
            ))),
        }
    }

    /// Fails when no primary customer profile is configured
    pub fn require_primary_profile(&self) -> Result<&str> {
        self.primary_profile_sid
            .as_deref()
            .ok_or_else(|| CliError::config(format!("{} is not set", PRIMARY_PROFILE_VAR)))
    }

    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default()
            .with_timings(self.timings)
            .with_concurrency(self.concurrency)
            .with_mock_brands(self.mock_brands);
        if let Some(primary) = &self.primary_profile_sid {
            config = config.with_primary_profile(primary.clone());
        }
        config
    }

    /// Build the root-account client
    pub fn provider(&self) -> Result<Arc<dyn Provider>> {
        let provider =
            TwilioProvider::new(self.credentials()?, self.hosts.clone(), self.api_timeout)?;
        Ok(Arc::new(provider))
    }
}

fn parse_var<T: FromStr>(var: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>> {
    var(name)
        .map(|value| {
            value
                .parse()
                .map_err(|_| CliError::config(format!("{} has an invalid value '{}'", name, value)))
        })
        .transpose()
}

fn host(var: &impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    var(name)
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "y")
}
