//! Engine configuration
//!
//! Built by the CLI from environment and flags. Tests use
//! [`Timings::immediate`] so the fixed delays and poll interval cost nothing.

use std::time::Duration;

// ============================================================================
// Defaults
// ============================================================================

/// Pause before each customer profile entity assignment
pub const DEFAULT_PROFILE_ASSIGNMENT_DELAY: Duration = Duration::from_secs(2);

/// Pause before the trust bundle entity assignments
pub const DEFAULT_TRUST_ASSIGNMENT_DELAY: Duration = Duration::from_secs(1);

/// Wait between brand status fetches
pub const DEFAULT_BRAND_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Total brand status fetches before the last observed status is accepted
pub const DEFAULT_BRAND_POLL_ATTEMPTS: u32 = 11;

/// Rows processed at once
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Fixed waits used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub profile_assignment_delay: Duration,
    pub trust_assignment_delay: Duration,
    pub brand_poll_interval: Duration,
    pub brand_poll_attempts: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            profile_assignment_delay: DEFAULT_PROFILE_ASSIGNMENT_DELAY,
            trust_assignment_delay: DEFAULT_TRUST_ASSIGNMENT_DELAY,
            brand_poll_interval: DEFAULT_BRAND_POLL_INTERVAL,
            brand_poll_attempts: DEFAULT_BRAND_POLL_ATTEMPTS,
        }
    }
}

impl Timings {
    /// No waiting at all; the attempt cap is kept
    pub fn immediate() -> Self {
        Self {
            profile_assignment_delay: Duration::ZERO,
            trust_assignment_delay: Duration::ZERO,
            brand_poll_interval: Duration::ZERO,
            brand_poll_attempts: DEFAULT_BRAND_POLL_ATTEMPTS,
        }
    }
}

/// Settings shared by every pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Primary customer profile assigned to each secondary profile
    pub primary_profile_sid: Option<String>,
    /// Create brands in mock mode (no vetting, no charge)
    pub mock_brands: bool,
    pub timings: Timings,
    pub concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            primary_profile_sid: None,
            mock_brands: false,
            timings: Timings::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl EngineConfig {
    pub fn with_primary_profile(mut self, sid: impl Into<String>) -> Self {
        self.primary_profile_sid = Some(sid.into());
        self
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_mock_brands(mut self, mock: bool) -> Self {
        self.mock_brands = mock;
        self
    }
}
