use std::time::Duration;

use anyhow::Context;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://student-performance-api-7xmi.onrender.com";

/// Connection settings for the analytics service.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub base_url: Url,
    /// `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
    pub color: bool,
}

impl DashboardConfig {
    pub fn new(base_url: &str, timeout_secs: Option<u64>, color: bool) -> anyhow::Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(trimmed)
            .with_context(|| format!("invalid analytics base url: {base_url}"))?;

        if base_url.cannot_be_a_base() {
            anyhow::bail!("analytics base url cannot carry paths: {base_url}");
        }

        Ok(Self {
            base_url,
            timeout: timeout_secs.map(Duration::from_secs),
            color,
        })
    }
}
