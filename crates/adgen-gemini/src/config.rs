//! Gemini configuration

use adgen_core::{Backoff, Error, PollPolicy, Result};
use serde::Serialize;
use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";
/// Ceiling for growing poll delays unless `ADGEN_POLL_MAX_DELAY_SECS` is set
pub const DEFAULT_POLL_MAX_DELAY: Duration = Duration::from_secs(60);

/// Configuration for the Gemini client
#[derive(Clone, Serialize)]
pub struct GeminiConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub api_url: String,
    pub analysis_model: String,
    pub image_model: String,
    pub video_model: String,
    pub poll: PollPolicy,
    /// Per-request HTTP timeout; zero turns it off
    pub request_timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("analysis_model", &self.analysis_model)
            .field("image_model", &self.image_model)
            .field("video_model", &self.video_model)
            .field("poll", &self.poll)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            analysis_model: DEFAULT_ANALYSIS_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            poll: PollPolicy::default(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl GeminiConfig {
    /// Create configuration from environment variables.
    ///
    /// A missing API key is not an error here; every gateway call fails with
    /// an authentication error until one is provided.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let api_key = var("GEMINI_API_KEY").or_else(|| var("API_KEY"));

        let mut poll = defaults.poll;
        if let Some(secs) = parse_u64(&var, "ADGEN_POLL_INTERVAL_SECS")? {
            poll.interval = Duration::from_secs(secs);
        }
        if let Some(attempts) = parse_u64(&var, "ADGEN_POLL_MAX_ATTEMPTS")? {
            poll.max_attempts = u32::try_from(attempts).map_err(|_| {
                Error::Configuration(format!("ADGEN_POLL_MAX_ATTEMPTS out of range: {}", attempts))
            })?;
        }

        let max_delay = parse_u64(&var, "ADGEN_POLL_MAX_DELAY_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_MAX_DELAY);
        if let Some(name) = var("ADGEN_POLL_BACKOFF") {
            poll.backoff = parse_backoff(&name, poll.interval, max_delay)?;
        }

        let request_timeout = parse_u64(&var, "ADGEN_HTTP_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        Ok(Self {
            api_key,
            api_url: var("GEMINI_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            analysis_model: var("GEMINI_ANALYSIS_MODEL").unwrap_or(defaults.analysis_model),
            image_model: var("GEMINI_IMAGE_MODEL").unwrap_or(defaults.image_model),
            video_model: var("GEMINI_VIDEO_MODEL").unwrap_or(defaults.video_model),
            poll,
            request_timeout,
        })
    }

    /// Create configuration with an explicit key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Point the client at another base URL (used for tests and proxies)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }
}

/// `fixed`, `linear` (grows by the interval) or `exponential` (doubles)
fn parse_backoff(name: &str, interval: Duration, max: Duration) -> Result<Backoff> {
    match name.trim().to_lowercase().as_str() {
        "fixed" => Ok(Backoff::Fixed),
        "linear" => Ok(Backoff::Linear {
            step: interval,
            max,
        }),
        "exponential" => Ok(Backoff::Exponential { factor: 2.0, max }),
        other => Err(Error::Configuration(format!(
            "ADGEN_POLL_BACKOFF must be fixed, linear or exponential, got '{}'",
            other
        ))),
    }
}

fn parse_u64<F>(var: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| Error::Configuration(format!("{} must be a whole number, got '{}'", key, raw))),
        None => Ok(None),
    }
}
