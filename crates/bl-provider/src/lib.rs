//! External history provider integration for the block audit log.
//!
//! Talks to a higher-privilege logging service over HTTP:
//! - A capability probe at startup decides whether the provider takes over block recording
//! - Per-coordinate history lookups feed history output and explosion attribution
//!
//! The probe runs once. If it fails, or the provider is disabled or too old, the
//! recorder falls back to the local store for the rest of the process lifetime.

use std::fmt;
use std::time::Duration;

use bl_core::BlockPos;
use bl_core::classify::SYNTHETIC_PREFIX;
use serde::Deserialize;
use thiserror::Error;

/// Default request timeout for provider calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Oldest provider API version the lookup protocol is known to work against.
pub const MIN_API_VERSION: u32 = 6;

const BREAK_ACTION: u8 = 0;
const PLACEMENT_ACTION: u8 = 1;

/// Provider client errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provided base URL was invalid.
    #[error("invalid base URL: {reason}")]
    InvalidBaseUrl { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Provider returned an error response.
    #[error("provider error: {message}")]
    Api { message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// What the provider reports about itself during the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Capabilities {
    pub enabled: bool,
    pub api_version: u32,
}

/// A history record as the provider returns it, newest first.
///
/// `time` is epoch seconds. `actor` is a participant name or a `#`-prefixed
/// synthetic marker such as `#explosion`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawRecord {
    pub time: i64,
    pub actor: String,
    pub block: String,
    pub action_id: u8,
}

impl RawRecord {
    /// Display label for the record's action code.
    ///
    /// Unknown codes render as `Change`; the provider adds codes faster than this
    /// client learns them.
    #[must_use]
    pub const fn action_label(&self) -> &'static str {
        match self.action_id {
            0 => "Broke",
            1 => "Place",
            _ => "Change",
        }
    }

    /// Whether the record's actor is a synthetic marker rather than a participant.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.actor.starts_with(SYNTHETIC_PREFIX)
    }

    /// Whether the record is an explosion-caused break.
    ///
    /// Gated on the break action id: synthetic actors also appear on routine
    /// placement records (`#gravity` sand), which keep their ordinary labels.
    #[must_use]
    pub fn is_explosion(&self) -> bool {
        self.action_id == BREAK_ACTION && self.is_synthetic()
    }

    #[must_use]
    pub const fn is_placement(&self) -> bool {
        self.action_id == PLACEMENT_ACTION
    }
}

/// Low-level provider transport.
///
/// Object-safe so tests can substitute a fake. [`Client`] is the HTTP implementation.
pub trait ProviderApi {
    /// Fetches the provider's self-reported capabilities.
    fn capabilities(&self) -> Result<Capabilities, ProviderError>;

    /// Fetches history records for a position, newest first, at most `limit` rows.
    fn block_history(&self, pos: &BlockPos, limit: u32) -> Result<Vec<RawRecord>, ProviderError>;
}

/// HTTP provider client.
#[derive(Debug)]
pub struct Client {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl Client {
    /// Creates a new client against the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty or not an HTTP URL, or if the
    /// HTTP client fails to build.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let base_url = base_url.into();

        // Validate base URL
        if base_url.trim().is_empty() {
            return Err(ProviderError::InvalidBaseUrl {
                reason: "base URL cannot be empty",
            });
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ProviderError::InvalidBaseUrl {
                reason: "base URL must start with http:// or https://",
            });
        }
        let base_url = base_url.trim_end_matches('/').to_string();

        // Build HTTP client with timeout
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProviderError::ClientBuild)?;

        Ok(Self { http, base_url })
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<T, ProviderError> {
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ProviderError::Api {
                message: format!("status {status}: {body}"),
            });
        }
        serde_json::from_str(&body).map_err(|err| ProviderError::InvalidResponse(err.to_string()))
    }
}

impl ProviderApi for Client {
    fn capabilities(&self) -> Result<Capabilities, ProviderError> {
        let url = format!("{}/v1/capabilities", self.base_url);
        self.get_json(self.http.get(url))
    }

    fn block_history(&self, pos: &BlockPos, limit: u32) -> Result<Vec<RawRecord>, ProviderError> {
        let url = format!("{}/v1/block-history", self.base_url);
        let request = self
            .http
            .get(url)
            .query(&[("world", pos.world.as_str())])
            .query(&[("x", pos.x), ("y", pos.y), ("z", pos.z)])
            .query(&[("limit", limit)]);
        self.get_json(request)
    }
}

/// A probed, usable provider.
///
/// Only [`Provider::probe`] constructs this, so holding one is proof the provider
/// answered the probe, is enabled, and speaks a supported API version.
pub struct Provider {
    api: Box<dyn ProviderApi + Send>,
    api_version: u32,
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl Provider {
    /// Probes the provider once and returns a handle if it is usable.
    ///
    /// Returns `None` when the probe fails, the provider is disabled, or its API
    /// version predates [`MIN_API_VERSION`].
    pub fn probe(api: Box<dyn ProviderApi + Send>) -> Option<Self> {
        let caps = match api.capabilities() {
            Ok(caps) => caps,
            Err(err) => {
                tracing::warn!(error = %err, "provider probe failed");
                return None;
            }
        };
        if !caps.enabled {
            tracing::info!("provider reports disabled");
            return None;
        }
        if caps.api_version < MIN_API_VERSION {
            tracing::warn!(
                api_version = caps.api_version,
                min_api_version = MIN_API_VERSION,
                "provider API version too old"
            );
            return None;
        }
        tracing::info!(api_version = caps.api_version, "provider active");
        Some(Self {
            api,
            api_version: caps.api_version,
        })
    }

    #[must_use]
    pub const fn api_version(&self) -> u32 {
        self.api_version
    }

    /// Fetches history records for a position, newest first.
    pub fn lookup(&self, pos: &BlockPos, limit: u32) -> Result<Vec<RawRecord>, ProviderError> {
        self.api.block_history(pos, limit)
    }
}

/// Most recent participant placement in a newest-first record list.
///
/// Synthetic actors are skipped; an explosion cannot have placed the charge that
/// set it off.
#[must_use]
pub fn latest_placer(records: &[RawRecord]) -> Option<&str> {
    records
        .iter()
        .find(|record| record.is_placement() && !record.is_synthetic())
        .map(|record| record.actor.as_str())
}
