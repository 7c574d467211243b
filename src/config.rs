//! Credential configuration and refresh policy for a [`TokenCache`](crate::cache::TokenCache).
//!
//! Values are validated once, either through [`TokenCacheConfigBuilder::build`] or while
//! deserializing a [`TokenCacheSettings`] document, and are immutable afterwards.

mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError, token::ClientSecret};

/// Path of the token endpoint relative to the application domain.
pub const TOKEN_ENDPOINT_PATH: &str = "/api/v1/oauth2/token";
/// Smallest accepted background refresh interval.
pub const MIN_BACKGROUND_REFRESH_INTERVAL: Duration = Duration::minutes(1);
/// Default buffer subtracted from reported token lifetimes.
pub const DEFAULT_TOKEN_EXPIRY_BUFFER: Duration = Duration::seconds(60);
/// Default per-attempt HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(30);

/// Bounded retry policy applied to 5xx token endpoint responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Total attempts, including the first one.
	pub max_attempts: u32,
	/// Pause between attempts.
	pub delay: Duration,
}
impl RetryPolicy {
	/// Default number of attempts.
	pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
	/// Default pause between attempts.
	pub const DEFAULT_DELAY: Duration = Duration::milliseconds(100);

	fn validate(&self) -> Result<(), ConfigError> {
		if self.max_attempts == 0 {
			return Err(ConfigError::ZeroAttempts);
		}
		if self.delay.is_negative() {
			return Err(ConfigError::NegativeRetryDelay { delay: self.delay });
		}

		Ok(())
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self { max_attempts: Self::DEFAULT_MAX_ATTEMPTS, delay: Self::DEFAULT_DELAY }
	}
}

/// Validated configuration for one client credential pair.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "TokenCacheSettings")]
pub struct TokenCacheConfig {
	/// Base host used to build the token endpoint URL.
	pub application_domain: String,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: ClientSecret,
	/// Interval of the background refresh loop; `None` disables it.
	pub background_refresh_interval: Option<Duration>,
	/// Safety margin subtracted from reported token lifetimes.
	pub token_expiry_buffer: Duration,
	/// Retry policy for 5xx responses.
	pub retry: RetryPolicy,
	/// Per-attempt HTTP timeout.
	pub request_timeout: Duration,
}
impl TokenCacheConfig {
	/// Returns a builder seeded with the required credential fields.
	pub fn builder(
		application_domain: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<ClientSecret>,
	) -> TokenCacheConfigBuilder {
		TokenCacheConfigBuilder::new(application_domain, client_id, client_secret)
	}

	/// Resolves the token endpoint URL.
	///
	/// A domain without a scheme is served over HTTPS; a domain that already names a scheme
	/// (for example `http://127.0.0.1:8080`) is used as the base unchanged.
	pub fn token_endpoint(&self) -> Result<Url, ConfigError> {
		let domain = self.application_domain.trim().trim_end_matches('/');
		let raw = if domain.contains("://") {
			format!("{domain}{TOKEN_ENDPOINT_PATH}")
		} else {
			format!("https://{domain}{TOKEN_ENDPOINT_PATH}")
		};

		Url::parse(&raw).map_err(|source| ConfigError::InvalidDomain {
			domain: self.application_domain.clone(),
			source,
		})
	}

	/// Checks every construction invariant.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.application_domain.trim().is_empty() {
			return Err(ConfigError::MissingField { field: "application_domain" });
		}
		if self.client_id.is_empty() {
			return Err(ConfigError::MissingField { field: "client_id" });
		}
		if self.client_secret.is_empty() {
			return Err(ConfigError::MissingField { field: "client_secret" });
		}
		match self.background_refresh_interval {
			Some(interval) if interval < MIN_BACKGROUND_REFRESH_INTERVAL =>
				return Err(ConfigError::BackgroundIntervalTooShort {
					interval,
					minimum: MIN_BACKGROUND_REFRESH_INTERVAL,
				}),
			_ => {},
		}
		if self.token_expiry_buffer.is_negative() {
			return Err(ConfigError::NegativeExpiryBuffer { buffer: self.token_expiry_buffer });
		}
		if !self.request_timeout.is_positive() {
			return Err(ConfigError::NonPositiveTimeout { timeout: self.request_timeout });
		}

		self.retry.validate()?;
		self.token_endpoint()?;

		Ok(())
	}
}

/// Raw, serde-friendly settings document.
///
/// Durations are plain integers so the document can come from files or environment layers;
/// conversion into [`TokenCacheConfig`] runs the same validation as the builder.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenCacheSettings {
	/// See [`TokenCacheConfig::application_domain`].
	#[serde(alias = "applicationDomain")]
	pub application_domain: String,
	/// See [`TokenCacheConfig::client_id`].
	#[serde(alias = "clientId")]
	pub client_id: String,
	/// See [`TokenCacheConfig::client_secret`].
	#[serde(alias = "clientSecret")]
	pub client_secret: ClientSecret,
	/// Background refresh interval in seconds.
	#[serde(alias = "backgroundRefreshIntervalSecs")]
	pub background_refresh_interval_secs: Option<i64>,
	/// Token expiry buffer in seconds.
	#[serde(alias = "tokenExpiryBufferSecs")]
	pub token_expiry_buffer_secs: Option<i64>,
	/// Maximum refresh attempts.
	#[serde(alias = "maxAttempts")]
	pub max_attempts: Option<u32>,
	/// Delay between attempts in milliseconds.
	#[serde(alias = "retryDelayMs")]
	pub retry_delay_ms: Option<i64>,
	/// Per-attempt HTTP timeout in seconds.
	#[serde(alias = "requestTimeoutSecs")]
	pub request_timeout_secs: Option<i64>,
}
impl TryFrom<TokenCacheSettings> for TokenCacheConfig {
	type Error = ConfigError;

	fn try_from(settings: TokenCacheSettings) -> Result<Self, Self::Error> {
		let mut builder = TokenCacheConfigBuilder::new(
			settings.application_domain,
			settings.client_id,
			settings.client_secret,
		);

		if let Some(secs) = settings.background_refresh_interval_secs {
			builder = builder.background_refresh_interval(Duration::seconds(secs));
		}
		if let Some(secs) = settings.token_expiry_buffer_secs {
			builder = builder.token_expiry_buffer(Duration::seconds(secs));
		}
		if let Some(attempts) = settings.max_attempts {
			builder = builder.max_attempts(attempts);
		}
		if let Some(ms) = settings.retry_delay_ms {
			builder = builder.retry_delay(Duration::milliseconds(ms));
		}
		if let Some(secs) = settings.request_timeout_secs {
			builder = builder.request_timeout(Duration::seconds(secs));
		}

		builder.build()
	}
}
