// self
use crate::{
	_prelude::*,
	config::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_TOKEN_EXPIRY_BUFFER, RetryPolicy, TokenCacheConfig},
	error::ConfigError,
	token::ClientSecret,
};

/// Builder for [`TokenCacheConfig`] values.
#[derive(Debug)]
pub struct TokenCacheConfigBuilder {
	/// Base host used to build the token endpoint URL.
	pub application_domain: String,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: ClientSecret,
	/// Optional background refresh interval.
	pub background_refresh_interval: Option<Duration>,
	/// Safety margin subtracted from reported token lifetimes.
	pub token_expiry_buffer: Duration,
	/// Retry policy for 5xx responses.
	pub retry: RetryPolicy,
	/// Per-attempt HTTP timeout.
	pub request_timeout: Duration,
}
impl TokenCacheConfigBuilder {
	/// Creates a new builder seeded with the required credential fields.
	pub fn new(
		application_domain: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<ClientSecret>,
	) -> Self {
		Self {
			application_domain: application_domain.into(),
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			background_refresh_interval: None,
			token_expiry_buffer: DEFAULT_TOKEN_EXPIRY_BUFFER,
			retry: RetryPolicy::default(),
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Enables the background refresh loop with the provided interval.
	pub fn background_refresh_interval(mut self, interval: Duration) -> Self {
		self.background_refresh_interval = Some(interval);

		self
	}

	/// Overrides the expiry buffer (defaults to 60 seconds).
	pub fn token_expiry_buffer(mut self, buffer: Duration) -> Self {
		self.token_expiry_buffer = buffer;

		self
	}

	/// Replaces the whole retry policy.
	pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;

		self
	}

	/// Overrides the number of attempts (defaults to 3).
	pub fn max_attempts(mut self, attempts: u32) -> Self {
		self.retry.max_attempts = attempts;

		self
	}

	/// Overrides the pause between attempts (defaults to 100 milliseconds).
	pub fn retry_delay(mut self, delay: Duration) -> Self {
		self.retry.delay = delay;

		self
	}

	/// Overrides the per-attempt HTTP timeout (defaults to 30 seconds).
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<TokenCacheConfig, ConfigError> {
		let config = TokenCacheConfig {
			application_domain: self.application_domain,
			client_id: self.client_id,
			client_secret: self.client_secret,
			background_refresh_interval: self.background_refresh_interval,
			token_expiry_buffer: self.token_expiry_buffer,
			retry: self.retry,
			request_timeout: self.request_timeout,
		};

		config.validate()?;

		Ok(config)
	}
}
