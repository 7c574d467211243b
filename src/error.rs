//! Cache-level error types shared across configuration, transport, and refresh paths.

// self
use crate::_prelude::*;

/// Cache-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical cache error exposed by public APIs.
///
/// The variants separate "your credentials are wrong" ([`Error::AuthClient`]) from "the
/// service is temporarily unavailable" ([`Error::RefreshExhausted`]) from everything else
/// ([`Error::Refresh`]), so callers can decide between failing fast and retrying later.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem detected while constructing the cache.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Refresh failed for a non-retryable reason (network, timeout, malformed body).
	#[error(transparent)]
	Refresh(#[from] RefreshError),

	/// Token endpoint rejected the request with a 4xx status.
	#[error("Token endpoint rejected the client credentials with HTTP {status}.")]
	AuthClient {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Response body, kept for diagnostics.
		body: String,
	},
	/// Token endpoint answered with a 5xx status on every attempt.
	#[error("Token endpoint kept failing after {attempts} attempts (last HTTP {status}).")]
	RefreshExhausted {
		/// Number of attempts performed.
		attempts: u32,
		/// HTTP status code of the final attempt.
		status: u16,
	},
}
impl Error {
	/// Whether the failure stems from rejected credentials or a malformed request.
	pub fn is_client_error(&self) -> bool {
		matches!(self, Self::AuthClient { .. })
	}

	/// Whether retrying later has a reasonable chance of succeeding.
	pub fn is_transient(&self) -> bool {
		match self {
			Self::RefreshExhausted { .. } => true,
			Self::Refresh(e) => e.is_transient(),
			Self::Config(_) | Self::AuthClient { .. } => false,
		}
	}
}

/// Configuration and validation failures raised while building the cache.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required setting is missing or empty.
	#[error("The `{field}` setting is required and must not be empty.")]
	MissingField {
		/// Setting name.
		field: &'static str,
	},
	/// Background refresh interval is shorter than the supported minimum.
	#[error("Background refresh interval must be at least {minimum}, got {interval}.")]
	BackgroundIntervalTooShort {
		/// Interval that was supplied.
		interval: Duration,
		/// Smallest accepted interval.
		minimum: Duration,
	},
	/// Token expiry buffer is negative.
	#[error("Token expiry buffer must not be negative, got {buffer}.")]
	NegativeExpiryBuffer {
		/// Buffer that was supplied.
		buffer: Duration,
	},
	/// Retry policy allows no attempt at all.
	#[error("Retry policy must allow at least one attempt.")]
	ZeroAttempts,
	/// Retry delay is negative.
	#[error("Retry delay must not be negative, got {delay}.")]
	NegativeRetryDelay {
		/// Delay that was supplied.
		delay: Duration,
	},
	/// Request timeout is zero or negative.
	#[error("Request timeout must be positive, got {timeout}.")]
	NonPositiveTimeout {
		/// Timeout that was supplied.
		timeout: Duration,
	},
	/// Application domain cannot be turned into a token endpoint URL.
	#[error("Application domain `{domain}` does not form a valid URL.")]
	InvalidDomain {
		/// Domain value that failed to parse.
		domain: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Client credentials cannot be encoded into an HTTP header.
	#[error("Client credentials cannot be encoded as an HTTP header.")]
	InvalidCredentialHeader {
		/// Underlying header validation failure.
		#[source]
		source: BoxError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Background refresh was requested outside of a Tokio runtime.
	#[error("Background refresh requires a running Tokio runtime.")]
	NoRuntime,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Wraps a header encoding failure inside [`ConfigError`].
	pub fn invalid_credential_header(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::InvalidCredentialHeader { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Non-retryable refresh failures.
#[derive(Debug, ThisError)]
pub enum RefreshError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Transport {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request did not complete within the configured timeout.
	#[error("Token endpoint did not answer within the request timeout.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Token endpoint responded with a body that is not a token response.
	#[error("Token endpoint returned a malformed token response.")]
	Deserialize {
		/// Structured parsing failure, including the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Token endpoint returned an empty `access_token`.
	#[error("Token endpoint returned an empty access token.")]
	EmptyAccessToken,
	/// Token endpoint returned an `expires_in` beyond the representable range.
	#[error("The expires_in value {expires_in} exceeds the supported range.")]
	ExpiresInOutOfRange {
		/// Raw lifetime in seconds.
		expires_in: i64,
	},
	/// Token endpoint returned a status outside the success/client/server classes.
	#[error("Token endpoint returned unexpected HTTP {status}.")]
	UnexpectedStatus {
		/// HTTP status code returned by the token endpoint.
		status: u16,
	},
}
impl RefreshError {
	/// Wraps a transport-specific network error.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Whether the failure is likely to clear on its own.
	pub fn is_transient(&self) -> bool {
		matches!(self, Self::Transport { .. } | Self::Timeout { .. })
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for RefreshError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::transport(e) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn classification_helpers_split_the_taxonomy() {
		let client = Error::AuthClient { status: 401, body: String::new() };
		let exhausted = Error::RefreshExhausted { attempts: 3, status: 503 };
		let empty = Error::from(RefreshError::EmptyAccessToken);
		let config = Error::from(ConfigError::ZeroAttempts);

		assert!(client.is_client_error());
		assert!(!client.is_transient());
		assert!(exhausted.is_transient());
		assert!(!exhausted.is_client_error());
		assert!(!empty.is_transient());
		assert!(!config.is_transient());
	}

	#[test]
	fn messages_name_the_status() {
		let err = Error::RefreshExhausted { attempts: 3, status: 502 };

		assert_eq!(err.to_string(), "Token endpoint kept failing after 3 attempts (last HTTP 502).");
	}
}
