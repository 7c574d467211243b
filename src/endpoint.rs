//! Transport seam for the token endpoint.
//!
//! [`TokenEndpoint`] is the cache's only dependency on an HTTP stack. Each call resolves to a
//! tagged [`TokenEndpointOutcome`] so the refresh protocol can dispatch on success, client
//! errors, server errors, and transport failures explicitly. [`ReqwestTokenEndpoint`] is the
//! default implementation; tests and custom transports provide their own.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
#[cfg(feature = "reqwest")]
use reqwest::{
	header::{ACCEPT, AUTHORIZATION, HeaderValue},
	redirect::Policy as RedirectPolicy,
};
// self
use crate::{_prelude::*, error::RefreshError, token::TokenResponse};
#[cfg(feature = "reqwest")]
use crate::{config::TokenCacheConfig, error::ConfigError};

/// Boxed future returned by [`TokenEndpoint::request_token`].
pub type TokenEndpointFuture<'a> = Pin<Box<dyn Future<Output = TokenEndpointOutcome> + 'a + Send>>;

/// Performs one `client_credentials` exchange against the token endpoint.
///
/// Implementations must be `Send + Sync + 'static` so a single instance can be shared between
/// foreground callers and the background refresh task. One call maps to exactly one outbound
/// request; retries are the cache's business.
pub trait TokenEndpoint
where
	Self: 'static + Send + Sync,
{
	/// Sends the token request and classifies the result.
	fn request_token(&self) -> TokenEndpointFuture<'_>;
}

/// Classified result of a single token request.
#[derive(Debug)]
pub enum TokenEndpointOutcome {
	/// 2xx with a well-formed token payload.
	Issued(TokenResponse),
	/// 4xx; the credentials or the request are wrong.
	ClientError {
		/// HTTP status code.
		status: u16,
		/// Response body, kept for diagnostics.
		body: String,
	},
	/// 5xx; the server may recover.
	ServerError {
		/// HTTP status code.
		status: u16,
		/// Response body, kept for diagnostics.
		body: String,
	},
	/// Anything else: network failure, timeout, malformed body, unexpected status.
	Failed(RefreshError),
}
impl TokenEndpointOutcome {
	/// Classifies a raw HTTP response.
	pub fn from_response(status: u16, body: &[u8]) -> Self {
		match status {
			200..=299 => match parse_token_response(status, body) {
				Ok(response) => Self::Issued(response),
				Err(e) => Self::Failed(e),
			},
			400..=499 => Self::ClientError { status, body: String::from_utf8_lossy(body).into_owned() },
			500..=599 => Self::ServerError { status, body: String::from_utf8_lossy(body).into_owned() },
			_ => Self::Failed(RefreshError::UnexpectedStatus { status }),
		}
	}

	/// Stable label suitable for span or metric fields.
	pub const fn label(&self) -> &'static str {
		match self {
			Self::Issued(_) => "issued",
			Self::ClientError { .. } => "client_error",
			Self::ServerError { .. } => "server_error",
			Self::Failed(_) => "failed",
		}
	}
}

/// Builds the `Authorization: Basic` value for a client credential pair.
pub fn basic_authorization(client_id: &str, client_secret: &str) -> String {
	format!("Basic {}", STANDARD.encode(format!("{client_id}:{client_secret}")))
}

fn parse_token_response(status: u16, body: &[u8]) -> Result<TokenResponse, RefreshError> {
	let mut de = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| RefreshError::Deserialize { source, status })
}

/// Reqwest-backed [`TokenEndpoint`] that posts `grant_type=client_credentials` with HTTP Basic
/// client authentication.
///
/// Token endpoints answer directly, so redirects are never followed.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestTokenEndpoint {
	client: ReqwestClient,
	url: Url,
	authorization: HeaderValue,
	timeout: std::time::Duration,
}
#[cfg(feature = "reqwest")]
impl ReqwestTokenEndpoint {
	/// Builds the endpoint and its dedicated HTTP client from a validated configuration.
	pub fn from_config(config: &TokenCacheConfig) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(RedirectPolicy::none()).build()?;

		Self::with_client(client, config)
	}

	/// Reuses an existing [`ReqwestClient`]; the credential header and timeout still come from
	/// `config`.
	pub fn with_client(client: ReqwestClient, config: &TokenCacheConfig) -> Result<Self, ConfigError> {
		let url = config.token_endpoint()?;
		let mut authorization = HeaderValue::from_str(&basic_authorization(
			&config.client_id,
			config.client_secret.expose(),
		))
		.map_err(ConfigError::invalid_credential_header)?;

		authorization.set_sensitive(true);

		Ok(Self { client, url, authorization, timeout: config.request_timeout.unsigned_abs() })
	}

	/// Token endpoint URL this instance posts to.
	pub fn url(&self) -> &Url {
		&self.url
	}
}
#[cfg(feature = "reqwest")]
impl TokenEndpoint for ReqwestTokenEndpoint {
	fn request_token(&self) -> TokenEndpointFuture<'_> {
		Box::pin(async move {
			let sent = self
				.client
				.post(self.url.clone())
				.header(AUTHORIZATION, self.authorization.clone())
				.header(ACCEPT, HeaderValue::from_static("application/json"))
				.timeout(self.timeout)
				.form(&[("grant_type", "client_credentials")])
				.send()
				.await;
			let response = match sent {
				Ok(response) => response,
				Err(e) => return TokenEndpointOutcome::Failed(e.into()),
			};
			let status = response.status().as_u16();

			match response.bytes().await {
				Ok(body) => TokenEndpointOutcome::from_response(status, &body),
				Err(e) => TokenEndpointOutcome::Failed(e.into()),
			}
		})
	}
}
#[cfg(feature = "reqwest")]
impl Debug for ReqwestTokenEndpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ReqwestTokenEndpoint")
			.field("url", &self.url.as_str())
			.field("timeout", &self.timeout)
			.finish()
	}
}
