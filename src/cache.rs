//! Client-credentials token cache with single-flight refreshes and bounded retries.
//!
//! [`TokenCache::get_token`] serves the cached token without any synchronization beyond one
//! read lock while it is valid. Once it is missing or expired, callers enter the refresh
//! protocol: they double-check the cache, queue on an async gate that admits one holder, check
//! again, and only the holder contacts the token endpoint. Callers that queued behind a
//! successful refresh pick up its result without touching the network.
//!
//! A caller that queued behind a *failed* refresh does not inherit that failure. Once the gate
//! frees up it re-checks the cache and performs its own attempt.

pub mod background;

mod metrics;

pub use background::BackgroundState;
pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	cache::background::BackgroundTask,
	config::TokenCacheConfig,
	endpoint::{TokenEndpoint, TokenEndpointOutcome},
	obs::{self, RefreshOutcome, RefreshSpan, RefreshTrigger},
	token::{AccessToken, CachedToken, TokenResponse},
};
#[cfg(feature = "reqwest")] use crate::endpoint::ReqwestTokenEndpoint;

#[cfg(feature = "reqwest")]
/// Cache specialized for the crate's default reqwest transport.
pub type ReqwestTokenCache = TokenCache<ReqwestTokenEndpoint>;

/// In-memory cache for one client credential pair.
///
/// Share it behind an [`Arc`]; every method takes `&self`. Call [`TokenCache::shutdown`] to
/// stop the background loop and wait for it. Dropping the cache only signals the loop.
pub struct TokenCache<E>
where
	E: ?Sized + TokenEndpoint,
{
	shared: Arc<Shared<E>>,
	background: Mutex<Option<BackgroundTask>>,
}
#[cfg(feature = "reqwest")]
impl TokenCache<ReqwestTokenEndpoint> {
	/// Validates `config`, builds the reqwest transport, and starts the background loop when an
	/// interval is configured.
	///
	/// Starting the loop requires a running Tokio runtime.
	pub fn new(config: TokenCacheConfig) -> Result<Self> {
		config.validate()?;

		let endpoint = ReqwestTokenEndpoint::from_config(&config)?;

		Self::with_endpoint(config, endpoint)
	}
}
impl<E> TokenCache<E>
where
	E: ?Sized + TokenEndpoint,
{
	/// Creates a cache that talks to the token endpoint through `endpoint`.
	pub fn with_endpoint(config: TokenCacheConfig, endpoint: impl Into<Arc<E>>) -> Result<Self> {
		config.validate()?;

		let interval = config.background_refresh_interval;
		let shared = Arc::new(Shared {
			config,
			endpoint: endpoint.into(),
			state: RwLock::new(None),
			gate: AsyncMutex::new(()),
			metrics: RefreshMetrics::default(),
			background_state: Mutex::new(BackgroundState::Disabled),
		});
		let background = match interval {
			Some(interval) => Some(BackgroundTask::spawn(shared.clone(), interval)?),
			None => None,
		};

		Ok(Self { shared, background: Mutex::new(background) })
	}

	/// Returns a valid bearer token, refreshing it first when needed.
	pub async fn get_token(&self) -> Result<AccessToken> {
		if let Some(token) = self.shared.valid_token(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		self.shared.refresh(RefreshTrigger::Foreground).await
	}

	/// Runs the refresh protocol now. Returns the cached token untouched while it is valid.
	pub async fn refresh(&self) -> Result<AccessToken> {
		self.shared.refresh(RefreshTrigger::Foreground).await
	}

	/// Forgets the cached token so the next [`TokenCache::get_token`] fetches a new one.
	///
	/// Call this after a downstream service answered 401 for a token the cache still considered
	/// valid.
	pub fn clear_token(&self) {
		*self.shared.state.write() = None;

		obs::token_cleared();
	}

	/// Clears the cached token when `status` is 401 and reports whether it did.
	pub fn clear_on_unauthorized(&self, status: u16) -> bool {
		if status == 401 {
			self.clear_token();

			true
		} else {
			false
		}
	}

	/// Snapshot of the cached token/expiry pair.
	pub fn cached_token(&self) -> Option<CachedToken> {
		self.shared.state.read().clone()
	}

	/// Buffered expiry of the cached token, if any.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.shared.state.read().as_ref().map(|cached| cached.expires_at)
	}

	/// Configuration the cache was built from.
	pub fn config(&self) -> &TokenCacheConfig {
		&self.shared.config
	}

	/// Transport used for token requests.
	pub fn endpoint(&self) -> &E {
		&self.shared.endpoint
	}

	/// Refresh counters.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.shared.metrics
	}

	/// Current state of the background refresh loop.
	pub fn background_state(&self) -> BackgroundState {
		*self.shared.background_state.lock()
	}

	/// Cancels the background loop and waits until it has exited. Idempotent.
	pub async fn shutdown(&self) {
		let task = self.background.lock().take();

		if let Some(task) = task {
			task.shutdown().await;
		}
	}
}
impl<E> Drop for TokenCache<E>
where
	E: ?Sized + TokenEndpoint,
{
	fn drop(&mut self) {
		if let Some(task) = self.background.get_mut().as_ref() {
			task.cancel();
		}
	}
}
impl<E> Debug for TokenCache<E>
where
	E: ?Sized + TokenEndpoint,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("client_id", &self.shared.config.client_id)
			.field("expires_at", &self.expires_at())
			.field("background", &self.background_state())
			.finish()
	}
}

/// State shared between callers and the background task.
pub(crate) struct Shared<E>
where
	E: ?Sized + TokenEndpoint,
{
	config: TokenCacheConfig,
	endpoint: Arc<E>,
	state: RwLock<Option<CachedToken>>,
	gate: AsyncMutex<()>,
	metrics: RefreshMetrics,
	background_state: Mutex<BackgroundState>,
}
impl<E> Shared<E>
where
	E: ?Sized + TokenEndpoint,
{
	pub(crate) async fn refresh(&self, trigger: RefreshTrigger) -> Result<AccessToken> {
		let span = RefreshSpan::new(trigger, "refresh");

		obs::record_refresh_outcome(trigger, RefreshOutcome::Attempt);
		self.metrics.record_attempt();

		let result = span.instrument(self.refresh_with_retries()).await;

		match &result {
			Ok(_) => {
				self.metrics.record_success();
				obs::record_refresh_outcome(trigger, RefreshOutcome::Success);
			},
			Err(e) => {
				self.metrics.record_failure();
				obs::record_refresh_outcome(trigger, RefreshOutcome::Failure);
				obs::refresh_failed(e);
			},
		}

		result
	}

	pub(crate) fn set_background_state(&self, state: BackgroundState) {
		*self.background_state.lock() = state;
	}

	fn valid_token(&self, now: OffsetDateTime) -> Option<AccessToken> {
		self.state.read().as_ref().filter(|cached| cached.is_valid_at(now)).map(|c| c.token.clone())
	}

	async fn refresh_with_retries(&self) -> Result<AccessToken> {
		let policy = self.config.retry;
		let mut attempt = 1;

		loop {
			if let Some(token) = self.valid_token(OffsetDateTime::now_utc()) {
				return Ok(token);
			}

			let gate = self.gate.lock().await;

			// Another caller may have refreshed while this one was queued.
			if let Some(token) = self.valid_token(OffsetDateTime::now_utc()) {
				return Ok(token);
			}

			self.metrics.record_endpoint_call();

			match self.endpoint.request_token().await {
				TokenEndpointOutcome::Issued(response) => return self.install(response),
				TokenEndpointOutcome::ClientError { status, body } =>
					return Err(Error::AuthClient { status, body }),
				TokenEndpointOutcome::ServerError { status, .. } => {
					drop(gate);

					if attempt >= policy.max_attempts {
						return Err(Error::RefreshExhausted { attempts: attempt, status });
					}

					obs::retry_scheduled(attempt, policy.max_attempts, status, policy.delay);
					self.metrics.record_retry();
					tokio::time::sleep(policy.delay.unsigned_abs()).await;

					attempt += 1;
				},
				TokenEndpointOutcome::Failed(e) => return Err(e.into()),
			}
		}
	}

	fn install(&self, response: TokenResponse) -> Result<AccessToken> {
		let now = OffsetDateTime::now_utc();
		let cached = CachedToken::from_response(
			response.access_token,
			response.expires_in,
			self.config.token_expiry_buffer,
			now,
		)?;
		let token = cached.token.clone();

		obs::token_installed(cached.remaining_at(now));

		*self.state.write() = Some(cached);

		Ok(token)
	}
}
