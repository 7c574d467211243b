//! Demonstrates plugging a custom [`TokenEndpoint`] into the cache.
//!
//! 1. Implement [`TokenEndpoint`] and classify each answer into a [`TokenEndpointOutcome`].
//! 2. Pass the transport to [`TokenCache::with_endpoint`].
//! 3. Inspect the error taxonomy to decide between failing fast and retrying later.

// std
use std::sync::atomic::{AtomicU32, Ordering};
// crates.io
use color_eyre::Result;
// self
use m2m_token_cache::{
	cache::TokenCache,
	config::TokenCacheConfig,
	endpoint::{TokenEndpoint, TokenEndpointFuture, TokenEndpointOutcome},
};

/// Fails with 503 a configurable number of times before issuing a token.
struct FlakyEndpoint {
	failures_left: AtomicU32,
}
impl TokenEndpoint for FlakyEndpoint {
	fn request_token(&self) -> TokenEndpointFuture<'_> {
		Box::pin(async move {
			let left = self.failures_left.load(Ordering::SeqCst);

			if left > 0 {
				self.failures_left.store(left - 1, Ordering::SeqCst);

				return TokenEndpointOutcome::from_response(503, b"maintenance");
			}

			TokenEndpointOutcome::from_response(
				200,
				b"{\"access_token\":\"flaky-but-fine\",\"expires_in\":3600}",
			)
		})
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = TokenCacheConfig::builder("auth.example.com", "demo-client", "demo-secret").build()?;
	let recovering = <TokenCache<FlakyEndpoint>>::with_endpoint(
		config.clone(),
		FlakyEndpoint { failures_left: AtomicU32::new(2) },
	)?;
	let token = recovering.get_token().await?;

	println!(
		"Recovered after {} retries: {}.",
		recovering.metrics().retries(),
		token.expose()
	);

	let down = <TokenCache<FlakyEndpoint>>::with_endpoint(
		config,
		FlakyEndpoint { failures_left: AtomicU32::new(u32::MAX) },
	)?;

	match down.get_token().await {
		Ok(_) => println!("Unexpected success."),
		Err(e) if e.is_transient() => println!("Service unavailable, try again later: {e}"),
		Err(e) => println!("Giving up: {e}"),
	}

	Ok(())
}
