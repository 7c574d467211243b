//! Demonstrates the reqwest-backed cache against a mock token endpoint: the first call fetches a
//! token, later calls reuse it, and a downstream 401 forces exactly one refetch.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use tracing_subscriber::EnvFilter;
// self
use m2m_token_cache::{cache::TokenCache, config::TokenCacheConfig};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
		)
		.init();

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/oauth2/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let config = TokenCacheConfig::builder(server.base_url(), "demo-client", "super-secret")
		.background_refresh_interval(time::Duration::minutes(5))
		.build()?;
	let cache = TokenCache::new(config)?;
	let token = cache.get_token().await?;

	println!("Authorization: {}", token.bearer());

	for _ in 0..3 {
		cache.get_token().await?;
	}

	token_mock.assert_calls_async(1).await;

	// The downstream API rejected the token; the next call fetches a new one.
	cache.clear_on_unauthorized(401);
	cache.get_token().await?;

	token_mock.assert_calls_async(2).await;

	println!(
		"Endpoint calls: {}, cache valid until {:?}.",
		cache.metrics().endpoint_calls(),
		cache.expires_at()
	);

	cache.shutdown().await;

	Ok(())
}
