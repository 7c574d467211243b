mod common;

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use time::Duration;
// self
use common::*;
use m2m_token_cache::{
	cache::TokenCache,
	error::{Error, RefreshError},
};

const TOKEN_PATH: &str = "/api/v1/oauth2/token";
// base64("svc-client:svc-secret")
const BASIC: &str = "Basic c3ZjLWNsaWVudDpzdmMtc2VjcmV0";

fn http_cache(server: &MockServer) -> TokenCache<m2m_token_cache::endpoint::ReqwestTokenEndpoint> {
	let config = builder(&server.base_url()).build().expect("HTTP test config should build.");

	TokenCache::new(config).expect("HTTP test cache should build.")
}

#[tokio::test]
async fn posts_client_credentials_with_basic_auth() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("authorization", BASIC)
				.header("accept", "application/json")
				.header("content-type", "application/x-www-form-urlencoded")
				.body("grant_type=client_credentials");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"http-token\",\"token_type\":\"bearer\",\"expires_in\":3600}");
		})
		.await;
	let cache = http_cache(&server);
	let token = cache.get_token().await.expect("Token request should succeed.");

	assert_eq!(token.expose(), "http-token");
	assert_eq!(cache.endpoint().url().path(), TOKEN_PATH);

	mock.assert_async().await;
}

#[tokio::test]
async fn cached_token_skips_the_network() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).body("{\"access_token\":\"cached\",\"expires_in\":1800}");
		})
		.await;
	let cache = http_cache(&server);

	for _ in 0..10 {
		assert_eq!(cache.get_token().await.expect("Token should be served.").expose(), "cached");
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_request() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.delay(std::time::Duration::from_millis(200))
				.body("{\"access_token\":\"shared\",\"expires_in\":900}");
		})
		.await;
	let cache = Arc::new(http_cache(&server));
	let handles = (0..16)
		.map(|_| {
			let cache = cache.clone();

			tokio::spawn(async move { cache.get_token().await })
		})
		.collect::<Vec<_>>();

	for handle in handles {
		let token = handle
			.await
			.expect("Caller task should not panic.")
			.expect("Every concurrent caller should get a token.");

		assert_eq!(token.expose(), "shared");
	}

	mock.assert_calls_async(1).await;
	assert_eq!(cache.metrics().endpoint_calls(), 1);
}

#[tokio::test]
async fn clear_token_triggers_exactly_one_refetch() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).body("{\"access_token\":\"again\",\"expires_in\":3600}");
		})
		.await;
	let cache = http_cache(&server);

	cache.get_token().await.expect("First request should succeed.");
	cache.clear_token();
	cache.get_token().await.expect("Refetch should succeed.");
	cache.get_token().await.expect("Cached token should be served.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn unauthorized_is_not_retried() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(401).body("{\"error\":\"invalid_client\"}");
		})
		.await;
	let cache = http_cache(&server);
	let err = cache.get_token().await.expect_err("401 should surface to the caller.");

	match err {
		Error::AuthClient { status, body } => {
			assert_eq!(status, 401);
			assert!(body.contains("invalid_client"));
		},
		other => panic!("Expected an auth client error, got {other:?}."),
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn persistent_server_errors_exhaust_retries() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(503);
		})
		.await;
	let cache = http_cache(&server);
	let err = cache.get_token().await.expect_err("Persistent 503 should exhaust retries.");

	assert!(matches!(err, Error::RefreshExhausted { attempts: 3, status: 503 }));
	assert!(err.is_transient());

	mock.assert_calls_async(3).await;
}

#[tokio::test]
async fn malformed_success_body_is_a_refresh_error() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).body("{\"token\":\"wrong-shape\"}");
		})
		.await;
	let cache = http_cache(&server);
	let err = cache.get_token().await.expect_err("Malformed body should surface.");

	assert!(matches!(err, Error::Refresh(RefreshError::Deserialize { status: 200, .. })));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn slow_endpoint_times_out() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.delay(std::time::Duration::from_secs(5))
				.body("{\"access_token\":\"late\",\"expires_in\":3600}");
		})
		.await;
	let config = builder(&server.base_url())
		.request_timeout(Duration::milliseconds(200))
		.build()
		.expect("Timeout test config should build.");
	let cache = TokenCache::new(config).expect("Timeout test cache should build.");
	let err = cache.get_token().await.expect_err("Slow endpoint should time out.");

	assert!(matches!(err, Error::Refresh(RefreshError::Timeout { .. })));
	assert_eq!(cache.metrics().endpoint_calls(), 1);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
	// Nothing listens on the discard port.
	let cache = TokenCache::new(
		builder("http://127.0.0.1:9").build().expect("Unreachable test config should build."),
	)
	.expect("Unreachable test cache should build.");
	let err = cache.get_token().await.expect_err("Connection failure should surface.");

	assert!(matches!(err, Error::Refresh(RefreshError::Transport { .. })));
	assert!(err.is_transient());
}
