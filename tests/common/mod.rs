//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration as StdDuration,
};
// crates.io
use parking_lot::Mutex;
use time::Duration;
// self
use m2m_token_cache::{
	cache::TokenCache,
	config::{TokenCacheConfig, TokenCacheConfigBuilder},
	endpoint::{TokenEndpoint, TokenEndpointFuture, TokenEndpointOutcome},
};

pub const CLIENT_ID: &str = "svc-client";
pub const CLIENT_SECRET: &str = "svc-secret";

/// One scripted answer of the fake token endpoint.
#[derive(Clone, Debug)]
pub struct Step {
	pub status: u16,
	pub body: String,
	pub delay: StdDuration,
}
impl Step {
	pub fn issued(token: &str, expires_in: i64) -> Self {
		Self {
			status: 200,
			body: format!("{{\"access_token\":\"{token}\",\"expires_in\":{expires_in}}}"),
			delay: StdDuration::ZERO,
		}
	}

	pub fn status(status: u16) -> Self {
		Self { status, body: String::new(), delay: StdDuration::ZERO }
	}

	pub fn delayed(mut self, delay: StdDuration) -> Self {
		self.delay = delay;

		self
	}
}

/// In-process token endpoint that replays a script and counts calls.
#[derive(Debug, Default)]
pub struct ScriptedEndpoint {
	steps: Mutex<VecDeque<Step>>,
	calls: AtomicUsize,
}
impl ScriptedEndpoint {
	pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
		Self { steps: Mutex::new(steps.into_iter().collect()), calls: AtomicUsize::new(0) }
	}

	pub fn push(&self, step: Step) {
		self.steps.lock().push_back(step);
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl TokenEndpoint for ScriptedEndpoint {
	fn request_token(&self) -> TokenEndpointFuture<'_> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let step = self.steps.lock().pop_front().unwrap_or_else(|| Step::status(500));

		Box::pin(async move {
			if !step.delay.is_zero() {
				tokio::time::sleep(step.delay).await;
			}

			TokenEndpointOutcome::from_response(step.status, step.body.as_bytes())
		})
	}
}

pub fn builder(domain: &str) -> TokenCacheConfigBuilder {
	TokenCacheConfig::builder(domain, CLIENT_ID, CLIENT_SECRET)
}

pub fn config() -> TokenCacheConfig {
	builder("auth.example.com").build().expect("Test config should build.")
}

pub fn background_config(interval: Duration) -> TokenCacheConfig {
	builder("auth.example.com")
		.background_refresh_interval(interval)
		.build()
		.expect("Background test config should build.")
}

pub fn background_cache(
	interval: Duration,
	endpoint: Arc<ScriptedEndpoint>,
) -> TokenCache<ScriptedEndpoint> {
	<TokenCache<ScriptedEndpoint>>::with_endpoint(background_config(interval), endpoint)
		.expect("Background cache should build.")
}
