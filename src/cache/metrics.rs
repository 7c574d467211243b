// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for refresh work performed by one cache.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	endpoint_calls: AtomicU64,
	retries: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
}
impl RefreshMetrics {
	/// Returns the number of times the refresh protocol was entered.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of requests sent to the token endpoint.
	pub fn endpoint_calls(&self) -> u64 {
		self.endpoint_calls.load(Ordering::Relaxed)
	}

	/// Returns the number of retry delays taken after 5xx answers.
	pub fn retries(&self) -> u64 {
		self.retries.load(Ordering::Relaxed)
	}

	/// Returns the number of successful refreshes (including ones satisfied by another caller).
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of failed refreshes.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_endpoint_call(&self) {
		self.endpoint_calls.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_retry(&self) {
		self.retries.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}
}
