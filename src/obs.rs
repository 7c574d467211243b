//! Optional observability helpers for refresh work.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to run every refresh inside a span named
//!   `m2m_token_cache.refresh` carrying the `trigger` and `stage` fields, and to emit events for
//!   retries, rejected credentials, and background loop transitions.
//! - Enable `metrics` to increment the `m2m_token_cache_refresh_total` counter for every
//!   attempt/success/failure, labeled by `trigger` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// What started a refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshTrigger {
	/// A caller found no valid token.
	Foreground,
	/// The background loop woke up.
	Background,
}
impl RefreshTrigger {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshTrigger::Foreground => "foreground",
			RefreshTrigger::Background => "background",
		}
	}
}
impl Display for RefreshTrigger {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshOutcome {
	/// Entry to the refresh protocol.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl RefreshOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshOutcome::Attempt => "attempt",
			RefreshOutcome::Success => "success",
			RefreshOutcome::Failure => "failure",
		}
	}
}
impl Display for RefreshOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
