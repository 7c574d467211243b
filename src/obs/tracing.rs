// self
use crate::{_prelude::*, obs::RefreshTrigger};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedRefresh<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRefresh<F> = F;

/// A span builder used by refresh paths.
#[derive(Clone, Debug)]
pub struct RefreshSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RefreshSpan {
	/// Creates a new span tagged with the provided trigger + stage.
	pub fn new(trigger: RefreshTrigger, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("m2m_token_cache.refresh", trigger = trigger.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (trigger, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRefresh<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a 5xx answer that will be retried.
pub(crate) fn retry_scheduled(attempt: u32, max_attempts: u32, status: u16, delay: Duration) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		attempt,
		max_attempts,
		status,
		delay_ms = delay.whole_milliseconds() as u64,
		"token endpoint returned a server error, retrying"
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (attempt, max_attempts, status, delay);
}

/// Logs a refresh that finished with an error.
pub(crate) fn refresh_failed(error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(error = %error, "token refresh failed");
	#[cfg(not(feature = "tracing"))]
	let _ = error;
}

/// Logs a token installed in the cache.
pub(crate) fn token_installed(remaining: Duration) {
	#[cfg(feature = "tracing")]
	tracing::debug!(remaining_secs = remaining.whole_seconds(), "access token cached");
	#[cfg(not(feature = "tracing"))]
	let _ = remaining;
}

/// Logs an explicit cache clear.
pub(crate) fn token_cleared() {
	#[cfg(feature = "tracing")]
	tracing::debug!("cached access token cleared");
}

/// Logs a background loop transition.
pub(crate) fn background_transition(state: &'static str, interval: Duration) {
	#[cfg(feature = "tracing")]
	tracing::info!(state, interval_secs = interval.whole_seconds(), "background refresh loop");
	#[cfg(not(feature = "tracing"))]
	let _ = (state, interval);
}
