//! Background refresh loop tied to the lifetime of a [`TokenCache`](crate::cache::TokenCache).
//!
//! The loop cycles `Waiting(interval) -> Refreshing -> Waiting -> ...` until its
//! [`CancellationToken`] fires. Both the sleep and the refresh race against cancellation, so a
//! shutdown is observed within the current step and no final refresh is attempted. Refresh
//! failures are logged and the loop keeps going; the next foreground call retries anyway.

// crates.io
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	cache::Shared,
	endpoint::TokenEndpoint,
	error::ConfigError,
	obs::{self, RefreshTrigger},
};

/// Observable state of the background refresh loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackgroundState {
	/// No background interval configured.
	#[default]
	Disabled,
	/// Spawned but not yet scheduled.
	Idle,
	/// Sleeping until the next tick.
	Waiting,
	/// Running the refresh protocol.
	Refreshing,
	/// Terminal; the loop has exited.
	Cancelled,
}
impl BackgroundState {
	/// Returns a stable label suitable for span or log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			BackgroundState::Disabled => "disabled",
			BackgroundState::Idle => "idle",
			BackgroundState::Waiting => "waiting",
			BackgroundState::Refreshing => "refreshing",
			BackgroundState::Cancelled => "cancelled",
		}
	}
}
impl Display for BackgroundState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Handle owning the spawned loop.
#[derive(Debug)]
pub(crate) struct BackgroundTask {
	cancel: CancellationToken,
	handle: JoinHandle<()>,
}
impl BackgroundTask {
	/// Spawns the loop on the current Tokio runtime.
	pub(crate) fn spawn<E>(shared: Arc<Shared<E>>, interval: Duration) -> Result<Self, ConfigError>
	where
		E: ?Sized + TokenEndpoint,
	{
		let runtime = tokio::runtime::Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;
		let cancel = CancellationToken::new();

		shared.set_background_state(BackgroundState::Idle);

		let handle = runtime.spawn(run(shared, interval, cancel.clone()));

		Ok(Self { cancel, handle })
	}

	/// Signals cancellation without waiting.
	pub(crate) fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Signals cancellation and waits for the loop to exit.
	pub(crate) async fn shutdown(self) {
		self.cancel.cancel();

		// A panicked or aborted loop has exited as well.
		let _ = self.handle.await;
	}
}

async fn run<E>(shared: Arc<Shared<E>>, interval: Duration, cancel: CancellationToken)
where
	E: ?Sized + TokenEndpoint,
{
	let tick = interval.unsigned_abs();

	obs::background_transition(BackgroundState::Idle.as_str(), interval);

	loop {
		shared.set_background_state(BackgroundState::Waiting);

		tokio::select! {
			biased;
			_ = cancel.cancelled() => break,
			_ = tokio::time::sleep(tick) => {},
		}

		shared.set_background_state(BackgroundState::Refreshing);

		tokio::select! {
			biased;
			_ = cancel.cancelled() => break,
			// Failures are already logged and counted by the refresh path.
			_ = shared.refresh(RefreshTrigger::Background) => {},
		}
	}

	shared.set_background_state(BackgroundState::Cancelled);
	obs::background_transition(BackgroundState::Cancelled.as_str(), interval);
}
