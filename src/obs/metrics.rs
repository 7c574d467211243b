// self
use crate::obs::{RefreshOutcome, RefreshTrigger};

/// Records a refresh outcome via the global metrics recorder (when enabled).
pub fn record_refresh_outcome(trigger: RefreshTrigger, outcome: RefreshOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"m2m_token_cache_refresh_total",
			"trigger" => trigger.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (trigger, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_refresh_outcome_noop_without_recorder() {
		record_refresh_outcome(RefreshTrigger::Background, RefreshOutcome::Failure);
	}
}
