// self
use crate::{
	_prelude::*,
	client::Routing,
	obs::{Operation, RequestOutcome},
};

/// Counts one outcome of a collector operation (when `metrics` is enabled).
pub fn record_request_outcome(operation: Operation, outcome: RequestOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"banpick_collector_request_total",
			"operation" => operation.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (operation, outcome);
	}
}

/// Records how long an outbound attempt waited for a rate-limit token, per routing class.
///
/// Attempts that got a token immediately are recorded as zero so the histogram also
/// shows how often the budget was the bottleneck.
pub fn record_rate_limit_wait(routing: Routing, waited: StdDuration) {
	#[cfg(feature = "metrics")]
	{
		metrics::histogram!(
			"banpick_collector_rate_limit_wait_seconds",
			"routing" => routing.as_str()
		)
		.record(waited.as_secs_f64());
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (routing, waited);
	}
}
