// self
use crate::{_prelude::*, obs::Operation};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedRequest<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRequest<F> = F;

/// A span builder used by collector operations.
#[derive(Clone, Debug)]
pub struct RequestSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RequestSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(operation: Operation, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"banpick_collector.request",
				operation = operation.as_str(),
				stage
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (operation, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRequest<Fut>
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

/// Emits a retry event inside the current span.
pub fn log_retry(attempt: u32, status: Option<u16>, delay: StdDuration) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(attempt, status, delay_ms = delay.as_millis() as u64, "retrying request");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (attempt, status, delay);
	}
}

/// Emits an event for a fetch that aggregation skipped instead of failing.
pub fn log_skip(target: &dyn Display, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(%target, %error, "skipping failed fetch");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (target, error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn spans_and_events_are_noops_without_subscriber() {
		let span = RequestSpan::new(Operation::MatchIds, "fetch");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);

		log_retry(1, Some(503), StdDuration::from_millis(500));
		log_skip(&"match KR_1", &Error::InvalidRequest { status: 404, reason: String::new() });
	}
}
