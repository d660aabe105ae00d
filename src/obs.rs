//! Optional observability helpers for collector requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `banpick_collector.request` with the
//!   `operation` and `stage` (call site) fields, plus retry and skip events.
//! - Enable `metrics` to increment the `banpick_collector_request_total` counter for every
//!   attempt/cache hit/retry/success/failure, labeled by `operation` + `outcome`, and to
//!   record limiter waits in the `banpick_collector_rate_limit_wait_seconds` histogram,
//!   labeled by `routing`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Logical operations observed by the collector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Raw [`fetch`](crate::client::RiotClient::fetch) against an arbitrary endpoint.
	Fetch,
	/// Riot ID to PUUID lookup.
	Account,
	/// Match-id listing for a player.
	MatchIds,
	/// Match-detail fetch.
	MatchDetail,
	/// Champion usage aggregation across queues.
	ChampionUsage,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Fetch => "fetch",
			Operation::Account => "account",
			Operation::MatchIds => "match_ids",
			Operation::MatchDetail => "match_detail",
			Operation::ChampionUsage => "champion_usage",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Entry to a collector operation.
	Attempt,
	/// Served from the response cache.
	CacheHit,
	/// A transient failure scheduled another attempt.
	Retry,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Failure logged and skipped during aggregation.
	Skipped,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::CacheHit => "cache_hit",
			RequestOutcome::Retry => "retry",
			RequestOutcome::Success => "success",
			RequestOutcome::Failure => "failure",
			RequestOutcome::Skipped => "skipped",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
