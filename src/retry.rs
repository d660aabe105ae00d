//! Retry budget and backoff schedule for transient upstream failures.

// crates.io
use rand::Rng;
// self
use crate::{_prelude::*, error::ConfigError};

/// Bounded exponential backoff applied to 429, 5xx, and network failures.
///
/// The n-th retry waits `base_delay * 2^(n-1)`, capped at `max_delay`. With `jitter`
/// enabled the wait is drawn uniformly from the upper half of that value. A larger
/// `Retry-After` hint from the server always wins over the computed delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
	/// Total attempts including the first request.
	pub max_attempts: u32,
	/// Delay before the first retry.
	pub base_delay: Duration,
	/// Upper bound for computed delays.
	pub max_delay: Duration,
	/// Spread retries of concurrent callers apart.
	pub jitter: bool,
}
impl RetryPolicy {
	/// Validates the attempt budget and backoff bounds.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.max_attempts == 0 {
			return Err(ConfigError::ZeroAttempts);
		}
		if self.base_delay.is_negative()
			|| self.max_delay.is_negative()
			|| self.base_delay > self.max_delay
		{
			return Err(ConfigError::InvalidBackoff);
		}

		Ok(())
	}

	/// Computed backoff after `failures` failed attempts (`failures >= 1`).
	pub fn backoff(&self, failures: u32) -> StdDuration {
		let base = self.base_delay.unsigned_abs();
		let max = self.max_delay.unsigned_abs();
		let factor = 1_u32.checked_shl(failures.saturating_sub(1)).unwrap_or(u32::MAX);
		let delay = base.checked_mul(factor).unwrap_or(max).min(max);

		if !self.jitter || delay.is_zero() {
			return delay;
		}

		let half = delay / 2;
		let spread = u64::try_from((delay - half).as_nanos()).unwrap_or(u64::MAX);

		half + StdDuration::from_nanos(rand::rng().random_range(0..=spread))
	}

	/// Delay before the next attempt, honoring a server `Retry-After` hint when larger.
	pub fn delay_for(&self, failures: u32, retry_after: Option<Duration>) -> StdDuration {
		let backoff = self.backoff(failures);

		match retry_after {
			Some(hint) if hint.is_positive() => backoff.max(hint.unsigned_abs()),
			_ => backoff,
		}
	}

	/// Returns `true` while another attempt fits in the budget.
	pub fn allows_retry(&self, attempts: u32) -> bool {
		attempts < self.max_attempts
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_attempts: 5,
			base_delay: Duration::milliseconds(500),
			max_delay: Duration::seconds(10),
			jitter: true,
		}
	}
}

/// How the client reacts to an HTTP status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
	/// 2xx; the body is the payload.
	Success,
	/// 429; retry after backoff.
	RateLimited,
	/// 5xx; retry after backoff.
	ServerError,
	/// Any other status; fail without retrying.
	Rejected,
}
impl StatusClass {
	/// Classifies a raw status code.
	pub fn of(status: u16) -> Self {
		match status {
			200..=299 => Self::Success,
			429 => Self::RateLimited,
			500..=599 => Self::ServerError,
			_ => Self::Rejected,
		}
	}
}
