//! Rate limit policy contracts and the token-bucket limiter the client consults before
//! every outbound request.
//!
//! Waiting is a suspension point, never a rejection: [`acquire`](RateLimitPolicy::acquire)
//! sleeps until the policy grants a token, so bursts beyond the budget are delayed rather
//! than dropped.

pub mod bucket;

pub use bucket::BucketConfig;

// crates.io
use tokio::time::{self, Instant};
// self
use crate::{_prelude::*, error::ConfigError, ratelimit::bucket::TokenBucket};

/// Strategy that decides whether the next request may go out now.
pub trait RateLimitPolicy
where
	Self: Send + Sync,
{
	/// Reserves a token at `now`, or reports how long to wait before asking again.
	fn evaluate(&self, now: Instant) -> RateLimitDecision;

	/// Blocks every caller until `until`, typically after an upstream 429.
	///
	/// The default implementation ignores the hint.
	fn penalize(&self, _until: Instant) {}
}
impl dyn RateLimitPolicy {
	/// Suspends the caller until the policy grants a token; returns the total time waited.
	pub async fn acquire(&self) -> StdDuration {
		let started = Instant::now();

		loop {
			match self.evaluate(Instant::now()) {
				RateLimitDecision::Allow => return started.elapsed(),
				RateLimitDecision::Delay(directive) => time::sleep(directive.wait).await,
			}
		}
	}
}

/// Result emitted by a [`RateLimitPolicy`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
	/// A token was reserved; the request may proceed immediately.
	Allow,
	/// The request should be delayed.
	Delay(RetryDirective),
}

/// Advises callers how long to wait after a [`RateLimitDecision::Delay`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryDirective {
	/// Suggested wait before evaluating again.
	pub wait: StdDuration,
	/// Optional descriptive string.
	pub reason: Option<&'static str>,
}
impl RetryDirective {
	/// Creates a new directive with the provided wait.
	pub fn new(wait: StdDuration) -> Self {
		Self { wait, reason: None }
	}

	/// Adds a human-readable reason.
	pub fn with_reason(mut self, reason: &'static str) -> Self {
		self.reason = Some(reason);

		self
	}
}

/// Token-bucket limiter combining one or more buckets.
///
/// A request proceeds only when every bucket holds a token and consumes one from each,
/// which lets a single limiter honor Riot's short and long windows together.
#[derive(Debug)]
pub struct RateLimiter {
	state: Mutex<LimiterState>,
}
impl RateLimiter {
	/// Builds a limiter from validated bucket configurations, all starting full.
	pub fn new(buckets: &[BucketConfig]) -> Result<Self, ConfigError> {
		if buckets.is_empty() {
			return Err(ConfigError::NoRateLimitBuckets);
		}

		let buckets = buckets
			.iter()
			.map(|config| config.validate().map(|_| TokenBucket::new(*config)))
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self { state: Mutex::new(LimiterState { buckets, blocked_until: None }) })
	}

	/// Returns the tokens currently held by each bucket, in configuration order.
	pub fn available(&self) -> Vec<u32> {
		let state = self.state.lock();
		let now = Instant::now();

		state.buckets.iter().map(|bucket| bucket.available(now)).collect()
	}
}
impl RateLimitPolicy for RateLimiter {
	fn evaluate(&self, now: Instant) -> RateLimitDecision {
		let mut state = self.state.lock();

		if let Some(until) = state.blocked_until {
			if now < until {
				return RateLimitDecision::Delay(
					RetryDirective::new(until - now).with_reason("upstream retry-after"),
				);
			}

			state.blocked_until = None;
		}

		if state.buckets.iter().all(|bucket| bucket.has_token(now)) {
			state.buckets.iter_mut().for_each(|bucket| bucket.take(now));

			return RateLimitDecision::Allow;
		}

		let wait = state
			.buckets
			.iter()
			.map(|bucket| bucket.wait_time(now))
			.max()
			.unwrap_or(StdDuration::ZERO)
			.max(StdDuration::from_millis(1));

		RateLimitDecision::Delay(RetryDirective::new(wait).with_reason("token bucket empty"))
	}

	fn penalize(&self, until: Instant) {
		let mut state = self.state.lock();

		state.blocked_until = Some(state.blocked_until.map_or(until, |current| current.max(until)));
	}
}

#[derive(Debug)]
struct LimiterState {
	buckets: Vec<TokenBucket>,
	blocked_until: Option<Instant>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn limiter(buckets: &[BucketConfig]) -> Arc<dyn RateLimitPolicy> {
		Arc::new(RateLimiter::new(buckets).expect("Limiter fixture should be valid."))
	}

	#[test]
	fn rejects_empty_configuration() {
		assert!(matches!(RateLimiter::new(&[]), Err(ConfigError::NoRateLimitBuckets)));
		assert!(matches!(
			RateLimiter::new(&[BucketConfig::per_interval(0, Duration::seconds(1))]),
			Err(ConfigError::ZeroBucketCapacity)
		));
	}

	#[tokio::test(start_paused = true)]
	async fn burst_beyond_capacity_suspends_instead_of_failing() {
		let limiter = limiter(&[BucketConfig::per_interval(3, Duration::seconds(1))]);
		let started = Instant::now();

		for _ in 0..3 {
			limiter.acquire().await;
		}

		assert_eq!(started.elapsed(), StdDuration::ZERO, "Capacity requests must not wait.");

		limiter.acquire().await;

		assert!(
			started.elapsed() >= StdDuration::from_secs(1),
			"The capacity+1 request must wait for the refill interval."
		);
	}

	#[tokio::test(start_paused = true)]
	async fn concurrent_callers_never_exceed_capacity_per_window() {
		let limiter = limiter(&[BucketConfig::per_interval(2, Duration::seconds(1))]);
		let started = Instant::now();
		let stamp = |limiter: Arc<dyn RateLimitPolicy>| async move {
			limiter.acquire().await;

			started.elapsed()
		};
		let (a, b, c, d, e) = tokio::join!(
			stamp(limiter.clone()),
			stamp(limiter.clone()),
			stamp(limiter.clone()),
			stamp(limiter.clone()),
			stamp(limiter.clone()),
		);
		let mut stamps = [a, b, c, d, e];

		stamps.sort();

		assert_eq!(stamps[1], StdDuration::ZERO);
		assert!(stamps[2] >= StdDuration::from_secs(1));
		assert!(stamps[3] >= StdDuration::from_secs(1));
		assert!(stamps[4] >= StdDuration::from_secs(2));
	}

	#[tokio::test(start_paused = true)]
	async fn burst_after_an_early_grant_stays_within_capacity() {
		let limiter = limiter(&[BucketConfig::per_interval(3, Duration::seconds(1))]);
		let started = Instant::now();
		let mut stamps = Vec::new();

		limiter.acquire().await;
		stamps.push(started.elapsed());
		time::advance(StdDuration::from_millis(999)).await;

		for _ in 0..5 {
			limiter.acquire().await;
			stamps.push(started.elapsed());
		}

		assert_eq!(
			stamps[..3],
			[StdDuration::ZERO, StdDuration::from_millis(999), StdDuration::from_millis(999)]
		);

		for window in stamps.windows(4) {
			assert!(
				window[3] - window[0] >= StdDuration::from_secs(1),
				"At most three grants may fall inside any one-second span: {stamps:?}."
			);
		}
	}

	#[tokio::test(start_paused = true)]
	async fn every_bucket_must_hold_a_token() {
		let limiter = limiter(&[
			BucketConfig::per_interval(2, Duration::seconds(1)),
			BucketConfig::per_interval(3, Duration::seconds(10)),
		]);
		let started = Instant::now();

		limiter.acquire().await;
		limiter.acquire().await;
		limiter.acquire().await;

		assert!(started.elapsed() >= StdDuration::from_secs(1));
		assert!(started.elapsed() < StdDuration::from_secs(10));

		limiter.acquire().await;

		assert!(started.elapsed() >= StdDuration::from_secs(10));
	}

	#[tokio::test(start_paused = true)]
	async fn available_tracks_each_bucket() {
		let limiter = RateLimiter::new(&[
			BucketConfig::per_interval(2, Duration::seconds(1)),
			BucketConfig::per_interval(5, Duration::seconds(10)),
		])
		.expect("Limiter fixture should be valid.");

		assert_eq!(limiter.evaluate(Instant::now()), RateLimitDecision::Allow);
		assert_eq!(limiter.available(), [1, 4]);

		time::advance(StdDuration::from_secs(1)).await;

		assert_eq!(limiter.available(), [2, 4]);
	}

	#[tokio::test(start_paused = true)]
	async fn penalty_blocks_until_deadline() {
		let limiter = RateLimiter::new(&[BucketConfig::per_interval(10, Duration::seconds(1))])
			.expect("Limiter fixture should be valid.");
		let started = Instant::now();

		limiter.penalize(started + StdDuration::from_secs(3));

		match limiter.evaluate(started) {
			RateLimitDecision::Delay(directive) => {
				assert_eq!(directive.wait, StdDuration::from_secs(3));
				assert_eq!(directive.reason, Some("upstream retry-after"));
			},
			RateLimitDecision::Allow => panic!("Penalized limiter must delay."),
		}

		let limiter: Arc<dyn RateLimitPolicy> = Arc::new(limiter);

		limiter.acquire().await;

		assert!(started.elapsed() >= StdDuration::from_secs(3));
	}
}
