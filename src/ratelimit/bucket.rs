//! Sliding-window token bucket matching Riot's application rate limits.

// std
use std::collections::VecDeque;
// crates.io
use tokio::time::Instant;
// self
use crate::{_prelude::*, error::ConfigError};

/// Capacity and refill schedule for a single bucket.
///
/// Every token comes back one `refill_interval` after it was taken, so any span of
/// `refill_interval` holds at most `capacity` grants no matter where the span starts.
/// When `refill_amount` is smaller than `capacity`, at most `refill_amount` tokens come
/// back per interval, which caps the sustained rate below the burst size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketConfig {
	/// Maximum tokens held at once.
	pub capacity: u32,
	/// Tokens returned per refill interval.
	pub refill_amount: u32,
	/// Time before a taken token returns.
	pub refill_interval: Duration,
}
impl BucketConfig {
	/// Bucket that allows `capacity` requests in any window of `interval`.
	pub fn per_interval(capacity: u32, interval: Duration) -> Self {
		Self { capacity, refill_amount: capacity, refill_interval: interval }
	}

	/// Validates the bucket invariants.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.capacity == 0 {
			return Err(ConfigError::ZeroBucketCapacity);
		}
		if self.refill_amount == 0 {
			return Err(ConfigError::ZeroBucketRefill);
		}
		if !self.refill_interval.is_positive() {
			return Err(ConfigError::NonPositiveRefillInterval);
		}

		Ok(())
	}
}

/// Mutable bucket state; callers serialize access.
///
/// `returns` keeps the scheduled return instants of the last `capacity` grants in grant
/// order. The schedule never decreases, so the tokens still out are always a suffix.
#[derive(Debug)]
pub(crate) struct TokenBucket {
	capacity: usize,
	refill_amount: usize,
	interval: StdDuration,
	returns: VecDeque<Instant>,
}
impl TokenBucket {
	pub(crate) fn new(config: BucketConfig) -> Self {
		let capacity = config.capacity as usize;

		Self {
			capacity,
			refill_amount: (config.refill_amount as usize).min(capacity),
			interval: config.refill_interval.unsigned_abs(),
			returns: VecDeque::with_capacity(capacity),
		}
	}

	fn outstanding(&self, now: Instant) -> usize {
		self.returns.len() - self.returns.partition_point(|at| *at <= now)
	}

	pub(crate) fn has_token(&self, now: Instant) -> bool {
		self.outstanding(now) < self.capacity
	}

	/// Time until the next token returns; zero when a token is available.
	pub(crate) fn wait_time(&self, now: Instant) -> StdDuration {
		if self.has_token(now) {
			return StdDuration::ZERO;
		}

		self.returns.front().map_or(StdDuration::ZERO, |at| at.saturating_duration_since(now))
	}

	/// Takes a token at `now`; callers check [`has_token`](Self::has_token) first.
	pub(crate) fn take(&mut self, now: Instant) {
		let earliest = now + self.interval;
		let paced = self
			.returns
			.len()
			.checked_sub(self.refill_amount)
			.and_then(|idx| self.returns.get(idx))
			.map(|at| *at + self.interval);
		let at = paced.map_or(earliest, |paced| paced.max(earliest));

		self.returns.push_back(at);

		if self.returns.len() > self.capacity {
			self.returns.pop_front();
		}
	}

	pub(crate) fn available(&self, now: Instant) -> u32 {
		u32::try_from(self.capacity - self.outstanding(now)).unwrap_or(u32::MAX)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn bucket(capacity: u32, refill_amount: u32, interval_ms: i64) -> (TokenBucket, Instant) {
		let config = BucketConfig {
			capacity,
			refill_amount,
			refill_interval: Duration::milliseconds(interval_ms),
		};

		(TokenBucket::new(config), Instant::now())
	}

	fn ms(start: Instant, offset: u64) -> Instant {
		start + StdDuration::from_millis(offset)
	}

	#[test]
	fn validation_rejects_degenerate_buckets() {
		assert!(BucketConfig::per_interval(0, Duration::seconds(1)).validate().is_err());
		assert!(BucketConfig::per_interval(5, Duration::ZERO).validate().is_err());
		assert!(
			BucketConfig { capacity: 5, refill_amount: 0, refill_interval: Duration::seconds(1) }
				.validate()
				.is_err()
		);
		assert!(BucketConfig::per_interval(20, Duration::seconds(1)).validate().is_ok());
	}

	#[test]
	fn tokens_return_one_interval_after_their_grant() {
		let (mut bucket, start) = bucket(3, 3, 1_000);

		bucket.take(start);

		let late = ms(start, 999);

		bucket.take(late);
		bucket.take(late);

		assert!(!bucket.has_token(late));
		assert_eq!(bucket.wait_time(late), StdDuration::from_millis(1));

		let first_back = ms(start, 1_000);

		assert_eq!(bucket.available(first_back), 1, "Only the first grant has returned.");

		bucket.take(first_back);

		assert!(!bucket.has_token(ms(start, 1_998)));
		assert_eq!(bucket.available(ms(start, 1_999)), 2);
	}

	#[test]
	fn no_window_holds_more_than_capacity() {
		let (mut bucket, start) = bucket(3, 3, 1_000);
		let mut grants = Vec::new();
		let mut now = start;

		while grants.len() < 12 {
			if bucket.has_token(now) {
				bucket.take(now);
				grants.push(now);
			} else {
				now += StdDuration::from_millis(7);
			}
		}

		for window in grants.windows(4) {
			assert!(window[3] - window[0] >= StdDuration::from_millis(1_000));
		}
	}

	#[test]
	fn partial_refills_accumulate_up_to_capacity() {
		let (mut bucket, start) = bucket(4, 1, 100);

		for _ in 0..4 {
			bucket.take(start);
		}

		assert_eq!(bucket.available(ms(start, 250)), 2);
		assert_eq!(
			bucket.wait_time(ms(start, 250)),
			StdDuration::ZERO,
			"Tokens are available so no wait is needed."
		);
		assert_eq!(bucket.available(ms(start, 10_000)), 4);
	}

	#[test]
	fn empty_bucket_waits_for_the_oldest_grant() {
		let (mut bucket, start) = bucket(1, 1, 100);

		bucket.take(start);
		bucket.take(ms(start, 130));

		assert_eq!(bucket.wait_time(ms(start, 130)), StdDuration::from_millis(100));
	}
}
