//! In-process response cache keyed by request signature.
//!
//! The cache combines LRU eviction with a time-to-live that is enforced lazily: a
//! stale entry is dropped the next time somebody reads it, and no background task
//! ever sweeps the table.

mod lru;
mod snapshot;

// self
use crate::{_prelude::*, cache::lru::LruArena, error::ConfigError, model::RawPayload};

/// Error type produced by cache snapshot persistence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CacheError {
	/// Snapshot could not be encoded or decoded.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// File system failure while reading or writing a snapshot.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Capacity and freshness bounds for [`ResponseCache`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
	/// Maximum number of entries held at once.
	pub capacity: usize,
	/// Age after which an entry is treated as absent.
	pub ttl: Duration,
}
impl CacheConfig {
	/// Validates the capacity and TTL.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.capacity == 0 {
			return Err(ConfigError::ZeroCacheCapacity);
		}
		if !self.ttl.is_positive() {
			return Err(ConfigError::NonPositiveCacheTtl);
		}

		Ok(())
	}
}
impl Default for CacheConfig {
	fn default() -> Self {
		Self { capacity: 512, ttl: Duration::minutes(10) }
	}
}

/// Cached payload plus the instant it was fetched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
	/// Payload returned by the API.
	pub payload: RawPayload,
	/// When the payload was fetched.
	pub fetched_at: OffsetDateTime,
}
impl CacheEntry {
	/// Returns `true` while the entry is younger than `ttl` at `now`.
	pub fn is_fresh_at(&self, now: OffsetDateTime, ttl: Duration) -> bool {
		now - self.fetched_at < ttl
	}
}

/// Thread-safe LRU + TTL cache of raw payloads.
///
/// Every read and write goes through one lock, so concurrent callers always observe a
/// consistent recency order.
#[derive(Debug)]
pub struct ResponseCache {
	config: CacheConfig,
	entries: Mutex<LruArena<String, CacheEntry>>,
}
impl ResponseCache {
	/// Creates an empty cache after validating `config`.
	pub fn new(config: CacheConfig) -> Result<Self, ConfigError> {
		config.validate()?;

		Ok(Self { config, entries: Mutex::new(LruArena::new(config.capacity)) })
	}

	/// Returns the configuration the cache was built with.
	pub fn config(&self) -> &CacheConfig {
		&self.config
	}

	/// Looks up a fresh payload; a hit becomes the most recently used entry.
	pub fn get(&self, signature: &str) -> Option<RawPayload> {
		self.get_at(signature, OffsetDateTime::now_utc())
	}

	/// Same as [`get`](Self::get) with an explicit clock reading.
	pub fn get_at(&self, signature: &str, now: OffsetDateTime) -> Option<RawPayload> {
		let mut entries = self.entries.lock();
		let fresh = entries.get(signature)?.is_fresh_at(now, self.config.ttl);

		if !fresh {
			entries.remove(signature);

			return None;
		}

		entries.get(signature).map(|entry| entry.payload.clone())
	}

	/// Stores a payload fetched now, evicting the least recently used entry when full.
	pub fn put(&self, signature: impl Into<String>, payload: RawPayload) {
		self.put_at(signature, payload, OffsetDateTime::now_utc());
	}

	/// Same as [`put`](Self::put) with an explicit fetch instant.
	pub fn put_at(
		&self,
		signature: impl Into<String>,
		payload: RawPayload,
		fetched_at: OffsetDateTime,
	) {
		self.entries.lock().insert(signature.into(), CacheEntry { payload, fetched_at });
	}

	/// Drops a single entry; returns `true` if it existed.
	pub fn remove(&self, signature: &str) -> bool {
		self.entries.lock().remove(signature).is_some()
	}

	/// Drops every entry.
	pub fn clear(&self) {
		self.entries.lock().clear();
	}

	/// Number of stored entries, including stale ones not read since they expired.
	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	/// Returns `true` when no entries are stored.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn cache(capacity: usize) -> ResponseCache {
		ResponseCache::new(CacheConfig { capacity, ttl: Duration::minutes(10) })
			.expect("Cache fixture should be valid.")
	}

	fn payload(n: u32) -> RawPayload {
		RawPayload::from(json!({ "n": n }))
	}

	#[test]
	fn rejects_degenerate_configuration() {
		assert!(matches!(
			ResponseCache::new(CacheConfig { capacity: 0, ttl: Duration::minutes(1) }),
			Err(ConfigError::ZeroCacheCapacity)
		));
		assert!(matches!(
			ResponseCache::new(CacheConfig { capacity: 1, ttl: Duration::ZERO }),
			Err(ConfigError::NonPositiveCacheTtl)
		));
	}

	#[test]
	fn hit_refreshes_recency() {
		let cache = cache(2);

		cache.put("a", payload(1));
		cache.put("b", payload(2));

		assert_eq!(cache.get("a"), Some(payload(1)));

		cache.put("c", payload(3));

		assert_eq!(cache.get("b"), None, "The least recently used entry must be evicted.");
		assert_eq!(cache.get("a"), Some(payload(1)));
		assert_eq!(cache.get("c"), Some(payload(3)));
	}

	#[test]
	fn stale_entries_are_dropped_on_read() {
		let cache = cache(4);
		let fetched = OffsetDateTime::now_utc();

		cache.put_at("a", payload(1), fetched);

		assert_eq!(cache.get_at("a", fetched + Duration::minutes(9)), Some(payload(1)));
		assert_eq!(cache.len(), 1);
		assert_eq!(cache.get_at("a", fetched + Duration::minutes(10)), None);
		assert!(cache.is_empty(), "Stale entry must be removed lazily.");
	}

	#[test]
	fn overwrite_resets_fetch_time() {
		let cache = cache(4);
		let fetched = OffsetDateTime::now_utc();

		cache.put_at("a", payload(1), fetched);
		cache.put_at("a", payload(2), fetched + Duration::minutes(8));

		assert_eq!(cache.get_at("a", fetched + Duration::minutes(12)), Some(payload(2)));
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn remove_and_clear() {
		let cache = cache(4);

		cache.put("a", payload(1));
		cache.put("b", payload(2));

		assert!(cache.remove("a"));
		assert!(!cache.remove("a"));
		assert_eq!(cache.len(), 1);

		cache.clear();

		assert!(cache.is_empty());
	}
}
