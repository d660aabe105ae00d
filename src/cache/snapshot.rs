//! JSON snapshot persistence so a restarted dashboard can reuse a warm cache.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::Path,
};
// self
use crate::{
	_prelude::*,
	cache::{CacheEntry, CacheError, ResponseCache},
};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
	version: u32,
	/// Least recently used first.
	entries: Vec<(String, CacheEntry)>,
}

impl ResponseCache {
	/// Writes every entry to `path`, replacing any previous snapshot atomically.
	///
	/// Entries are written least recently used first so a later
	/// [`load_snapshot`](Self::load_snapshot) restores the same recency order.
	pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<(), CacheError> {
		let path = path.as_ref();
		let snapshot = {
			let entries = self.entries.lock();

			Snapshot {
				version: SNAPSHOT_VERSION,
				entries: entries
					.iter_oldest_first()
					.map(|(signature, entry)| (signature.clone(), entry.clone()))
					.collect(),
			}
		};
		let serialized = serde_json::to_vec(&snapshot).map_err(|e| CacheError::Serialization {
			message: format!("Failed to serialize cache snapshot: {e}"),
		})?;

		ensure_parent_exists(path)?;

		let mut tmp_path = path.to_path_buf();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| CacheError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| CacheError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| CacheError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, path).map_err(|e| CacheError::Backend {
			message: format!("Failed to replace {}: {e}", path.display()),
		})
	}

	/// Loads entries from a snapshot written by [`save_snapshot`](Self::save_snapshot).
	///
	/// Entries already stale are skipped, and when more fresh entries remain than the
	/// cache holds only the most recently used ones are loaded. A missing or empty file
	/// loads nothing. Returns the number of snapshot entries now held by the cache.
	pub fn load_snapshot(&self, path: impl AsRef<Path>) -> Result<usize, CacheError> {
		let path = path.as_ref();

		if !path.exists() {
			return Ok(0);
		}

		let bytes = fs::read(path).map_err(|e| CacheError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(0);
		}

		let snapshot: Snapshot =
			serde_json::from_slice(&bytes).map_err(|e| CacheError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		if snapshot.version != SNAPSHOT_VERSION {
			return Err(CacheError::Serialization {
				message: format!(
					"Unsupported cache snapshot version {} in {}",
					snapshot.version,
					path.display()
				),
			});
		}

		let now = OffsetDateTime::now_utc();
		let ttl = self.config.ttl;
		let fresh = snapshot
			.entries
			.into_iter()
			.filter(|(_, entry)| entry.is_fresh_at(now, ttl))
			.collect::<Vec<_>>();
		// Only the most recent `capacity` entries can survive the load.
		let overflow = fresh.len().saturating_sub(self.config.capacity);
		let mut entries = self.entries.lock();
		let mut loaded = 0;

		for (signature, entry) in fresh.into_iter().skip(overflow) {
			entries.insert(signature, entry);

			loaded += 1;
		}

		Ok(loaded)
	}
}

fn ensure_parent_exists(path: &Path) -> Result<(), CacheError> {
	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		fs::create_dir_all(parent).map_err(|e| CacheError::Backend {
			message: format!("Failed to create cache directory {}: {e}", parent.display()),
		})?;
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, path::PathBuf, process};
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::{cache::CacheConfig, model::RawPayload};

	fn temp_path(tag: &str) -> PathBuf {
		let unique = format!(
			"banpick_collector_cache_{tag}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	fn cache(capacity: usize) -> ResponseCache {
		ResponseCache::new(CacheConfig { capacity, ttl: Duration::minutes(10) })
			.expect("Cache fixture should be valid.")
	}

	#[test]
	fn save_and_reload_preserves_recency() {
		let path = temp_path("round_trip");
		let warm = cache(3);

		warm.put("a", RawPayload::from(json!(1)));
		warm.put("b", RawPayload::from(json!(2)));
		warm.put("c", RawPayload::from(json!(3)));
		warm.get("a");
		warm.save_snapshot(&path).expect("Failed to save cache snapshot.");

		let restored = cache(3);

		assert_eq!(restored.load_snapshot(&path).expect("Failed to load cache snapshot."), 3);

		restored.put("d", RawPayload::from(json!(4)));

		assert_eq!(restored.get("b"), None, "Recency order must survive a reload.");
		assert_eq!(restored.get("a"), Some(RawPayload::from(json!(1))));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary cache snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn stale_entries_are_not_restored() {
		let path = temp_path("stale");
		let warm = cache(3);
		let an_hour_ago = OffsetDateTime::now_utc() - Duration::hours(1);

		warm.put_at("old", RawPayload::from(json!(1)), an_hour_ago);
		warm.put("new", RawPayload::from(json!(2)));
		warm.save_snapshot(&path).expect("Failed to save cache snapshot.");

		let restored = cache(3);

		assert_eq!(restored.load_snapshot(&path).expect("Failed to load cache snapshot."), 1);
		assert_eq!(restored.get("old"), None);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary cache snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn oversized_snapshot_keeps_the_newest_entries() {
		let path = temp_path("oversized");
		let warm = cache(3);

		warm.put("a", RawPayload::from(json!(1)));
		warm.put("b", RawPayload::from(json!(2)));
		warm.put("c", RawPayload::from(json!(3)));
		warm.save_snapshot(&path).expect("Failed to save cache snapshot.");

		let small = cache(2);

		assert_eq!(small.load_snapshot(&path).expect("Failed to load cache snapshot."), 2);
		assert_eq!(small.len(), 2);
		assert_eq!(small.get("a"), None, "The oldest entry must not be loaded.");
		assert_eq!(small.get("b"), Some(RawPayload::from(json!(2))));
		assert_eq!(small.get("c"), Some(RawPayload::from(json!(3))));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary cache snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn missing_file_loads_nothing_and_garbage_fails() {
		let path = temp_path("garbage");
		let cache = cache(3);

		assert_eq!(cache.load_snapshot(&path).expect("Missing snapshot should be empty."), 0);

		fs::write(&path, b"not json").expect("Failed to write garbage snapshot.");

		assert!(matches!(cache.load_snapshot(&path), Err(CacheError::Serialization { .. })));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary cache snapshot {}: {e}", path.display())
		});
	}
}
