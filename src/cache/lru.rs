//! Arena-backed LRU map.
//!
//! Entries live in a slot vector and link to their neighbours by index, so recency
//! updates never allocate or chase pointers. `head` is the most recently used slot and
//! `tail` the eviction candidate; vacated slots are recycled through a free list.

// std
use std::{borrow::Borrow, hash::Hash};
// self
use crate::_prelude::*;

#[derive(Debug)]
struct Slot<K, V> {
	key: K,
	value: V,
	prev: Option<usize>,
	next: Option<usize>,
}

/// Fixed-capacity map that evicts the least recently used entry on overflow.
#[derive(Debug)]
pub(crate) struct LruArena<K, V> {
	slots: Vec<Option<Slot<K, V>>>,
	free: Vec<usize>,
	index: HashMap<K, usize>,
	head: Option<usize>,
	tail: Option<usize>,
	capacity: usize,
}
impl<K, V> LruArena<K, V>
where
	K: Clone + Eq + Hash,
{
	/// `capacity` must be positive; the cache validates this before construction.
	pub(crate) fn new(capacity: usize) -> Self {
		Self {
			slots: Vec::new(),
			free: Vec::new(),
			index: HashMap::new(),
			head: None,
			tail: None,
			capacity: capacity.max(1),
		}
	}

	pub(crate) fn len(&self) -> usize {
		self.index.len()
	}

	/// Returns the value and marks it most recently used.
	pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<&V>
	where
		K: Borrow<Q>,
		Q: ?Sized + Eq + Hash,
	{
		let idx = *self.index.get(key)?;

		self.promote(idx);

		self.slots[idx].as_ref().map(|slot| &slot.value)
	}

	/// Inserts or replaces a value; returns the entry evicted to make room, if any.
	pub(crate) fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
		if let Some(&idx) = self.index.get(&key) {
			if let Some(slot) = self.slots[idx].as_mut() {
				slot.value = value;
			}

			self.promote(idx);

			return None;
		}

		let evicted = if self.index.len() >= self.capacity { self.pop_tail() } else { None };
		let slot = Slot { key: key.clone(), value, prev: None, next: None };
		let idx = match self.free.pop() {
			Some(idx) => {
				self.slots[idx] = Some(slot);

				idx
			},
			None => {
				self.slots.push(Some(slot));

				self.slots.len() - 1
			},
		};

		self.index.insert(key, idx);
		self.push_front(idx);

		evicted
	}

	pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
	where
		K: Borrow<Q>,
		Q: ?Sized + Eq + Hash,
	{
		let idx = self.index.remove(key)?;

		self.release(idx).map(|(_, value)| value)
	}

	pub(crate) fn clear(&mut self) {
		self.slots.clear();
		self.free.clear();
		self.index.clear();
		self.head = None;
		self.tail = None;
	}

	/// Iterates from least to most recently used.
	pub(crate) fn iter_oldest_first(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
		let mut cursor = self.tail;

		std::iter::from_fn(move || {
			let slot = self.slots.get(cursor?)?.as_ref()?;

			cursor = slot.prev;

			Some((&slot.key, &slot.value))
		})
	}

	fn pop_tail(&mut self) -> Option<(K, V)> {
		let idx = self.tail?;
		let (key, value) = self.release(idx)?;

		self.index.remove(&key);

		Some((key, value))
	}

	fn release(&mut self, idx: usize) -> Option<(K, V)> {
		self.detach(idx);

		let slot = self.slots[idx].take()?;

		self.free.push(idx);

		Some((slot.key, slot.value))
	}

	fn promote(&mut self, idx: usize) {
		if self.head == Some(idx) {
			return;
		}

		self.detach(idx);
		self.push_front(idx);
	}

	fn detach(&mut self, idx: usize) {
		let Some((prev, next)) = self.slots[idx].as_ref().map(|slot| (slot.prev, slot.next)) else {
			return;
		};

		match prev {
			Some(prev) => self.link_next(prev, next),
			None => self.head = next,
		}
		match next {
			Some(next) => self.link_prev(next, prev),
			None => self.tail = prev,
		}

		if let Some(slot) = self.slots[idx].as_mut() {
			slot.prev = None;
			slot.next = None;
		}
	}

	fn push_front(&mut self, idx: usize) {
		let old_head = self.head;

		if let Some(slot) = self.slots[idx].as_mut() {
			slot.prev = None;
			slot.next = old_head;
		}
		if let Some(old_head) = old_head {
			self.link_prev(old_head, Some(idx));
		}

		self.head = Some(idx);

		if self.tail.is_none() {
			self.tail = Some(idx);
		}
	}

	fn link_next(&mut self, idx: usize, next: Option<usize>) {
		if let Some(slot) = self.slots[idx].as_mut() {
			slot.next = next;
		}
	}

	fn link_prev(&mut self, idx: usize, prev: Option<usize>) {
		if let Some(slot) = self.slots[idx].as_mut() {
			slot.prev = prev;
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn keys(arena: &LruArena<&'static str, u32>) -> Vec<&'static str> {
		arena.iter_oldest_first().map(|(key, _)| *key).collect()
	}

	#[test]
	fn evicts_least_recently_used() {
		let mut arena = LruArena::new(3);

		arena.insert("a", 1);
		arena.insert("b", 2);
		arena.insert("c", 3);

		assert_eq!(arena.get("a"), Some(&1));
		assert_eq!(arena.insert("d", 4), Some(("b", 2)));
		assert_eq!(keys(&arena), ["c", "a", "d"]);
		assert_eq!(arena.len(), 3);
	}

	#[test]
	fn replacing_a_key_refreshes_recency_without_eviction() {
		let mut arena = LruArena::new(2);

		arena.insert("a", 1);
		arena.insert("b", 2);

		assert_eq!(arena.insert("a", 10), None);
		assert_eq!(keys(&arena), ["b", "a"]);
		assert_eq!(arena.insert("c", 3), Some(("b", 2)));
	}

	#[test]
	fn removed_slots_are_recycled() {
		let mut arena = LruArena::new(4);

		for (key, value) in [("a", 1), ("b", 2), ("c", 3)] {
			arena.insert(key, value);
		}

		assert_eq!(arena.remove("b"), Some(2));
		assert_eq!(arena.remove("b"), None);
		assert_eq!(keys(&arena), ["a", "c"]);

		arena.insert("d", 4);

		assert_eq!(arena.slots.len(), 3, "The freed slot should be reused.");
		assert_eq!(keys(&arena), ["a", "c", "d"]);

		arena.remove("a");
		arena.remove("d");

		assert_eq!(keys(&arena), ["c"]);
		assert_eq!(arena.head, arena.tail);

		arena.clear();

		assert_eq!(arena.len(), 0);
		assert!(arena.get("c").is_none());
	}

	#[test]
	fn single_slot_arena_keeps_latest() {
		let mut arena = LruArena::new(1);

		arena.insert("a", 1);

		assert_eq!(arena.insert("b", 2), Some(("a", 1)));
		assert_eq!(arena.get("b"), Some(&2));
		assert_eq!(keys(&arena), ["b"]);
	}
}
