use std::time::{Duration, Instant};

use rand::Rng;

use mdns_wire::{Record, TYPE_ANY};

/// Fractions of a record's TTL at which it is re-queried, then finally expired.
const TRIGGER_FRACTIONS: [f64; 5] = [0.50, 0.85, 0.90, 0.95, 1.00];
const DEFAULT_JITTER_MAX: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
	ShouldQuery(Record),
	Expired(Record),
}

struct Entry {
	record: Record,
	triggers: Vec<Instant>,
}

/// The cache's actual storage and trigger bookkeeping, with no dependency on the event loop.
///
/// Every method takes `now` explicitly rather than reading a clock, so the expiry schedule can
/// be exercised under test without waiting in real time.
pub struct Cache {
	entries: Vec<Entry>,
	jitter_max: Duration,
}

impl Default for Cache {
	fn default() -> Self {
		Self::new(DEFAULT_JITTER_MAX)
	}
}

impl Cache {
	/// `jitter_max` bounds the shared per-entry jitter added to every trigger (0 to `jitter_max`,
	/// uniformly at random); the reference design uses 20ms.
	pub fn new(jitter_max: Duration) -> Self {
		Self { entries: Vec::new(), jitter_max }
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Insert `record`, superseding any duplicate or (if `flush_cache` is set) same name+type
	/// entry. Returns the events this produced: an insertion with `ttl == 0` is a farewell and
	/// produces `Expired(record)` without adding anything to the cache.
	pub fn insert(&mut self, record: Record, now: Instant) -> Vec<CacheEvent> {
		let flush = record.flush_cache;
		let name = record.name.clone();
		let record_type = record.record_type();

		self.entries.retain(|e| {
			let duplicate = e.record.matches_ignoring_ttl(&record);
			let superseded = flush && e.record.name == name && e.record.record_type() == record_type;
			!(duplicate || superseded)
		});

		if record.ttl == 0 {
			return vec![CacheEvent::Expired(record)];
		}

		let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..=self.jitter_max.as_millis() as u64));
		let triggers = TRIGGER_FRACTIONS
			.iter()
			.map(|fraction| now + Duration::from_secs_f64(record.ttl as f64 * fraction) + jitter)
			.collect();

		self.entries.push(Entry { record, triggers });
		Vec::new()
	}

	pub fn lookup_one(&self, name: &str, record_type: u16) -> Option<Record> {
		self.entries.iter().map(|e| &e.record).find(|r| matches(r, name, record_type)).cloned()
	}

	pub fn lookup_all(&self, name: &str, record_type: u16) -> Vec<Record> {
		self.entries.iter().map(|e| &e.record).filter(|r| matches(r, name, record_type)).cloned().collect()
	}

	/// Pop every trigger due at or before `now`. An entry that still has triggers left after
	/// that emits `ShouldQuery` once, no matter how many of its triggers fired this tick; an
	/// entry left with none is removed and emits `Expired`.
	pub fn tick(&mut self, now: Instant) -> Vec<CacheEvent> {
		let mut events = Vec::new();

		self.entries.retain_mut(|entry| {
			let mut popped = false;
			while matches!(entry.triggers.first(), Some(t) if *t <= now) {
				entry.triggers.remove(0);
				popped = true;
			}

			if entry.triggers.is_empty() {
				events.push(CacheEvent::Expired(entry.record.clone()));
				false
			} else {
				if popped {
					events.push(CacheEvent::ShouldQuery(entry.record.clone()));
				}
				true
			}
		});

		events
	}

	/// The earliest trigger across every entry, i.e. when the next tick should run.
	pub fn next_wake(&self) -> Option<Instant> {
		self.entries.iter().filter_map(|e| e.triggers.first().copied()).min()
	}
}

fn matches(record: &Record, name: &str, record_type: u16) -> bool {
	let type_matches = record_type == TYPE_ANY || record.record_type() == record_type;
	let name_matches = name.is_empty() || record.name.ends_with(name);
	type_matches && name_matches
}

#[cfg(test)]
mod tests {
	use std::net::Ipv4Addr;

	use pretty_assertions::assert_eq;

	use super::*;
	use mdns_wire::{Ptr, RecordData, Wire, A};

	fn a_record(name: &str, ttl: u32, flush: bool) -> Record {
		Record { name: name.to_string(), flush_cache: flush, ttl, data: RecordData::A(A { address: Ipv4Addr::new(1, 2, 3, 4) }) }
	}

	fn ptr_record(name: &str, target: &str, ttl: u32, flush: bool) -> Record {
		Record { name: name.to_string(), flush_cache: flush, ttl, data: RecordData::Ptr(Ptr { target: target.to_string() }) }
	}

	#[test]
	fn insert_schedules_five_jittered_triggers() {
		let mut cache = Cache::default();
		let now = Instant::now();
		let events = cache.insert(a_record("host.local.", 10, false), now);
		assert!(events.is_empty());
		assert_eq!(cache.len(), 1);

		let next = cache.next_wake().unwrap();
		let lower = now + Duration::from_secs_f64(10.0 * 0.50);
		let upper = lower + DEFAULT_JITTER_MAX;
		assert!(next >= lower && next <= upper);
	}

	#[test]
	fn cache_expiry_emits_in_order() {
		let mut cache = Cache::default();
		let t0 = Instant::now();
		cache.insert(a_record("host.local.", 1, false), t0);

		// allow for the 0-20ms shared jitter by ticking slightly past each fraction.
		let slack = Duration::from_millis(25);

		for fraction in [0.50, 0.85, 0.90, 0.95] {
			let now = t0 + Duration::from_secs_f64(fraction) + slack;
			let events = cache.tick(now);
			assert_eq!(events, vec![CacheEvent::ShouldQuery(a_record("host.local.", 1, false))]);
			assert_eq!(cache.len(), 1);
		}

		let now = t0 + Duration::from_secs_f64(1.0) + slack;
		let events = cache.tick(now);
		assert_eq!(events, vec![CacheEvent::Expired(a_record("host.local.", 1, false))]);
		assert!(cache.is_empty());
	}

	#[test]
	fn flush_cache_replaces_same_name_and_type() {
		let mut cache = Cache::default();
		let now = Instant::now();
		cache.insert(ptr_record("X._http._tcp.local.", "a.local.", 120, false), now);
		cache.insert(ptr_record("X._http._tcp.local.", "b.local.", 120, true), now);

		let found = cache.lookup_all("X._http._tcp.local.", Ptr::TYPE_NUMBER);
		assert_eq!(found, vec![ptr_record("X._http._tcp.local.", "b.local.", 120, true)]);
	}

	#[test]
	fn reinserting_with_a_different_ttl_refreshes_rather_than_duplicates() {
		let mut cache = Cache::default();
		let now = Instant::now();
		cache.insert(a_record("host.local.", 120, false), now);
		cache.insert(a_record("host.local.", 4500, false), now);

		assert_eq!(cache.len(), 1);
		assert_eq!(cache.lookup_all("host.local.", A::TYPE_NUMBER), vec![a_record("host.local.", 4500, false)]);
	}

	#[test]
	fn ttl_zero_removes_without_inserting_and_emits_expired() {
		let mut cache = Cache::default();
		let now = Instant::now();
		cache.insert(a_record("host.local.", 120, false), now);
		let events = cache.insert(a_record("host.local.", 0, false), now);
		assert_eq!(events, vec![CacheEvent::Expired(a_record("host.local.", 0, false))]);
		assert!(cache.is_empty());
	}

	#[test]
	fn lookup_matches_by_name_suffix_and_any_type() {
		let mut cache = Cache::default();
		let now = Instant::now();
		cache.insert(a_record("printer-7.local.", 120, false), now);

		assert!(cache.lookup_one("7.local.", TYPE_ANY).is_some());
		assert!(cache.lookup_one("", TYPE_ANY).is_some());
		assert!(cache.lookup_one("printer-7.local.", A::TYPE_NUMBER).is_some());
		assert!(cache.lookup_one("printer-7.local.", Ptr::TYPE_NUMBER).is_none());
	}
}
