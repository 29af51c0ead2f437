//! The expiring record cache, split into a pure logic half ([`core`]) and a thin actor shell
//! that drives it from the shared event loop.
//!
//! Reads (`lookup_one`/`lookup_all`) go straight through a shared `Rc<RefCell<_>>` handle so a
//! browser or resolver can query the cache without round-tripping through the actor's mailbox.
//! Writes always go through the actor, since only it knows how to reschedule the wake timer.

pub mod core;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use stakker::{FixedTimerKey, Fwd, CX};

use mdns_wire::Record;

pub use crate::core::CacheEvent;

/// A cloneable read handle onto the cache's storage. Cheap to clone; the last clone dropped
/// frees the underlying storage, matching the "shared ownership, last-holder frees" contract.
pub type SharedCache = Rc<RefCell<core::Cache>>;

pub struct Cache {
	shared: SharedCache,
	subscribers: Vec<Fwd<CacheEvent>>,
	wake: FixedTimerKey,
}

impl Cache {
	pub fn init(_cx: CX![], jitter_max: Duration) -> Option<Self> {
		Some(Self { shared: Rc::new(RefCell::new(core::Cache::new(jitter_max))), subscribers: Vec::new(), wake: FixedTimerKey::default() })
	}

	/// A read-only-in-spirit handle for lookups. Mutating it directly bypasses event emission
	/// and timer rescheduling — only [`Cache::insert`] should ever write through it.
	pub fn handle(&self) -> SharedCache {
		self.shared.clone()
	}

	pub fn subscribe(&mut self, _cx: CX![], fwd: Fwd<CacheEvent>) {
		self.subscribers.push(fwd);
	}

	pub fn insert(&mut self, cx: CX![], record: Record) {
		let now = cx.now();
		let events = self.shared.borrow_mut().insert(record, now);
		self.emit(events);
		self.reschedule(cx, now);
	}

	fn emit(&self, events: Vec<CacheEvent>) {
		for event in events {
			for sub in &self.subscribers {
				sub.fwd(event.clone());
			}
		}
	}

	fn reschedule(&mut self, cx: CX![], now: Instant) {
		cx.timer_del(self.wake);

		let Some(next) = self.shared.borrow().next_wake() else {
			self.wake = FixedTimerKey::default();
			return;
		};

		let actor = cx.access_actor().clone();
		let delay = next.saturating_duration_since(now);
		self.wake = cx.after(delay, move |s| actor.apply(s, |this, cx| this.tick(cx)));
	}

	fn tick(&mut self, cx: CX![]) {
		let now = cx.now();
		let events = self.shared.borrow_mut().tick(now);
		self.emit(events);
		self.reschedule(cx, now);
	}
}
