use std::collections::HashSet;
use std::net::IpAddr;
use std::rc::Rc;
use std::time::Duration;

use stakker::{fwd_to, Actor, Fwd, CX};

use mdns_cache::SharedCache;
use mdns_wire::{Aaaa, Message, Query, Record, RecordData, Wire, A};

use crate::bus::MessageBus;
use crate::transport::SharedTransport;

fn address_of(record: &Record) -> Option<IpAddr> {
	match record.data {
		RecordData::A(A { address }) => Some(IpAddr::V4(address)),
		RecordData::Aaaa(Aaaa { address }) => Some(IpAddr::V6(address)),
		_ => None,
	}
}

/// Resolves a single host name to its IPv4/IPv6 addresses, replaying whatever the cache already
/// holds before the first reply ever arrives.
pub struct Resolver {
	transport: SharedTransport,
	cache_actor: Actor<mdns_cache::Cache>,
	cache: SharedCache,

	name: String,
	addresses: HashSet<IpAddr>,

	resolved: Vec<Fwd<IpAddr>>,
}

impl Resolver {
	pub fn init(
		cx: CX![],
		transport: SharedTransport,
		bus: Actor<MessageBus>,
		cache_actor: Actor<mdns_cache::Cache>,
		cache: SharedCache,
		name: impl Into<String>,
	) -> Option<Self> {
		let actor = cx.access_actor().clone();
		cx.defer(move |s| {
			bus.apply(s, move |bus, cx| bus.subscribe_messages(cx, fwd_to!([actor], on_message() as (Message))));
		});

		let mut this = Self { transport, cache_actor, cache, name: name.into(), addresses: HashSet::new(), resolved: Vec::new() };
		this.query();

		let actor = cx.access_actor().clone();
		cx.after(Duration::ZERO, move |s| actor.apply(s, |this, cx| this.on_startup_timeout(cx)));

		Some(this)
	}

	pub fn subscribe_resolved(&mut self, _cx: CX![], fwd: Fwd<IpAddr>) {
		self.resolved.push(fwd);
	}

	fn existing(&self) -> Vec<Record> {
		let cache = self.cache.borrow();
		let mut records = cache.lookup_all(&self.name, A::TYPE_NUMBER);
		records.extend(cache.lookup_all(&self.name, Aaaa::TYPE_NUMBER));
		records
	}

	fn query(&mut self) {
		let queries = vec![
			Query { name: self.name.clone(), record_type: A::TYPE_NUMBER, unicast_response: false },
			Query { name: self.name.clone(), record_type: Aaaa::TYPE_NUMBER, unicast_response: false },
		];
		let message = Message { queries, records: self.existing(), ..Message::query(0, Vec::new()) };
		self.transport.borrow_mut().send_to_all(&message);
	}

	fn on_message(&mut self, cx: CX![], message: Message) {
		if !message.is_response {
			return;
		}

		for record in message.records {
			let is_address = matches!(record.data, RecordData::A(_) | RecordData::Aaaa(_));
			if !is_address || record.name != self.name {
				continue;
			}

			let Some(address) = address_of(&record) else { continue };

			let cache_actor = self.cache_actor.clone();
			cx.defer(move |s| cache_actor.apply(s, move |c, cx| c.insert(cx, record)));

			if self.addresses.insert(address) {
				for sub in &self.resolved {
					sub.fwd(address);
				}
			}
		}
	}

	/// Replays whatever was already cached when this resolver was constructed. Mirrors the
	/// original zero-delay deferred pass; matches against `addresses` are intentionally not
	/// re-checked here, so a pre-existing address can be reported again if it later reappears in
	/// a live response.
	fn on_startup_timeout(&mut self, _cx: CX![]) {
		for record in self.existing() {
			if let Some(address) = address_of(&record) {
				for sub in &self.resolved {
					sub.fwd(address);
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::net::{Ipv4Addr, Ipv6Addr};

	use mdns_wire::Ptr;

	use super::*;

	#[test]
	fn address_of_extracts_a_v4_address_from_an_a_record() {
		let record = Record { name: "host.local.".to_string(), flush_cache: false, ttl: 120, data: RecordData::A(A { address: Ipv4Addr::new(192, 168, 1, 5) }) };
		assert_eq!(address_of(&record), Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 5))));
	}

	#[test]
	fn address_of_extracts_a_v6_address_from_an_aaaa_record() {
		let address = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1);
		let record = Record { name: "host.local.".to_string(), flush_cache: false, ttl: 120, data: RecordData::Aaaa(Aaaa { address }) };
		assert_eq!(address_of(&record), Some(IpAddr::V6(address)));
	}

	#[test]
	fn address_of_ignores_unrelated_record_types() {
		let record = Record { name: "host.local.".to_string(), flush_cache: false, ttl: 120, data: RecordData::Ptr(Ptr { target: "other.local.".to_string() }) };
		assert_eq!(address_of(&record), None);
	}
}
