use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use stakker::{fwd_to, Actor, FixedTimerKey, Fwd, CX};

use mdns_cache::{CacheEvent, SharedCache};
use mdns_wire::{Aaaa, Message, Ptr, Query, Record, RecordData, Srv, Txt, Wire, A};

use crate::config::Config;
use crate::service::Service;
use crate::transport::SharedTransport;
use crate::BROWSE_META_TYPE;

/// Discovers services of one type (or, for the browse meta-type, every type on the link) by
/// correlating PTR/SRV/TXT/A/AAAA records streamed in off the wire and out of the shared cache.
pub struct Browser {
	transport: SharedTransport,
	cache_actor: Actor<mdns_cache::Cache>,
	cache: SharedCache,
	config: Rc<Config>,

	service_type: String,

	ptr_targets: HashSet<String>,
	services: HashMap<String, Service>,
	hostnames: HashSet<String>,

	query_timer: FixedTimerKey,
	service_timer: FixedTimerKey,

	added: Vec<Fwd<Service>>,
	updated: Vec<Fwd<Service>>,
	removed: Vec<Fwd<Service>>,
}

impl Browser {
	pub fn init(
		cx: CX![],
		transport: SharedTransport,
		bus: Actor<crate::bus::MessageBus>,
		cache_actor: Actor<mdns_cache::Cache>,
		cache: SharedCache,
		service_type: impl Into<String>,
		config: Rc<Config>,
	) -> Option<Self> {
		let actor = cx.access_actor().clone();
		let cache_for_subscribe = cache_actor.clone();
		cx.defer(move |s| {
			let msg_actor = actor.clone();
			bus.apply(s, move |bus, cx| bus.subscribe_messages(cx, fwd_to!([msg_actor], on_message() as (Message))));
			cache_for_subscribe.apply(s, move |c, cx| c.subscribe(cx, fwd_to!([actor], on_cache_event() as (CacheEvent))));
		});

		let service_type = service_type.into();
		let mut this = Self {
			transport,
			cache_actor,
			cache,
			config,
			service_type,
			ptr_targets: HashSet::new(),
			services: HashMap::new(),
			hostnames: HashSet::new(),
			query_timer: FixedTimerKey::default(),
			service_timer: FixedTimerKey::default(),
			added: Vec::new(),
			updated: Vec::new(),
			removed: Vec::new(),
		};

		if !this.service_type.is_empty() {
			this.on_query_timeout(cx);
		}
		Some(this)
	}

	pub fn subscribe_added(&mut self, _cx: CX![], fwd: Fwd<Service>) {
		self.added.push(fwd);
	}

	pub fn subscribe_updated(&mut self, _cx: CX![], fwd: Fwd<Service>) {
		self.updated.push(fwd);
	}

	pub fn subscribe_removed(&mut self, _cx: CX![], fwd: Fwd<Service>) {
		self.removed.push(fwd);
	}

	fn insert(&mut self, cx: CX![], record: Record) {
		let cache_actor = self.cache_actor.clone();
		cx.defer(move |s| cache_actor.apply(s, move |c, cx| c.insert(cx, record)));
	}

	/// Strip a leading `<anything>._sub.` prefix, used to match SRV/TXT suffixes against the
	/// unprefixed service type.
	fn local_domain(name: &str) -> &str {
		match name.find("._sub.") {
			Some(i) => &name[i + "._sub.".len()..],
			None => name,
		}
	}

	fn on_message(&mut self, cx: CX![], message: Message) {
		if !message.is_response {
			return;
		}

		let any = self.service_type == BROWSE_META_TYPE;
		let local_type = Self::local_domain(&self.service_type);

		let mut update_names = HashSet::new();
		let mut to_cache = Vec::new();

		for record in &message.records {
			let mut cache_record = false;

			match &record.data {
				RecordData::Ptr(Ptr { target }) => {
					if any && record.name == BROWSE_META_TYPE {
						self.ptr_targets.insert(target.clone());
						cache_record = true;
					} else if any || record.name == self.service_type {
						update_names.insert(target.clone());
						cache_record = true;
					}
				}
				RecordData::Srv(Srv { target, .. }) => {
					if any || record.name.ends_with(&format!(".{local_type}")) {
						update_names.insert(record.name.clone());
						self.hostnames.insert(target.clone());
						cache_record = true;
					}
				}
				RecordData::Txt(Txt { .. }) => {
					if any || record.name.ends_with(&format!(".{local_type}")) {
						update_names.insert(record.name.clone());
						cache_record = true;
					}
				}
				_ => {}
			}

			if cache_record {
				to_cache.push(record.clone());
			}
		}

		if !self.ptr_targets.is_empty() {
			cx.timer_del(self.service_timer);
			let actor = cx.access_actor().clone();
			self.service_timer = cx.after(self.config.service_coalesce, move |s| actor.apply(s, |this, cx| this.on_service_timeout(cx)));
		}

		for record in &message.records {
			let is_address = matches!(record.data, RecordData::A(_) | RecordData::Aaaa(_));
			if is_address && self.hostnames.contains(&record.name) {
				to_cache.push(record.clone());
			}
		}

		for record in to_cache {
			self.insert(cx, record);
		}

		let mut query_names = HashSet::new();
		for name in update_names {
			if self.update_service(&name) {
				query_names.insert(name);
			}
		}

		if !query_names.is_empty() {
			let mut queries = Vec::new();
			for name in &query_names {
				queries.push(Query { name: name.clone(), record_type: Srv::TYPE_NUMBER, unicast_response: false });
				queries.push(Query { name: name.clone(), record_type: Txt::TYPE_NUMBER, unicast_response: false });
			}
			let message = Message::query(0, queries);
			self.transport.borrow_mut().send_to_all(&message);
		}
	}

	/// Rebuild a service descriptor for `fqdn` from whatever is currently cached. Returns `true`
	/// if the SRV record is still missing and a follow-up query is needed.
	fn update_service(&mut self, fqdn: &str) -> bool {
		let Some(split) = fqdn.find("._") else { return false };
		let service_name = &fqdn[..split];
		let service_type = &fqdn[split + 1..];

		if self.cache.borrow().lookup_one(service_type, Ptr::TYPE_NUMBER).is_none() {
			return false;
		}

		let Some(srv) = self.cache.borrow().lookup_one(fqdn, Srv::TYPE_NUMBER) else { return true };
		let RecordData::Srv(Srv { port, target, .. }) = srv.data else { return true };

		let ipv4 = self.cache.borrow().lookup_one(&target, A::TYPE_NUMBER).and_then(|r| match r.data {
			RecordData::A(A { address }) => Some(address),
			_ => None,
		});
		let ipv6 = self.cache.borrow().lookup_one(&target, Aaaa::TYPE_NUMBER).and_then(|r| match r.data {
			RecordData::Aaaa(Aaaa { address }) => Some(address),
			_ => None,
		});

		let mut attributes: Vec<mdns_wire::TxtAttribute> = Vec::new();
		for txt in self.cache.borrow().lookup_all(fqdn, Txt::TYPE_NUMBER) {
			if let RecordData::Txt(Txt { attributes: attrs }) = txt.data {
				for attr in attrs {
					if let Some(existing) = attributes.iter_mut().find(|a| a.key == attr.key) {
						*existing = attr;
					} else {
						attributes.push(attr);
					}
				}
			}
		}

		let service = Service { name: service_name.to_string(), service_type: service_type.to_string(), hostname: target, port, ipv4, ipv6, attributes };

		match self.services.get(fqdn) {
			None => {
				for sub in &self.added {
					sub.fwd(service.clone());
				}
			}
			Some(existing) if *existing != service => {
				for sub in &self.updated {
					sub.fwd(service.clone());
				}
			}
			_ => {}
		}

		self.services.insert(fqdn.to_string(), service);
		false
	}

	fn recompute_hostnames(&mut self) {
		self.hostnames = self.services.values().map(|s| s.hostname.clone()).collect();
	}

	fn on_cache_event(&mut self, _cx: CX![], event: CacheEvent) {
		match event {
			CacheEvent::ShouldQuery(record) => {
				let query = Query { name: record.name.clone(), record_type: record.record_type(), unicast_response: false };
				let message = Message::query(0, vec![query]);
				self.transport.borrow_mut().send_to_all(&message);
			}
			CacheEvent::Expired(record) => match &record.data {
				RecordData::Srv(_) => {
					if let Some(service) = self.services.remove(&record.name) {
						for sub in &self.removed {
							sub.fwd(service.clone());
						}
						self.recompute_hostnames();
					}
				}
				RecordData::Txt(_) => {
					self.update_service(&record.name);
				}
				_ => {}
			},
		}
	}

	fn on_query_timeout(&mut self, cx: CX![]) {
		if self.service_type.is_empty() {
			return;
		}

		let known_answers = self.cache.borrow().lookup_all(&self.service_type, Ptr::TYPE_NUMBER);
		let query = Query { name: self.service_type.clone(), record_type: Ptr::TYPE_NUMBER, unicast_response: false };
		let message = Message { queries: vec![query], records: known_answers, ..Message::query(0, Vec::new()) };
		self.transport.borrow_mut().send_to_all(&message);

		cx.timer_del(self.query_timer);
		let actor = cx.access_actor().clone();
		self.query_timer = cx.after(self.config.query_interval, move |s| actor.apply(s, |this, cx| this.on_query_timeout(cx)));
	}

	fn on_service_timeout(&mut self, _cx: CX![]) {
		if self.ptr_targets.is_empty() {
			return;
		}

		let mut queries = Vec::new();
		let mut records = Vec::new();
		for target in self.ptr_targets.drain() {
			queries.push(Query { name: target.clone(), record_type: Ptr::TYPE_NUMBER, unicast_response: false });
			records.extend(self.cache.borrow().lookup_all(&target, Ptr::TYPE_NUMBER));
		}

		let message = Message { queries, records, ..Message::query(0, Vec::new()) };
		self.transport.borrow_mut().send_to_all(&message);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn local_domain_passes_through_a_plain_service_type() {
		assert_eq!(Browser::local_domain("_ipp._tcp.local."), "_ipp._tcp.local.");
	}

	#[test]
	fn local_domain_strips_a_subtype_prefix() {
		assert_eq!(Browser::local_domain("_printer._sub._ipp._tcp.local."), "_ipp._tcp.local.");
	}
}
