use std::rc::Rc;

use stakker::{actor, fwd_to, ret_nop, Actor, ActorOwn, CX};

use mdns_wire::{Message, Ptr, Record, RecordData, Srv, Txt, Wire};

use crate::bus::MessageBus;
use crate::config::Config;
use crate::hostname::SharedHostname;
use crate::prober::Prober;
use crate::reply::build_reply;
use crate::service::Service;
use crate::transport::SharedTransport;
use crate::BROWSE_META_TYPE;

/// Advertises one service: publishes browse-PTR, type-PTR, SRV and TXT records, answers queries
/// for them with known-answer suppression, and sends a farewell when replaced or dropped.
///
/// Every publish (first time, or after the FQDN or hostname changes) goes through a [`Prober`]
/// first — SRV name uniqueness is re-confirmed, never assumed.
pub struct Provider {
	transport: SharedTransport,
	bus: Actor<MessageBus>,
	hostname: SharedHostname,
	config: Rc<Config>,

	browse_ptr_proposed: Record,
	ptr_proposed: Record,
	srv_proposed: Record,
	txt_proposed: Record,

	browse_ptr_published: Option<Record>,
	ptr_published: Option<Record>,
	srv_published: Option<Record>,
	txt_published: Option<Record>,

	initialized: bool,
	confirmed: bool,

	prober: Option<ActorOwn<Prober>>,
}

impl Provider {
	pub fn init(cx: CX![], transport: SharedTransport, bus: Actor<MessageBus>, hostname: SharedHostname, config: Rc<Config>) -> Option<Self> {
		let actor = cx.access_actor().clone();
		let bus_for_subscribe = bus.clone();
		cx.defer(move |s| {
			bus_for_subscribe.apply(s, move |bus, cx| bus.subscribe_messages(cx, fwd_to!([actor], on_message() as (Message))));
		});

		Some(Self {
			transport,
			bus,
			hostname,
			config,
			browse_ptr_proposed: Record { name: BROWSE_META_TYPE.to_string(), flush_cache: false, ttl: 0, data: RecordData::Ptr(Ptr { target: String::new() }) },
			ptr_proposed: Record { name: String::new(), flush_cache: false, ttl: 0, data: RecordData::Ptr(Ptr { target: String::new() }) },
			srv_proposed: Record {
				name: String::new(),
				flush_cache: true,
				ttl: 0,
				data: RecordData::Srv(Srv { priority: 0, weight: 0, port: 0, target: String::new() }),
			},
			txt_proposed: Record { name: String::new(), flush_cache: true, ttl: 0, data: RecordData::Txt(Txt { attributes: Vec::new() }) },
			browse_ptr_published: None,
			ptr_published: None,
			srv_published: None,
			txt_published: None,
			initialized: false,
			confirmed: false,
			prober: None,
		})
	}

	/// Set (or change) the service being advertised. Has no effect until the hostname registrar
	/// is registered; from then on, a changed FQDN (or the very first call) re-probes the SRV
	/// name before publishing, while an unchanged FQDN just republishes directly.
	pub fn update(&mut self, cx: CX![], service: Service) {
		self.initialized = true;

		let service_name = service.name.replace('.', "-");
		let fqdn = format!("{service_name}.{}", service.service_type);
		let ttl = self.config.default_record_ttl;
		let current_hostname = self.hostname.borrow().name.clone();

		self.browse_ptr_proposed = Record { name: BROWSE_META_TYPE.to_string(), flush_cache: false, ttl, data: RecordData::Ptr(Ptr { target: service.service_type.clone() }) };
		self.ptr_proposed = Record { name: service.service_type.clone(), flush_cache: false, ttl, data: RecordData::Ptr(Ptr { target: fqdn.clone() }) };
		self.srv_proposed = Record {
			name: fqdn.clone(),
			flush_cache: true,
			ttl,
			data: RecordData::Srv(Srv { priority: 0, weight: 0, port: service.port, target: current_hostname }),
		};
		self.txt_proposed = Record { name: fqdn.clone(), flush_cache: true, ttl, data: RecordData::Txt(Txt { attributes: service.attributes }) };

		if !self.hostname.borrow().registered {
			return;
		}

		let fqdn_changed = self.srv_published.as_ref().map(|r| r.name.as_str()) != Some(fqdn.as_str());
		if !self.confirmed || fqdn_changed {
			self.confirm(cx);
		} else {
			self.publish(cx);
		}
	}

	fn confirm(&mut self, cx: CX![]) {
		let actor = cx.access_actor().clone();
		let prober: ActorOwn<Prober> = actor!(
			cx,
			Prober::init(self.transport.clone(), self.bus.clone(), self.srv_proposed.clone(), self.config.clone()),
			ret_nop!()
		);

		let prober_actor = prober.clone();
		cx.defer(move |s| {
			prober_actor.apply(s, move |p, cx| p.subscribe_confirmed(cx, fwd_to!([actor], on_name_confirmed() as (String))));
		});

		self.prober = Some(prober);
	}

	fn on_name_confirmed(&mut self, cx: CX![], name: String) {
		if self.confirmed {
			self.farewell();
		} else {
			self.confirmed = true;
		}

		if let RecordData::Ptr(Ptr { target }) = &mut self.ptr_proposed.data {
			*target = name.clone();
		}
		self.srv_proposed.name = name.clone();
		self.txt_proposed.name = name;

		self.publish(cx);
		self.prober = None;
	}

	fn publish(&mut self, _cx: CX![]) {
		self.browse_ptr_published = Some(self.browse_ptr_proposed.clone());
		self.ptr_published = Some(self.ptr_proposed.clone());
		self.srv_published = Some(self.srv_proposed.clone());
		self.txt_published = Some(self.txt_proposed.clone());
		self.announce();
	}

	/// Clears the published records by giving them a zero TTL and broadcasting the withdrawal.
	/// Takes no `cx`: it needs nothing but the transport, which lets [`Drop`] call it too.
	fn farewell(&mut self) {
		if let Some(r) = &mut self.ptr_published {
			r.ttl = 0;
		}
		if let Some(r) = &mut self.srv_published {
			r.ttl = 0;
		}
		if let Some(r) = &mut self.txt_published {
			r.ttl = 0;
		}
		self.announce();
	}

	/// Broadcast the currently published PTR, SRV and TXT — never the browse-PTR, which is only
	/// ever sent in reply to a direct query for it.
	fn announce(&mut self) {
		let (Some(ptr), Some(srv), Some(txt)) = (&self.ptr_published, &self.srv_published, &self.txt_published) else { return };
		let message = Message::response(vec![ptr.clone(), srv.clone(), txt.clone()]);
		self.transport.borrow_mut().send_to_all(&message);
	}

	fn on_message(&mut self, _cx: CX![], message: Message) {
		if !self.confirmed || message.is_response {
			return;
		}

		let (Some(ptr), Some(srv), Some(txt)) = (self.ptr_published.clone(), self.srv_published.clone(), self.txt_published.clone()) else { return };

		let wanted = wanted_records(&message, &ptr, &srv, &txt);
		if !(wanted.browse_ptr || wanted.ptr || wanted.srv || wanted.txt) {
			return;
		}

		let mut records = Vec::new();
		if wanted.browse_ptr {
			if let Some(r) = &self.browse_ptr_published {
				records.push(r.clone());
			}
		}
		if wanted.ptr {
			records.push(ptr);
		}
		if wanted.srv {
			records.push(srv);
		}
		if wanted.txt {
			records.push(txt);
		}

		let reply = build_reply(&message, records);
		self.transport.borrow_mut().send(&reply);
	}

	/// Called via a forward wired up at construction time from the hostname registrar's
	/// `subscribe_changed`, whenever the registered name changes.
	pub(crate) fn on_hostname_changed(&mut self, cx: CX![], name: String) {
		if let RecordData::Srv(Srv { target, .. }) = &mut self.srv_proposed.data {
			*target = name;
		}

		if self.initialized {
			self.confirm(cx);
		}
	}
}

impl Drop for Provider {
	/// Sends a farewell for whatever is currently published, mirroring `~ProviderPrivate()`'s
	/// `if (confirmed) farewell()`. Stakker actor teardown can't hand a `drop` impl a `Cx`, which
	/// is exactly why `farewell`/`announce` take none — only the transport handle, which `Drop`
	/// already owns by the time this runs.
	fn drop(&mut self) {
		if self.confirmed {
			self.farewell();
		}
	}
}

#[derive(Debug, Default, PartialEq, Eq)]
struct WantedRecords {
	browse_ptr: bool,
	ptr: bool,
	srv: bool,
	txt: bool,
}

/// Which of the four published records `message`'s queries ask for, after known-answer
/// suppression drops anything the asker already listed as an answer it already holds.
///
/// A query for the type-PTR also pulls in SRV and TXT, matching a resolver that has only just
/// learned of the service and wants the rest of the record set in the same round trip.
fn wanted_records(message: &Message, ptr: &Record, srv: &Record, txt: &Record) -> WantedRecords {
	let mut wanted = WantedRecords::default();

	for query in &message.queries {
		if query.record_type == Ptr::TYPE_NUMBER && query.name == BROWSE_META_TYPE {
			wanted.browse_ptr = true;
		} else if query.record_type == Ptr::TYPE_NUMBER && query.name == ptr.name {
			wanted.ptr = true;
		} else if query.record_type == Srv::TYPE_NUMBER && query.name == srv.name {
			wanted.srv = true;
		} else if query.record_type == Txt::TYPE_NUMBER && query.name == txt.name {
			wanted.txt = true;
		}
	}

	for record in &message.records {
		if record.matches_ignoring_ttl(ptr) {
			wanted.ptr = false;
		} else if record.matches_ignoring_ttl(srv) {
			wanted.srv = false;
		} else if record.matches_ignoring_ttl(txt) {
			wanted.txt = false;
		}
	}

	if wanted.ptr {
		wanted.srv = true;
		wanted.txt = true;
	}

	wanted
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ptr_record() -> Record {
		Record { name: "_ipp._tcp.local.".to_string(), flush_cache: false, ttl: 4500, data: RecordData::Ptr(Ptr { target: "printer-7._ipp._tcp.local.".to_string() }) }
	}

	fn srv_record() -> Record {
		Record {
			name: "printer-7._ipp._tcp.local.".to_string(),
			flush_cache: true,
			ttl: 4500,
			data: RecordData::Srv(Srv { priority: 0, weight: 0, port: 631, target: "host.local.".to_string() }),
		}
	}

	fn txt_record() -> Record {
		Record { name: "printer-7._ipp._tcp.local.".to_string(), flush_cache: true, ttl: 4500, data: RecordData::Txt(Txt { attributes: Vec::new() }) }
	}

	fn query_for(name: &str, record_type: u16) -> Message {
		Message::query(0, vec![mdns_wire::Query { name: name.to_string(), record_type, unicast_response: false }])
	}

	#[test]
	fn a_ptr_query_also_pulls_in_srv_and_txt() {
		let message = query_for("_ipp._tcp.local.", Ptr::TYPE_NUMBER);
		let wanted = wanted_records(&message, &ptr_record(), &srv_record(), &txt_record());
		assert_eq!(wanted, WantedRecords { browse_ptr: false, ptr: true, srv: true, txt: true });
	}

	#[test]
	fn known_answer_suppression_drops_a_record_the_asker_already_has() {
		let mut message = query_for("_ipp._tcp.local.", Ptr::TYPE_NUMBER);
		message.records.push(ptr_record());
		let wanted = wanted_records(&message, &ptr_record(), &srv_record(), &txt_record());
		assert_eq!(wanted, WantedRecords { browse_ptr: false, ptr: false, srv: true, txt: true });
	}

	#[test]
	fn an_unrelated_query_wants_nothing() {
		let message = query_for("_http._tcp.local.", Ptr::TYPE_NUMBER);
		let wanted = wanted_records(&message, &ptr_record(), &srv_record(), &txt_record());
		assert_eq!(wanted, WantedRecords::default());
	}

	#[test]
	fn browse_meta_query_only_wants_the_browse_ptr() {
		let message = query_for(BROWSE_META_TYPE, Ptr::TYPE_NUMBER);
		let wanted = wanted_records(&message, &ptr_record(), &srv_record(), &txt_record());
		assert_eq!(wanted, WantedRecords { browse_ptr: true, ptr: false, srv: false, txt: false });
	}
}
