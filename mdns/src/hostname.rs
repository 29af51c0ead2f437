use std::cell::RefCell;
use std::net::IpAddr;
use std::rc::Rc;

use stakker::{fwd_to, Actor, FixedTimerKey, Fwd, CX};

use mdns_wire::{Aaaa, Message, Query, Record, RecordData, Wire, A};

use crate::bus::MessageBus;
use crate::config::Config;
use crate::naming::{hostname_base, propose};
use crate::reply::build_reply;
use crate::transport::{Interfaces, LocalName, SharedTransport};

/// A snapshot of the registrar's state, readable synchronously by other actors (the provider
/// needs to know, at the moment it is asked to publish, whether a name is currently held).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostnameState {
	pub name: String,
	pub registered: bool,
}

pub type SharedHostname = Rc<RefCell<HostnameState>>;

/// Acquires and holds a unique `*.local.` name, serving A/AAAA for it once registered.
///
/// Probing is cooperative, not adversarial: a conflicting response just bumps a numeric suffix
/// and tries again, on the same 2s timer used to decide "nobody objected".
pub struct Hostname {
	transport: SharedTransport,
	interfaces: Rc<dyn Interfaces>,
	config: Rc<Config>,

	wanted: String,
	previous: Option<String>,
	current: String,
	suffix: u32,
	registered: bool,
	shared: SharedHostname,

	registration_timer: FixedTimerKey,
	rebroadcast_timer: FixedTimerKey,

	changed: Vec<Fwd<String>>,
}

impl Hostname {
	pub fn init(
		cx: CX![],
		transport: SharedTransport,
		bus: Actor<MessageBus>,
		interfaces: Rc<dyn Interfaces>,
		local_name: &dyn LocalName,
		config: Rc<Config>,
	) -> Option<Self> {
		let actor = cx.access_actor().clone();
		cx.defer(move |s| {
			bus.apply(s, move |bus, cx| bus.subscribe_messages(cx, fwd_to!([actor], on_message() as (Message))));
		});

		let mut this = Self {
			transport,
			interfaces,
			config,
			wanted: local_name.local_name(),
			previous: None,
			current: String::new(),
			suffix: 1,
			registered: false,
			shared: Rc::new(RefCell::new(HostnameState::default())),
			registration_timer: FixedTimerKey::default(),
			rebroadcast_timer: FixedTimerKey::default(),
			changed: Vec::new(),
		};
		this.on_rebroadcast_timeout(cx);
		Some(this)
	}

	pub fn is_registered(&self) -> bool {
		self.registered
	}

	pub fn hostname(&self) -> &str {
		&self.current
	}

	/// A cheap, cloneable handle other actors can read synchronously, without round-tripping
	/// through this actor's mailbox.
	pub fn handle(&self) -> SharedHostname {
		self.shared.clone()
	}

	pub fn subscribe_changed(&mut self, _cx: CX![], fwd: Fwd<String>) {
		self.changed.push(fwd);
	}

	fn assert_hostname(&mut self, cx: CX![]) {
		self.current = propose(&hostname_base(&self.wanted), ".local.", self.suffix);

		let message = Message::query(
			0,
			vec![
				Query { name: self.current.clone(), record_type: A::TYPE_NUMBER, unicast_response: false },
				Query { name: self.current.clone(), record_type: Aaaa::TYPE_NUMBER, unicast_response: false },
			],
		);
		self.transport.borrow_mut().send_to_all(&message);

		cx.timer_del(self.registration_timer);
		let actor = cx.access_actor().clone();
		self.registration_timer = cx.after(self.config.probe_timeout, move |s| actor.apply(s, |this, cx| this.on_registration_timeout(cx)));
	}

	/// Find the local address of `record_type`'s family that lives on whichever interface owns
	/// the subnet `src` arrived from.
	fn generate_record(&self, src: IpAddr, record_type: u16) -> Option<Record> {
		let entries = self.interfaces.addresses();
		let owning_interface = entries.iter().find(|e| e.network.contains(&src))?.interface_index;

		let address = entries.iter().filter(|e| e.interface_index == owning_interface).find(|e| match record_type {
			t if t == A::TYPE_NUMBER => e.address.is_ipv4(),
			t if t == Aaaa::TYPE_NUMBER => e.address.is_ipv6(),
			_ => false,
		})?;

		let data = match address.address {
			IpAddr::V4(v4) => RecordData::A(A { address: v4 }),
			IpAddr::V6(v6) => RecordData::Aaaa(Aaaa { address: v6 }),
		};

		Some(Record { name: self.current.clone(), flush_cache: false, ttl: self.config.default_record_ttl, data })
	}

	fn on_message(&mut self, cx: CX![], message: Message) {
		if message.is_response {
			if self.registered {
				return;
			}
			for record in &message.records {
				let is_address = matches!(record.data, RecordData::A(_) | RecordData::Aaaa(_));
				if is_address && record.name == self.current {
					self.suffix += 1;
					self.assert_hostname(cx);
				}
			}
		} else {
			if !self.registered {
				return;
			}
			let Some(peer) = message.peer_address else { return };

			let mut records = Vec::new();
			for query in &message.queries {
				let is_address_query = query.record_type == A::TYPE_NUMBER || query.record_type == Aaaa::TYPE_NUMBER;
				if is_address_query && query.name == self.current {
					if let Some(record) = self.generate_record(peer, query.record_type) {
						records.push(record);
					}
				}
			}

			if !records.is_empty() {
				let reply = build_reply(&message, records);
				self.transport.borrow_mut().send(&reply);
			}
		}
	}

	fn on_registration_timeout(&mut self, cx: CX![]) {
		self.registered = true;
		*self.shared.borrow_mut() = HostnameState { name: self.current.clone(), registered: true };

		if self.previous.as_deref() != Some(self.current.as_str()) {
			let name = self.current.clone();
			for sub in &self.changed {
				sub.fwd(name.clone());
			}
		}

		cx.timer_del(self.rebroadcast_timer);
		let actor = cx.access_actor().clone();
		self.rebroadcast_timer = cx.after(self.config.rebroadcast_interval, move |s| actor.apply(s, |this, cx| this.on_rebroadcast_timeout(cx)));
	}

	fn on_rebroadcast_timeout(&mut self, cx: CX![]) {
		self.previous = Some(self.current.clone());
		self.registered = false;
		self.suffix = 1;
		self.shared.borrow_mut().registered = false;
		self.assert_hostname(cx);
	}
}

#[cfg(test)]
mod tests {
	use std::net::Ipv4Addr;

	use super::*;
	use crate::testing::{FakeInterfaces, FakeLocalName};

	#[test]
	fn hostname_base_strips_dots_from_a_dotted_local_name() {
		assert_eq!(hostname_base(&FakeLocalName::new("my.laptop").local_name()), "my-laptop");
	}

	#[test]
	fn generate_record_needs_no_actor_to_pick_the_right_family() {
		let interfaces = FakeInterfaces::single_ipv4(Ipv4Addr::new(192, 168, 1, 2));
		let entries = interfaces.addresses();
		assert_eq!(entries.len(), 1);
		assert!(entries[0].network.contains(&IpAddr::V4(Ipv4Addr::new(192, 168, 1, 5))));
	}
}
