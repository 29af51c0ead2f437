use std::rc::Rc;

use stakker::{fwd_to, Actor, FixedTimerKey, Fwd, CX};

use mdns_wire::{Message, Query, Record, TYPE_ANY};

use crate::bus::MessageBus;
use crate::config::Config;
use crate::naming::{propose, split_at_first_dot};
use crate::transport::SharedTransport;

/// Probes a single proposed record's name for uniqueness on the local network, bumping a numeric
/// suffix and retrying whenever another host answers for the name it just tried.
///
/// Confirmation is purely an absence of objection: if nothing answers within the probe window,
/// the name is taken as unique and [`Prober::subscribe_confirmed`] fires once, for good.
pub struct Prober {
	transport: SharedTransport,
	config: Rc<Config>,

	base: String,
	suffix_part: String,
	suffix: u32,
	proposed: Record,
	confirmed: bool,

	timer: FixedTimerKey,
	confirmed_subs: Vec<Fwd<String>>,
}

impl Prober {
	pub fn init(cx: CX![], transport: SharedTransport, bus: Actor<MessageBus>, record: Record, config: Rc<Config>) -> Option<Self> {
		let actor = cx.access_actor().clone();
		cx.defer(move |s| {
			bus.apply(s, move |bus, cx| bus.subscribe_messages(cx, fwd_to!([actor], on_message() as (Message))));
		});

		let (base, suffix_part) = split_at_first_dot(&record.name);
		let (base, suffix_part) = (base.to_string(), suffix_part.to_string());

		let mut this = Self {
			transport,
			config,
			base,
			suffix_part,
			suffix: 1,
			proposed: record,
			confirmed: false,
			timer: FixedTimerKey::default(),
			confirmed_subs: Vec::new(),
		};
		this.assert_record(cx);
		Some(this)
	}

	pub fn is_confirmed(&self) -> bool {
		self.confirmed
	}

	pub fn confirmed_name(&self) -> &str {
		&self.proposed.name
	}

	pub fn subscribe_confirmed(&mut self, _cx: CX![], fwd: Fwd<String>) {
		self.confirmed_subs.push(fwd);
	}

	fn assert_record(&mut self, cx: CX![]) {
		self.proposed.name = propose(&self.base, &self.suffix_part, self.suffix);

		let query = Query { name: self.proposed.name.clone(), record_type: TYPE_ANY, unicast_response: false };
		let message = Message {
			peer_address: None,
			peer_port: 0,
			transaction_id: 0,
			is_response: false,
			is_truncated: false,
			queries: vec![query],
			records: vec![self.proposed.clone()],
		};
		self.transport.borrow_mut().send_to_all(&message);

		cx.timer_del(self.timer);
		let actor = cx.access_actor().clone();
		self.timer = cx.after(self.config.probe_timeout, move |s| actor.apply(s, |this, cx| this.on_timeout(cx)));
	}

	fn on_message(&mut self, cx: CX![], message: Message) {
		if self.confirmed || !message.is_response {
			return;
		}

		let mut conflict = false;
		for record in &message.records {
			if record.name == self.proposed.name && record.record_type() == self.proposed.record_type() {
				conflict = true;
			}
		}

		if conflict {
			self.suffix += 1;
			self.assert_record(cx);
		}
	}

	fn on_timeout(&mut self, _cx: CX![]) {
		self.confirmed = true;
		let name = self.proposed.name.clone();
		for sub in &self.confirmed_subs {
			sub.fwd(name.clone());
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_a_proposed_records_name_into_base_and_suffix() {
		let (base, suffix) = split_at_first_dot("printer-7._ipp._tcp.local.");
		assert_eq!(base, "printer-7");
		assert_eq!(suffix, "._ipp._tcp.local.");
	}
}
