use stakker::{fwd_to, Fwd, CX};

use mdns_wire::Message;

use crate::transport::SharedTransport;

/// Fans every inbound message (and transport error) out to every subscribed state machine.
///
/// The transport calls back into exactly one `Fwd<Message>`/`Fwd<String>` pair, registered once
/// at construction — this actor is that one subscriber, and re-broadcasts to everyone who
/// actually cares, matching "every subscriber receives every inbound message, in receive order".
pub struct MessageBus {
	messages: Vec<Fwd<Message>>,
	errors: Vec<Fwd<String>>,
}

impl MessageBus {
	pub fn init(cx: CX![], transport: SharedTransport) -> Option<Self> {
		transport.borrow_mut().on_message(fwd_to!([cx], dispatch() as (Message)));
		transport.borrow_mut().on_error(fwd_to!([cx], dispatch_error() as (String)));

		Some(Self { messages: Vec::new(), errors: Vec::new() })
	}

	pub fn subscribe_messages(&mut self, _cx: CX![], fwd: Fwd<Message>) {
		self.messages.push(fwd);
	}

	pub fn subscribe_errors(&mut self, _cx: CX![], fwd: Fwd<String>) {
		self.errors.push(fwd);
	}

	fn dispatch(&mut self, _cx: CX![], message: Message) {
		for sub in &self.messages {
			sub.fwd(message.clone());
		}
	}

	fn dispatch_error(&mut self, _cx: CX![], err: String) {
		log::warn!("transport error: {err}");
		for sub in &self.errors {
			sub.fwd(err.clone());
		}
	}
}
