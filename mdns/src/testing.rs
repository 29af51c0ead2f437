//! In-memory test doubles for the [`Transport`], [`Interfaces`] and [`LocalName`] boundary
//! traits, so state-machine logic can be exercised without a real socket or real interface list.

use std::net::{IpAddr, Ipv4Addr};

use ipnet::IpNet;
use stakker::Fwd;

use mdns_wire::Message;

use crate::transport::{InterfaceAddress, Interfaces, LocalName, Transport};

/// Records every message handed to [`FakeTransport::send`]/[`send_to_all`] instead of putting
/// it on a wire, so tests can assert on exactly what a component tried to transmit.
#[derive(Default)]
pub struct FakeTransport {
	pub sent: Vec<Message>,
	pub broadcast: Vec<Message>,
	on_message: Option<Fwd<Message>>,
	on_error: Option<Fwd<String>>,
}

impl FakeTransport {
	pub fn new() -> Self {
		Self::default()
	}

	/// Simulate an inbound datagram by delivering it straight to whatever subscribed via
	/// [`Transport::on_message`].
	pub fn deliver(&self, message: Message) {
		if let Some(fwd) = &self.on_message {
			fwd.fwd(message);
		}
	}

	pub fn raise_error(&self, err: impl Into<String>) {
		if let Some(fwd) = &self.on_error {
			fwd.fwd(err.into());
		}
	}
}

impl Transport for FakeTransport {
	fn send(&mut self, message: &Message) {
		self.sent.push(message.clone());
	}

	fn send_to_all(&mut self, message: &Message) {
		self.broadcast.push(message.clone());
	}

	fn on_message(&mut self, fwd: Fwd<Message>) {
		self.on_message = Some(fwd);
	}

	fn on_error(&mut self, fwd: Fwd<String>) {
		self.on_error = Some(fwd);
	}
}

/// A fixed, fabricated set of local interface addresses.
#[derive(Default)]
pub struct FakeInterfaces {
	pub entries: Vec<InterfaceAddress>,
}

impl FakeInterfaces {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, interface_index: u32, address: IpAddr, network: IpNet) -> Self {
		self.entries.push(InterfaceAddress { interface_index, address, network });
		self
	}

	/// A single IPv4 entry on the conventional `192.168.1.0/24` test subnet, with the host at
	/// `.2` — convenient for tests that just need "some local address".
	pub fn single_ipv4(host: Ipv4Addr) -> Self {
		Self::new().with(0, IpAddr::V4(host), IpNet::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 0)), 24).expect("valid prefix length"))
	}
}

impl Interfaces for FakeInterfaces {
	fn addresses(&self) -> Vec<InterfaceAddress> {
		self.entries.clone()
	}
}

pub struct FakeLocalName(pub String);

impl FakeLocalName {
	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}
}

impl LocalName for FakeLocalName {
	fn local_name(&self) -> String {
		self.0.clone()
	}
}
