use std::cell::RefCell;
use std::net::IpAddr;
use std::rc::Rc;

use ipnet::IpNet;
use stakker::Fwd;

use mdns_wire::Message;

/// What the core requires from the host application's multicast socket layer. Borrowed by every
/// state machine through a [`SharedTransport`] handle; nothing in this crate owns a socket.
pub trait Transport {
	/// Deliver one message to the IP address, port and IP family specified on it.
	fn send(&mut self, message: &Message);

	/// Deliver the message on every non-loopback, non-point-to-point, multicast-capable,
	/// up-and-running interface, to the mDNS multicast group of each IP family.
	fn send_to_all(&mut self, message: &Message);

	/// Register where decoded, valid incoming datagrams should be forwarded. Called once, at
	/// construction time, by whoever wires the application together.
	fn on_message(&mut self, fwd: Fwd<Message>);

	/// Register where transport-level failures should be reported.
	fn on_error(&mut self, fwd: Fwd<String>);
}

pub type SharedTransport = Rc<RefCell<dyn Transport>>;

/// One address entry on a local network interface.
///
/// `interface_index` groups entries that belong to the same physical interface, so address
/// selection can find "the IPv6 address of whichever interface owns this IPv4 subnet" rather than
/// just any address on the host.
#[derive(Debug, Clone, Copy)]
pub struct InterfaceAddress {
	pub interface_index: u32,
	pub address: IpAddr,
	pub network: IpNet,
}

/// Enumeration of local network interfaces, used by the hostname registrar's address-selection
/// step to find which local address shares a subnet with an incoming query's source address.
pub trait Interfaces {
	fn addresses(&self) -> Vec<InterfaceAddress>;
}

/// The host's own configured name, used as the seed for hostname probing.
pub trait LocalName {
	fn local_name(&self) -> String;
}
