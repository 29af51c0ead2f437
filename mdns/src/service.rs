use std::net::{Ipv4Addr, Ipv6Addr};

use mdns_wire::TxtAttribute;

/// A discovered or locally-advertised service instance.
///
/// The fully-qualified name under which it is known on the wire is `name + "." + type` — e.g.
/// `{name: "printer-7", type: "_ipp._tcp.local."}` is `printer-7._ipp._tcp.local.`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Service {
	pub name: String,
	pub service_type: String,
	pub hostname: String,
	pub port: u16,
	pub ipv4: Option<Ipv4Addr>,
	pub ipv6: Option<Ipv6Addr>,
	pub attributes: Vec<TxtAttribute>,
}

impl Service {
	pub fn fqdn(&self) -> String {
		format!("{}.{}", self.name, self.service_type)
	}
}
