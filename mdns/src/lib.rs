//! mDNS service discovery and advertisement.
//!
//! This crate implements the protocol core — the hostname registrar, the record-uniqueness
//! prober, the service browser, the host resolver and the service provider — against the three
//! boundary traits in [`transport`]. It never opens a socket, enumerates interfaces, or looks up
//! the local hostname itself; an embedding application supplies all three.

use std::net::{Ipv4Addr, Ipv6Addr};

pub mod bus;
pub mod config;
pub mod hostname;
pub mod naming;
pub mod prober;
pub mod provider;
pub mod reply;
pub mod resolver;
pub mod service;
pub mod testing;
pub mod transport;

mod browser;

pub use bus::MessageBus;
pub use config::Config;
pub use hostname::Hostname;
pub use prober::Prober;
pub use provider::Provider;
pub use resolver::Resolver;
pub use service::Service;
pub use transport::{InterfaceAddress, Interfaces, LocalName, SharedTransport, Transport};

pub use browser::Browser;

pub const MDNS_PORT: u16 = 5353;
pub const MULTICAST_IPV4: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);
pub const MULTICAST_IPV6: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 0xfb);
pub const BROWSE_META_TYPE: &str = "_services._dns-sd._udp.local.";
