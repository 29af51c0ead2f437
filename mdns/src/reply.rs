use std::net::IpAddr;

use mdns_wire::{Message, Record};

use crate::{MDNS_PORT, MULTICAST_IPV4, MULTICAST_IPV6};

/// Where a reply to `to` should be sent: the mDNS multicast group of `to`'s IP family if it
/// arrived on the standard mDNS port, otherwise straight back to its source (a legacy unicast
/// query).
fn reply_destination(to: &Message) -> (IpAddr, u16) {
	if to.peer_port == MDNS_PORT {
		let addr = match to.peer_address {
			Some(IpAddr::V6(_)) => IpAddr::V6(MULTICAST_IPV6),
			_ => IpAddr::V4(MULTICAST_IPV4),
		};
		(addr, MDNS_PORT)
	} else {
		(to.peer_address.expect("a received message always carries its source address"), to.peer_port)
	}
}

/// Build a response to `to` carrying `records`, addressed per [`reply_destination`].
pub fn build_reply(to: &Message, records: Vec<Record>) -> Message {
	let (peer_address, peer_port) = reply_destination(to);
	Message {
		peer_address: Some(peer_address),
		peer_port,
		transaction_id: to.transaction_id,
		is_response: true,
		is_truncated: false,
		queries: Vec::new(),
		records,
	}
}

#[cfg(test)]
mod tests {
	use std::net::Ipv4Addr;

	use super::*;

	fn query_from(peer: IpAddr, port: u16) -> Message {
		Message { peer_address: Some(peer), peer_port: port, transaction_id: 0, is_response: false, is_truncated: false, queries: Vec::new(), records: Vec::new() }
	}

	#[test]
	fn replies_to_multicast_queries_go_to_the_group_address() {
		let to = query_from(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 5)), MDNS_PORT);
		let reply = build_reply(&to, Vec::new());
		assert_eq!(reply.peer_address, Some(IpAddr::V4(MULTICAST_IPV4)));
		assert_eq!(reply.peer_port, MDNS_PORT);
		assert!(reply.is_response);
	}

	#[test]
	fn replies_to_unicast_queries_go_back_to_the_source() {
		let peer = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 5));
		let to = query_from(peer, 9999);
		let reply = build_reply(&to, Vec::new());
		assert_eq!(reply.peer_address, Some(peer));
		assert_eq!(reply.peer_port, 9999);
	}
}
