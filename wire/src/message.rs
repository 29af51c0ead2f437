use std::net::IpAddr;

use crate::error::WireError;
use crate::reader::Reader;
use crate::record::RecordData;
use crate::writer::{write_name, write_u16, write_u32, NameOffsets};

/// Wildcard query type, matching every record type for a name.
pub const TYPE_ANY: u16 = 255;

const CLASS_IN: u16 = 1;
const CLASS_FLUSH_OR_UNICAST: u16 = 0x8000;

const FLAG_RESPONSE: u16 = 0x8000;
const FLAG_AUTHORITATIVE: u16 = 0x0400;
const FLAG_TRUNCATED: u16 = 0x0200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
	pub name: String,
	pub record_type: u16,
	pub unicast_response: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
	pub name: String,
	pub flush_cache: bool,
	pub ttl: u32,
	pub data: RecordData,
}

impl Record {
	pub fn record_type(&self) -> u16 {
		self.data.type_number()
	}

	/// Same name and record data as `other`, ignoring TTL and the cache-flush bit.
	///
	/// This is the identity used to refresh an existing cache entry and for known-answer
	/// suppression: a record re-announced with a different (or simply elapsed) TTL is still the
	/// same answer, and an asker's echoed "known answer" carries whatever TTL it happened to
	/// have cached, not ours.
	pub fn matches_ignoring_ttl(&self, other: &Record) -> bool {
		self.name == other.name && self.data == other.data
	}
}

/// A fully decoded (or not-yet-addressed, for outgoing messages) DNS message.
///
/// `peer_address`/`peer_port` are never populated by [`parse`]; they are filled in by whatever
/// received the datagram, once it knows who sent it. [`serialize`] ignores them entirely — this
/// module only turns bytes into structure and back, it never touches a socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
	pub peer_address: Option<IpAddr>,
	pub peer_port: u16,
	pub transaction_id: u16,
	pub is_response: bool,
	pub is_truncated: bool,
	pub queries: Vec<Query>,
	pub records: Vec<Record>,
}

impl Message {
	pub fn query(transaction_id: u16, queries: Vec<Query>) -> Self {
		Message {
			peer_address: None,
			peer_port: 0,
			transaction_id,
			is_response: false,
			is_truncated: false,
			queries,
			records: Vec::new(),
		}
	}

	pub fn response(records: Vec<Record>) -> Self {
		Message {
			peer_address: None,
			peer_port: 0,
			transaction_id: 0,
			is_response: true,
			is_truncated: false,
			queries: Vec::new(),
			records,
		}
	}
}

pub fn parse(bytes: &[u8]) -> Result<Message, WireError> {
	let mut r = Reader::new(bytes);

	let transaction_id = r.read_u16()?;
	let flags = r.read_u16()?;
	let qdcount = r.read_u16()?;
	let ancount = r.read_u16()?;
	let nscount = r.read_u16()?;
	let arcount = r.read_u16()?;

	let is_response = flags & FLAG_RESPONSE != 0;
	let is_truncated = flags & FLAG_TRUNCATED != 0;

	let mut queries = Vec::with_capacity(qdcount as usize);
	for _ in 0..qdcount {
		let name = r.read_name()?;
		let record_type = r.read_u16()?;
		let class = r.read_u16()?;
		queries.push(Query { name, record_type, unicast_response: class & CLASS_FLUSH_OR_UNICAST != 0 });
	}

	let total_records = ancount as u32 + nscount as u32 + arcount as u32;
	let mut records = Vec::with_capacity(total_records as usize);
	for _ in 0..total_records {
		let name = r.read_name()?;
		let type_number = r.read_u16()?;
		let class = r.read_u16()?;
		let ttl = r.read_u32()?;
		let len = r.read_u16()?;

		if r.remaining() < len as usize {
			return Err(WireError::RecordTooLong { declared: len, remaining: r.remaining() });
		}

		let data_start = r.position();
		let decoded = RecordData::read(type_number, len, &mut r)?;

		let end = data_start + len as usize;
		if r.position() < end {
			r.skip(end - r.position())?;
		}

		if let Some(data) = decoded {
			records.push(Record { name, flush_cache: class & CLASS_FLUSH_OR_UNICAST != 0, ttl, data });
		} else {
			log::trace!("skipping unsupported record type {type_number} for {name}");
		}
	}

	Ok(Message { peer_address: None, peer_port: 0, transaction_id, is_response, is_truncated, queries, records })
}

pub fn serialize(msg: &Message) -> Vec<u8> {
	let mut out = Vec::with_capacity(128);

	let mut flags = 0u16;
	if msg.is_response {
		flags |= FLAG_RESPONSE | FLAG_AUTHORITATIVE;
	}
	if msg.is_truncated {
		flags |= FLAG_TRUNCATED;
	}

	write_u16(&mut out, msg.transaction_id);
	write_u16(&mut out, flags);
	write_u16(&mut out, msg.queries.len() as u16);
	write_u16(&mut out, msg.records.len() as u16);
	write_u16(&mut out, 0);
	write_u16(&mut out, 0);

	let mut offsets = NameOffsets::new();

	for q in &msg.queries {
		write_name(&mut out, &q.name, &mut offsets);
		write_u16(&mut out, q.record_type);
		write_u16(&mut out, CLASS_IN | if q.unicast_response { CLASS_FLUSH_OR_UNICAST } else { 0 });
	}

	for rec in &msg.records {
		write_record(&mut out, rec, &mut offsets);
	}

	out
}

fn write_record(out: &mut Vec<u8>, rec: &Record, offsets: &mut NameOffsets) {
	write_name(out, &rec.name, offsets);
	write_u16(out, rec.record_type());
	write_u16(out, CLASS_IN | if rec.flush_cache { CLASS_FLUSH_OR_UNICAST } else { 0 });
	write_u32(out, rec.ttl);

	let len_pos = out.len();
	write_u16(out, 0);
	let payload_start = out.len();
	rec.data.write(out, offsets);
	let payload_len = (out.len() - payload_start) as u16;
	out[len_pos] = (payload_len >> 8) as u8;
	out[len_pos + 1] = (payload_len & 0xff) as u8;
}

#[cfg(test)]
mod tests {
	use std::net::Ipv4Addr;

	use pretty_assertions::assert_eq;

	use super::*;
	use crate::record::{Ptr, A};

	#[test]
	fn round_trips_a_query_message() {
		let msg = Message::query(
			0x1234,
			vec![Query { name: "_ipp._tcp.local.".to_string(), record_type: TYPE_ANY, unicast_response: false }],
		);
		let bytes = serialize(&msg);
		let decoded = parse(&bytes).unwrap();
		assert_eq!(decoded.transaction_id, msg.transaction_id);
		assert_eq!(decoded.queries, msg.queries);
		assert!(!decoded.is_response);
	}

	#[test]
	fn round_trips_a_response_with_shared_name_compression() {
		let msg = Message::response(vec![
			Record {
				name: "_ipp._tcp.local.".to_string(),
				flush_cache: false,
				ttl: 120,
				data: RecordData::Ptr(Ptr { target: "printer-7._ipp._tcp.local.".to_string() }),
			},
			Record {
				name: "printer-7.local.".to_string(),
				flush_cache: true,
				ttl: 120,
				data: RecordData::A(A { address: Ipv4Addr::new(192, 168, 1, 7) }),
			},
		]);

		let bytes = serialize(&msg);
		let decoded = parse(&bytes).unwrap();
		assert_eq!(decoded.records, msg.records);
		assert!(decoded.is_response);
		assert!(decoded.records[1].flush_cache);
		assert!(!decoded.records[0].flush_cache);

		// the second record's target name reuses the "local." suffix written by the first,
		// which only holds if the compression pointer logic actually fired.
		assert!(bytes.len() < 90);
	}

	#[test]
	fn skips_an_unsupported_record_type_without_failing() {
		let mut bytes = vec![0, 0, 0x84, 0, 0, 0, 0, 1, 0, 0, 0, 0];
		// name "a." + type 5 (CNAME, unsupported) + class IN + ttl 0 + rdlength 2 + 2 junk bytes
		bytes.extend_from_slice(&[1, b'a', 0]);
		bytes.extend_from_slice(&[0, 5]);
		bytes.extend_from_slice(&[0, 1]);
		bytes.extend_from_slice(&[0, 0, 0, 0]);
		bytes.extend_from_slice(&[0, 2]);
		bytes.extend_from_slice(&[0xff, 0xff]);

		let decoded = parse(&bytes).unwrap();
		assert!(decoded.records.is_empty());
	}

	#[test]
	fn rejects_a_record_whose_length_overruns_the_message() {
		let mut bytes = vec![0, 0, 0x84, 0, 0, 0, 0, 1, 0, 0, 0, 0];
		bytes.extend_from_slice(&[1, b'a', 0]);
		bytes.extend_from_slice(&[0, 1]);
		bytes.extend_from_slice(&[0, 1]);
		bytes.extend_from_slice(&[0, 0, 0, 0]);
		bytes.extend_from_slice(&[0, 100]);

		assert_eq!(parse(&bytes), Err(WireError::RecordTooLong { declared: 100, remaining: 0 }));
	}

	#[test]
	fn rejects_a_query_name_pointer_into_the_header() {
		let mut bytes = vec![0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0];
		// pointer at offset 12 (right after the header) targeting offset 0 (inside the header)
		bytes.push(0xc0);
		bytes.push(0x00);
		bytes.extend_from_slice(&[0, 1]);
		bytes.extend_from_slice(&[0, 1]);

		assert_eq!(parse(&bytes), Err(WireError::PointerLoop { pointer_offset: 12, target: 0 }));
	}

	#[test]
	fn matches_ignoring_ttl_treats_a_refreshed_record_as_the_same() {
		let a = Record { name: "host.local.".to_string(), flush_cache: false, ttl: 120, data: RecordData::A(A { address: Ipv4Addr::new(192, 168, 1, 7) }) };
		let b = Record { name: "host.local.".to_string(), flush_cache: true, ttl: 4500, data: RecordData::A(A { address: Ipv4Addr::new(192, 168, 1, 7) }) };
		assert!(a.matches_ignoring_ttl(&b));
	}

	#[test]
	fn matches_ignoring_ttl_still_distinguishes_different_data() {
		let a = Record { name: "host.local.".to_string(), flush_cache: false, ttl: 120, data: RecordData::A(A { address: Ipv4Addr::new(192, 168, 1, 7) }) };
		let b = Record { name: "host.local.".to_string(), flush_cache: false, ttl: 120, data: RecordData::A(A { address: Ipv4Addr::new(192, 168, 1, 8) }) };
		assert!(!a.matches_ignoring_ttl(&b));
	}
}
