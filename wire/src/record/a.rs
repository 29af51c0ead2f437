use std::net::Ipv4Addr;

use super::Wire;
use crate::error::WireError;
use crate::reader::Reader;
use crate::writer::NameOffsets;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct A {
	pub address: Ipv4Addr,
}

impl Wire for A {
	const TYPE_NUMBER: u16 = 1;

	fn read(_len: u16, r: &mut Reader) -> Result<Self, WireError> {
		let b = r.read_bytes(4)?;
		Ok(A { address: Ipv4Addr::new(b[0], b[1], b[2], b[3]) })
	}

	fn write(&self, out: &mut Vec<u8>, _offsets: &mut NameOffsets) {
		out.extend_from_slice(&self.address.octets());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips() {
		let rec = A { address: Ipv4Addr::new(192, 168, 1, 42) };
		let mut out = Vec::new();
		rec.write(&mut out, &mut NameOffsets::new());
		assert_eq!(out, [192, 168, 1, 42]);

		let mut r = Reader::new(&out);
		assert_eq!(A::read(4, &mut r).unwrap(), rec);
	}
}
