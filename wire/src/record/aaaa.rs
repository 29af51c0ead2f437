use std::net::Ipv6Addr;

use super::Wire;
use crate::error::WireError;
use crate::reader::Reader;
use crate::writer::NameOffsets;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aaaa {
	pub address: Ipv6Addr,
}

impl Wire for Aaaa {
	const TYPE_NUMBER: u16 = 28;

	fn read(_len: u16, r: &mut Reader) -> Result<Self, WireError> {
		let b = r.read_bytes(16)?;
		let mut octets = [0u8; 16];
		octets.copy_from_slice(b);
		Ok(Aaaa { address: Ipv6Addr::from(octets) })
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
		let rec = Aaaa { address: Ipv6Addr::LOCALHOST };
		let mut out = Vec::new();
		rec.write(&mut out, &mut NameOffsets::new());
		assert_eq!(out.len(), 16);

		let mut r = Reader::new(&out);
		assert_eq!(Aaaa::read(16, &mut r).unwrap(), rec);
	}
}
