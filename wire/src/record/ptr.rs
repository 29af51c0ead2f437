use super::Wire;
use crate::error::WireError;
use crate::reader::Reader;
use crate::writer::{write_name, NameOffsets};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ptr {
	pub target: String,
}

impl Wire for Ptr {
	const TYPE_NUMBER: u16 = 12;

	fn read(_len: u16, r: &mut Reader) -> Result<Self, WireError> {
		Ok(Ptr { target: r.read_name()? })
	}

	fn write(&self, out: &mut Vec<u8>, offsets: &mut NameOffsets) {
		write_name(out, &self.target, offsets);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips() {
		let rec = Ptr { target: "my-printer._ipp._tcp.local.".to_string() };
		let mut out = Vec::new();
		rec.write(&mut out, &mut NameOffsets::new());

		let mut r = Reader::new(&out);
		assert_eq!(Ptr::read(out.len() as u16, &mut r).unwrap(), rec);
	}
}
