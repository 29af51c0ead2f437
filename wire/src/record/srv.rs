use super::Wire;
use crate::error::WireError;
use crate::reader::Reader;
use crate::writer::{write_name, write_u16, NameOffsets};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Srv {
	pub priority: u16,
	pub weight: u16,
	pub port: u16,
	pub target: String,
}

impl Wire for Srv {
	const TYPE_NUMBER: u16 = 33;

	fn read(_len: u16, r: &mut Reader) -> Result<Self, WireError> {
		let priority = r.read_u16()?;
		let weight = r.read_u16()?;
		let port = r.read_u16()?;
		let target = r.read_name()?;
		Ok(Srv { priority, weight, port, target })
	}

	fn write(&self, out: &mut Vec<u8>, offsets: &mut NameOffsets) {
		write_u16(out, self.priority);
		write_u16(out, self.weight);
		write_u16(out, self.port);
		write_name(out, &self.target, offsets);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips() {
		let rec = Srv { priority: 0, weight: 0, port: 631, target: "printer-7.local.".to_string() };
		let mut out = Vec::new();
		rec.write(&mut out, &mut NameOffsets::new());

		let mut r = Reader::new(&out);
		assert_eq!(Srv::read(out.len() as u16, &mut r).unwrap(), rec);
	}
}
