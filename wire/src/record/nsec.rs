use super::Wire;
use crate::error::WireError;
use crate::reader::Reader;
use crate::writer::{write_name, write_u8, NameOffsets};

/// The type bitmap of a single NSEC window block. Opaque on purpose — this codec only ever
/// carries the bitmap a `Provider` built to advertise "no other record types exist for this
/// name" and never inspects individual bits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bitmap(Vec<u8>);

impl Bitmap {
	pub fn new(bytes: Vec<u8>) -> Self {
		Bitmap(bytes)
	}

	/// Set bit `type_number` (rounded into the one 32-byte window this codec supports) in an
	/// all-zero bitmap. Used by providers to announce which record types exist for a name.
	pub fn with_type(type_number: u16) -> Self {
		let byte = (type_number / 8) as usize;
		let mut bytes = vec![0u8; byte + 1];
		bytes[byte] |= 0x80 >> (type_number % 8);
		Bitmap(bytes)
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	pub fn contains(&self, type_number: u16) -> bool {
		let byte = (type_number / 8) as usize;
		self.0.get(byte).map(|b| b & (0x80 >> (type_number % 8)) != 0).unwrap_or(false)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nsec {
	pub next_domain_name: String,
	pub bitmap: Bitmap,
}

impl Wire for Nsec {
	const TYPE_NUMBER: u16 = 47;

	fn read(_len: u16, r: &mut Reader) -> Result<Self, WireError> {
		let next_domain_name = r.read_name()?;
		let block = r.read_u8()?;
		if block != 0 {
			return Err(WireError::NonZeroNsecWindow(block));
		}
		let bitmap_len = r.read_u8()?;
		let bytes = r.read_bytes(bitmap_len as usize)?;
		Ok(Nsec { next_domain_name, bitmap: Bitmap::new(bytes.to_vec()) })
	}

	fn write(&self, out: &mut Vec<u8>, offsets: &mut NameOffsets) {
		write_name(out, &self.next_domain_name, offsets);
		write_u8(out, 0);
		debug_assert!(self.bitmap.as_bytes().len() <= 32, "a single NSEC window block holds at most 32 bytes");
		write_u8(out, self.bitmap.as_bytes().len() as u8);
		out.extend_from_slice(self.bitmap.as_bytes());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips() {
		let rec = Nsec { next_domain_name: "printer-7.local.".to_string(), bitmap: Bitmap::with_type(1) };
		let mut out = Vec::new();
		rec.write(&mut out, &mut NameOffsets::new());

		let mut r = Reader::new(&out);
		assert_eq!(Nsec::read(out.len() as u16, &mut r).unwrap(), rec);
	}

	#[test]
	fn bitmap_with_type_sets_the_right_bit() {
		let bitmap = Bitmap::with_type(28); // AAAA
		assert!(bitmap.contains(28));
		assert!(!bitmap.contains(1));
		assert!(!bitmap.contains(255));
	}

	#[test]
	fn rejects_a_nonzero_window_block() {
		let mut out = Vec::new();
		write_name(&mut out, "x.local.", &mut NameOffsets::new());
		write_u8(&mut out, 1);
		write_u8(&mut out, 1);
		out.push(0);

		let mut r = Reader::new(&out);
		assert_eq!(Nsec::read(out.len() as u16, &mut r), Err(WireError::NonZeroNsecWindow(1)));
	}
}
