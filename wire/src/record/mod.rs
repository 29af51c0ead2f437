mod a;
mod aaaa;
mod nsec;
mod ptr;
mod srv;
mod txt;

pub use a::A;
pub use aaaa::Aaaa;
pub use nsec::{Bitmap, Nsec};
pub use ptr::Ptr;
pub use srv::Srv;
pub use txt::{Txt, TxtAttribute};

use crate::error::WireError;
use crate::reader::Reader;
use crate::writer::NameOffsets;

/// Every record type this codec understands implements this: a type number plus a pair of pure
/// functions between its wire form and its in-memory representation.
pub trait Wire: Sized {
	const TYPE_NUMBER: u16;

	/// Decode the record's RDATA, which spans exactly `len` bytes starting at the reader's
	/// current position (the caller has already checked that many bytes remain).
	fn read(len: u16, r: &mut Reader) -> Result<Self, WireError>;

	/// Encode the record's RDATA. The caller writes the length prefix around this.
	fn write(&self, out: &mut Vec<u8>, offsets: &mut NameOffsets);
}

/// The RDATA of one of the six record types in scope, tagged by type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
	A(A),
	Aaaa(Aaaa),
	Ptr(Ptr),
	Srv(Srv),
	Txt(Txt),
	Nsec(Nsec),
}

impl RecordData {
	pub fn type_number(&self) -> u16 {
		match self {
			RecordData::A(_) => A::TYPE_NUMBER,
			RecordData::Aaaa(_) => Aaaa::TYPE_NUMBER,
			RecordData::Ptr(_) => Ptr::TYPE_NUMBER,
			RecordData::Srv(_) => Srv::TYPE_NUMBER,
			RecordData::Txt(_) => Txt::TYPE_NUMBER,
			RecordData::Nsec(_) => Nsec::TYPE_NUMBER,
		}
	}

	pub fn write(&self, out: &mut Vec<u8>, offsets: &mut NameOffsets) {
		match self {
			RecordData::A(r) => r.write(out, offsets),
			RecordData::Aaaa(r) => r.write(out, offsets),
			RecordData::Ptr(r) => r.write(out, offsets),
			RecordData::Srv(r) => r.write(out, offsets),
			RecordData::Txt(r) => r.write(out, offsets),
			RecordData::Nsec(r) => r.write(out, offsets),
		}
	}

	/// Decode RDATA for a known type number. Unknown types come back as `Ok(None)` without the
	/// reader having been advanced — the caller skips the declared length instead.
	pub fn read(type_number: u16, len: u16, r: &mut Reader) -> Result<Option<Self>, WireError> {
		Ok(Some(match type_number {
			A::TYPE_NUMBER => RecordData::A(A::read(len, r)?),
			Aaaa::TYPE_NUMBER => RecordData::Aaaa(Aaaa::read(len, r)?),
			Ptr::TYPE_NUMBER => RecordData::Ptr(Ptr::read(len, r)?),
			Srv::TYPE_NUMBER => RecordData::Srv(Srv::read(len, r)?),
			Txt::TYPE_NUMBER => RecordData::Txt(Txt::read(len, r)?),
			Nsec::TYPE_NUMBER => RecordData::Nsec(Nsec::read(len, r)?),
			_ => return Ok(None),
		}))
	}
}
