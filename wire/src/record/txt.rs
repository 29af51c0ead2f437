use super::Wire;
use crate::error::WireError;
use crate::reader::Reader;
use crate::writer::{write_u8, NameOffsets};

/// One `key` or `key=value` entry from a TXT record. Values are opaque byte strings in the DNS
/// spec; we decode them lossily as UTF-8, which is what every mDNS deployment in practice emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxtAttribute {
	pub key: String,
	pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Txt {
	pub attributes: Vec<TxtAttribute>,
}

impl Wire for Txt {
	const TYPE_NUMBER: u16 = 16;

	fn read(len: u16, r: &mut Reader) -> Result<Self, WireError> {
		let end = r.position() + len as usize;
		let mut attributes = Vec::new();

		while r.position() < end {
			let n = r.read_u8()?;
			if n == 0 {
				break;
			}
			let bytes = r.read_bytes(n as usize)?;
			let entry = String::from_utf8_lossy(bytes).into_owned();
			attributes.push(match entry.find('=') {
				Some(i) => TxtAttribute { key: entry[..i].to_string(), value: Some(entry[i + 1..].to_string()) },
				None => TxtAttribute { key: entry, value: None },
			});
		}

		if r.position() < end {
			r.skip(end - r.position())?;
		}

		Ok(Txt { attributes })
	}

	fn write(&self, out: &mut Vec<u8>, _offsets: &mut NameOffsets) {
		if self.attributes.is_empty() {
			write_u8(out, 0);
			return;
		}
		for attr in &self.attributes {
			let entry = match &attr.value {
				Some(v) => format!("{}={v}", attr.key),
				None => attr.key.clone(),
			};
			debug_assert!(entry.len() <= 255, "TXT entries cannot exceed 255 bytes: {entry:?}");
			write_u8(out, entry.len() as u8);
			out.extend_from_slice(entry.as_bytes());
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn encoded_len(txt: &Txt) -> usize {
		let mut out = Vec::new();
		txt.write(&mut out, &mut NameOffsets::new());
		out.len()
	}

	#[test]
	fn round_trips_key_value_pairs() {
		let txt = Txt {
			attributes: vec![
				TxtAttribute { key: "txtvers".to_string(), value: Some("1".to_string()) },
				TxtAttribute { key: "ty".to_string(), value: Some("Office Printer".to_string()) },
			],
		};
		let mut out = Vec::new();
		txt.write(&mut out, &mut NameOffsets::new());

		let mut r = Reader::new(&out);
		assert_eq!(Txt::read(out.len() as u16, &mut r).unwrap(), txt);
	}

	#[test]
	fn round_trips_a_bare_key() {
		let txt = Txt { attributes: vec![TxtAttribute { key: "mdns".to_string(), value: None }] };
		let mut out = Vec::new();
		txt.write(&mut out, &mut NameOffsets::new());

		let mut r = Reader::new(&out);
		assert_eq!(Txt::read(out.len() as u16, &mut r).unwrap(), txt);
	}

	#[test]
	fn an_empty_txt_is_a_single_zero_byte() {
		let txt = Txt::default();
		let mut out = Vec::new();
		txt.write(&mut out, &mut NameOffsets::new());
		assert_eq!(out, [0]);
		assert_eq!(encoded_len(&txt), 1);

		let mut r = Reader::new(&out);
		assert_eq!(Txt::read(1, &mut r).unwrap(), txt);
	}
}
