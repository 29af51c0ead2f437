use std::collections::HashMap;

pub type NameOffsets = HashMap<String, u16>;

pub fn write_u8(out: &mut Vec<u8>, v: u8) {
	out.push(v);
}

pub fn write_u16(out: &mut Vec<u8>, v: u16) {
	out.push((v >> 8) as u8);
	out.push((v & 0xff) as u8);
}

pub fn write_u32(out: &mut Vec<u8>, v: u32) {
	write_u16(out, (v >> 16) as u16);
	write_u16(out, (v & 0xffff) as u16);
}

/// Write a domain name, reusing an earlier occurrence of any of its suffixes via a compression
/// pointer when the packet built so far already contains one within pointer range (14 bits).
///
/// `name` is expected in canonical form (trailing dot); the trailing dot is stripped before
/// splitting on `.`.
pub fn write_name(out: &mut Vec<u8>, name: &str, offsets: &mut NameOffsets) {
	let mut rest = name.trim_end_matches('.');

	loop {
		if rest.is_empty() {
			write_u8(out, 0);
			return;
		}

		if let Some(&ptr) = offsets.get(rest) {
			write_u16(out, 0xc000 | ptr);
			return;
		}

		if out.len() <= 0x3fff {
			offsets.insert(rest.to_string(), out.len() as u16);
		}

		let (label, remainder) = match rest.find('.') {
			Some(i) => (&rest[..i], &rest[i + 1..]),
			None => (rest, ""),
		};

		debug_assert!(label.len() <= 63, "DNS labels cannot exceed 63 bytes: {label:?}");
		write_u8(out, label.len() as u8);
		out.extend_from_slice(label.as_bytes());
		rest = remainder;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn writes_an_uncompressed_name() {
		let mut out = Vec::new();
		write_name(&mut out, "foo.local.", &mut NameOffsets::new());
		assert_eq!(out, [3, b'f', b'o', b'o', 5, b'l', b'o', b'c', b'a', b'l', 0]);
	}

	#[test]
	fn reuses_a_previously_written_suffix() {
		let mut out = Vec::new();
		let mut offsets = NameOffsets::new();
		write_name(&mut out, "local.", &mut offsets);
		let second_start = out.len();
		write_name(&mut out, "foo.local.", &mut offsets);
		assert_eq!(&out[second_start..second_start + 4], [3, b'f', b'o', b'o']);
		assert_eq!(&out[second_start + 4..], [0xc0, 0x00]);
	}

	#[test]
	fn writes_the_root_name() {
		let mut out = Vec::new();
		write_name(&mut out, ".", &mut NameOffsets::new());
		assert_eq!(out, [0]);
	}
}
