use std::fmt;

/// Everything that can go wrong while decoding a DNS message. Decoding never panics: a
/// malformed or truncated packet always comes back as one of these instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
	/// Ran off the end of the buffer while reading a fixed-size field.
	UnexpectedEof,
	/// A label length byte had its top two bits set to a value other than `00` (plain label)
	/// or `11` (compression pointer).
	ReservedLabelLength(u8),
	/// A compression pointer targeted an offset at or after the offset of the pointer itself.
	PointerLoop { pointer_offset: usize, target: usize },
	/// A record's declared payload length reaches past the end of the message.
	RecordTooLong { declared: u16, remaining: usize },
	/// An NSEC record declared a window block other than `0`, which this codec does not support.
	NonZeroNsecWindow(u8),
}

impl fmt::Display for WireError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			WireError::UnexpectedEof => write!(f, "unexpected end of message"),
			WireError::ReservedLabelLength(b) => write!(f, "reserved label length byte 0x{b:02x}"),
			WireError::PointerLoop { pointer_offset, target } => {
				write!(f, "compression pointer at {pointer_offset} targets {target}, which is not strictly earlier")
			}
			WireError::RecordTooLong { declared, remaining } => {
				write!(f, "record declares {declared} bytes of payload but only {remaining} remain")
			}
			WireError::NonZeroNsecWindow(block) => write!(f, "NSEC window block {block} is not supported, only block 0"),
		}
	}
}

impl std::error::Error for WireError {}
