//! DNS/mDNS wire-format codec.
//!
//! Parsing and serialization are pure functions over byte slices: nothing here opens a socket,
//! looks at a clock, or reads configuration. Everything above this crate treats a [`Message`] as
//! the unit of exchange and leaves addressing, retransmission and caching to its callers.

mod error;
mod reader;
mod record;
mod writer;

mod message;

pub use error::WireError;
pub use message::{parse, serialize, Message, Query, Record, TYPE_ANY};
pub use record::{Aaaa, Bitmap, Nsec, Ptr, RecordData, Srv, Txt, TxtAttribute, Wire, A};
