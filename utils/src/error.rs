//! An opaque result type for operations whose failure is already fully described by a `log::error!`
//! or `log::warn!` call at the point it occurred. Callers only need to know whether the operation
//! succeeded, not why — the failure has already been logged with whatever detail matters.

use core::result;

#[doc(hidden)]
pub trait Ext<T, E> {
	fn ok_or(self, f: impl FnOnce(E)) -> Option<T>;
}

impl<T, E> Ext<T, E> for result::Result<T, E> {
	fn ok_or(self, f: impl FnOnce(E)) -> Option<T> {
		match self {
			Ok(v) => Some(v),
			Err(e) => {
				f(e);
				None
			}
		}
	}
}

pub type Result<T = (), E = ()> = result::Result<T, E>;

pub use Ext as _;
