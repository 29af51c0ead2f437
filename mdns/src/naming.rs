//! Name-suffixing logic shared by the hostname registrar and the record-uniqueness prober: both
//! probe a candidate name, bump a numeric suffix on conflict, and retry.

/// Compose `<base>-<counter><suffix>` (or just `<base><suffix>` when `counter == 1`).
///
/// `suffix` is expected to carry its own leading dot (e.g. `.local.` or `._ipp._tcp.local.`) so
/// callers never need to insert a separator themselves.
pub fn propose(base: &str, suffix: &str, counter: u32) -> String {
	if counter <= 1 {
		format!("{base}{suffix}")
	} else {
		format!("{base}-{counter}{suffix}")
	}
}

/// Split `name` at its first `.`, keeping the dot on the suffix side.
pub fn split_at_first_dot(name: &str) -> (&str, &str) {
	match name.find('.') {
		Some(i) => (&name[..i], &name[i..]),
		None => (name, ""),
	}
}

/// The base name a hostname registrar probes with: the host's local name, with any trailing
/// `.local` stripped and every remaining `.` turned into `-` (mDNS host names are a single
/// label).
pub fn hostname_base(local_name: &str) -> String {
	local_name.strip_suffix(".local").unwrap_or(local_name).replace('.', "-")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn proposes_the_bare_name_at_counter_one() {
		assert_eq!(propose("printer-7", "._ipp._tcp.local.", 1), "printer-7._ipp._tcp.local.");
	}

	#[test]
	fn proposes_a_suffixed_name_past_counter_one() {
		assert_eq!(propose("printer-7", "._ipp._tcp.local.", 2), "printer-7-2._ipp._tcp.local.");
	}

	#[test]
	fn splits_at_the_first_dot_keeping_it_on_the_suffix() {
		assert_eq!(split_at_first_dot("printer-7._ipp._tcp.local."), ("printer-7", "._ipp._tcp.local."));
	}

	#[test]
	fn strips_a_trailing_local_suffix_and_replaces_dots() {
		assert_eq!(hostname_base("my.host.local"), "my-host");
		assert_eq!(hostname_base("my-host"), "my-host");
	}
}
