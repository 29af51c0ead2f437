use std::time::Duration;

/// Tunables shared by every actor in this crate. The defaults match the reference design;
/// embedding applications mostly want these as-is, but tests shrink them to keep runs fast.
#[derive(Debug, Clone, Copy)]
pub struct Config {
	pub query_interval: Duration,
	pub probe_timeout: Duration,
	pub rebroadcast_interval: Duration,
	pub service_coalesce: Duration,
	pub default_record_ttl: u32,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			query_interval: Duration::from_secs(60),
			probe_timeout: Duration::from_secs(2),
			rebroadcast_interval: Duration::from_secs(30 * 60),
			service_coalesce: Duration::from_millis(100),
			default_record_ttl: 75 * 60,
		}
	}
}
