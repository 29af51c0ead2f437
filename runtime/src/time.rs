use std::time::SystemTime;

/// The current wall-clock time, derived from the runtime's monotonic clock plus the wall-clock
/// time recorded at start-up (so that tests can advance the monotonic clock without depending on
/// the real system clock).
pub fn system(core: &stakker::Core) -> SystemTime {
	let time = core.systime();
	let dur = core.now() - core.start_instant();
	time + dur
}

/// The current UNIX time in whole seconds.
pub fn unix(core: &stakker::Core) -> u32 {
	let time = system(core);

	let unix = time
		.duration_since(SystemTime::UNIX_EPOCH)
		.expect("the current time should be after the UNIX epoch");

	unix.as_secs().try_into().expect("32-bit UNIX time should not overflow")
}
