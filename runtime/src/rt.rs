use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant, SystemTime};

use stakker::Stakker;

static EXIT: AtomicBool = AtomicBool::new(false);

/// Request a clean shutdown of the running [`exec`] loop on the next iteration.
///
/// Installed as the `ctrlc` handler by [`exec`], but can also be called directly by an embedding
/// application (e.g. in response to its own shutdown signal).
pub fn request_exit() {
	EXIT.store(true, Ordering::Relaxed);
}

/// Create a fresh `Stakker` instance with its monotonic and wall-clock time synchronised to now.
pub fn init() -> Stakker {
	let now = Instant::now();
	let now_sys = SystemTime::now();
	let mut s = Stakker::new(now);
	s.set_systime(Some(now_sys));
	s
}

/// Drive the cooperative event loop until shutdown is requested (Ctrl+C or [`request_exit`]).
///
/// Unlike a raw socket-polling loop, this crate has nothing to poll: actors only react to timers
/// and to deferred calls queued by the embedding application's `Transport` implementation when it
/// hands the core a newly received message. Each iteration sleeps until the next scheduled timer
/// (or returns immediately if work is pending), then lets `stakker` run due callbacks.
///
/// `exit_fn` is called once, synchronously, when a shutdown is requested; it should defer whatever
/// cleanup (e.g. sending farewell records) is needed before the actors are torn down.
pub fn exec(stakker: &mut Stakker, exit_fn: impl FnOnce()) {
	let _ = ctrlc::set_handler(request_exit).map_err(|err| log::error!("failed to install Ctrl+C handler: {err}"));

	let mut t = Instant::now();
	let mut idle_pending = stakker.run(t, false);

	while stakker.not_shutdown() {
		if EXIT.load(Ordering::Relaxed) {
			exit_fn();
			stakker.run(t, false);
			break;
		}

		let Some(timeout) = stakker.next_wait(t) else {
			if !idle_pending {
				break;
			}
			t = Instant::now();
			idle_pending = stakker.run(t, idle_pending);
			continue;
		};

		log::trace!("sleeping for {:?}", timeout);
		std::thread::sleep(timeout.min(Duration::from_millis(250)));

		t = Instant::now();
		idle_pending = stakker.run(t, idle_pending);
	}
}
