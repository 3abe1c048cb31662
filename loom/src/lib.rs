//! `loom` is the facade instrumented application code links against: the
//! seven lifecycle/fast-path entry points of spec §6.3, process-wide
//! singleton wiring for [`loom_core::Loom`] and the `CriticalRegion` mutex
//! table, and `start_daemon`/`stop_daemon` mirroring the original's
//! `StartDaemon`/`StopDaemon`.
//!
//! The entry points in [`ffi`] are declared `#[no_mangle] pub extern "C"`
//! because instrumentation-inserted code is generated without knowledge of
//! Rust's name mangling; [`System`] and the free functions re-exported at
//! the crate root are the safe Rust surface the daemon and this crate's own
//! tests use instead.

use std::net::SocketAddr;
use std::sync::{Mutex, OnceLock};
use std::thread::JoinHandle;

use loom_core::{Loom, Operation, SlotId};
use loom_daemon::Config as DaemonConfig;
use loom_filters::CriticalRegionMutexes;

pub mod ffi;

/// Sizing for the process-wide [`Loom`] instance: the Rust analogue of the
/// original's `MaxNumBackEdges`/`MaxNumInsts`/`MaxNumFilters` compile-time
/// constants (`examples/original_source/runtime/Updater/UpdateEngine.h`),
/// fixed once at [`configure`] time instead of hardcoded.
#[derive(Debug, Clone, Copy)]
pub struct SystemConfig {
	pub num_back_edges: usize,
	pub num_hook_sites: usize,
	pub num_filters: usize,
	pub controller_addr: SocketAddr,
}

impl Default for SystemConfig {
	fn default() -> Self {
		let daemon_default = DaemonConfig::default();
		Self {
			num_back_edges: 1024,
			num_hook_sites: 1024,
			num_filters: daemon_default.num_filters,
			controller_addr: daemon_default.controller_addr,
		}
	}
}

struct System {
	loom: Loom,
	mutexes: CriticalRegionMutexes,
	config: SystemConfig,
}

static SYSTEM: OnceLock<System> = OnceLock::new();
static DAEMON: Mutex<Option<JoinHandle<()>>> = Mutex::new(None);

/// Sets the sizing this process uses for its singleton [`Loom`]. Must be
/// called, if at all, before the first fast-path hook or [`start_daemon`]
/// call — in practice, from the very first line of `main`, before any
/// instrumented back edge can possibly run. Calling it twice, or after the
/// singleton has already been lazily constructed by a hook, is a logic
/// error and panics, the same way double-initializing `LoomUpdateLock`
/// would be in the original.
pub fn configure(config: SystemConfig) {
	assert!(
		SYSTEM.set(System::new(config)).is_ok(),
		"loom::configure called after the system was already initialized"
	);
}

fn system() -> &'static System {
	SYSTEM.get_or_init(|| System::new(SystemConfig::default()))
}

impl System {
	fn new(config: SystemConfig) -> Self {
		Self {
			loom: Loom::new(config.num_back_edges, config.num_hook_sites),
			mutexes: CriticalRegionMutexes::new(config.num_filters),
			config,
		}
	}

	/// Dispatches one [`Operation`]: `CriticalRegion`'s two callbacks are
	/// the only ones the closed [`loom_core::Callback`] set currently
	/// defines (spec §4.1/§4.7's "CriticalRegion callback semantics").
	fn dispatch(&self, op: Operation) {
		match op.callback {
			loom_core::Callback::EnterCriticalRegion => self.mutexes.lock(op.arg),
			loom_core::Callback::ExitCriticalRegion => self.mutexes.unlock(op.arg),
		}
	}
}

/// `LoomEnterProcess` (spec §4.3): initializes the singleton if it has not
/// already been, in exactly the state `LoomEnterProcess` establishes in the
/// original (wait flags, counters, and operation chains all zeroed), then
/// acquires the update-lock for the calling (bootstrap) thread.
pub fn enter_process() {
	system().loom.enter_process();
}

/// `LoomExitProcess` (spec §4.3). Must only be called once no other
/// application thread remains.
pub fn exit_process() {
	let sys = system();
	sys.loom.exit_process();
}

/// `LoomEnterThread` (spec §4.3): acquires the update-lock in shared mode
/// on behalf of the calling thread.
pub fn enter_thread() {
	system().loom.enter_thread();
}

/// `LoomExitThread` (spec §4.3): releases the calling thread's shared hold.
pub fn exit_thread() {
	system().loom.exit_thread();
}

/// `LoomCycleCheck` (spec §4.4): the back-edge fast path.
pub fn cycle_check(back_edge_id: usize) {
	system().loom.cycle_check(loom_core::BackEdgeId(back_edge_id));
}

/// `LoomBeforeBlocking` (spec §4.4): marks the calling thread in-flight at
/// `site_id`, dispatching that site's entry-flavored operations (locking
/// any `CriticalRegion` mutex chained there) before releasing the update-
/// lock's shared hold.
pub fn before_blocking(site_id: usize) {
	let sys = system();
	sys.loom
		.before_blocking(SlotId(site_id), |op| sys.dispatch(op));
}

/// `LoomAfterBlocking` (spec §4.4): reacquires the shared hold, dispatching
/// exit-flavored operations (unlocking the matching mutex) before
/// decrementing the in-flight counter.
pub fn after_blocking(site_id: usize) {
	let sys = system();
	sys.loom
		.after_blocking(SlotId(site_id), |op| sys.dispatch(op));
}

/// `StartDaemon` (spec §4.8, §6.3): spawns the daemon thread against the
/// process-wide singleton. Idempotent in the sense that calling it again
/// while a daemon thread is already running replaces the tracked handle
/// without joining the old one — matching the original's `StartDaemon`,
/// which never checked for a pre-existing daemon either.
pub fn start_daemon() -> std::io::Result<()> {
	let sys = system();
	let config = DaemonConfig {
		controller_addr: sys.config.controller_addr,
		num_filters: sys.config.num_filters,
	};
	let handle = loom_daemon::spawn(&sys.loom, config);
	*DAEMON.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(handle);
	Ok(())
}

/// `StopDaemon` (spec §4.8, §6.3). The daemon thread is killed automatically
/// when the process exits; there is nothing to join here, matching the
/// original's `StopDaemon`, which only logs and returns.
pub fn stop_daemon() {
	log::info!("stop_daemon");
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dispatch_locks_and_unlocks_the_matching_mutex() {
		let sys = System::new(SystemConfig {
			num_back_edges: 4,
			num_hook_sites: 4,
			num_filters: 2,
			..SystemConfig::default()
		});
		let id = loom_core::FilterId(0);
		let enter = Operation {
			callback: loom_core::Callback::EnterCriticalRegion,
			arg: id,
			slot_id: SlotId(0),
		};
		let exit = Operation {
			callback: loom_core::Callback::ExitCriticalRegion,
			arg: id,
			slot_id: SlotId(0),
		};
		sys.dispatch(enter);
		sys.dispatch(exit);
	}
}
