use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use loom_core::{BackEdgeId, Loom, SlotId};

/// Scenario F: a thread parked inside an unsafe blocking call site delays
/// evacuation until it exits.
#[test]
fn evacuate_drains_in_flight_counter() {
	// The evacuating thread here plays the daemon's role: per spec §4.2/§4.3
	// the daemon is not an application thread and never calls
	// `enter_thread`, so it never itself holds a shared lock that would
	// self-deadlock against `evacuate`'s `wr_lock`.
	let loom = Arc::new(Loom::new(4, 4));

	let site = SlotId(2);
	let entered = Arc::new(AtomicBool::new(false));

	let worker = {
		let loom = Arc::clone(&loom);
		let entered = Arc::clone(&entered);
		thread::spawn(move || {
			loom.enter_thread();
			loom.before_blocking(site, |_| {});
			entered.store(true, Ordering::SeqCst);
			thread::sleep(Duration::from_millis(100));
			loom.after_blocking(site, |_| {});
			loom.exit_thread();
		})
	};

	while !entered.load(Ordering::SeqCst) {
		thread::yield_now();
	}

	let mut unsafe_call_sites = HashSet::new();
	unsafe_call_sites.insert(site);

	let start = Instant::now();
	let evacuation = loom.evacuate(&HashSet::new(), &unsafe_call_sites);
	let elapsed = start.elapsed();
	drop(evacuation);

	assert!(
		elapsed >= Duration::from_millis(80),
		"evacuate returned before the in-flight thread drained: {elapsed:?}"
	);

	worker.join().unwrap();
}

/// A back edge whose wait flag clears mid-spin must still be observed as
/// reacquiring the shared lock before `cycle_check` returns.
#[test]
fn cycle_check_drains_and_reacquires() {
	// As above: the thread driving `evacuate` never itself calls
	// `enter_thread`, so it holds no shared lock for `wr_lock` to wait out.
	let loom = Arc::new(Loom::new(2, 1));

	let edge = BackEdgeId(0);
	let mut unsafe_back_edges = HashSet::new();
	unsafe_back_edges.insert(BackEdgeId(1)); // edge 0 is "safe" => gets wait=1

	let waiter = {
		let loom = Arc::clone(&loom);
		thread::spawn(move || {
			loom.enter_thread();
			loom.cycle_check(edge);
			loom.exit_thread();
		})
	};

	// Give the spawned thread a moment to start spinning, then resume it.
	thread::sleep(Duration::from_millis(20));
	let evacuation = loom.evacuate(&unsafe_back_edges, &HashSet::new());
	drop(evacuation);

	waiter.join().unwrap();
}

#[test]
fn install_mutates_chain_then_resume_unwinds_wait_flags() {
	// No application thread ever enters here, so the test driver (standing
	// in for the daemon) is free to take the update-lock exclusively.
	let loom = Loom::new(3, 3);

	let op = loom_core::Operation {
		callback: loom_core::Callback::EnterCriticalRegion,
		arg: loom_core::FilterId(0),
		slot_id: SlotId(1),
	};

	{
		let evacuation = loom.evacuate(&HashSet::new(), &HashSet::new());
		evacuation.prepend(SlotId(1), op);
	}

	assert_eq!(loom.site_snapshot(SlotId(1)), vec![op]);

	{
		let evacuation = loom.evacuate(&HashSet::new(), &HashSet::new());
		evacuation.unlink(SlotId(1), op);
	}

	assert!(loom.site_snapshot(SlotId(1)).is_empty());
}
