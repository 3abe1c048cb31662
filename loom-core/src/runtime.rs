//! [`Loom`] ties together the update-lock (C2), the hook-site tables (C3),
//! the lifecycle hooks (C4), and the fast-path hooks (C5) into the single
//! process-wide instance an embedding application constructs once, before
//! any application global constructor runs.

use std::collections::HashSet;

use crate::evacuation::Evacuation;
use crate::lock::UpdateLock;
use crate::site::{self, BackEdge, BackEdgeId, HookSite, Operation, SlotId};

/// The evacuation/quiescence protocol and hook-dispatch data plane for one
/// instrumented process.
///
/// `B` and `S` (the number of back edges and hook sites, spec §3's
/// `MaxNumBackEdges`/`MaxNumInsts`) are fixed at construction time and never
/// change afterwards — the Rust equivalent of the original runtime's
/// compile-time array bounds, sized by the embedding application instead of
/// hardcoded.
pub struct Loom {
	update_lock: UpdateLock,
	back_edges: Box<[BackEdge]>,
	hook_sites: Box<[HookSite]>,
}

impl Loom {
	/// Constructs a fresh, quiescent runtime with `num_back_edges` back
	/// edges and `num_hook_sites` hook sites, all wait flags clear, all
	/// counters zero, all operation chains empty — exactly the state
	/// `LoomEnterProcess` establishes by zeroing its static arrays.
	pub fn new(num_back_edges: usize, num_hook_sites: usize) -> Self {
		Self {
			update_lock: UpdateLock::new(),
			back_edges: site::new_back_edges(num_back_edges),
			hook_sites: site::new_hook_sites(num_hook_sites),
		}
	}

	pub fn num_back_edges(&self) -> usize {
		self.back_edges.len()
	}

	pub fn num_hook_sites(&self) -> usize {
		self.hook_sites.len()
	}

	pub(crate) fn update_lock(&self) -> &UpdateLock {
		&self.update_lock
	}

	pub(crate) fn back_edges(&self) -> &[BackEdge] {
		&self.back_edges
	}

	pub(crate) fn hook_site(&self, id: SlotId) -> &HookSite {
		&self.hook_sites[id.0]
	}

	/// `LoomEnterProcess`: runs before any application global constructor.
	/// `self` must already be freshly constructed (see [`Self::new`]); this
	/// only takes care of the part the original performs *after*
	/// zero-initializing its statics — acquiring the update-lock on behalf
	/// of the initial thread.
	pub fn enter_process(&self) {
		log::info!(
			"entering process: {} back edges, {} hook sites",
			self.num_back_edges(),
			self.num_hook_sites()
		);
		self.enter_thread();
	}

	/// `LoomExitProcess`: releases the initial thread's hold and clears
	/// every site's operation chain. Must only be called once no other
	/// application thread remains.
	pub fn exit_process(&self) {
		self.exit_thread();
		for site in &*self.hook_sites {
			// SAFETY: no application thread remains, so nobody can be
			// traversing a chain concurrently with this clear.
			unsafe { site.clear() };
		}
		log::info!("exited process");
	}

	/// `LoomEnterThread`: acquires the update-lock in shared mode.
	pub fn enter_thread(&self) {
		self.update_lock.rd_lock();
	}

	/// `LoomExitThread`: releases the update-lock.
	pub fn exit_thread(&self) {
		self.update_lock.rd_unlock();
	}

	/// `LoomCycleCheck`: the back-edge fast path. Common case is a single
	/// relaxed-ish load and branch; only drains (releases the shared hold,
	/// spins, reacquires) when `edge`'s wait flag is set.
	pub fn cycle_check(&self, edge: BackEdgeId) {
		let back_edge = &self.back_edges[edge.0];
		if !back_edge.is_waiting() {
			return;
		}
		self.update_lock.rd_unlock();
		while back_edge.is_waiting() {
			core::hint::spin_loop();
		}
		self.update_lock.rd_lock();
	}

	/// `LoomBeforeBlocking`: marks the calling thread as in-flight at
	/// `site`, dispatches that site's entry-flavored operations (while
	/// still holding the update-lock, so traversal is safe), then releases
	/// the shared hold before the wrapped blocking call actually runs.
	///
	/// `on_entry` is invoked once per entry-flavored [`Operation`] currently
	/// chained at `site`, in chain order; `loom-filters` uses it to lock
	/// the mutex a `CriticalRegion` filter installed there.
	pub fn before_blocking(&self, site: SlotId, mut on_entry: impl FnMut(Operation)) {
		debug_assert!(
			self.update_lock.is_locked(),
			"before_blocking requires the calling thread to already hold the update-lock \
			 shared (call enter_thread first); calling it without that hold would unbalance \
			 rd_unlock below"
		);
		let hook_site = &self.hook_sites[site.0];
		hook_site.enter_blocking();
		// SAFETY: the calling thread holds the update-lock shared (an
		// invariant between hook calls), so traversal is safe here.
		unsafe {
			hook_site.for_each(|op| {
				if op.callback.flavor() == site::HookFlavor::Entry {
					on_entry(op);
				}
			});
		}
		self.update_lock.rd_unlock();
	}

	/// `LoomAfterBlocking`: reacquires the shared hold, dispatches `site`'s
	/// exit-flavored operations, then decrements the in-flight counter.
	/// The decrement happens last so that between the blocking region
	/// ending and the counter reaching zero, the thread is already visible
	/// to the daemon as holding the lock (spec §4.4).
	pub fn after_blocking(&self, site: SlotId, mut on_exit: impl FnMut(Operation)) {
		self.update_lock.rd_lock();
		debug_assert!(
			self.update_lock.is_locked(),
			"after_blocking just reacquired the update-lock shared; is_locked() must be true"
		);
		let hook_site = &self.hook_sites[site.0];
		// SAFETY: see `before_blocking`.
		unsafe {
			hook_site.for_each(|op| {
				if op.callback.flavor() == site::HookFlavor::Exit {
					on_exit(op);
				}
			});
		}
		hook_site.exit_blocking();
	}

	/// Drives the system to quiescence w.r.t. `unsafe_back_edges` and
	/// `unsafe_call_sites`, returning a proof ([`Evacuation`]) that can be
	/// used to mutate operation chains. Dropping the returned value resumes
	/// the system (spec §4.6 `Resume`).
	pub fn evacuate(
		&self,
		unsafe_back_edges: &HashSet<BackEdgeId>,
		unsafe_call_sites: &HashSet<SlotId>,
	) -> Evacuation<'_> {
		Evacuation::begin(self, unsafe_back_edges, unsafe_call_sites)
	}

	/// Snapshots `site`'s current operation chain. Intended for tests and
	/// debugging.
	pub fn site_snapshot(&self, site: SlotId) -> Vec<Operation> {
		self.hook_sites[site.0].snapshot()
	}

	/// The number of application threads currently inside the blocking
	/// call wrapped at `site`. Intended for tests and debugging.
	pub fn in_flight(&self, site: SlotId) -> u32 {
		self.hook_sites[site.0].in_flight()
	}
}
