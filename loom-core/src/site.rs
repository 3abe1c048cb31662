//! The per-site and per-edge state described in spec §3 ("Data model"):
//! [`HookSite`] (operation chains + blocking-call counters) and the wait
//! flags behind each back edge.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::atomics::{atomic_dec, atomic_inc};

/// Identifies a back edge, one of `0..B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BackEdgeId(pub usize);

/// Identifies a hook site, one of `0..S`. The same index space is shared by
/// ordinary instrumentation points and blocking call sites: `counter` is
/// simply unused (always zero) for sites that are never wrapped around a
/// blocking call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub usize);

/// Identifies an installed filter, one of `0..F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FilterId(pub u32);

/// One of the small set of instrumentation primitives an [`Operation`] can
/// dispatch to. `loom-filters` is the only crate that currently produces
/// these; kept here (rather than behind a trait object) because the set is
/// closed and dispatch must be branch-cheap on the fast path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
	EnterCriticalRegion,
	ExitCriticalRegion,
}

/// Which of a site's two dispatch moments a [`Callback`] answers to: the
/// "entry" hook fires where instrumentation marks the start of a region
/// ([`crate::runtime::Loom::before_blocking`] for blocking call sites),
/// "exit" where it marks the end
/// ([`crate::runtime::Loom::after_blocking`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookFlavor {
	Entry,
	Exit,
}

impl Callback {
	pub fn flavor(self) -> HookFlavor {
		match self {
			Callback::EnterCriticalRegion => HookFlavor::Entry,
			Callback::ExitCriticalRegion => HookFlavor::Exit,
		}
	}
}

/// A `(callback, arg, slot_id)` triple: one instrumentation action attached
/// to one site. `arg` is opaque to this crate; in practice it is the owning
/// filter's id, which `loom-filters`'s dispatcher uses to find the matching
/// per-filter mutex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
	pub callback: Callback,
	pub arg: FilterId,
	pub slot_id: SlotId,
}

/// Per-site state: the ordered operation chain and the blocking-call
/// in-flight counter.
///
/// # Safety
///
/// `operations` is only ever mutated by [`crate::evacuation::Evacuation`]
/// while the update-lock is held exclusively *and* the site has been
/// evacuated (so no reader is mid-traversal). Readers (the `loom-filters`
/// dispatcher, via [`Self::for_each`]) only ever traverse it while holding
/// the update-lock shared. Because mutation is gated on the writer lock and
/// traversal on the reader lock, and the two are mutually exclusive, this
/// satisfies the usual aliasing rules despite the `UnsafeCell` — it is
/// exactly the discipline spec §4.5 describes, made explicit instead of
/// left to reviewer trust.
pub(crate) struct HookSite {
	operations: UnsafeCell<Vec<Operation>>,
	counter: AtomicU32,
}

// SAFETY: see the safety note on the struct; all access to `operations` is
// externally synchronized by the update-lock.
unsafe impl Sync for HookSite {}

impl HookSite {
	fn new() -> Self {
		Self {
			operations: UnsafeCell::new(Vec::new()),
			counter: AtomicU32::new(0),
		}
	}

	/// Returns the number of application threads currently inside the
	/// wrapped blocking call at this site. Meaningless (always `0`) for
	/// sites that are never used with [`crate::runtime::Loom::before_blocking`].
	pub(crate) fn in_flight(&self) -> u32 {
		self.counter.load(Ordering::SeqCst)
	}

	pub(crate) fn enter_blocking(&self) {
		atomic_inc(&self.counter);
	}

	pub(crate) fn exit_blocking(&self) {
		atomic_dec(&self.counter);
	}

	/// Splices `op` onto the front of this site's operation chain.
	///
	/// # Safety
	///
	/// Caller must hold the update-lock exclusively and must have evacuated
	/// this site (spec §4.5, §4.6).
	pub(crate) unsafe fn prepend(&self, op: Operation) {
		(*self.operations.get()).insert(0, op);
	}

	/// Removes the first operation equal to `op` from this site's chain.
	///
	/// # Safety
	///
	/// Same preconditions as [`Self::prepend`].
	pub(crate) unsafe fn unlink(&self, op: Operation) {
		let ops = &mut *self.operations.get();
		if let Some(pos) = ops.iter().position(|candidate| *candidate == op) {
			ops.remove(pos);
		}
	}

	/// Runs `f` for every operation currently in this site's chain, in
	/// order.
	///
	/// # Safety
	///
	/// Caller must hold the update-lock in shared (or exclusive) mode for
	/// the duration of the traversal.
	pub(crate) unsafe fn for_each(&self, mut f: impl FnMut(Operation)) {
		for &op in &*self.operations.get() {
			f(op);
		}
	}

	/// Empties this site's operation chain outright, bypassing the usual
	/// evacuate-then-mutate discipline.
	///
	/// # Safety
	///
	/// Caller must guarantee no other thread can be traversing or mutating
	/// this chain concurrently — in practice, only valid once no
	/// application thread remains (`LoomExitProcess`).
	pub(crate) unsafe fn clear(&self) {
		(*self.operations.get()).clear();
	}

	/// Returns a copy of this site's current operation chain. Intended for
	/// tests and debugging; traverses under the same "caller holds the
	/// update-lock" contract as [`Self::for_each`].
	pub fn snapshot(&self) -> Vec<Operation> {
		unsafe { (*self.operations.get()).clone() }
	}
}

pub(crate) struct BackEdge {
	wait: AtomicBool,
}

impl BackEdge {
	fn new() -> Self {
		Self {
			wait: AtomicBool::new(false),
		}
	}

	/// Opaque-to-the-optimizer read of the wait flag: the hot path of
	/// [`crate::runtime::Loom::cycle_check`].
	pub(crate) fn is_waiting(&self) -> bool {
		self.wait.load(Ordering::SeqCst)
	}

	pub(crate) fn raise(&self) {
		self.wait.store(true, Ordering::SeqCst);
	}

	pub(crate) fn clear(&self) {
		self.wait.store(false, Ordering::SeqCst);
	}
}

pub(crate) fn new_hook_sites(len: usize) -> Box<[HookSite]> {
	(0..len).map(|_| HookSite::new()).collect()
}

pub(crate) fn new_back_edges(len: usize) -> Box<[BackEdge]> {
	(0..len).map(|_| BackEdge::new()).collect()
}
