//! Per-filter `CriticalRegion` mutexes (spec §4.7's `mutexes[filter_id]`).
//!
//! Sized to `MaxNumFilters` and allocated once, the same way `loom-core`
//! preallocates its back-edge and hook-site arrays rather than
//! allocating/freeing per filter: "creating"/"destroying" a filter's mutex
//! is therefore a bookkeeping no-op here rather than a real constructor
//! call, since an always-valid raw mutex already sits at that index.

use lock_api::RawMutex as _;
use loom_core::FilterId;
use parking_lot::RawMutex;

struct CriticalRegionMutex(RawMutex);

impl CriticalRegionMutex {
	fn new() -> Self {
		Self(RawMutex::INIT)
	}

	fn lock(&self) {
		self.0.lock();
	}

	fn unlock(&self) {
		// SAFETY: called only from `EnterCriticalRegion`/`ExitCriticalRegion`
		// dispatch, which pairs every lock with exactly one unlock on the
		// thread that performed the lock (spec §4.7's "CriticalRegion
		// callback semantics").
		unsafe { self.0.unlock() };
	}
}

// SAFETY: `RawMutex` is `Send + Sync` on its own.
unsafe impl Sync for CriticalRegionMutex {}

/// The `CriticalRegion` mutex table, indexed by [`FilterId`]. Shared freely
/// across application threads: locking/unlocking an individual mutex needs
/// no synchronization beyond what `RawMutex` itself provides.
pub struct CriticalRegionMutexes {
	slots: Box<[CriticalRegionMutex]>,
}

impl CriticalRegionMutexes {
	pub fn new(num_filters: usize) -> Self {
		Self {
			slots: (0..num_filters).map(|_| CriticalRegionMutex::new()).collect(),
		}
	}

	/// `EnterCriticalRegion(arg=id)`.
	pub fn lock(&self, id: FilterId) {
		self.slots[id.0 as usize].lock();
	}

	/// `ExitCriticalRegion(arg=id)`.
	pub fn unlock(&self, id: FilterId) {
		self.slots[id.0 as usize].unlock();
	}
}
