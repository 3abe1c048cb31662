//! The process-wide update-lock (C2): a multi-reader/single-writer
//! rendezvous between application threads (readers) and the daemon (the
//! sole writer).
//!
//! Unlike a typical Rust `RwLock<T>`, nothing here is actually protected by
//! the type system: the lock only ever guards `()`, and callers take and
//! release it as bare operations (`rd_lock`/`rd_unlock`/`wr_lock`/
//! `wr_unlock`) rather than through scope-tied guards, because
//! [`crate::runtime::Loom::cycle_check`] and [`crate::runtime::Loom::before_blocking`] must
//! release and reacquire the lock in the middle of a single logical
//! operation. The actual data it protects ([`crate::site::HookSite`]'s
//! operation chains) is accessed through raw cells whose safety is
//! documented at the call site instead.

use lock_api::RawRwLock as _;
use parking_lot::RawRwLock;

pub(crate) struct UpdateLock(RawRwLock);

impl UpdateLock {
	pub(crate) const fn new() -> Self {
		Self(RawRwLock::INIT)
	}

	/// Acquires the lock in shared mode, blocking until available.
	pub(crate) fn rd_lock(&self) {
		self.0.lock_shared();
	}

	/// Releases one shared hold.
	///
	/// # Safety-by-contract
	///
	/// Callers must have a matching, not-yet-released [`Self::rd_lock`] call
	/// on the current thread. Violating this is a logic error, not memory
	/// unsafety (`parking_lot`'s raw lock does not track ownership), so this
	/// is a plain method rather than `unsafe fn`; misuse is caught by the
	/// debug assertions in [`crate::runtime::Loom`]'s call sites instead.
	pub(crate) fn rd_unlock(&self) {
		unsafe { self.0.unlock_shared() };
	}

	/// Acquires the lock exclusively, blocking until available.
	pub(crate) fn wr_lock(&self) {
		self.0.lock_exclusive();
	}

	/// Releases the exclusive hold.
	pub(crate) fn wr_unlock(&self) {
		unsafe { self.0.unlock_exclusive() };
	}

	/// Whether *some* thread currently holds the lock, shared or exclusive.
	///
	/// `RawRwLock` doesn't track which thread holds what, so this cannot
	/// confirm the calling thread specifically holds a shared hold — only
	/// that the lock isn't completely unheld. That's enough to catch the
	/// call-without-`enter_thread` misuse [`crate::runtime::Loom::before_blocking`]
	/// and [`crate::runtime::Loom::after_blocking`] guard against: releasing
	/// or traversing under a lock nobody holds at all.
	pub(crate) fn is_locked(&self) -> bool {
		self.0.is_locked()
	}
}

// SAFETY: `RawRwLock` is `Send + Sync` on its own; this wrapper adds no
// additional non-atomic state.
unsafe impl Sync for UpdateLock {}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;
	use std::thread;

	#[test]
	fn many_readers_can_overlap() {
		let lock = Arc::new(UpdateLock::new());
		let handles: Vec<_> = (0..8)
			.map(|_| {
				let lock = Arc::clone(&lock);
				thread::spawn(move || {
					lock.rd_lock();
					thread::yield_now();
					lock.rd_unlock();
				})
			})
			.collect();
		for h in handles {
			h.join().unwrap();
		}
	}

	#[test]
	fn writer_excludes_readers() {
		let lock = UpdateLock::new();
		lock.wr_lock();
		lock.wr_unlock();
		lock.rd_lock();
		lock.rd_unlock();
	}
}
