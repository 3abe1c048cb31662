//! Compare-exchange-free increment/decrement on 32-bit counters, with full
//! barrier semantics. Used only on [`crate::site::HookSite::counter`].

use core::sync::atomic::{AtomicU32, Ordering};

/// Increments `counter` and returns the new value.
///
/// Full barrier: equivalent to `__sync_add_and_fetch` in the original
/// runtime this crate supersedes.
pub(crate) fn atomic_inc(counter: &AtomicU32) -> u32 {
	counter.fetch_add(1, Ordering::SeqCst) + 1
}

/// Decrements `counter` and returns the new value.
///
/// Full barrier: equivalent to `__sync_sub_and_fetch`.
pub(crate) fn atomic_dec(counter: &AtomicU32) -> u32 {
	counter.fetch_sub(1, Ordering::SeqCst) - 1
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn inc_then_dec_round_trips() {
		let counter = AtomicU32::new(0);
		assert_eq!(atomic_inc(&counter), 1);
		assert_eq!(atomic_inc(&counter), 2);
		assert_eq!(atomic_dec(&counter), 1);
		assert_eq!(atomic_dec(&counter), 0);
		assert_eq!(counter.load(Ordering::SeqCst), 0);
	}
}
