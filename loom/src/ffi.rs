//! The C-linkage lifecycle entry points of spec §6.3, exactly as
//! `examples/original_source/runtime/Updater/Evacuate.cpp` declares them
//! (`extern "C" void LoomEnterProcess(); ...`): instrumentation-inserted
//! code calls these directly, by symbol name, with no knowledge of Rust's
//! name mangling or even that the runtime underneath is written in Rust.
//!
//! Each function is a thin, panic-swallowing wrapper around the
//! corresponding safe function at the crate root. Panicking across an
//! `extern "C"` boundary is undefined behavior, so a caught panic is logged
//! and turned into a no-op rather than unwound through instrumented code —
//! acceptable here because every safe wrapper either cannot fail (the
//! common case) or, per spec §7, is meant to abort the process on failure
//! anyway (`Fatal` invariant violations), which `catch_unwind` does not
//! suppress.

use std::panic::{catch_unwind, AssertUnwindSafe};

fn guard(name: &str, f: impl FnOnce() + std::panic::UnwindSafe) {
	if catch_unwind(f).is_err() {
		log::error!("panic escaped {name}; this indicates an invariant violation");
	}
}

/// `LoomEnterProcess`. Must run before any application global constructor.
#[no_mangle]
pub extern "C" fn LoomEnterProcess() {
	guard("LoomEnterProcess", crate::enter_process);
}

/// `LoomExitProcess`.
#[no_mangle]
pub extern "C" fn LoomExitProcess() {
	guard("LoomExitProcess", crate::exit_process);
}

/// `LoomEnterThread`.
#[no_mangle]
pub extern "C" fn LoomEnterThread() {
	guard("LoomEnterThread", crate::enter_thread);
}

/// `LoomExitThread`.
#[no_mangle]
pub extern "C" fn LoomExitThread() {
	guard("LoomExitThread", crate::exit_thread);
}

/// `LoomCycleCheck(unsigned BackEdgeID)`.
#[no_mangle]
pub extern "C" fn LoomCycleCheck(back_edge_id: u32) {
	let back_edge_id = back_edge_id as usize;
	guard("LoomCycleCheck", AssertUnwindSafe(move || crate::cycle_check(back_edge_id)));
}

/// `LoomBeforeBlocking(unsigned CallSiteID)`.
#[no_mangle]
pub extern "C" fn LoomBeforeBlocking(call_site_id: u32) {
	let call_site_id = call_site_id as usize;
	guard(
		"LoomBeforeBlocking",
		AssertUnwindSafe(move || crate::before_blocking(call_site_id)),
	);
}

/// `LoomAfterBlocking(unsigned CallSiteID)`.
#[no_mangle]
pub extern "C" fn LoomAfterBlocking(call_site_id: u32) {
	let call_site_id = call_site_id as usize;
	guard(
		"LoomAfterBlocking",
		AssertUnwindSafe(move || crate::after_blocking(call_site_id)),
	);
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Scenario A driven through the `extern "C"` symbols rather than the
	/// safe wrappers: a thread entering and leaving site 7 must not panic
	/// or deadlock even with no filter installed.
	#[test]
	fn lifecycle_round_trip_through_ffi_symbols() {
		LoomEnterProcess();
		LoomEnterThread();
		LoomCycleCheck(0);
		LoomBeforeBlocking(7);
		LoomAfterBlocking(7);
		LoomExitThread();
	}
}
