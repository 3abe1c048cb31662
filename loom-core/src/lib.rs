//! `loom-core` is the evacuation/quiescence protocol and hook-dispatch data
//! plane backing a live-update engine: application threads continuously
//! call [`runtime::Loom::cycle_check`], [`runtime::Loom::before_blocking`]
//! and [`runtime::Loom::after_blocking`] at back edges and blocking call
//! sites, while an updater drives [`runtime::Loom::evacuate`] to safely
//! mutate per-site operation chains.
//!
//! # Threading notes
//!
//! None of the functions here spawn threads, block on I/O, or depend on any
//! async runtime. They are meant to be called directly from arbitrary,
//! preemptively-scheduled OS threads, including the single bootstrap thread
//! during process startup.

mod atomics;
mod evacuation;
mod lock;
mod runtime;
mod site;

pub use evacuation::Evacuation;
pub use runtime::Loom;
pub use site::{BackEdgeId, Callback, FilterId, HookFlavor, Operation, SlotId};
