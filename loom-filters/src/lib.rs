//! `loom-filters` is the typed, safe layer on top of `loom-core`'s raw
//! evacuation and hook-dispatch primitives: it understands what a filter
//! *is* (a kind, a set of operations, a per-filter mutex) and turns a
//! parsed filter-file into the right sequence of `loom-core` calls.

mod error;
mod kind;
mod mutex;
mod registry;
mod spec;

pub use error::FilterError;
pub use kind::FilterKind;
pub use mutex::CriticalRegionMutexes;
pub use registry::FilterRegistry;
pub use spec::FilterSpec;
