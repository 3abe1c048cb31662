//! The filter registry (C7): `install`/`uninstall`/`clear_all`, built on
//! `loom-core`'s evacuation primitives.
//!
//! Unlike the hook-site tables in `loom-core`, `filters[]` has exactly one
//! writer in this design — the daemon thread — so [`FilterRegistry`] takes
//! `&mut self` on every mutating method instead of relying on a runtime
//! discipline enforced by the update-lock. This is a small, deliberate
//! tightening over the original: the invariant "the daemon is the sole
//! mutator of `filters[]`" (spec §5) is now load-bearing in the type system
//! rather than merely documented.

use loom_core::{FilterId, Loom, Operation};

use crate::error::FilterError;
use crate::kind::FilterKind;
use crate::spec::FilterSpec;

struct InstalledFilter {
	kind: FilterKind,
	ops: Vec<Operation>,
}

/// Owns the filter-id-indexed slot table and drives install/uninstall
/// through the shared [`Loom`].
///
/// Does not itself hold the per-filter `CriticalRegion` mutexes
/// ([`crate::CriticalRegionMutexes`]): those are preallocated once and
/// shared with dispatch code independently of this registry, since
/// "initializing"/"destroying" a filter's mutex is a bookkeeping no-op here
/// (see `mutex.rs`), leaving nothing for the registry to own on that front.
pub struct FilterRegistry<'a> {
	loom: &'a Loom,
	slots: Vec<Option<InstalledFilter>>,
}

impl<'a> FilterRegistry<'a> {
	pub fn new(loom: &'a Loom, num_filters: usize) -> Self {
		Self {
			loom,
			slots: (0..num_filters).map(|_| None).collect(),
		}
	}

	pub fn num_filters(&self) -> usize {
		self.slots.len()
	}

	fn slot(&self, id: FilterId) -> Result<&Option<InstalledFilter>, FilterError> {
		self.slots.get(id.0 as usize).ok_or(FilterError::NotFound { id })
	}

	fn slot_mut(&mut self, id: FilterId) -> Result<&mut Option<InstalledFilter>, FilterError> {
		self.slots.get_mut(id.0 as usize).ok_or(FilterError::NotFound { id })
	}

	/// Whether `id` currently names an installed filter. Intended for tests
	/// and the daemon's own bookkeeping.
	pub fn is_installed(&self, id: FilterId) -> bool {
		matches!(self.slot(id), Ok(Some(_)))
	}

	/// `install(filter_id, spec)` (spec §4.7): fails `AlreadyExists` if the
	/// slot is occupied, otherwise evacuates the spec's unsafe sets, links
	/// every operation onto its site's chain, and records the filter.
	pub fn install(&mut self, id: FilterId, spec: FilterSpec) -> Result<(), FilterError> {
		if matches!(self.slot(id)?, Some(_)) {
			return Err(FilterError::AlreadyExists { id });
		}

		let evacuation = self
			.loom
			.evacuate(&spec.unsafe_back_edges, &spec.unsafe_call_sites);

		let mut ops = Vec::with_capacity(spec.entries.len());
		for (callback, slot_id) in &spec.entries {
			let op = Operation {
				callback: *callback,
				arg: id,
				slot_id: *slot_id,
			};
			evacuation.prepend(*slot_id, op);
			ops.push(op);
		}
		drop(evacuation);

		log::info!("filter {} installed ({} operations)", id.0, ops.len());
		*self.slot_mut(id)? = Some(InstalledFilter { kind: spec.kind, ops });
		Ok(())
	}

	/// `uninstall(filter_id)` (spec §4.7): fails `NotFound` if the slot is
	/// empty, otherwise evacuates (conservatively, with empty unsafe sets,
	/// as the spec permits), unlinks every operation the filter owned, and
	/// clears the slot.
	pub fn uninstall(&mut self, id: FilterId) -> Result<(), FilterError> {
		let installed = self.slot_mut(id)?.take().ok_or(FilterError::NotFound { id })?;

		let evacuation = self.loom.evacuate(&Default::default(), &Default::default());
		for op in &installed.ops {
			evacuation.unlink(op.slot_id, *op);
		}
		drop(evacuation);

		log::info!("filter {} uninstalled ({} operations)", id.0, installed.ops.len());
		Ok(())
	}

	/// `clear_all()` (spec §4.7): tears down every installed filter's own
	/// bookkeeping without an intervening evacuation. Safe only once no
	/// application thread remains — `ExitProcess`'s call to
	/// [`Loom::exit_process`] already clears every site's operation chain
	/// wholesale, so there is nothing left for this to unlink; it only
	/// needs to forget the registry's own records.
	pub fn clear_all(&mut self) {
		let cleared = self.slots.iter_mut().filter(|slot| slot.take().is_some()).count();
		log::info!("cleared {cleared} installed filters");
	}
}
