//! `FilterKind`: the closed set of filter behaviors. `Unknown` (spec's
//! "slot empty" tag) is represented by `Option<FilterKind>`/`None` at the
//! registry layer rather than as a variant here, so the type system rules
//! out ever constructing an "unknown-kind" filter by accident.

use crate::error::FilterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
	CriticalRegion,
}

impl FilterKind {
	/// The filter-file grammar's kind tag (§6.2): `1` is the only currently
	/// supported kind.
	pub fn from_tag(tag: i64) -> Result<Self, FilterError> {
		match tag {
			1 => Ok(FilterKind::CriticalRegion),
			other => Err(FilterError::UnknownFilterKind { tag: other }),
		}
	}
}
