//! The filter-registry error taxonomy (spec §7), minus the transport- and
//! command-framing kinds that belong to `loom-daemon`.

use loom_core::FilterId;

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
	#[error("filter {} is already installed", .id.0)]
	AlreadyExists { id: FilterId },

	#[error("filter {} is not installed", .id.0)]
	NotFound { id: FilterId },

	#[error("malformed filter file: {reason}")]
	MalformedFilter { reason: String },

	/// Kept distinct from [`Self::MalformedFilter`] so callers can log the
	/// offending tag, but handled identically by the daemon's response
	/// mapping ("unknown kinds cause the whole file to be rejected").
	#[error("unknown filter kind tag {tag}")]
	UnknownFilterKind { tag: i64 },
}
