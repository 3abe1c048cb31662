//! Parsing the filter-file grammar (spec §6.2) into a [`FilterSpec`] the
//! registry can install.

use std::collections::HashSet;

use loom_core::{BackEdgeId, Callback, SlotId};

use crate::error::FilterError;
use crate::kind::FilterKind;

/// A parsed, not-yet-installed filter: the behavior (`kind`), the operations
/// it wants linked into site chains, and the unsafe sets it needs evacuated
/// before those links can be made.
///
/// Per spec §9's "Unsafe-set computation TODO", the source ships only the
/// empty, all-safe configuration — computing a filter's real unsafe sets
/// from its slot ids plus instrumentation metadata is declared out of scope
/// for this core. `unsafe_back_edges`/`unsafe_call_sites` are therefore
/// exposed as explicit, default-empty fields a caller may populate once that
/// analysis exists upstream, rather than hardcoded to empty internally.
#[derive(Debug, Clone)]
pub struct FilterSpec {
	pub kind: FilterKind,
	pub entries: Vec<(Callback, SlotId)>,
	pub unsafe_back_edges: HashSet<BackEdgeId>,
	pub unsafe_call_sites: HashSet<SlotId>,
}

impl FilterSpec {
	/// Parses the §6.2 grammar: a header line `<kind> <num_ops>` followed by
	/// exactly `num_ops` lines of `<entry_or_exit> <slot_id>`.
	pub fn parse(contents: &str) -> Result<Self, FilterError> {
		let mut lines = contents.lines();

		let header = lines
			.next()
			.ok_or_else(|| FilterError::MalformedFilter {
				reason: "empty filter file".to_owned(),
			})?;
		let mut header_tokens = header.split_whitespace();

		let kind_tag = parse_token::<i64>(header_tokens.next(), "filter kind")?;
		let num_ops = parse_token::<usize>(header_tokens.next(), "operation count")?;
		let kind = FilterKind::from_tag(kind_tag)?;

		let mut entries = Vec::with_capacity(num_ops);
		for index in 0..num_ops {
			let line = lines.next().ok_or_else(|| FilterError::MalformedFilter {
				reason: format!("expected {num_ops} operation lines, found {index}"),
			})?;
			let mut tokens = line.split_whitespace();
			let entry_or_exit = parse_token::<i64>(tokens.next(), "entry_or_exit")?;
			let slot_id = parse_token::<usize>(tokens.next(), "slot id")?;

			let callback = match kind {
				// "entry_or_exit = 0 binds EnterCriticalRegion to that slot;
				// any other value binds ExitCriticalRegion" (spec §6.2).
				FilterKind::CriticalRegion if entry_or_exit == 0 => Callback::EnterCriticalRegion,
				FilterKind::CriticalRegion => Callback::ExitCriticalRegion,
			};
			entries.push((callback, SlotId(slot_id)));
		}

		Ok(Self {
			kind,
			entries,
			unsafe_back_edges: HashSet::new(),
			unsafe_call_sites: HashSet::new(),
		})
	}
}

fn parse_token<T: std::str::FromStr>(token: Option<&str>, field: &str) -> Result<T, FilterError> {
	token
		.ok_or_else(|| FilterError::MalformedFilter {
			reason: format!("missing {field}"),
		})?
		.parse()
		.map_err(|_| FilterError::MalformedFilter {
			reason: format!("{field} is not a valid integer"),
		})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_critical_region_filter() {
		let spec = FilterSpec::parse("1 2\n0 7\n1 7\n").unwrap();
		assert_eq!(spec.kind, FilterKind::CriticalRegion);
		assert_eq!(
			spec.entries,
			vec![
				(Callback::EnterCriticalRegion, SlotId(7)),
				(Callback::ExitCriticalRegion, SlotId(7)),
			]
		);
	}

	#[test]
	fn zero_ops_is_legal() {
		let spec = FilterSpec::parse("1 0\n").unwrap();
		assert!(spec.entries.is_empty());
	}

	#[test]
	fn unknown_kind_is_rejected() {
		let err = FilterSpec::parse("9 0\n").unwrap_err();
		assert!(matches!(err, FilterError::UnknownFilterKind { tag: 9 }));
	}

	#[test]
	fn truncated_body_is_malformed() {
		let err = FilterSpec::parse("1 2\n0 7\n").unwrap_err();
		assert!(matches!(err, FilterError::MalformedFilter { .. }));
	}
}
