//! `ProcessMessage` (spec §6.1): parses one command line, dispatches to the
//! filter registry, and always produces exactly one non-empty response
//! string. Unlike the original, nothing here is fallible at the Rust type
//! level — a malformed command is not a [`crate::DaemonError`], it is a
//! diagnostic response, matching the original's caller ignoring
//! `ProcessMessage`'s return code entirely.

use loom_core::FilterId;
use loom_filters::{FilterError, FilterRegistry, FilterSpec};

pub(crate) fn process_message(registry: &mut FilterRegistry<'_>, line: &str) -> String {
	let mut tokens = line.split(' ').filter(|token| !token.is_empty());

	let Some(command) = tokens.next() else {
		return "no command specified".to_owned();
	};

	match command {
		"add" => handle_add(registry, &mut tokens),
		"del" => handle_del(registry, &mut tokens),
		_ => "unknown command".to_owned(),
	}
}

fn handle_add<'a>(registry: &mut FilterRegistry<'_>, tokens: &mut impl Iterator<Item = &'a str>) -> String {
	const WRONG_FORMAT: &str = "wrong format. expect: add <filter ID> <file name>";

	let Some(id_token) = tokens.next() else {
		return WRONG_FORMAT.to_owned();
	};
	let Some(filename) = tokens.next() else {
		return WRONG_FORMAT.to_owned();
	};
	let Ok(id) = id_token.parse::<u32>() else {
		return WRONG_FORMAT.to_owned();
	};

	match add_filter(registry, FilterId(id), filename) {
		Ok(()) => format!("filter {id} is successfully added"),
		Err(()) => "failed to add the filter".to_owned(),
	}
}

fn add_filter(registry: &mut FilterRegistry<'_>, id: FilterId, filename: &str) -> Result<(), ()> {
	let contents = std::fs::read_to_string(filename).map_err(|err| {
		log::warn!("cannot open filter file {filename}: {err}");
	})?;
	let spec = FilterSpec::parse(&contents).map_err(|err| {
		log::warn!("malformed filter file {filename}: {err}");
	})?;
	registry.install(id, spec).map_err(|err| match err {
		FilterError::AlreadyExists { id } => log::warn!("filter {} already exists", id.0),
		other => log::warn!("failed to install filter {}: {other}", id.0),
	})
}

fn handle_del<'a>(registry: &mut FilterRegistry<'_>, tokens: &mut impl Iterator<Item = &'a str>) -> String {
	const WRONG_FORMAT: &str = "wrong format. expect: del <filter ID>";

	let Some(id_token) = tokens.next() else {
		return WRONG_FORMAT.to_owned();
	};
	let Ok(id) = id_token.parse::<u32>() else {
		return WRONG_FORMAT.to_owned();
	};

	match registry.uninstall(FilterId(id)) {
		Ok(()) => format!("filter {id} is successfully deleted"),
		Err(err) => {
			log::warn!("failed to delete filter {id}: {err}");
			"failed to delete the filter".to_owned()
		}
	}
}
