//! Drives `loom::start_daemon` over a real loopback TCP connection and
//! exercises the controller protocol end to end (spec §6.1 scenarios
//! A/B/D/E), standing in for the controller process.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;

use loom::SystemConfig;

fn filter_file(contents: &str) -> tempfile::NamedTempFileGuard {
	tempfile::NamedTempFileGuard::new(contents)
}

/// Tiny drop-cleaning scratch file, mirroring the helper `loom-daemon`'s
/// own command tests use, since this workspace does not depend on the
/// `tempfile` crate.
mod tempfile {
	pub struct NamedTempFileGuard {
		path: std::path::PathBuf,
	}

	impl NamedTempFileGuard {
		pub fn new(contents: &str) -> Self {
			let path = std::env::temp_dir().join(format!(
				"loom-daemon-wire-test-{:?}-{}",
				std::thread::current().id(),
				std::process::id()
			));
			std::fs::write(&path, contents).unwrap();
			Self { path }
		}

		pub fn path(&self) -> &std::path::Path {
			&self.path
		}
	}

	impl Drop for NamedTempFileGuard {
		fn drop(&mut self) {
			let _ = std::fs::remove_file(&self.path);
		}
	}
}

#[test]
fn add_double_add_delete_over_the_wire() {
	let listener = TcpListener::bind("127.0.0.1:0").unwrap();
	let addr = listener.local_addr().unwrap();

	loom::configure(SystemConfig {
		num_back_edges: 8,
		num_hook_sites: 16,
		num_filters: 4,
		controller_addr: addr,
	});
	loom::start_daemon().unwrap();

	let (conn, _) = listener.accept().unwrap();
	let mut writer = conn.try_clone().unwrap();
	let mut reader = BufReader::new(conn);

	let mut line = String::new();
	reader.read_line(&mut line).unwrap();
	assert_eq!(line.trim_end(), "iam loom_daemon");

	let file = filter_file("1 2\n0 7\n1 7\n");
	let path = file.path().to_str().unwrap();

	let mut roundtrip = |command: &str| -> String {
		writeln!(writer, "{command}").unwrap();
		let mut response = String::new();
		reader.read_line(&mut response).unwrap();
		response.trim_end().to_owned()
	};

	assert_eq!(roundtrip(&format!("add 0 {path}")), "filter 0 is successfully added");
	assert_eq!(roundtrip(&format!("add 0 {path}")), "failed to add the filter");
	assert_eq!(roundtrip("del 0"), "filter 0 is successfully deleted");
	assert_eq!(roundtrip("del 0"), "failed to delete the filter");
	assert_eq!(roundtrip(""), "no command specified");
	assert_eq!(
		roundtrip("add 0"),
		"wrong format. expect: add <filter ID> <file name>"
	);
}
