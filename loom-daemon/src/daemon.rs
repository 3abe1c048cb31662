//! `RunDaemon`/`StartDaemon` (spec §4.8, §6.3): the daemon thread itself.
//!
//! Mirrors `examples/original_source/runtime/UpdateEngine/Daemon.c`'s
//! `RunDaemon`: block every asynchronous signal first, set the OS-visible
//! thread name, connect to the controller, announce, then loop reading one
//! command and writing exactly one response per iteration. A transport
//! failure ends the loop; the thread simply exits, which is why
//! [`spawn`]'s closure only logs the error rather than propagating it
//! anywhere (spec §7: "the rest of the application is unaffected").

use std::io::BufReader;
use std::net::TcpStream;
use std::sync::Mutex;
use std::thread::JoinHandle;

use loom_core::Loom;
use loom_filters::FilterRegistry;
use nix::sys::signal::{pthread_sigmask, SigSet, SigmaskHow};

use crate::commands::process_message;
use crate::config::Config;
use crate::error::DaemonError;
use crate::wire::{receive_message, send_message};

/// OS-visible thread name ("ps c" in the original's comment). Giving
/// [`std::thread::Builder::name`] a name has the same effect as the
/// original's explicit `prctl(PR_SET_NAME, ...)` call on Linux, and it runs
/// on the daemon thread itself (not its creator), which spec §9's "Signal
/// policy" note requires for [`block_all_signals`] too.
const THREAD_NAME: &str = "loom-daemon";

/// Spawns the daemon thread and returns immediately, mirroring the
/// original's `StartDaemon`/`pthread_create`. `loom` must outlive the
/// returned handle; the facade crate satisfies this with a process-wide
/// singleton.
pub fn spawn(loom: &'static Loom, config: Config) -> JoinHandle<()> {
	let registry = Mutex::new(FilterRegistry::new(loom, config.num_filters));
	std::thread::Builder::new()
		.name(THREAD_NAME.to_owned())
		.spawn(move || {
			if let Err(err) = run(&config, &registry) {
				log::error!("loom daemon exiting: {err}");
			}
		})
		.expect("failed to spawn loom daemon thread")
}

/// Blocks every asynchronous signal on the calling thread.
///
/// Host applications such as databases and web servers run their own signal
/// handling thread relying on `sigwait`; an interloper thread that accepts
/// a signal first could prevent the host from ever observing it.
fn block_all_signals() -> Result<(), DaemonError> {
	let all = SigSet::all();
	pthread_sigmask(SigmaskHow::SIG_BLOCK, Some(&all), None)?;
	Ok(())
}

/// The daemon's request/response loop (spec §4.8 step (v) onward). Runs
/// until the controller connection fails; never exits voluntarily
/// otherwise.
fn run(config: &Config, registry: &Mutex<FilterRegistry<'_>>) -> Result<(), DaemonError> {
	block_all_signals()?;
	log::info!("loom daemon is running");

	let stream = TcpStream::connect(config.controller_addr)?;
	log::info!("connected to controller at {}", config.controller_addr);

	let mut writer = stream.try_clone()?;
	let mut reader = BufReader::new(stream);

	// "Tell the controller I am a daemon" — does not wait for a reply.
	send_message(&mut writer, "iam loom_daemon")?;

	loop {
		let line = receive_message(&mut reader)?;
		log::debug!("received command: {line:?}");
		let response = {
			let mut registry = registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
			process_message(&mut registry, &line)
		};
		debug_assert!(!response.is_empty(), "spec §6.1: the response is always non-empty");
		send_message(&mut writer, &response)?;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use std::net::TcpListener;

	fn free_loom() -> &'static Loom {
		Box::leak(Box::new(Loom::new(4, 16)))
	}

	/// Scenario A/E driven end-to-end over a real loopback socket: connect,
	/// receive the handshake, send a malformed command, check the response.
	#[test]
	fn handshake_then_malformed_command_roundtrip() {
		let listener = TcpListener::bind("127.0.0.1:0").unwrap();
		let addr = listener.local_addr().unwrap();

		let loom = free_loom();
		let config = Config {
			controller_addr: addr,
			num_filters: 8,
		};
		let registry = Mutex::new(FilterRegistry::new(loom, config.num_filters));

		let daemon = std::thread::spawn(move || {
			let _ = run(&config, &registry);
		});

		let (mut conn, _) = listener.accept().unwrap();
		let mut reader = BufReader::new(conn.try_clone().unwrap());

		let handshake = receive_message(&mut reader).unwrap();
		assert_eq!(handshake, "iam loom_daemon");

		writeln!(conn, "").unwrap();
		let response = receive_message(&mut reader).unwrap();
		assert_eq!(response, "no command specified");

		drop(conn);
		let _ = daemon.join();
	}
}
