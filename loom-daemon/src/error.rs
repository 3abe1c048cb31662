//! The two daemon-fatal error kinds from spec §7: everything else
//! (`MalformedCommand`, `MalformedFilter`, `AlreadyExists`, `NotFound`,
//! `UnknownFilterKind`) is handled per-message by [`crate::commands`] and
//! surfaces only as a response string, never as a `Result` — exactly as the
//! original `ProcessMessage`'s `-1` return is unchecked by its caller.

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
	#[error("controller transport failure: {0}")]
	TransportFailure(#[from] std::io::Error),

	#[error("failed to block signals on the daemon thread: {0}")]
	Signal(#[from] nix::errno::Errno),
}
