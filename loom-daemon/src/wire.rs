//! `SendMessage`/`ReceiveMessage` (spec §6.1): newline-delimited framing,
//! "one logical message per call".

use std::io::{BufRead, Write};

use crate::error::DaemonError;

pub(crate) fn send_message(stream: &mut impl Write, message: &str) -> Result<(), DaemonError> {
	writeln!(stream, "{message}")?;
	stream.flush()?;
	Ok(())
}

pub(crate) fn receive_message(reader: &mut impl BufRead) -> Result<String, DaemonError> {
	let mut line = String::new();
	let read = reader.read_line(&mut line)?;
	if read == 0 {
		return Err(DaemonError::TransportFailure(std::io::Error::new(
			std::io::ErrorKind::UnexpectedEof,
			"controller closed the connection",
		)));
	}
	while matches!(line.chars().last(), Some('\n') | Some('\r')) {
		line.pop();
	}
	Ok(line)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;

	#[test]
	fn receive_strips_newline() {
		let mut reader = Cursor::new(b"add 0 fa.txt\n".to_vec());
		assert_eq!(receive_message(&mut reader).unwrap(), "add 0 fa.txt");
	}

	#[test]
	fn receive_on_closed_connection_is_transport_failure() {
		let mut reader = Cursor::new(Vec::new());
		assert!(receive_message(&mut reader).is_err());
	}

	#[test]
	fn send_appends_exactly_one_newline() {
		let mut buf = Vec::new();
		send_message(&mut buf, "filter 0 is successfully added").unwrap();
		assert_eq!(buf, b"filter 0 is successfully added\n");
	}
}
