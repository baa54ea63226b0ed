use std::io;
use std::time::Duration;

use static_assertions::assert_impl_all;

use crate::{
	backend::{Backend, Mock},
	error::*,
	protocol::{Axis, Command},
	Port,
};

assert_impl_all!(Port<Mock>: Send, std::fmt::Debug);
assert_impl_all!(Port<Box<dyn Backend + Send>>: Send);

/// Generate code to check how a port classifies replies.
///
/// The syntax is `<reply>, <command> => <check>` where multiple cases are
/// separated by `,`. `<reply>` is the `Option<&str>` the mock controller
/// answers every line with, and `<check>` is either `ok` or the name of an
/// [`Error`] predicate, such as `is_timeout`, that the result must satisfy.
macro_rules! check_cases {
	(@check $result:ident, ok, $reply:expr, $command:expr) => {
		if let Err(e) = $result {
			panic!(
				"unexpected error for {} answered with {}:\n\tactual error: {}\n\t{:?}\n",
				stringify!($command),
				stringify!($reply),
				e,
				e
			);
		}
	};
	(@check $result:ident, $predicate:ident, $reply:expr, $command:expr) => {
		match $result {
			Err(e) if e.$predicate() => {}
			other => panic!(
				"unexpected result for {} answered with {}:\n\texpected:\t{}\n\tgot:\t\t{:?}\n",
				stringify!($command),
				stringify!($reply),
				stringify!($predicate),
				other
			),
		}
	};
	($($reply:expr, $command:expr => $check:ident),+ $(,)?) => {
		$(
			let reply: Option<&'static str> = $reply;
			let mut port = Port::from_mock(Mock::with_responder(move |_| reply.map(str::to_string)));
			let result = port.transact(&$command);
			check_cases!(@check result, $check, $reply, $command);
		)+
	};
}

#[test]
fn reply_classification() {
	check_cases!(
		Some("1250"), Command::get_position(Axis::X).unwrap() => ok,
		None, Command::get_position(Axis::X).unwrap() => is_timeout,
		Some("E22"), Command::get_position(Axis::X).unwrap() => is_protocol,
		None, Command::drive_absolute(Axis::X, 10).unwrap() => ok,
		Some("E01"), Command::drive_absolute(Axis::X, 10).unwrap() => is_protocol,
		Some("E99"), Command::write_to_flash() => is_protocol,
		None, Command::get_version() => is_timeout,
		Some("DS102"), Command::get_version() => ok,
	);
}

#[test]
fn query_returns_payload() {
	let mut port = Port::from_mock(Mock::with_responder(|line| match line {
		":POS?" => Some("1250".to_string()),
		_ => None,
	}));
	let reply = port.transact(&Command::get_position(Axis::X).unwrap()).unwrap();
	assert_eq!(reply.as_str(), "1250");
	assert_eq!(reply.command(), ":POS?");
	assert_eq!(reply.to_f64().unwrap(), 1250.0);
}

#[test]
fn silent_set_command_is_success() {
	let mut port = Port::open_mock();
	let reply = port.transact(&Command::drive_absolute(Axis::Y, 12.5).unwrap()).unwrap();
	assert!(reply.is_empty());
	assert_eq!(
		port.backend().unwrap().written(),
		vec![":GOABS 12.5".to_string()]
	);
}

#[test]
fn error_reply_carries_code() {
	let mut port = Port::from_mock(Mock::with_responder(|_| Some("E02".to_string())));
	let err = port
		.transact(&Command::drive_absolute(Axis::X, 100).unwrap())
		.unwrap_err();
	assert!(matches!(err, Error::Protocol(ProtocolError::Controller(_))), "{err:?}");
	assert_eq!(err.controller_code().map(|c| c.as_str()), Some("E02"));
	assert!(err.to_string().contains("Limit detected"), "{err}");
}

#[test]
fn stale_input_is_discarded() {
	let mut port = Port::from_mock(Mock::with_responder(|line| {
		(line == ":MOTION?").then(|| "0".to_string())
	}));
	// A reply that arrived late for some earlier command.
	port.backend_mut().unwrap().append_data(b"1\r");
	let reply = port.transact(&Command::get_motion(Axis::X).unwrap()).unwrap();
	assert_eq!(reply.as_str(), "0");
}

#[test]
fn commands_are_terminated_once() {
	let mut port = Port::open_mock();
	port.raw("WRITE\r").unwrap();
	port.raw("WRITE").unwrap();
	assert_eq!(
		port.backend().unwrap().written(),
		vec!["WRITE".to_string(), "WRITE".to_string()]
	);
}

#[test]
fn read_until_excludes_delimiter() {
	let mut port = Port::open_mock();
	port.backend_mut().unwrap().append_data(b"12.5\rnext");
	let bytes = port.read_until(b'\r', Some(Duration::from_millis(10))).unwrap();
	assert_eq!(bytes, b"12.5");
}

#[test]
fn read_until_times_out_with_partial_data() {
	let mut port = Port::open_mock();
	port.backend_mut().unwrap().append_data(b"12");
	let err = port
		.read_until(b'\r', Some(Duration::from_millis(10)))
		.unwrap_err();
	match err {
		Error::Timeout(e) => assert_eq!(e.partial(), b"12"),
		e => panic!("unexpected error {e:?}"),
	}
}

#[test]
fn read_until_restores_timeout() {
	let mut port = Port::open_mock();
	port.set_read_timeout(Some(Duration::from_secs(1))).unwrap();
	let _ = port.read_until(b'\r', Some(Duration::from_millis(10)));
	assert_eq!(port.read_timeout().unwrap(), Some(Duration::from_secs(1)));
}

#[test]
fn closed_port_is_a_connection_error() {
	let mut port = Port::open_mock();
	assert!(port.is_open());
	port.close();
	assert!(!port.is_open());
	// Closing again is harmless.
	port.close();

	let err = port.raw("*IDN?").unwrap_err();
	assert!(err.is_connection(), "{err:?}");
	let err = port.write(b"WRITE\r").unwrap_err();
	assert!(err.is_connection(), "{err:?}");
	let err = port.read_until(b'\r', None).unwrap_err();
	assert!(err.is_connection(), "{err:?}");
}

#[test]
fn write_failure_is_a_connection_error() {
	let mut port = Port::open_mock();
	port.backend_mut()
		.unwrap()
		.write_error(Some(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged")));
	let err = port.raw("WRITE").unwrap_err();
	assert!(err.is_connection(), "{err:?}");
}

#[test]
fn read_failure_is_a_connection_error() {
	let mut port = Port::open_mock();
	port.backend_mut()
		.unwrap()
		.read_error(Some(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged")));
	let err = port.raw("*IDN?").unwrap_err();
	assert!(err.is_connection(), "{err:?}");
}

#[test]
fn timeout_guard_restores_timeout() {
	let mut port = Port::open_mock();
	port.set_read_timeout(Some(Duration::from_secs(1))).unwrap();
	{
		let guard = port.timeout_guard(Some(Duration::from_secs(7))).unwrap();
		assert_eq!(guard.read_timeout().unwrap(), Some(Duration::from_secs(7)));
	}
	assert_eq!(port.read_timeout().unwrap(), Some(Duration::from_secs(1)));
}

#[test]
fn failed_timeout_restore_poisons_port() {
	let mut port = Port::open_mock();
	{
		let mut guard = port.timeout_guard(Some(Duration::from_secs(7))).unwrap();
		guard
			.backend_mut()
			.unwrap()
			.set_read_timeout_error(Some(io::Error::new(io::ErrorKind::Other, "stuck")));
	}
	let err = port.raw("WRITE").unwrap_err();
	assert!(err.is_connection(), "{err:?}");
	assert!(err.to_string().contains("failed to reset timeout"), "{err}");

	// The poison is only reported once.
	port.raw("WRITE").unwrap();
}

#[test]
fn ack_window_is_configurable() {
	let mut port = Port::open_mock();
	assert_eq!(port.ack_window(), crate::port::DEFAULT_ACK_WINDOW);
	let old = port.set_ack_window(Duration::from_millis(5));
	assert_eq!(old, crate::port::DEFAULT_ACK_WINDOW);
	assert_eq!(port.ack_window(), Duration::from_millis(5));
}

#[test]
fn zero_timeout_drains_buffered_reply() {
	let mut port = Port::open_mock();
	port.backend_mut().unwrap().append_data(b"1250\r");
	let bytes = port.read_until(b'\r', Some(Duration::ZERO)).unwrap();
	assert_eq!(bytes, b"1250");
}

#[test]
fn query_with_zero_read_timeout() {
	let mut port = Port::from_mock(Mock::with_responder(|line| {
		(line == ":POS?").then(|| "1250".to_string())
	}));
	port.set_read_timeout(Some(Duration::ZERO)).unwrap();
	let reply = port.transact(&Command::get_position(Axis::X).unwrap()).unwrap();
	assert_eq!(reply.to_f64().unwrap(), 1250.0);

	// Nothing buffered still times out.
	let err = port.transact(&Command::get_version()).unwrap_err();
	assert!(err.is_timeout(), "{err:?}");
}

#[test]
fn late_rejection_is_discarded_before_next_command() {
	let mut port = Port::open_mock();
	// An `E01` that missed the acknowledgement window of an earlier command.
	port.backend_mut().unwrap().append_data(b"E01\r");
	let reply = port.transact(&Command::drive_absolute(Axis::X, 10).unwrap()).unwrap();
	assert!(reply.is_empty());
	assert!(port.backend().unwrap().is_empty());
}

#[test]
fn clear_input_returns_discarded_bytes() {
	let mut port = Port::open_mock();
	port.backend_mut().unwrap().append_data(b"E01\r1");
	assert_eq!(port.clear_input().unwrap(), b"E01\r1");
	assert!(port.clear_input().unwrap().is_empty());
}
