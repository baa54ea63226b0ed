//! Error types.
//!
//! Every fallible operation in this crate returns the top level [`Error`]
//! enum, which has exactly four kinds:
//!
//! * [`ConnectionError`]: the port is not open, could not be opened, or the
//!   transport failed while exchanging bytes.
//! * [`TimeoutError`]: the controller did not reply in time.
//! * [`ProtocolError`]: the controller answered with an `E`-coded reply, or
//!   with a payload that does not fit the command.
//! * [`ValidationError`]: a caller supplied value was rejected locally,
//!   before any bytes were sent.
//!
//! The individual error types convert into [`Error`], so they can be used
//! with `?`:
//!
//! ```
//! use ds102::error::{Error, ValidationError};
//!
//! fn check_table(table: u8) -> Result<(), ValidationError> {
//!     // ...
//! # Ok(())
//! }
//!
//! fn select(table: u8) -> Result<(), Error> {
//!     check_table(table)?;
//!     // ...
//! # Ok(())
//! }
//! ```
//!
//! Note that the `wait_*` family of methods on
//! [`Controller`](crate::Controller) reports "still moving at the deadline"
//! as `Ok(false)`, never as a [`TimeoutError`]. A [`TimeoutError`] always
//! means the controller stopped answering.

use std::{fmt, io, time::Duration};

use crate::protocol::ErrorCode;

/// The specified device could not be opened, is not open, or failed while in use.
#[derive(Debug, thiserror::Error)]
#[error("connection error: {message}")]
pub struct ConnectionError {
	message: Box<str>,
	#[source]
	source: Option<io::Error>,
}

impl ConnectionError {
	/// Create an error with the given description.
	pub(crate) fn new<M: Into<String>>(message: M) -> Self {
		ConnectionError {
			message: message.into().into_boxed_str(),
			source: None,
		}
	}

	/// The port was used after it was closed, or before it was opened.
	pub(crate) fn not_connected() -> Self {
		ConnectionError::new("not connected to controller")
	}

	/// Wrap a transport failure.
	pub(crate) fn io(err: io::Error) -> Self {
		ConnectionError {
			message: err.to_string().into_boxed_str(),
			source: Some(err),
		}
	}

	/// Get a description of the failure.
	pub fn message(&self) -> &str {
		&self.message
	}

	/// Get the kind of the underlying I/O error, if there is one.
	pub fn io_kind(&self) -> Option<io::ErrorKind> {
		self.source.as_ref().map(io::Error::kind)
	}
}

/// No complete reply arrived before the read timeout expired.
#[derive(Debug, thiserror::Error)]
pub struct TimeoutError {
	/// How long the port waited, if known.
	waited: Option<Duration>,
	/// Any bytes received before the timeout.
	partial: Box<[u8]>,
	/// What was being waited on.
	context: Box<str>,
}

impl TimeoutError {
	/// Create a timeout for a read that received `partial` before giving up.
	pub(crate) fn new<C: Into<String>>(context: C, waited: Option<Duration>, partial: &[u8]) -> Self {
		TimeoutError {
			waited,
			partial: Box::from(partial),
			context: context.into().into_boxed_str(),
		}
	}

	/// How long the port waited before giving up, if known.
	pub fn waited(&self) -> Option<Duration> {
		self.waited
	}

	/// The bytes that were received before the timeout, if any.
	pub fn partial(&self) -> &[u8] {
		&self.partial
	}
}

impl fmt::Display for TimeoutError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "timed out {}", self.context)?;
		if let Some(waited) = self.waited {
			write!(f, " after {waited:?}")?;
		}
		if !self.partial.is_empty() {
			write!(
				f,
				" (received {:?} without a delimiter)",
				String::from_utf8_lossy(&self.partial)
			)?;
		}
		Ok(())
	}
}

/// The controller answered a command with an `E`-coded error reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
#[error("controller error {}: {}", .code.as_str(), .code.message())]
pub struct ControllerError {
	code: ErrorCode,
}

impl ControllerError {
	/// Create an error for the given code.
	pub fn new(code: ErrorCode) -> Self {
		ControllerError { code }
	}

	/// Get the decoded error code.
	pub fn code(&self) -> &ErrorCode {
		&self.code
	}

	/// Get the human readable description of the code.
	pub fn message(&self) -> &str {
		self.code.message()
	}

	/// Whether the code is not one of the documented codes.
	///
	/// The raw code is still available from [`code`](Self::code).
	pub fn is_unknown(&self) -> bool {
		matches!(self.code, ErrorCode::Unknown(_))
	}
}

/// A reply that is not an error, but that cannot be interpreted as the
/// command documents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unexpected reply to `{command}`: {reply:?} ({expected})")]
pub struct UnexpectedReplyError {
	command: Box<str>,
	reply: Box<str>,
	expected: &'static str,
}

impl UnexpectedReplyError {
	/// Create a new error.
	///
	/// `expected` describes what the reply should have contained.
	pub(crate) fn new(command: &str, reply: &str, expected: &'static str) -> Self {
		UnexpectedReplyError {
			command: Box::from(command),
			reply: Box::from(reply),
			expected,
		}
	}

	/// Get the command that elicited the reply.
	pub fn command(&self) -> &str {
		&self.command
	}

	/// Get the offending reply.
	pub fn reply(&self) -> &str {
		&self.reply
	}
}

/// The controller's reply did not conform to the protocol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ProtocolError {
	/// The controller reported an error.
	#[error(transparent)]
	Controller(#[from] ControllerError),
	/// The reply could not be parsed.
	#[error(transparent)]
	UnexpectedReply(#[from] UnexpectedReplyError),
}

/// A caller supplied value was rejected before it was sent to the controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {what}: {detail}")]
pub struct ValidationError {
	what: &'static str,
	detail: Box<str>,
}

impl ValidationError {
	/// Create a new error describing why `what` was rejected.
	pub(crate) fn new<D: Into<String>>(what: &'static str, detail: D) -> Self {
		ValidationError {
			what,
			detail: detail.into().into_boxed_str(),
		}
	}

	/// The value of `what` is outside of the inclusive range `min..=max`.
	pub(crate) fn out_of_range<T: fmt::Display>(what: &'static str, value: T, min: T, max: T) -> Self {
		ValidationError::new(what, format!("{value} must be between {min} and {max}"))
	}

	/// Get the name of the rejected value.
	pub fn what(&self) -> &str {
		self.what
	}

	/// Get the reason the value was rejected.
	pub fn detail(&self) -> &str {
		&self.detail
	}
}

/// A configuration file could not be loaded.
///
/// This is kept apart from [`Error`] because it only happens at startup,
/// never while talking to the controller.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
	/// The file could not be read.
	#[error("failed to read {path}: {source}")]
	Io {
		/// The path of the file.
		path: String,
		/// The underlying error.
		#[source]
		source: io::Error,
	},
	/// The file is not valid TOML or does not match the expected layout.
	#[error("failed to parse configuration: {0}")]
	Parse(#[from] toml::de::Error),
	/// The file parsed but a value is unusable.
	#[error("invalid configuration: {0}")]
	Invalid(#[from] ValidationError),
}

/// Any error returned by this library.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// The transport is unavailable or failed.
	#[error(transparent)]
	Connection(#[from] ConnectionError),
	/// The controller did not reply in time.
	#[error(transparent)]
	Timeout(#[from] TimeoutError),
	/// The controller's reply signalled a fault or was malformed.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
	/// A value was rejected locally.
	#[error(transparent)]
	Validation(#[from] ValidationError),
}

impl Error {
	/// A convenience function for determining if the error is due to the
	/// port timing out.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Timeout(_))
	}

	/// Whether the error is a transport failure.
	pub fn is_connection(&self) -> bool {
		matches!(self, Error::Connection(_))
	}

	/// Whether the error came from the controller's reply.
	pub fn is_protocol(&self) -> bool {
		matches!(self, Error::Protocol(_))
	}

	/// Whether the error was raised locally before sending anything.
	pub fn is_validation(&self) -> bool {
		matches!(self, Error::Validation(_))
	}

	/// If the controller reported an error, get its code.
	pub fn controller_code(&self) -> Option<&ErrorCode> {
		match self {
			Error::Protocol(ProtocolError::Controller(e)) => Some(e.code()),
			_ => None,
		}
	}
}

impl From<ControllerError> for Error {
	fn from(other: ControllerError) -> Self {
		Error::Protocol(other.into())
	}
}

impl From<UnexpectedReplyError> for Error {
	fn from(other: UnexpectedReplyError) -> Self {
		Error::Protocol(other.into())
	}
}

impl From<io::Error> for Error {
	fn from(other: io::Error) -> Self {
		match other.kind() {
			io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
				Error::Timeout(TimeoutError::new("waiting for the controller", None, &[]))
			}
			_ => Error::Connection(ConnectionError::io(other)),
		}
	}
}

impl From<serialport::Error> for Error {
	fn from(other: serialport::Error) -> Self {
		match other.kind() {
			serialport::ErrorKind::NoDevice => Error::Connection(ConnectionError::new(format!(
				"the specified device is either disconnected or already in use by another process: {}",
				other.description
			))),
			serialport::ErrorKind::InvalidInput => Error::Connection(ConnectionError::io(io::Error::new(
				io::ErrorKind::InvalidInput,
				other.description,
			))),
			serialport::ErrorKind::Unknown => {
				Error::Connection(ConnectionError::io(io::Error::other(other.description)))
			}
			serialport::ErrorKind::Io(kind) => Error::from(io::Error::new(kind, other.description)),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use static_assertions::assert_impl_all;

	// The error types must be usable across threads, e.g. behind the
	// StageContext's mutex.
	assert_impl_all!(Error: Send, Sync, std::error::Error);
	assert_impl_all!(ProtocolError: Send, Sync, Clone);
	assert_impl_all!(
		ConfigError: Send,
		Sync,
		std::error::Error,
		From<toml::de::Error>,
		From<ValidationError>
	);

	// Make sure the concrete errors convert into the top level error.
	assert_impl_all!(
		Error: From<ConnectionError>,
		From<TimeoutError>,
		From<ProtocolError>,
		From<ControllerError>,
		From<UnexpectedReplyError>,
		From<ValidationError>,
		From<io::Error>,
		From<serialport::Error>
	);

	#[test]
	fn io_timeouts_become_timeout_errors() {
		let err = Error::from(io::Error::new(io::ErrorKind::TimedOut, "slow"));
		assert!(err.is_timeout());
		let err = Error::from(io::Error::new(io::ErrorKind::WouldBlock, "slow"));
		assert!(err.is_timeout());
	}

	#[test]
	fn other_io_errors_become_connection_errors() {
		let err = Error::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
		assert!(err.is_connection());
		match err {
			Error::Connection(e) => assert_eq!(e.io_kind(), Some(io::ErrorKind::BrokenPipe)),
			e => panic!("unexpected error {e:?}"),
		}
	}

	#[test]
	fn serialport_no_device_is_a_connection_error() {
		let err = Error::from(serialport::Error::new(
			serialport::ErrorKind::NoDevice,
			"/dev/ttyUSB9",
		));
		assert!(err.is_connection());
		assert!(err.to_string().contains("/dev/ttyUSB9"));
	}

	#[test]
	fn controller_error_display_includes_code_and_message() {
		let err = Error::from(ControllerError::new(ErrorCode::Limit));
		assert_eq!(err.to_string(), "controller error E02: Limit detected");
		assert_eq!(err.controller_code(), Some(&ErrorCode::Limit));
	}

	#[test]
	fn timeout_display_mentions_partial_data() {
		let err = TimeoutError::new("waiting for `:POS?`", Some(Duration::from_secs(1)), b"12");
		let text = err.to_string();
		assert!(text.starts_with("timed out waiting for `:POS?` after 1s"), "{text}");
		assert!(text.contains("\"12\""), "{text}");
	}

	#[test]
	fn validation_out_of_range_message() {
		let err = ValidationError::out_of_range("speed table", 12, 0, 9);
		assert_eq!(err.to_string(), "invalid speed table: 12 must be between 0 and 9");
		assert_eq!(err.what(), "speed table");
	}
}
