//! Replies from the controller.

use crate::error::{ControllerError, UnexpectedReplyError};
use std::fmt;

/// The code of an `E`-prefixed error reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
	/// `E00`: the stage is not connected, or a sensor logic setting is wrong.
	NotConnected,
	/// `E01`: the axis is in motion.
	AxisInMotion,
	/// `E02`: a limit was detected.
	Limit,
	/// `E03`: an emergency stop was detected.
	Emergency,
	/// `E20`: the command broke a command rule.
	CommandRule,
	/// `E21`: the command was not terminated with a delimiter.
	MissingDelimiter,
	/// `E22`: a setting was out of range.
	Range,
	/// `E40`: a communication error.
	Communication,
	/// `E41`: the flash memory could not be written.
	FlashWrite,
	/// Any other `E`-prefixed reply. The raw code is preserved.
	Unknown(Box<str>),
}

impl ErrorCode {
	/// Decode the code from a reply such as `"E02"`.
	pub fn from_reply(reply: &str) -> Self {
		match reply {
			"E00" => ErrorCode::NotConnected,
			"E01" => ErrorCode::AxisInMotion,
			"E02" => ErrorCode::Limit,
			"E03" => ErrorCode::Emergency,
			"E20" => ErrorCode::CommandRule,
			"E21" => ErrorCode::MissingDelimiter,
			"E22" => ErrorCode::Range,
			"E40" => ErrorCode::Communication,
			"E41" => ErrorCode::FlashWrite,
			other => ErrorCode::Unknown(Box::from(other)),
		}
	}

	/// Get the code as it appears on the wire.
	pub fn as_str(&self) -> &str {
		match self {
			ErrorCode::NotConnected => "E00",
			ErrorCode::AxisInMotion => "E01",
			ErrorCode::Limit => "E02",
			ErrorCode::Emergency => "E03",
			ErrorCode::CommandRule => "E20",
			ErrorCode::MissingDelimiter => "E21",
			ErrorCode::Range => "E22",
			ErrorCode::Communication => "E40",
			ErrorCode::FlashWrite => "E41",
			ErrorCode::Unknown(code) => code,
		}
	}

	/// Get the description the controller's manual gives for the code.
	pub fn message(&self) -> &'static str {
		match self {
			ErrorCode::NotConnected => "Stage is not connected or sensor logic setting error",
			ErrorCode::AxisInMotion => "Axis is in motion",
			ErrorCode::Limit => "Limit detected",
			ErrorCode::Emergency => "Emergency detected",
			ErrorCode::CommandRule => "Command rule error",
			ErrorCode::MissingDelimiter => "Error of unsent delimiter",
			ErrorCode::Range => "Setting range error",
			ErrorCode::Communication => "Communication error",
			ErrorCode::FlashWrite => "Error of write in flash memory",
			ErrorCode::Unknown(_) => "Unknown controller error",
		}
	}
}

impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A successful reply to a command.
///
/// Setting and drive commands are acknowledged with silence, which produces
/// an empty reply. Queries carry a payload that the caller interprets with
/// one of the `to_*` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
	/// The command the reply answers, without the delimiter.
	command: Box<str>,
	/// The reply with surrounding whitespace removed.
	payload: Box<str>,
}

impl Reply {
	/// Classify a raw reply to `command`.
	///
	/// Any reply that starts with `E` is a controller error, whether or not
	/// the code is known. Everything else is a success payload.
	///
	/// ```
	/// use ds102::protocol::{ErrorCode, Reply};
	///
	/// let reply = Reply::classify(":POS?", "1250\r").unwrap();
	/// assert_eq!(reply.to_f64().unwrap(), 1250.0);
	///
	/// let err = Reply::classify(":GOABS 10", "E02").unwrap_err();
	/// assert_eq!(err.code(), &ErrorCode::Limit);
	/// ```
	pub fn classify(command: &str, raw: &str) -> Result<Reply, ControllerError> {
		let payload = raw.trim();
		if payload.starts_with('E') {
			return Err(ControllerError::new(ErrorCode::from_reply(payload)));
		}
		Ok(Reply {
			command: Box::from(command),
			payload: Box::from(payload),
		})
	}

	/// The reply to a command the controller acknowledged with silence.
	pub(crate) fn empty(command: &str) -> Reply {
		Reply {
			command: Box::from(command),
			payload: Box::from(""),
		}
	}

	/// Get the command this reply answers.
	pub fn command(&self) -> &str {
		&self.command
	}

	/// Get the payload.
	pub fn as_str(&self) -> &str {
		&self.payload
	}

	/// Whether the controller replied with nothing.
	pub fn is_empty(&self) -> bool {
		self.payload.is_empty()
	}

	/// Consume the reply and return the payload.
	pub fn into_string(self) -> String {
		self.payload.into_string()
	}

	fn unexpected(&self, expected: &'static str) -> UnexpectedReplyError {
		UnexpectedReplyError::new(&self.command, &self.payload, expected)
	}

	/// Interpret the payload as a decimal number.
	pub fn to_f64(&self) -> Result<f64, UnexpectedReplyError> {
		self.payload
			.parse::<f64>()
			.ok()
			.filter(|v| v.is_finite())
			.ok_or_else(|| self.unexpected("expected a number"))
	}

	/// Interpret the payload as an unsigned integer.
	pub fn to_u32(&self) -> Result<u32, UnexpectedReplyError> {
		self.payload
			.parse::<u32>()
			.map_err(|_| self.unexpected("expected an unsigned integer"))
	}

	/// Interpret the payload as a status byte.
	pub fn to_u8(&self) -> Result<u8, UnexpectedReplyError> {
		self.payload
			.parse::<u8>()
			.map_err(|_| self.unexpected("expected an integer between 0 and 255"))
	}

	/// Interpret the payload as a flag, where `1` is true and `0` is false.
	pub fn to_flag(&self) -> Result<bool, UnexpectedReplyError> {
		match &*self.payload {
			"1" => Ok(true),
			"0" => Ok(false),
			_ => Err(self.unexpected("expected 0 or 1")),
		}
	}
}

impl fmt::Display for Reply {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.payload)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn known_error_codes() {
		let cases = [
			("E00", ErrorCode::NotConnected),
			("E01", ErrorCode::AxisInMotion),
			("E02", ErrorCode::Limit),
			("E03", ErrorCode::Emergency),
			("E20", ErrorCode::CommandRule),
			("E21", ErrorCode::MissingDelimiter),
			("E22", ErrorCode::Range),
			("E40", ErrorCode::Communication),
			("E41", ErrorCode::FlashWrite),
		];
		for (raw, expected) in cases {
			let err = Reply::classify("X", raw).unwrap_err();
			assert_eq!(err.code(), &expected);
			assert_eq!(err.code().as_str(), raw);
			assert!(!err.is_unknown());
		}
	}

	#[test]
	fn limit_reply_is_an_error_with_message() {
		let err = Reply::classify(":GOABS 100", "E02").unwrap_err();
		assert!(err.to_string().contains("Limit detected"), "{err}");
	}

	#[test]
	fn unknown_code_is_preserved() {
		let err = Reply::classify(":GO 3", "E99").unwrap_err();
		assert!(err.is_unknown());
		assert_eq!(err.code().as_str(), "E99");
		let text = err.to_string();
		assert!(text.contains("E99"), "{text}");
		assert!(text.to_lowercase().contains("unknown"), "{text}");
	}

	#[test]
	fn every_e_prefixed_reply_is_an_error() {
		assert!(Reply::classify("X", "E").is_err());
		assert!(Reply::classify("X", "ERR").is_err());
		assert!(Reply::classify("X", " E22\r").is_err());
	}

	#[test]
	fn numeric_payloads() {
		let reply = Reply::classify(":POS?", "1250").unwrap();
		assert_eq!(reply.to_f64().unwrap(), 1250.0);
		assert_eq!(reply.to_u32().unwrap(), 1250);
		assert!(reply.to_u8().is_err());

		let reply = Reply::classify(":POS?", "-12.5").unwrap();
		assert_eq!(reply.to_f64().unwrap(), -12.5);
		assert!(reply.to_u32().is_err());
	}

	#[test]
	fn non_numeric_payload_is_unexpected() {
		let reply = Reply::classify(":POS?", "abc").unwrap();
		let err = reply.to_f64().unwrap_err();
		assert_eq!(err.command(), ":POS?");
		assert_eq!(err.reply(), "abc");
	}

	#[test]
	fn flags() {
		assert!(Reply::classify(":MOTION?", "1").unwrap().to_flag().unwrap());
		assert!(!Reply::classify(":MOTION?", "0").unwrap().to_flag().unwrap());
		assert!(Reply::classify(":MOTION?", "2").unwrap().to_flag().is_err());
	}

	#[test]
	fn text_payload_is_returned_as_is() {
		let reply = Reply::classify("*IDN?", "DS102 Ver2.00\r").unwrap();
		assert_eq!(reply.as_str(), "DS102 Ver2.00");
		assert_eq!(reply.into_string(), "DS102 Ver2.00");
	}
}
