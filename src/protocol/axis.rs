//! Axis identifiers.

use crate::error::ValidationError;
use std::{fmt, str::FromStr};

/// One of the controller's axes, or all of them at once.
///
/// Raw identifiers are converted at the edge of the library, either from the
/// axis number (`1` to `6`) or from its letter (`"X"` to `"W"`, or `"ALL"`).
///
/// ```
/// use ds102::protocol::Axis;
///
/// assert_eq!("y".parse::<Axis>()?, Axis::Y);
/// assert_eq!(Axis::try_from(3_u8)?, Axis::Z);
/// assert_eq!(Axis::X.wire_value(), "1");
/// # Ok::<(), ds102::error::ValidationError>(())
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
	/// Axis 1.
	X,
	/// Axis 2.
	Y,
	/// Axis 3.
	Z,
	/// Axis 4.
	U,
	/// Axis 5.
	V,
	/// Axis 6.
	W,
	/// Every axis. Only meaningful for axis selection and stopping.
	All,
}

impl Axis {
	/// The six individual axes, in order.
	pub const SINGLE: [Axis; 6] = [Axis::X, Axis::Y, Axis::Z, Axis::U, Axis::V, Axis::W];

	/// Get the axis number (1 to 6), or `None` for [`Axis::All`].
	pub fn number(self) -> Option<u8> {
		match self {
			Axis::X => Some(1),
			Axis::Y => Some(2),
			Axis::Z => Some(3),
			Axis::U => Some(4),
			Axis::V => Some(5),
			Axis::W => Some(6),
			Axis::All => None,
		}
	}

	/// Get the canonical letter code.
	pub fn letter(self) -> &'static str {
		match self {
			Axis::X => "X",
			Axis::Y => "Y",
			Axis::Z => "Z",
			Axis::U => "U",
			Axis::V => "V",
			Axis::W => "W",
			Axis::All => "ALL",
		}
	}

	/// Get the value written after `AXI` to select this axis.
	pub fn wire_value(self) -> &'static str {
		match self {
			Axis::X => "1",
			Axis::Y => "2",
			Axis::Z => "3",
			Axis::U => "4",
			Axis::V => "5",
			Axis::W => "6",
			Axis::All => "ALL",
		}
	}

	/// Whether this refers to a single axis.
	pub fn is_single(self) -> bool {
		self != Axis::All
	}

	/// Return the axis if it is a single axis, otherwise a [`ValidationError`].
	pub fn require_single(self) -> Result<Axis, ValidationError> {
		if self.is_single() {
			Ok(self)
		} else {
			Err(ValidationError::new(
				"axis",
				"ALL cannot be used here, a single axis (X, Y, Z, U, V or W) is required",
			))
		}
	}
}

impl fmt::Display for Axis {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.letter())
	}
}

impl TryFrom<u8> for Axis {
	type Error = ValidationError;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			1..=6 => Ok(Axis::SINGLE[usize::from(value - 1)]),
			_ => Err(ValidationError::out_of_range("axis number", value, 1, 6)),
		}
	}
}

impl FromStr for Axis {
	type Err = ValidationError;

	/// Parse an axis from its number or letter code, ignoring case and
	/// surrounding whitespace.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		if let Ok(number) = s.parse::<u8>() {
			return Axis::try_from(number);
		}
		match s.to_ascii_uppercase().as_str() {
			"X" => Ok(Axis::X),
			"Y" => Ok(Axis::Y),
			"Z" => Ok(Axis::Z),
			"U" => Ok(Axis::U),
			"V" => Ok(Axis::V),
			"W" => Ok(Axis::W),
			"ALL" => Ok(Axis::All),
			_ => Err(ValidationError::new(
				"axis",
				format!("{s:?} is not one of 1-6, X, Y, Z, U, V, W or ALL"),
			)),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn numbers_and_letters_agree() {
		for (i, axis) in Axis::SINGLE.into_iter().enumerate() {
			let number = u8::try_from(i + 1).unwrap();
			assert_eq!(axis.number(), Some(number));
			assert_eq!(Axis::try_from(number).unwrap(), axis);
			assert_eq!(axis.letter().parse::<Axis>().unwrap(), axis);
			assert_eq!(axis.wire_value(), number.to_string());
		}
		assert_eq!(Axis::All.number(), None);
	}

	#[test]
	fn parse_is_case_insensitive() {
		assert_eq!(" x ".parse::<Axis>().unwrap(), Axis::X);
		assert_eq!("all".parse::<Axis>().unwrap(), Axis::All);
		assert_eq!("6".parse::<Axis>().unwrap(), Axis::W);
	}

	#[test]
	fn invalid_identifiers_are_rejected() {
		for input in ["0", "7", "Q", "", "XY", "-1"] {
			let err = input.parse::<Axis>().unwrap_err();
			assert!(err.what().contains("axis"), "{input}: {err}");
		}
		assert!(Axis::try_from(0_u8).is_err());
		assert!(Axis::try_from(7_u8).is_err());
	}

	#[test]
	fn all_is_not_a_single_axis() {
		assert!(Axis::All.require_single().is_err());
		assert_eq!(Axis::V.require_single().unwrap(), Axis::V);
	}
}
