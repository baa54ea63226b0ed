//! The numeric parameter format.

use crate::error::ValidationError;
use std::fmt;

/// A numeric command parameter.
///
/// Integers are written as plain decimal. Floating point values are written
/// with a decimal point, then trailing zeros and any bare trailing decimal
/// point are removed, so `12.5` is sent as `12.5` and `12.0` as `12`.
///
/// ```
/// use ds102::protocol::Number;
///
/// assert_eq!(Number::from(7).to_string(), "7");
/// assert_eq!(Number::from(12.50).to_string(), "12.5");
/// assert_eq!(Number::from(12.0).to_string(), "12");
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Number {
	/// An integer value.
	Int(i64),
	/// A floating point value.
	Float(f64),
}

impl Number {
	/// Get the value as an `f64`.
	#[allow(clippy::cast_precision_loss)]
	pub fn as_f64(self) -> f64 {
		match self {
			Number::Int(v) => v as f64,
			Number::Float(v) => v,
		}
	}

	/// Ensure the value can be written to the controller.
	///
	/// Only non-finite floats (NaN and the infinities) are rejected.
	pub fn check_finite(self, what: &'static str) -> Result<Self, ValidationError> {
		match self {
			Number::Float(v) if !v.is_finite() => {
				Err(ValidationError::new(what, format!("{v} is not a finite number")))
			}
			n => Ok(n),
		}
	}
}

impl fmt::Display for Number {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match *self {
			Number::Int(v) => write!(f, "{v}"),
			Number::Float(v) => {
				// Negative zero would otherwise be written as "-0".
				let v = if v == 0.0 { 0.0 } else { v };
				let text = format!("{v:.6}");
				let text = if text.contains('.') {
					text.trim_end_matches('0').trim_end_matches('.')
				} else {
					text.as_str()
				};
				// Tiny negative values round to "-0".
				f.write_str(if text == "-0" { "0" } else { text })
			}
		}
	}
}

macro_rules! impl_from_int {
	($($t:ty),+) => {
		$(
			impl From<$t> for Number {
				fn from(value: $t) -> Self {
					Number::Int(i64::from(value))
				}
			}
		)+
	};
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Number {
	fn from(value: f64) -> Self {
		Number::Float(value)
	}
}

impl From<f32> for Number {
	fn from(value: f32) -> Self {
		Number::Float(f64::from(value))
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn integers_never_gain_a_decimal_point() {
		assert_eq!(Number::from(7).to_string(), "7");
		assert_eq!(Number::from(-1250_i64).to_string(), "-1250");
		assert_eq!(Number::from(0_u8).to_string(), "0");
	}

	#[test]
	fn floats_drop_trailing_zeros() {
		assert_eq!(Number::from(12.0).to_string(), "12");
		assert_eq!(Number::from(12.50).to_string(), "12.5");
		assert_eq!(Number::from(0.0).to_string(), "0");
		assert_eq!(Number::from(-0.0).to_string(), "0");
		assert_eq!(Number::from(-0.000_000_1).to_string(), "0");
		assert_eq!(Number::from(-3.25).to_string(), "-3.25");
		assert_eq!(Number::from(58000.0).to_string(), "58000");
		assert_eq!(Number::from(100.0).to_string(), "100");
	}

	#[test]
	fn non_finite_values_are_rejected() {
		assert!(Number::from(f64::NAN).check_finite("position").is_err());
		assert!(Number::from(f64::INFINITY).check_finite("position").is_err());
		assert!(Number::from(1.5).check_finite("position").is_ok());
		assert!(Number::from(1).check_finite("position").is_ok());
	}
}
