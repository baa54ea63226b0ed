//! Well plate geometry.
//!
//! A [`WellPlateCalculator`] turns well names such as `"B7"` into stage
//! coordinates. Rows are named with letters (`A`, `B`, ..., `Z`, `AA`, ...)
//! and columns with 1-based numbers. Well `A1` sits at the plate origin and
//! every further row or column moves towards *lower* stage coordinates:
//!
//! ```text
//! x = plate_origin_x - column_index * well_spacing_x
//! y = plate_origin_y - row_index * well_spacing_y
//! ```
//!
//! The calculator performs no I/O. It is combined with a
//! [`Controller`](crate::Controller) by [`StageContext`](crate::StageContext).

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::{fmt, iter::FusedIterator, str::FromStr};

/// The distance, in stage units, between a well's centre and its edge
/// sub-positions.
///
/// It does not scale with the well diameter.
pub const SUB_POSITION_OFFSET: f64 = 1800.0;

/// The size and placement of a well plate on the stage.
///
/// Spacing and origin are in stage units. The diameter is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellPlateConfig {
	/// Number of rows (A, B, ...).
	pub rows: u32,
	/// Number of columns (1, 2, ...).
	pub cols: u32,
	/// Distance between neighbouring well centres along X.
	pub well_spacing_x: f64,
	/// Distance between neighbouring well centres along Y.
	pub well_spacing_y: f64,
	/// Diameter of a well, in millimetres.
	pub well_diameter: f64,
	/// X coordinate of the centre of well A1.
	pub plate_origin_x: f64,
	/// Y coordinate of the centre of well A1.
	pub plate_origin_y: f64,
}

impl WellPlateConfig {
	/// A standard 96-well plate (8 x 12, 9 mm pitch) with an uncalibrated origin.
	pub fn well_96() -> Self {
		WellPlateConfig {
			rows: 8,
			cols: 12,
			well_spacing_x: 9.0,
			well_spacing_y: 9.0,
			well_diameter: 6.4,
			plate_origin_x: 0.0,
			plate_origin_y: 0.0,
		}
	}

	/// A standard 384-well plate (16 x 24, 4.5 mm pitch) with an uncalibrated origin.
	pub fn well_384() -> Self {
		WellPlateConfig {
			rows: 16,
			cols: 24,
			well_spacing_x: 4.5,
			well_spacing_y: 4.5,
			well_diameter: 3.3,
			plate_origin_x: 0.0,
			plate_origin_y: 0.0,
		}
	}

	/// A 24-well plate (4 x 6) calibrated in stage steps, with A1 at (58000, 32000).
	pub fn well_24_calibrated() -> Self {
		WellPlateConfig {
			rows: 4,
			cols: 6,
			well_spacing_x: 9500.0,
			well_spacing_y: 9500.0,
			well_diameter: 15.6,
			plate_origin_x: 58000.0,
			plate_origin_y: 32000.0,
		}
	}

	/// A human readable name, e.g. `"96-well plate"`.
	pub fn name(&self) -> String {
		format!("{}-well plate", u64::from(self.rows) * u64::from(self.cols))
	}

	/// Check that the plate has at least one well and finite geometry.
	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.rows == 0 {
			return Err(ValidationError::new("plate rows", "a plate needs at least one row"));
		}
		if self.cols == 0 {
			return Err(ValidationError::new("plate columns", "a plate needs at least one column"));
		}
		for (what, value) in [
			("well spacing", self.well_spacing_x),
			("well spacing", self.well_spacing_y),
			("well diameter", self.well_diameter),
			("plate origin", self.plate_origin_x),
			("plate origin", self.plate_origin_y),
		] {
			check_finite(what, value)?;
		}
		Ok(())
	}
}

impl Default for WellPlateConfig {
	fn default() -> Self {
		WellPlateConfig::well_24_calibrated()
	}
}

fn check_finite(what: &'static str, value: f64) -> Result<f64, ValidationError> {
	if value.is_finite() {
		Ok(value)
	} else {
		Err(ValidationError::new(what, format!("{value} is not a finite number")))
	}
}

/// Encode a 0-based row index as letters: 0 is `A`, 25 is `Z`, 26 is `AA`.
fn row_letters(index: u32) -> String {
	let mut letters = Vec::new();
	let mut n = u64::from(index) + 1;
	while n > 0 {
		n -= 1;
		letters.push(b'A' + u8::try_from(n % 26).unwrap_or_default());
		n /= 26;
	}
	letters.reverse();
	letters.into_iter().map(char::from).collect()
}

/// Decode row letters into a 0-based index. `None` if the index overflows.
fn row_index(letters: &str) -> Option<u32> {
	let mut value: u32 = 0;
	for b in letters.bytes() {
		value = value
			.checked_mul(26)?
			.checked_add(u32::from(b - b'A') + 1)?;
	}
	value.checked_sub(1)
}

/// A single well, addressed by 0-based row and column indices.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Well {
	/// 0-based row index (`A` is 0).
	pub row: u32,
	/// 0-based column index (column `1` is 0).
	pub col: u32,
}

impl Well {
	/// Get the well's name, e.g. `"B7"` for row 1, column 6.
	pub fn name(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for Well {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", row_letters(self.row), u64::from(self.col) + 1)
	}
}

/// A point in stage coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
	/// The X coordinate.
	pub x: f64,
	/// The Y coordinate.
	pub y: f64,
}

impl Point {
	/// Create a new point.
	pub const fn new(x: f64, y: f64) -> Self {
		Point { x, y }
	}
}

/// A position within a well: its centre or one of eight points around it.
///
/// Edge positions are [`SUB_POSITION_OFFSET`] away from the centre along
/// each axis involved. `Top` is towards *negative* Y.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WellPosition {
	/// The centre of the well.
	#[default]
	Center,
	/// Towards negative Y.
	Top,
	/// Towards positive Y.
	Bottom,
	/// Towards negative X.
	Left,
	/// Towards positive X.
	Right,
	#[allow(missing_docs)]
	TopLeft,
	#[allow(missing_docs)]
	TopRight,
	#[allow(missing_docs)]
	BottomLeft,
	#[allow(missing_docs)]
	BottomRight,
}

impl WellPosition {
	/// All positions, starting with the centre.
	pub const ALL: [WellPosition; 9] = [
		WellPosition::Center,
		WellPosition::Top,
		WellPosition::Bottom,
		WellPosition::Left,
		WellPosition::Right,
		WellPosition::TopLeft,
		WellPosition::TopRight,
		WellPosition::BottomLeft,
		WellPosition::BottomRight,
	];

	/// The position's name, e.g. `"top_left"`.
	pub fn as_str(self) -> &'static str {
		match self {
			WellPosition::Center => "center",
			WellPosition::Top => "top",
			WellPosition::Bottom => "bottom",
			WellPosition::Left => "left",
			WellPosition::Right => "right",
			WellPosition::TopLeft => "top_left",
			WellPosition::TopRight => "top_right",
			WellPosition::BottomLeft => "bottom_left",
			WellPosition::BottomRight => "bottom_right",
		}
	}

	/// The offset from the well centre, in stage units.
	pub fn offset(self) -> (f64, f64) {
		let d = SUB_POSITION_OFFSET;
		match self {
			WellPosition::Center => (0.0, 0.0),
			WellPosition::Top => (0.0, -d),
			WellPosition::Bottom => (0.0, d),
			WellPosition::Left => (-d, 0.0),
			WellPosition::Right => (d, 0.0),
			WellPosition::TopLeft => (-d, -d),
			WellPosition::TopRight => (d, -d),
			WellPosition::BottomLeft => (-d, d),
			WellPosition::BottomRight => (d, d),
		}
	}
}

impl fmt::Display for WellPosition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for WellPosition {
	type Err = ValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let name = s.trim().to_ascii_lowercase();
		WellPosition::ALL
			.into_iter()
			.find(|p| p.as_str() == name)
			.ok_or_else(|| ValidationError::new("well position", format!("{s:?} is not recognized")))
	}
}

/// Computes stage coordinates of wells on a configured plate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WellPlateCalculator {
	config: WellPlateConfig,
}

impl WellPlateCalculator {
	/// Create a calculator for the given plate.
	pub fn new(config: WellPlateConfig) -> Result<Self, ValidationError> {
		config.validate()?;
		Ok(WellPlateCalculator { config })
	}

	/// Get the plate configuration.
	pub fn config(&self) -> &WellPlateConfig {
		&self.config
	}

	/// Parse a well name into its row and column.
	///
	/// The name is trimmed and case-insensitive. It must consist of one or
	/// more letters followed by one or more digits, and must name a well
	/// that exists on the plate.
	///
	/// ## Example
	///
	/// ```rust
	/// # use ds102::plate::{Well, WellPlateCalculator, WellPlateConfig};
	/// let calc = WellPlateCalculator::new(WellPlateConfig::well_96()).unwrap();
	/// assert_eq!(calc.parse_well_name(" h12 ").unwrap(), Well { row: 7, col: 11 });
	/// assert!(calc.parse_well_name("I1").is_err());
	/// ```
	pub fn parse_well_name(&self, name: &str) -> Result<Well, ValidationError> {
		let normalized = name.trim().to_ascii_uppercase();
		let split = normalized
			.find(|c: char| !c.is_ascii_alphabetic())
			.unwrap_or(normalized.len());
		let (letters, digits) = normalized.split_at(split);
		if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
			return Err(ValidationError::new(
				"well name",
				format!("{name:?} must be a row letter followed by a column number"),
			));
		}

		let plate = self.config.name();
		let row = row_index(letters)
			.filter(|&row| row < self.config.rows)
			.ok_or_else(|| ValidationError::new("well name", format!("row {letters} is out of range for a {plate}")))?;
		let col = digits
			.parse::<u32>()
			.ok()
			.and_then(|col| col.checked_sub(1))
			.filter(|&col| col < self.config.cols)
			.ok_or_else(|| ValidationError::new("well name", format!("column {digits} is out of range for a {plate}")))?;
		Ok(Well { row, col })
	}

	/// Get the stage coordinates of the centre of a well.
	pub fn get_well_center(&self, name: &str) -> Result<Point, ValidationError> {
		let well = self.parse_well_name(name)?;
		Ok(self.center_of(well))
	}

	fn center_of(&self, well: Well) -> Point {
		Point {
			x: self.config.plate_origin_x - f64::from(well.col) * self.config.well_spacing_x,
			y: self.config.plate_origin_y - f64::from(well.row) * self.config.well_spacing_y,
		}
	}

	/// Get the stage coordinates of a position within a well.
	pub fn get_well_position(&self, name: &str, position: WellPosition) -> Result<Point, ValidationError> {
		let center = self.get_well_center(name)?;
		let (dx, dy) = position.offset();
		Ok(Point {
			x: center.x + dx,
			y: center.y + dy,
		})
	}

	/// Iterate over the names of every well in row-major order.
	///
	/// The iterator owns a copy of the plate dimensions, so it is unaffected
	/// by later reconfiguration and can be cloned to restart it.
	pub fn get_all_wells(&self) -> Wells {
		Wells {
			cols: self.config.cols,
			next: 0,
			end: u64::from(self.config.rows) * u64::from(self.config.cols),
		}
	}

	/// Move the plate origin (the centre of A1). Every well shifts by the
	/// same amount.
	pub fn update_origin(&mut self, x: f64, y: f64) -> Result<(), ValidationError> {
		check_finite("plate origin", x)?;
		check_finite("plate origin", y)?;
		self.config.plate_origin_x = x;
		self.config.plate_origin_y = y;
		Ok(())
	}

	/// Replace the plate configuration.
	///
	/// On error the current configuration is left untouched.
	pub fn reconfigure(&mut self, config: WellPlateConfig) -> Result<(), ValidationError> {
		config.validate()?;
		self.config = config;
		Ok(())
	}
}

/// An iterator over the well names of a plate, see
/// [`WellPlateCalculator::get_all_wells`].
#[derive(Debug, Clone)]
pub struct Wells {
	cols: u32,
	next: u64,
	end: u64,
}

impl Wells {
	fn well_at(&self, index: u64) -> Well {
		let cols = u64::from(self.cols);
		// Both fit in a u32 since `index < rows * cols`.
		Well {
			row: u32::try_from(index / cols).unwrap_or(u32::MAX),
			col: u32::try_from(index % cols).unwrap_or(u32::MAX),
		}
	}
}

impl Iterator for Wells {
	type Item = String;

	fn next(&mut self) -> Option<Self::Item> {
		if self.next >= self.end {
			return None;
		}
		let well = self.well_at(self.next);
		self.next += 1;
		Some(well.name())
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let remaining = usize::try_from(self.end - self.next).unwrap_or(usize::MAX);
		(remaining, Some(remaining))
	}
}

impl ExactSizeIterator for Wells {}

impl FusedIterator for Wells {}

#[cfg(test)]
mod test {
	use super::*;

	fn plate(rows: u32, cols: u32) -> WellPlateCalculator {
		WellPlateCalculator::new(WellPlateConfig {
			rows,
			cols,
			..WellPlateConfig::well_24_calibrated()
		})
		.unwrap()
	}

	#[test]
	fn parse_well_names() {
		let calc = plate(4, 6);
		assert_eq!(calc.parse_well_name("A1").unwrap(), Well { row: 0, col: 0 });
		assert_eq!(calc.parse_well_name("D6").unwrap(), Well { row: 3, col: 5 });
		assert_eq!(calc.parse_well_name("  b3\n").unwrap(), Well { row: 1, col: 2 });

		let calc = WellPlateCalculator::new(WellPlateConfig::well_96()).unwrap();
		assert_eq!(calc.parse_well_name("H12").unwrap(), Well { row: 7, col: 11 });
	}

	#[test]
	fn malformed_well_names_are_rejected() {
		let calc = plate(4, 6);
		for name in ["", "A", "1", "1A", "A1B", "A-1", "A 1", "Ä1", "A0", "E1", "A7", "A99999999999"] {
			let err = calc.parse_well_name(name).unwrap_err();
			assert_eq!(err.what(), "well name", "{name:?}");
		}
	}

	#[test]
	fn multi_letter_rows() {
		let calc = plate(30, 2);
		assert_eq!(calc.parse_well_name("Z1").unwrap().row, 25);
		assert_eq!(calc.parse_well_name("AA1").unwrap().row, 26);
		assert_eq!(calc.parse_well_name("AD1").unwrap().row, 29);
		assert!(calc.parse_well_name("AE1").is_err());
		assert!(calc.parse_well_name("ZZZZZZZZZZZZ1").is_err());

		assert_eq!(row_letters(0), "A");
		assert_eq!(row_letters(25), "Z");
		assert_eq!(row_letters(26), "AA");
		assert_eq!(row_letters(29), "AD");
		assert_eq!(row_letters(701), "ZZ");
		assert_eq!(row_letters(702), "AAA");
	}

	#[test]
	fn every_listed_well_parses_back() {
		let calc = plate(30, 3);
		for (i, name) in calc.get_all_wells().enumerate() {
			let well = calc.parse_well_name(&name).unwrap();
			assert_eq!(u64::from(well.row) * 3 + u64::from(well.col), i as u64, "{name}");
		}
	}

	#[test]
	fn well_center_is_origin_subtractive() {
		let calc = WellPlateCalculator::default();
		assert_eq!(calc.get_well_center("A1").unwrap(), Point::new(58000.0, 32000.0));
		assert_eq!(calc.get_well_center("B2").unwrap(), Point::new(48500.0, 22500.0));
		assert_eq!(calc.get_well_center("D6").unwrap(), Point::new(10500.0, 3500.0));
	}

	#[test]
	fn sub_positions() {
		let calc = WellPlateCalculator::default();
		let center = calc.get_well_center("B2").unwrap();
		let at = |p| calc.get_well_position("B2", p).unwrap();
		assert_eq!(at(WellPosition::Center), center);
		assert_eq!(at(WellPosition::Top), Point::new(48500.0, 20700.0));
		assert_eq!(at(WellPosition::Bottom), Point::new(48500.0, 24300.0));
		assert_eq!(at(WellPosition::Left), Point::new(46700.0, 22500.0));
		assert_eq!(at(WellPosition::Right), Point::new(50300.0, 22500.0));
		assert_eq!(at(WellPosition::TopLeft), Point::new(46700.0, 20700.0));
		assert_eq!(at(WellPosition::BottomRight), Point::new(50300.0, 24300.0));
	}

	#[test]
	fn parse_well_positions() {
		assert_eq!("center".parse::<WellPosition>().unwrap(), WellPosition::Center);
		assert_eq!(" Top_Left ".parse::<WellPosition>().unwrap(), WellPosition::TopLeft);
		for p in WellPosition::ALL {
			assert_eq!(p.to_string().parse::<WellPosition>().unwrap(), p);
		}
		assert!("middle".parse::<WellPosition>().is_err());
	}

	#[test]
	fn all_wells_in_row_major_order() {
		let calc = plate(4, 6);
		let wells = calc.get_all_wells();
		assert_eq!(wells.len(), 24);
		let names: Vec<_> = wells.clone().collect();
		assert_eq!(&names[..7], ["A1", "A2", "A3", "A4", "A5", "A6", "B1"]);
		assert_eq!(names.last().map(String::as_str), Some("D6"));
		let mut unique = names.clone();
		unique.sort();
		unique.dedup();
		assert_eq!(unique.len(), 24);
		// Restartable
		assert_eq!(calc.get_all_wells().collect::<Vec<_>>(), names);
		assert_eq!(wells.collect::<Vec<_>>(), names);
	}

	#[test]
	fn update_origin_shifts_every_well() {
		let mut calc = WellPlateCalculator::default();
		let before = calc.get_well_center("C4").unwrap();
		calc.update_origin(60000.0, 30000.0).unwrap();
		assert_eq!(calc.get_well_center("A1").unwrap(), Point::new(60000.0, 30000.0));
		let after = calc.get_well_center("C4").unwrap();
		assert_eq!(after.x - before.x, 2000.0);
		assert_eq!(after.y - before.y, -2000.0);

		assert!(calc.update_origin(f64::NAN, 0.0).is_err());
		assert_eq!(calc.config().plate_origin_x, 60000.0);
	}

	#[test]
	fn reconfigure_replaces_the_whole_plate() {
		let mut calc = WellPlateCalculator::default();
		calc.reconfigure(WellPlateConfig::well_384()).unwrap();
		assert_eq!(calc.config(), &WellPlateConfig::well_384());
		assert_eq!(calc.get_all_wells().len(), 384);
		assert!(calc.parse_well_name("P24").is_ok());

		let bad = WellPlateConfig {
			rows: 0,
			..WellPlateConfig::well_96()
		};
		assert!(calc.reconfigure(bad).is_err());
		assert_eq!(calc.config(), &WellPlateConfig::well_384());
	}

	#[test]
	fn config_names_and_validation() {
		assert_eq!(WellPlateConfig::well_96().name(), "96-well plate");
		assert_eq!(WellPlateConfig::default().name(), "24-well plate");
		let bad = WellPlateConfig {
			well_spacing_x: f64::INFINITY,
			..WellPlateConfig::well_96()
		};
		assert!(WellPlateCalculator::new(bad).is_err());
	}
}
