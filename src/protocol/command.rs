//! Encoding commands.
//!
//! Every command the controller understands has a constructor on
//! [`Command`]. Constructors validate their arguments, so a command that
//! exists has parameters within the documented ranges.

use super::{Axis, Number, DELIMITER};
use crate::error::ValidationError;
use std::{fmt, str::FromStr, time::Duration};

/// A single command line, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
	/// The axis that must be selected before sending, if any.
	axis: Option<Axis>,
	/// The text of the command, without the delimiter.
	text: String,
	/// How long the controller needs after receiving the command before it
	/// can accept another one.
	settle: Duration,
	/// Whether the controller answers even though the text does not end in `?`.
	answered: bool,
}

/// Check that `value` is within `min..=max`.
fn in_range<T>(what: &'static str, value: T, min: T, max: T) -> Result<T, ValidationError>
where
	T: PartialOrd + fmt::Display + Copy,
{
	if value < min || value > max {
		Err(ValidationError::out_of_range(what, value, min, max))
	} else {
		Ok(value)
	}
}

impl Command {
	/// Create a command that is not tied to an axis, e.g. `WRITE`.
	///
	/// The text is sent verbatim. A trailing delimiter is allowed and will not
	/// be repeated.
	pub fn global<S: Into<String>>(text: S) -> Command {
		let mut text = text.into();
		if text.as_bytes().last() == Some(&DELIMITER) {
			text.pop();
		}
		Command {
			axis: None,
			text,
			settle: Duration::ZERO,
			answered: false,
		}
	}

	/// Create an axis-scoped command, `:<mnemonic> <value>`, or
	/// `:<mnemonic>` for a query.
	fn scoped<V: fmt::Display>(axis: Axis, mnemonic: &str, value: Option<V>) -> Result<Command, ValidationError> {
		let axis = axis.require_single()?;
		let text = match value {
			Some(value) => format!(":{mnemonic} {value}"),
			None => format!(":{mnemonic}"),
		};
		Ok(Command {
			axis: Some(axis),
			text,
			settle: Duration::ZERO,
			answered: false,
		})
	}

	/// An axis-scoped query such as `:POS?`.
	fn query(axis: Axis, mnemonic: &str) -> Result<Command, ValidationError> {
		Command::scoped::<&str>(axis, mnemonic, None)
	}

	/// Set how long to wait after the command has been sent.
	fn with_settle(mut self, settle: Duration) -> Command {
		self.settle = settle;
		self
	}

	/// Mark a command that does not end in `?` as always answered.
	fn answered(mut self) -> Command {
		self.answered = true;
		self
	}

	/// Get the axis that must be selected before this command is sent.
	pub fn axis(&self) -> Option<Axis> {
		self.axis
	}

	/// Get the command text, without the delimiter.
	pub fn text(&self) -> &str {
		&self.text
	}

	/// How long the controller needs after this command before accepting
	/// another one.
	pub fn settle(&self) -> Duration {
		self.settle
	}

	/// Whether the command is a query that the controller always answers.
	///
	/// Other commands are only answered if they fail.
	pub fn is_query(&self) -> bool {
		self.answered || self.text.ends_with('?')
	}

	/// Get the bytes to write, terminated by exactly one delimiter.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(self.text.len() + 1);
		bytes.extend_from_slice(self.text.as_bytes());
		bytes.push(DELIMITER);
		bytes
	}

	// -- Axis selection ------------------------------------------------------

	/// `AXI<n>`: select the axis for subsequent axis-scoped commands.
	pub fn select(axis: Axis) -> Command {
		Command::global(format!("AXI{}", axis.wire_value()))
	}

	// -- Axis parameters -----------------------------------------------------

	/// `:CWSLE <0|1>`: enable or disable the CW soft limit.
	pub fn cw_soft_limit_enable(axis: Axis, enable: bool) -> Result<Command, ValidationError> {
		Command::scoped(axis, "CWSLE", Some(u8::from(enable)))
	}

	/// `:CWSLP <position>`: set the CW soft limit position.
	pub fn cw_soft_limit_position<N: Into<Number>>(axis: Axis, position: N) -> Result<Command, ValidationError> {
		let position = position.into().check_finite("soft limit position")?;
		Command::scoped(axis, "CWSLP", Some(position))
	}

	/// `:CCWSLE <0|1>`: enable or disable the CCW soft limit.
	pub fn ccw_soft_limit_enable(axis: Axis, enable: bool) -> Result<Command, ValidationError> {
		Command::scoped(axis, "CCWSLE", Some(u8::from(enable)))
	}

	/// `:CCWSLP <position>`: set the CCW soft limit position.
	pub fn ccw_soft_limit_position<N: Into<Number>>(axis: Axis, position: N) -> Result<Command, ValidationError> {
		let position = position.into().check_finite("soft limit position")?;
		Command::scoped(axis, "CCWSLP", Some(position))
	}

	/// `:DRDIV <0-15>`: set the driver's step division.
	pub fn driver_division(axis: Axis, division: u8) -> Result<Command, ValidationError> {
		let division = in_range("driver division", division, 0, 15)?;
		Command::scoped(axis, "DRDIV", Some(division))
	}

	/// `:DATA <1|2>`: select the data set.
	pub fn data_selection(axis: Axis, data: u8) -> Result<Command, ValidationError> {
		let data = in_range("data selection", data, 1, 2)?;
		Command::scoped(axis, "DATA", Some(data))
	}

	/// `:HOMEP <position>`: set the home position.
	pub fn home_position<N: Into<Number>>(axis: Axis, position: N) -> Result<Command, ValidationError> {
		let position = position.into().check_finite("home position")?;
		Command::scoped(axis, "HOMEP", Some(position))
	}

	/// `:POS <position>`: overwrite the current position register.
	pub fn set_position<N: Into<Number>>(axis: Axis, position: N) -> Result<Command, ValidationError> {
		let position = position.into().check_finite("position")?;
		Command::scoped(axis, "POS", Some(position))
	}

	/// `:PULS <pulses>`: set the constant step pulse count.
	pub fn pulse<N: Into<Number>>(axis: Axis, pulses: N) -> Result<Command, ValidationError> {
		let pulses = pulses.into().check_finite("pulse")?;
		Command::scoped(axis, "PULS", Some(pulses))
	}

	/// `:PULSA <position>`: set the absolute pulse target.
	pub fn pulse_absolute<N: Into<Number>>(axis: Axis, position: N) -> Result<Command, ValidationError> {
		let position = position.into().check_finite("absolute pulse")?;
		Command::scoped(axis, "PULSA", Some(position))
	}

	/// `:SELSP <0-9>`: select the speed table used for driving.
	pub fn select_speed(axis: Axis, table: u8) -> Result<Command, ValidationError> {
		let table = in_range("speed table", table, 0, 9)?;
		Command::scoped(axis, "SELSP", Some(table))
	}

	/// `:STANDARD <resolution>`: set the standard resolution.
	pub fn standard_resolution<N: Into<Number>>(axis: Axis, resolution: N) -> Result<Command, ValidationError> {
		let resolution = resolution.into().check_finite("standard resolution")?;
		Command::scoped(axis, "STANDARD", Some(resolution))
	}

	/// `:UNIT <0-4>`: set the unit positions are expressed in.
	pub fn unit(axis: Axis, unit: UnitType) -> Result<Command, ValidationError> {
		Command::scoped(axis, "UNIT", Some(unit as u8))
	}

	// -- Memory switches -----------------------------------------------------

	/// `:MEMSW0 <0-12>`: set the origin return type.
	pub fn origin_return_type(axis: Axis, kind: u8) -> Result<Command, ValidationError> {
		let kind = in_range("origin return type", kind, 0, 12)?;
		Command::scoped(axis, "MEMSW0", Some(kind))
	}

	/// `:MEMSW1`, `:MEMSW2` or `:MEMSW3`: set a sensor's input logic.
	pub fn sensor_logic(axis: Axis, input: SensorInput, logic: SensorLogic) -> Result<Command, ValidationError> {
		Command::scoped(axis, &format!("MEMSW{}", input as u8), Some(logic as u8))
	}

	/// `:MEMSW4` to `:MEMSW7`: turn a switch on or off.
	///
	/// The controller encodes "on" as `0`.
	pub fn memory_switch(axis: Axis, switch: MemorySwitch, on: bool) -> Result<Command, ValidationError> {
		Command::scoped(axis, &format!("MEMSW{}", switch as u8), Some(u8::from(!on)))
	}

	// -- Speed tables --------------------------------------------------------

	/// `:L<n>`, `:F<n>`, `:R<n>` and `:S<n>`: the four commands that program
	/// speed table `table`.
	pub fn speed_table(axis: Axis, table: u8, profile: &SpeedProfile) -> Result<[Command; 4], ValidationError> {
		let table = in_range("speed table", table, 0, 9)?;
		profile.validate()?;
		Ok([
			Command::scoped(axis, &format!("L{table}"), Some(profile.start_speed))?,
			Command::scoped(axis, &format!("F{table}"), Some(profile.drive_speed))?,
			Command::scoped(axis, &format!("R{table}"), Some(profile.accel_time))?,
			Command::scoped(axis, &format!("S{table}"), Some(profile.s_curve_rate))?,
		])
	}

	// -- Flash ---------------------------------------------------------------

	/// `WRITE`: store all parameters in flash memory.
	pub fn write_to_flash() -> Command {
		Command::global("WRITE").with_settle(Duration::from_millis(200))
	}

	/// `*RST`: restart the controller.
	pub fn reset() -> Command {
		Command::global("*RST").with_settle(Duration::from_millis(5500))
	}

	// -- Driving -------------------------------------------------------------

	/// `:GO <mode>`: start driving in the given mode.
	pub fn drive(axis: Axis, mode: DriveMode) -> Result<Command, ValidationError> {
		Command::scoped(axis, "GO", Some(mode as u8))
	}

	/// `:GOABS <position>`: drive to an absolute position.
	pub fn drive_absolute<N: Into<Number>>(axis: Axis, position: N) -> Result<Command, ValidationError> {
		let position = position.into().check_finite("position")?;
		Command::scoped(axis, "GOABS", Some(position))
	}

	/// `GOTCH <0-63>`: drive every axis to a teaching point.
	pub fn drive_to_teaching_point(point: u8) -> Result<Command, ValidationError> {
		let point = in_range("teaching point", point, 0, 63)?;
		Ok(Command::global(format!("GOTCH {point}")))
	}

	/// `GOLI X+Y-...`: linear interpolated incremental drive.
	pub fn drive_linear_incremental(directions: &[(Axis, Direction)]) -> Result<Command, ValidationError> {
		if directions.is_empty() {
			return Err(ValidationError::new("linear drive", "at least one axis is required"));
		}
		let mut text = String::from("GOLI ");
		for &(axis, direction) in directions {
			let axis = axis.require_single()?;
			text.push_str(axis.letter());
			text.push(direction.sign());
		}
		Ok(Command::global(text))
	}

	/// `GOLA X<p>_Y<p>...`: linear interpolated absolute drive.
	pub fn drive_linear_absolute(positions: &[(Axis, Number)]) -> Result<Command, ValidationError> {
		if positions.is_empty() {
			return Err(ValidationError::new("linear drive", "at least one axis is required"));
		}
		let parts = positions
			.iter()
			.map(|&(axis, position)| {
				let axis = axis.require_single()?;
				let position = position.check_finite("position")?;
				Ok(format!("{}{position}", axis.letter()))
			})
			.collect::<Result<Vec<_>, ValidationError>>()?;
		Ok(Command::global(format!("GOLA {}", parts.join("_"))))
	}

	/// `STOP_<mode>` for [`Axis::All`], otherwise `:STOP_<mode>`.
	pub fn stop(axis: Axis, mode: StopMode) -> Command {
		let mode = mode as u8;
		if axis.is_single() {
			Command {
				axis: Some(axis),
				text: format!(":STOP_{mode}"),
				settle: Duration::ZERO,
				answered: false,
			}
		} else {
			Command::global(format!("STOP_{mode}"))
		}
	}

	// -- Teaching points -----------------------------------------------------

	/// `TCH<nn> v1/v2/v3/v4/v5/v6`: store a teaching point.
	///
	/// Axes missing from `values` are stored as "no data".
	pub fn teaching_point(point: u8, values: &[(Axis, TeachingValue)]) -> Result<Command, ValidationError> {
		let point = in_range("teaching point", point, 0, 63)?;
		let mut slots = [TeachingValue::NoData; 6];
		for &(axis, value) in values {
			let axis = axis.require_single()?;
			if let TeachingValue::Position(position) = value {
				position.check_finite("teaching point position")?;
			}
			let index = axis.number().map_or(0, |n| usize::from(n - 1));
			slots[index] = value;
		}
		let values = slots
			.iter()
			.map(ToString::to_string)
			.collect::<Vec<_>>()
			.join("/");
		Ok(Command::global(format!("TCH{point:02} {values}")))
	}

	// -- Status --------------------------------------------------------------

	/// `:POS?`
	pub fn get_position(axis: Axis) -> Result<Command, ValidationError> {
		Command::query(axis, "POS?")
	}

	/// `:MOTION?`
	pub fn get_motion(axis: Axis) -> Result<Command, ValidationError> {
		Command::query(axis, "MOTION?")
	}

	/// `:READY?`
	pub fn get_ready(axis: Axis) -> Result<Command, ValidationError> {
		Command::query(axis, "READY?")
	}

	/// `:SB1?`, `:SB2?` and `:SB3?`
	pub fn get_status_bytes(axis: Axis) -> Result<[Command; 3], ValidationError> {
		Ok([
			Command::query(axis, "SB1?")?,
			Command::query(axis, "SB2?")?,
			Command::query(axis, "SB3?")?,
		])
	}

	/// `EMS?`
	pub fn get_emergency() -> Command {
		Command::global("EMS?")
	}

	/// `MOTIONA?`
	pub fn get_all_motion() -> Command {
		Command::global("MOTIONA?")
	}

	/// `*IDN?`
	pub fn get_version() -> Command {
		Command::global("*IDN?")
	}

	// -- I/O -----------------------------------------------------------------

	/// `IN<nn>?`: read a single input (0-47).
	pub fn get_input(input: u8) -> Result<Command, ValidationError> {
		let input = in_range("input number", input, 0, 47)?;
		Ok(Command::global(format!("IN{input:02}?")))
	}

	/// `INP<n>?`: read an input port (0-2).
	pub fn get_input_port(port: u8) -> Result<Command, ValidationError> {
		let port = in_range("input port", port, 0, 2)?;
		Ok(Command::global(format!("INP{port}?")))
	}

	/// `OUT<nn>_<0|1>`: set a single output (0-35).
	pub fn set_output(output: u8, on: bool) -> Result<Command, ValidationError> {
		let output = in_range("output number", output, 0, 35)?;
		Ok(Command::global(format!("OUT{output:02}_{}", u8::from(on))))
	}

	/// `OUTP<n>_<value>`: set an output port (0-2) to a value (0-4095).
	pub fn set_output_port(port: u8, value: u16) -> Result<Command, ValidationError> {
		let port = in_range("output port", port, 0, 2)?;
		let value = in_range("output port value", value, 0, 4095)?;
		Ok(Command::global(format!("OUTP{port}_{value}")))
	}

	/// `OUTP<n>?`: read an output port (0-2).
	pub fn get_output_port(port: u8) -> Result<Command, ValidationError> {
		let port = in_range("output port", port, 0, 2)?;
		Ok(Command::global(format!("OUTP{port}?")))
	}

	// -- Programs ------------------------------------------------------------

	/// `SELPRG <0-7>`: select a stored program.
	pub fn select_program(program: u8) -> Result<Command, ValidationError> {
		let program = in_range("program number", program, 0, 7)?;
		Ok(Command::global(format!("SELPRG {program}")))
	}

	/// `SELPRG?`
	pub fn get_program_number() -> Command {
		Command::global("SELPRG?")
	}

	/// `PRG RUN` or `PRG STEP`: start the selected program.
	pub fn run_program(mode: ProgramMode) -> Command {
		Command::global(format!("PRG {mode}"))
	}

	/// `PRG?`
	pub fn get_program_status() -> Command {
		Command::global("PRG?")
	}

	/// `DELPRG <0-7>`: delete a stored program.
	pub fn delete_program(program: u8) -> Result<Command, ValidationError> {
		let program = in_range("program number", program, 0, 7)?;
		Ok(Command::global(format!("DELPRG {program}")).with_settle(Duration::from_millis(500)))
	}

	/// `SETPRG <program>, <step>, <text>`: store one program step.
	///
	/// The step text is passed through as-is.
	pub fn set_program_step(program: u8, step: u8, text: &str) -> Result<Command, ValidationError> {
		let program = in_range("program number", program, 0, 7)?;
		let step = in_range("program step", step, 0, 99)?;
		if text.bytes().any(|b| b == DELIMITER || b == b'\n') {
			return Err(ValidationError::new("program step", "the text must be a single line"));
		}
		Ok(Command::global(format!("SETPRG {program}, {step}, {text}"))
			.with_settle(Duration::from_millis(30)))
	}

	/// `GETPRG <program>, <step>`: read one program step.
	pub fn get_program_step(program: u8, step: u8) -> Result<Command, ValidationError> {
		let program = in_range("program number", program, 0, 7)?;
		let step = in_range("program step", step, 0, 99)?;
		Ok(Command::global(format!("GETPRG {program}, {step}")).answered())
	}
}

impl fmt::Display for Command {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.text)
	}
}

/// Implement `FromStr` for a fieldless enum from a list of accepted names.
macro_rules! impl_from_str {
	($name:ident, $what:literal, { $($($text:literal)|+ => $variant:ident),+ $(,)? }) => {
		impl FromStr for $name {
			type Err = ValidationError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				match s.trim().to_ascii_uppercase().as_str() {
					$($($text)|+ => Ok($name::$variant),)+
					_ => Err(ValidationError::new($what, format!("{s:?} is not recognized"))),
				}
			}
		}
	};
}

/// How `:GO` drives an axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DriveMode {
	/// Step clockwise.
	Cw = 0,
	/// Step counter-clockwise.
	Ccw = 1,
	/// Return to the origin sensor.
	Origin = 2,
	/// Drive to the home position.
	Home = 3,
	/// Drive to the absolute pulse target.
	Absolute = 4,
	/// Jog clockwise until stopped.
	JogCw = 5,
	/// Jog counter-clockwise until stopped.
	JogCcw = 6,
}

impl_from_str!(DriveMode, "drive mode", {
	"0" | "CW" => Cw,
	"1" | "CCW" => Ccw,
	"2" | "ORIGIN" | "ORG" => Origin,
	"3" | "HOME" => Home,
	"4" | "ABS" => Absolute,
	"5" | "CWJ" => JogCw,
	"6" | "CCWJ" => JogCcw,
});

/// How a stop command halts motion.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum StopMode {
	/// Halt immediately.
	#[default]
	Emergency = 0,
	/// Decelerate to a stop.
	Reduction = 1,
}

impl_from_str!(StopMode, "stop mode", {
	"0" | "E" | "EMERGENCY" => Emergency,
	"1" | "R" | "REDUCTION" => Reduction,
});

/// A direction of travel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
	/// Clockwise, or `+`.
	Cw,
	/// Counter-clockwise, or `-`.
	Ccw,
}

impl Direction {
	fn sign(self) -> char {
		match self {
			Direction::Cw => '+',
			Direction::Ccw => '-',
		}
	}

	/// The `:GO` mode that jogs in this direction.
	pub fn jog_mode(self) -> DriveMode {
		match self {
			Direction::Cw => DriveMode::JogCw,
			Direction::Ccw => DriveMode::JogCcw,
		}
	}
}

impl_from_str!(Direction, "direction", {
	"CW" | "+" => Cw,
	"CCW" | "-" => Ccw,
});

/// The unit an axis reports positions in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UnitType {
	/// Motor pulses.
	Pulse = 0,
	/// Micrometres.
	Micrometre = 1,
	/// Millimetres.
	Millimetre = 2,
	/// Degrees.
	Degree = 3,
	/// Milliradians.
	Milliradian = 4,
}

impl_from_str!(UnitType, "unit", {
	"0" | "PULSE" => Pulse,
	"1" | "UM" => Micrometre,
	"2" | "MM" => Millimetre,
	"3" | "DEG" => Degree,
	"4" | "MRAD" => Milliradian,
});

/// A sensor whose input logic is set by a memory switch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SensorInput {
	/// The limit sensors (`MEMSW1`).
	Limit = 1,
	/// The origin sensor (`MEMSW2`).
	Origin = 2,
	/// The near-origin sensor (`MEMSW3`).
	NearOrigin = 3,
}

/// The input logic of a sensor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SensorLogic {
	/// B contact.
	NormallyClosed = 0,
	/// A contact.
	NormallyOpen = 1,
}

/// The on/off memory switches.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MemorySwitch {
	/// `MEMSW4`: reduce the motor current while idle.
	CurrentDown = 4,
	/// `MEMSW5`: keep the normal (positive) motion direction.
	NormalDirection = 5,
	/// `MEMSW6`: stop immediately rather than decelerating.
	FastStop = 6,
	/// `MEMSW7`: reset the position to 0 after an origin return.
	ZeroResetAfterOrigin = 7,
}

/// The parameters stored in a speed table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SpeedProfile {
	/// Start-up speed in pulses per second (1-9999).
	pub start_speed: u32,
	/// Drive speed in pulses per second (1-999999).
	pub drive_speed: u32,
	/// Acceleration and deceleration time in milliseconds (1-9999).
	pub accel_time: u32,
	/// S-curve rate in percent (0-100).
	pub s_curve_rate: u32,
}

impl SpeedProfile {
	/// Check every parameter against its documented range.
	pub fn validate(&self) -> Result<(), ValidationError> {
		in_range("start speed", self.start_speed, 1, 9999)?;
		in_range("drive speed", self.drive_speed, 1, 999_999)?;
		in_range("acceleration time", self.accel_time, 1, 9999)?;
		in_range("S-curve rate", self.s_curve_rate, 0, 100)?;
		Ok(())
	}
}

/// The value stored for one axis in a teaching point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TeachingValue {
	/// A position.
	Position(Number),
	/// No data (`N`).
	NoData,
	/// The axis's current position (`S`).
	Current,
}

impl fmt::Display for TeachingValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TeachingValue::Position(n) => fmt::Display::fmt(n, f),
			TeachingValue::NoData => f.write_str("N"),
			TeachingValue::Current => f.write_str("S"),
		}
	}
}

/// How a stored program is run.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ProgramMode {
	/// Run to completion.
	Run,
	/// Execute one step at a time.
	Step,
}

impl fmt::Display for ProgramMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			ProgramMode::Run => "RUN",
			ProgramMode::Step => "STEP",
		})
	}
}

impl_from_str!(ProgramMode, "program mode", {
	"RUN" => Run,
	"STEP" => Step,
});

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn global_commands_are_terminated_once() {
		assert_eq!(Command::global("WRITE").to_bytes(), b"WRITE\r");
		assert_eq!(Command::global("WRITE\r").to_bytes(), b"WRITE\r");
	}

	#[test]
	fn axis_scoped_encoding() {
		let cmd = Command::drive_absolute(Axis::X, 1250).unwrap();
		assert_eq!(cmd.text(), ":GOABS 1250");
		assert_eq!(cmd.axis(), Some(Axis::X));
		assert!(!cmd.is_query());

		let cmd = Command::drive_absolute(Axis::Y, 12.5).unwrap();
		assert_eq!(cmd.text(), ":GOABS 12.5");

		let cmd = Command::get_position(Axis::Z).unwrap();
		assert_eq!(cmd.text(), ":POS?");
		assert!(cmd.is_query());
	}

	#[test]
	fn axis_scoped_commands_need_a_single_axis() {
		assert!(Command::drive(Axis::All, DriveMode::Home).is_err());
		assert!(Command::get_position(Axis::All).is_err());
	}

	#[test]
	fn selection() {
		assert_eq!(Command::select(Axis::X).text(), "AXI1");
		assert_eq!(Command::select(Axis::W).text(), "AXI6");
		assert_eq!(Command::select(Axis::All).text(), "AXIALL");
		assert_eq!(Command::select(Axis::X).axis(), None);
	}

	#[test]
	fn ranges_are_checked_locally() {
		assert!(Command::select_speed(Axis::X, 9).is_ok());
		assert!(Command::select_speed(Axis::X, 10).is_err());
		assert!(Command::driver_division(Axis::X, 15).is_ok());
		assert!(Command::driver_division(Axis::X, 16).is_err());
		assert!(Command::data_selection(Axis::X, 0).is_err());
		assert!(Command::data_selection(Axis::X, 2).is_ok());
		assert!(Command::origin_return_type(Axis::X, 13).is_err());
		assert!(Command::teaching_point(64, &[]).is_err());
		assert!(Command::get_input(48).is_err());
		assert!(Command::get_input_port(3).is_err());
		assert!(Command::set_output(36, true).is_err());
		assert!(Command::set_output_port(2, 4096).is_err());
		assert!(Command::select_program(8).is_err());
		assert!(Command::set_program_step(0, 100, "GO").is_err());
		assert!(Command::drive_absolute(Axis::X, f64::NAN).is_err());
	}

	#[test]
	fn memory_switches() {
		let cmd = Command::origin_return_type(Axis::X, 3).unwrap();
		assert_eq!(cmd.text(), ":MEMSW0 3");
		let cmd = Command::sensor_logic(Axis::X, SensorInput::NearOrigin, SensorLogic::NormallyOpen).unwrap();
		assert_eq!(cmd.text(), ":MEMSW3 1");
		let cmd = Command::memory_switch(Axis::Y, MemorySwitch::CurrentDown, true).unwrap();
		assert_eq!(cmd.text(), ":MEMSW4 0");
		let cmd = Command::memory_switch(Axis::Y, MemorySwitch::ZeroResetAfterOrigin, false).unwrap();
		assert_eq!(cmd.text(), ":MEMSW7 1");
	}

	#[test]
	fn speed_table() {
		let profile = SpeedProfile {
			start_speed: 500,
			drive_speed: 5000,
			accel_time: 100,
			s_curve_rate: 0,
		};
		let cmds = Command::speed_table(Axis::X, 3, &profile).unwrap();
		let texts: Vec<_> = cmds.iter().map(Command::text).collect();
		assert_eq!(texts, [":L3 500", ":F3 5000", ":R3 100", ":S3 0"]);
		assert!(cmds.iter().all(|c| c.axis() == Some(Axis::X)));

		let bad = SpeedProfile {
			drive_speed: 1_000_000,
			..profile
		};
		assert!(Command::speed_table(Axis::X, 3, &bad).is_err());
		assert!(Command::speed_table(Axis::X, 10, &profile).is_err());
	}

	#[test]
	fn teaching_point_fills_missing_axes() {
		let cmd = Command::teaching_point(
			5,
			&[
				(Axis::X, TeachingValue::Position(Number::from(100.0))),
				(Axis::Z, TeachingValue::Current),
			],
		)
		.unwrap();
		assert_eq!(cmd.text(), "TCH05 100/N/S/N/N/N");
	}

	#[test]
	fn linear_drives() {
		let cmd =
			Command::drive_linear_incremental(&[(Axis::X, Direction::Cw), (Axis::Y, Direction::Ccw)]).unwrap();
		assert_eq!(cmd.text(), "GOLI X+Y-");

		let cmd = Command::drive_linear_absolute(&[(Axis::X, Number::from(100)), (Axis::Y, Number::from(200.5))])
			.unwrap();
		assert_eq!(cmd.text(), "GOLA X100_Y200.5");

		assert!(Command::drive_linear_absolute(&[]).is_err());
		assert!(Command::drive_linear_incremental(&[(Axis::All, Direction::Cw)]).is_err());
	}

	#[test]
	fn stop_scope() {
		assert_eq!(Command::stop(Axis::All, StopMode::Emergency).text(), "STOP_0");
		let cmd = Command::stop(Axis::Y, StopMode::Reduction);
		assert_eq!(cmd.text(), ":STOP_1");
		assert_eq!(cmd.axis(), Some(Axis::Y));
	}

	#[test]
	fn io_and_programs() {
		assert_eq!(Command::get_input(7).unwrap().text(), "IN07?");
		assert_eq!(Command::set_output(3, true).unwrap().text(), "OUT03_1");
		assert_eq!(Command::set_output_port(1, 4095).unwrap().text(), "OUTP1_4095");
		assert_eq!(Command::run_program(ProgramMode::Step).text(), "PRG STEP");
		assert_eq!(
			Command::set_program_step(2, 10, "GOABS 100").unwrap().text(),
			"SETPRG 2, 10, GOABS 100"
		);
		let cmd = Command::get_program_step(2, 10).unwrap();
		assert_eq!(cmd.text(), "GETPRG 2, 10");
		assert!(cmd.is_query());
	}

	#[test]
	fn settle_times() {
		assert_eq!(Command::write_to_flash().settle(), Duration::from_millis(200));
		assert_eq!(Command::reset().settle(), Duration::from_millis(5500));
		assert_eq!(Command::delete_program(1).unwrap().settle(), Duration::from_millis(500));
		assert_eq!(Command::get_version().settle(), Duration::ZERO);
	}

	#[test]
	fn mode_names() {
		assert_eq!("org".parse::<DriveMode>().unwrap(), DriveMode::Origin);
		assert_eq!("CCWJ".parse::<DriveMode>().unwrap(), DriveMode::JogCcw);
		assert_eq!("r".parse::<StopMode>().unwrap(), StopMode::Reduction);
		assert_eq!("emergency".parse::<StopMode>().unwrap(), StopMode::Emergency);
		assert!("sideways".parse::<DriveMode>().is_err());
		assert_eq!(Direction::Ccw.jog_mode(), DriveMode::JogCcw);
	}
}
