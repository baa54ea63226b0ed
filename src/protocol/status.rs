//! Decoded status replies.

use super::Axis;
use bitflags::bitflags;

bitflags! {
	/// A set of axes, as reported by `MOTIONA?`.
	///
	/// Bit 0 is X through to bit 5 for W.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct AxisMask: u8 {
		/// Axis 1.
		const X = 0b0000_0001;
		/// Axis 2.
		const Y = 0b0000_0010;
		/// Axis 3.
		const Z = 0b0000_0100;
		/// Axis 4.
		const U = 0b0000_1000;
		/// Axis 5.
		const V = 0b0001_0000;
		/// Axis 6.
		const W = 0b0010_0000;
	}
}

impl AxisMask {
	/// Whether the mask includes `axis`.
	///
	/// For [`Axis::All`] this is true only if every axis is set.
	pub fn contains_axis(self, axis: Axis) -> bool {
		self.contains(AxisMask::from(axis))
	}

	/// Iterate over the individual axes in the mask, from X to W.
	pub fn axes(self) -> impl Iterator<Item = Axis> {
		Axis::SINGLE
			.into_iter()
			.filter(move |axis| self.contains_axis(*axis))
	}
}

impl From<Axis> for AxisMask {
	fn from(axis: Axis) -> Self {
		match axis {
			Axis::X => AxisMask::X,
			Axis::Y => AxisMask::Y,
			Axis::Z => AxisMask::Z,
			Axis::U => AxisMask::U,
			Axis::V => AxisMask::V,
			Axis::W => AxisMask::W,
			Axis::All => AxisMask::all(),
		}
	}
}

impl FromIterator<Axis> for AxisMask {
	fn from_iter<T: IntoIterator<Item = Axis>>(iter: T) -> Self {
		iter.into_iter()
			.fold(AxisMask::empty(), |mask, axis| mask | AxisMask::from(axis))
	}
}

bitflags! {
	/// Status byte 1 (`SB1?`): the drive state of an axis.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct DriveStatus: u8 {
		/// The axis is being driven by a stored program.
		const PROGRAM_DRIVING = 0b1000_0000;
		/// The axis is moving.
		const IN_MOTION = 0b0100_0000;
		/// The home position has been detected.
		const HOME_DETECTED = 0b0010_0000;
		/// The origin has been detected.
		const ORIGIN_DETECTED = 0b0001_0000;
		/// The last drive was discontinued.
		const DISCONTINUED = 0b0000_1000;
		/// A soft limit was detected.
		const SOFT_LIMIT = 0b0000_0100;
		/// A mechanical limit was detected.
		const MECHANICAL_LIMIT = 0b0000_0010;
		/// The axis is moving, or last moved, clockwise.
		const DIRECTION_CW = 0b0000_0001;
	}
}

bitflags! {
	/// Status byte 2 (`SB2?`): the limit state of an axis.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct LimitStatus: u8 {
		/// The CW mechanical limit was detected.
		const CW_MECHANICAL = 0b0000_0001;
		/// The CCW mechanical limit was detected.
		const CCW_MECHANICAL = 0b0000_0010;
		/// The CW soft limit was detected.
		const CW_SOFT = 0b0000_0100;
		/// The CCW soft limit was detected.
		const CCW_SOFT = 0b0000_1000;
		/// The CW soft limit is enabled.
		const CW_SOFT_ENABLED = 0b0001_0000;
		/// The CCW soft limit is enabled.
		const CCW_SOFT_ENABLED = 0b0010_0000;
	}
}

bitflags! {
	/// Status byte 3 (`SB3?`): the driver configuration of an axis.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct DriverStatus: u8 {
		/// The axis can be selected.
		const AXIS_SELECTION_AVAILABLE = 0b0000_0001;
		/// A micro-step driver is fitted.
		const MICRO_STEP = 0b0000_0010;
		/// A micro-step driver is fitted (alternate bit used by some models).
		const MICRO_STEP_ALT = 0b0001_0000;
	}
}

/// The decoded status bytes of a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AxisStatus {
	/// Status byte 1.
	pub drive: DriveStatus,
	/// Status byte 2.
	pub limits: LimitStatus,
	/// Status byte 3.
	pub driver: DriverStatus,
}

impl AxisStatus {
	/// Decode the three raw status bytes. Unknown bits are ignored.
	pub fn from_bytes(sb1: u8, sb2: u8, sb3: u8) -> Self {
		AxisStatus {
			drive: DriveStatus::from_bits_truncate(sb1),
			limits: LimitStatus::from_bits_truncate(sb2),
			driver: DriverStatus::from_bits_truncate(sb3),
		}
	}

	/// Whether the axis is moving.
	pub fn in_motion(&self) -> bool {
		self.drive.contains(DriveStatus::IN_MOTION)
	}

	/// Whether any limit, soft or mechanical, was detected.
	pub fn limit_detected(&self) -> bool {
		self.drive
			.intersects(DriveStatus::SOFT_LIMIT | DriveStatus::MECHANICAL_LIMIT)
	}

	/// Whether a micro-step driver is fitted.
	pub fn micro_step_driver(&self) -> bool {
		self.driver
			.intersects(DriverStatus::MICRO_STEP | DriverStatus::MICRO_STEP_ALT)
	}

	/// Whether the axis can be selected.
	pub fn axis_selection_available(&self) -> bool {
		self.driver
			.contains(DriverStatus::AXIS_SELECTION_AVAILABLE)
	}
}

/// The state of the stored program, as reported by `PRG?`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProgramStatus {
	/// The program is running.
	Run,
	/// The program is in step mode.
	Step,
	/// The program is stopped.
	Stop,
	/// Any other reply, preserved as-is.
	Unknown(Box<str>),
}

impl ProgramStatus {
	/// Decode a `PRG?` reply.
	pub fn from_reply(reply: &str) -> Self {
		match reply {
			"0" => ProgramStatus::Run,
			"1" => ProgramStatus::Step,
			"2" => ProgramStatus::Stop,
			other => ProgramStatus::Unknown(Box::from(other)),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn axis_mask_bits() {
		let mask = AxisMask::from_bits_truncate(0b0000_0101);
		assert!(mask.contains_axis(Axis::X));
		assert!(!mask.contains_axis(Axis::Y));
		assert!(mask.contains_axis(Axis::Z));
		assert_eq!(mask.axes().collect::<Vec<_>>(), vec![Axis::X, Axis::Z]);
		assert!(!mask.contains_axis(Axis::All));
		assert!(AxisMask::all().contains_axis(Axis::All));
	}

	#[test]
	fn axis_mask_ignores_unknown_bits() {
		let mask = AxisMask::from_bits_truncate(0b1100_0000);
		assert!(mask.is_empty());
	}

	#[test]
	fn axis_mask_from_axes() {
		let mask: AxisMask = [Axis::X, Axis::W].into_iter().collect();
		assert_eq!(mask, AxisMask::X | AxisMask::W);
	}

	#[test]
	fn status_bytes() {
		let status = AxisStatus::from_bytes(0b0100_0011, 0b0001_0001, 0b0001_0000);
		assert!(status.in_motion());
		assert!(status.drive.contains(DriveStatus::DIRECTION_CW));
		assert!(status.limit_detected());
		assert!(status.limits.contains(LimitStatus::CW_MECHANICAL));
		assert!(status.limits.contains(LimitStatus::CW_SOFT_ENABLED));
		assert!(!status.limits.contains(LimitStatus::CCW_SOFT));
		assert!(status.micro_step_driver());
		assert!(!status.axis_selection_available());

		let idle = AxisStatus::from_bytes(0, 0, 0b0000_0001);
		assert!(!idle.in_motion());
		assert!(!idle.limit_detected());
		assert!(!idle.micro_step_driver());
		assert!(idle.axis_selection_available());
	}

	#[test]
	fn program_status() {
		assert_eq!(ProgramStatus::from_reply("0"), ProgramStatus::Run);
		assert_eq!(ProgramStatus::from_reply("1"), ProgramStatus::Step);
		assert_eq!(ProgramStatus::from_reply("2"), ProgramStatus::Stop);
		assert_eq!(
			ProgramStatus::from_reply("7"),
			ProgramStatus::Unknown(Box::from("7"))
		);
	}
}
