//! The DS102/DS112 command protocol.
//!
//! The controller speaks CR-terminated ASCII lines. Commands come in two
//! forms:
//!
//! * global commands, such as `STOP_0`, `WRITE` or `*IDN?`, and
//! * axis-scoped commands, such as `:GOABS 1250` or `:POS?`, which apply to
//!   whichever axis was last selected with `AXI<n>`.
//!
//! Queries (commands ending in `?`) are always answered. Other commands are
//! answered only when they fail, with an `E`-prefixed error code.
//!
//! This module only encodes and decodes; it performs no I/O. See
//! [`Port`](crate::Port) for sending commands and
//! [`Controller`](crate::Controller) for the typed operations.

mod axis;
mod command;
mod format;
mod response;
mod status;

pub use axis::Axis;
pub use command::{
	Command, Direction, DriveMode, MemorySwitch, ProgramMode, SensorInput, SensorLogic, SpeedProfile,
	StopMode, TeachingValue, UnitType,
};
pub use format::Number;
pub use response::{ErrorCode, Reply};
pub use status::{AxisMask, AxisStatus, DriveStatus, DriverStatus, LimitStatus, ProgramStatus};

/// The byte that terminates every command and reply.
pub const DELIMITER: u8 = b'\r';
