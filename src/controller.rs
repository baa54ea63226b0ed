//! Typed operations on a connected controller.
//!
//! A [`Controller`] combines a [`Port`] with an [`AxisSelector`], so every
//! axis-scoped command is preceded by the right `AXI<n>`. It never holds an
//! opinion about whether an axis is moving: every state query asks the
//! controller, since motion can also be started from the front panel or by
//! a stored program.
//!
//! Drive commands return as soon as the controller has accepted them. Use
//! the `wait_*` methods, or the blocking conveniences such as
//! [`move_to_position`](Controller::move_to_position), to wait for motion to
//! finish. Waiting loops report a deadline as `Ok(false)`; an `Err` always
//! means communication failed or the controller rejected a command.
//!
//! Nothing in this module retries.


use crate::{
	backend::{Backend, Serial},
	config::{ControllerConfig, MotionOptions},
	error::{Error, TimeoutError, ValidationError},
	port::Port,
	protocol::{
		Axis, AxisMask, AxisStatus, Command, Direction, DriveMode, MemorySwitch, Number, ProgramMode,
		ProgramStatus, Reply, SensorInput, SensorLogic, SpeedProfile, StopMode, TeachingValue, UnitType,
	},
	selector::{AxisSelector, SelectionPolicy},
};
use std::time::{Duration, Instant};

/// Absolute target positions for one or more axes.
///
/// Targets are kept in insertion order, which is also the order the drive
/// commands are sent in. Setting an axis twice replaces its target.
///
/// ## Example
///
/// ```rust
/// # use ds102::{controller::MotionRequest, protocol::Axis};
/// let request = MotionRequest::new()
///     .with(Axis::X, 48_500)
///     .with(Axis::Y, 22_500.5);
/// assert_eq!(request.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MotionRequest {
	targets: Vec<(Axis, Number)>,
}

impl MotionRequest {
	/// Create an empty request.
	pub fn new() -> Self {
		MotionRequest::default()
	}

	/// Add or replace the target of `axis`, builder style.
	#[must_use]
	pub fn with<N: Into<Number>>(mut self, axis: Axis, position: N) -> Self {
		self.insert(axis, position);
		self
	}

	/// Add or replace the target of `axis`.
	pub fn insert<N: Into<Number>>(&mut self, axis: Axis, position: N) {
		let position = position.into();
		match self.targets.iter_mut().find(|(a, _)| *a == axis) {
			Some(target) => target.1 = position,
			None => self.targets.push((axis, position)),
		}
	}

	/// Get the target of `axis`, if any.
	pub fn get(&self, axis: Axis) -> Option<Number> {
		self.targets
			.iter()
			.find_map(|&(a, position)| (a == axis).then_some(position))
	}

	/// Iterate over the targets in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (Axis, Number)> + '_ {
		self.targets.iter().copied()
	}

	/// The number of axes with a target.
	pub fn len(&self) -> usize {
		self.targets.len()
	}

	/// Whether no axis has a target.
	pub fn is_empty(&self) -> bool {
		self.targets.is_empty()
	}
}

impl<N: Into<Number>> FromIterator<(Axis, N)> for MotionRequest {
	fn from_iter<T: IntoIterator<Item = (Axis, N)>>(iter: T) -> Self {
		let mut request = MotionRequest::new();
		for (axis, position) in iter {
			request.insert(axis, position);
		}
		request
	}
}

/// The provisioning sequence run by [`Controller::initialize_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initialization {
	/// The axes to provision, in order.
	pub axes: Vec<Axis>,
	/// The origin return type written to `MEMSW0` (0-12).
	pub origin_return_type: u8,
	/// The speed table selected for the origin return (0-9).
	pub speed_table: u8,
}

impl Default for Initialization {
	/// X and Y, origin return type 3, speed table 8.
	fn default() -> Self {
		Initialization {
			axes: vec![Axis::X, Axis::Y],
			origin_return_type: 3,
			speed_table: 8,
		}
	}
}

/// A DS102/DS112 controller.
///
/// The controller assumes it has exclusive use of the port. Share it between
/// threads behind a mutex, as [`StageContext`](crate::StageContext) does.
pub struct Controller<B: Backend> {
	port: Port<B>,
	selector: AxisSelector,
	motion: MotionOptions,
}

impl<B: Backend> std::fmt::Debug for Controller<B> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Controller")
			.field("port", &self.port)
			.field("selector", &self.selector)
			.field("motion", &self.motion)
			.finish()
	}
}

impl Controller<Serial> {
	/// Open the configured serial port and wrap it in a controller.
	///
	/// ## Example
	///
	/// ```rust
	/// # use ds102::{Controller, config::ControllerConfig, protocol::Axis};
	/// # fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
	/// let mut controller = Controller::connect(&ControllerConfig::new("/dev/ttyUSB0"))?;
	/// println!("X is at {}", controller.get_position(Axis::X)?);
	/// # Ok(())
	/// # }
	/// ```
	pub fn connect(config: &ControllerConfig) -> Result<Self, Error> {
		Ok(Controller::new(config.open()?))
	}
}

impl<B: Backend> Controller<B> {
	/// Wrap an open port with the default [`MotionOptions`] and
	/// [`SelectionPolicy`].
	pub fn new(port: Port<B>) -> Self {
		Controller::with_options(port, MotionOptions::default(), SelectionPolicy::default())
	}

	/// Wrap an open port with custom options.
	pub fn with_options(port: Port<B>, motion: MotionOptions, policy: SelectionPolicy) -> Self {
		Controller {
			port,
			selector: AxisSelector::new(policy),
			motion,
		}
	}

	/// Get the underlying port.
	pub fn port(&self) -> &Port<B> {
		&self.port
	}

	/// Get the underlying port mutably.
	///
	/// Anything could be sent through it, so the cached axis selection is
	/// forgotten.
	pub fn port_mut(&mut self) -> &mut Port<B> {
		self.selector.invalidate();
		&mut self.port
	}

	/// Unwrap the controller and return its port.
	pub fn into_port(self) -> Port<B> {
		self.port
	}

	/// Close the port. Closing twice does nothing.
	pub fn close(&mut self) {
		self.selector.invalidate();
		self.port.close();
	}

	/// Whether the port is still open.
	pub fn is_connected(&self) -> bool {
		self.port.is_open()
	}

	/// Get the motion options.
	pub fn motion_options(&self) -> MotionOptions {
		self.motion
	}

	/// Set the motion options.
	pub fn set_motion_options(&mut self, options: MotionOptions) {
		self.motion = options;
	}

	/// Get the axis selection policy.
	pub fn selection_policy(&self) -> SelectionPolicy {
		self.selector.policy()
	}

	/// Set the axis selection policy.
	pub fn set_selection_policy(&mut self, policy: SelectionPolicy) {
		self.selector.set_policy(policy);
	}

	/// Send a command, selecting its axis first if it is axis-scoped.
	pub fn send(&mut self, command: &Command) -> Result<Reply, Error> {
		if let Some(axis) = command.axis() {
			self.selector.ensure(&mut self.port, axis)?;
		}
		self.port.transact(command).map_err(|e| {
			if e.is_timeout() || e.is_connection() {
				self.selector.invalidate();
			}
			e
		})
	}

	fn send_all<I: IntoIterator<Item = Command>>(&mut self, commands: I) -> Result<(), Error> {
		for command in commands {
			self.send(&command)?;
		}
		Ok(())
	}

	/// Send a line verbatim.
	///
	/// The line may change the controller's axis selection, so the cached
	/// selection is forgotten.
	pub fn raw(&mut self, line: &str) -> Result<Reply, Error> {
		self.selector.invalidate();
		self.port.raw(line)
	}

	/// Select `axis` now, regardless of the selection policy.
	pub fn select_axis(&mut self, axis: Axis) -> Result<(), Error> {
		self.selector.select(&mut self.port, axis)
	}

	// -- Axis parameters -----------------------------------------------------

	/// Enable or disable the CW soft limit, and optionally move it.
	pub fn set_cw_soft_limit(&mut self, axis: Axis, enable: bool, position: Option<Number>) -> Result<(), Error> {
		let mut commands = vec![Command::cw_soft_limit_enable(axis, enable)?];
		if let Some(position) = position {
			commands.push(Command::cw_soft_limit_position(axis, position)?);
		}
		self.send_all(commands)
	}

	/// Enable or disable the CCW soft limit, and optionally move it.
	pub fn set_ccw_soft_limit(&mut self, axis: Axis, enable: bool, position: Option<Number>) -> Result<(), Error> {
		let mut commands = vec![Command::ccw_soft_limit_enable(axis, enable)?];
		if let Some(position) = position {
			commands.push(Command::ccw_soft_limit_position(axis, position)?);
		}
		self.send_all(commands)
	}

	/// Set the driver's micro-step division (0-15).
	pub fn set_driver_division(&mut self, axis: Axis, division: u8) -> Result<(), Error> {
		self.send(&Command::driver_division(axis, division)?)?;
		Ok(())
	}

	/// Select the data set (1 or 2).
	pub fn set_data_selection(&mut self, axis: Axis, data: u8) -> Result<(), Error> {
		self.send(&Command::data_selection(axis, data)?)?;
		Ok(())
	}

	/// Set the home position.
	pub fn set_home_position<N: Into<Number>>(&mut self, axis: Axis, position: N) -> Result<(), Error> {
		self.send(&Command::home_position(axis, position)?)?;
		Ok(())
	}

	/// Overwrite the current position register.
	pub fn set_position<N: Into<Number>>(&mut self, axis: Axis, position: N) -> Result<(), Error> {
		self.send(&Command::set_position(axis, position)?)?;
		Ok(())
	}

	/// Set the step size used by constant-step drives.
	pub fn set_pulse<N: Into<Number>>(&mut self, axis: Axis, pulses: N) -> Result<(), Error> {
		self.send(&Command::pulse(axis, pulses)?)?;
		Ok(())
	}

	/// Set the target of the next absolute drive.
	pub fn set_absolute_pulse<N: Into<Number>>(&mut self, axis: Axis, position: N) -> Result<(), Error> {
		self.send(&Command::pulse_absolute(axis, position)?)?;
		Ok(())
	}

	/// Select the speed table (0-9) used by subsequent drives.
	pub fn select_speed(&mut self, axis: Axis, table: u8) -> Result<(), Error> {
		self.send(&Command::select_speed(axis, table)?)?;
		Ok(())
	}

	/// Set the distance moved per pulse.
	pub fn set_standard_resolution<N: Into<Number>>(&mut self, axis: Axis, resolution: N) -> Result<(), Error> {
		self.send(&Command::standard_resolution(axis, resolution)?)?;
		Ok(())
	}

	/// Set the unit positions are expressed in.
	pub fn set_unit(&mut self, axis: Axis, unit: UnitType) -> Result<(), Error> {
		self.send(&Command::unit(axis, unit)?)?;
		Ok(())
	}

	// -- Memory switches and speed tables ------------------------------------

	/// Set the origin return type (`MEMSW0`, 0-12).
	pub fn set_origin_return_type(&mut self, axis: Axis, kind: u8) -> Result<(), Error> {
		self.send(&Command::origin_return_type(axis, kind)?)?;
		Ok(())
	}

	/// Set the input logic of a sensor (`MEMSW1` to `MEMSW3`).
	pub fn set_sensor_logic(&mut self, axis: Axis, input: SensorInput, logic: SensorLogic) -> Result<(), Error> {
		self.send(&Command::sensor_logic(axis, input, logic)?)?;
		Ok(())
	}

	/// Turn one of the boolean memory switches (`MEMSW4` to `MEMSW7`) on or off.
	pub fn set_memory_switch(&mut self, axis: Axis, switch: MemorySwitch, on: bool) -> Result<(), Error> {
		self.send(&Command::memory_switch(axis, switch, on)?)?;
		Ok(())
	}

	/// Program speed table `table` (0-9) of `axis`.
	///
	/// Every value is checked before the first command is sent.
	pub fn set_speed_table(&mut self, axis: Axis, table: u8, profile: &SpeedProfile) -> Result<(), Error> {
		self.send_all(Command::speed_table(axis, table, profile)?)
	}

	// -- Teaching points and flash -------------------------------------------

	/// Store teaching point `point` (0-63). Axes not listed are stored without data.
	pub fn set_teaching_point(&mut self, point: u8, values: &[(Axis, TeachingValue)]) -> Result<(), Error> {
		self.send(&Command::teaching_point(point, values)?)?;
		Ok(())
	}

	/// Store all parameters in flash memory.
	pub fn write_to_flash(&mut self) -> Result<(), Error> {
		log::info!("{} writing parameters to flash", self.name());
		self.send(&Command::write_to_flash())?;
		Ok(())
	}

	/// Restart the controller. This blocks while it reboots.
	pub fn reset(&mut self) -> Result<(), Error> {
		log::info!("{} resetting", self.name());
		self.selector.invalidate();
		self.send(&Command::reset())?;
		Ok(())
	}

	// -- Driving -------------------------------------------------------------

	/// Start driving `axis` in the given mode. Does not wait.
	pub fn drive(&mut self, axis: Axis, mode: DriveMode) -> Result<(), Error> {
		self.send(&Command::drive(axis, mode)?)?;
		Ok(())
	}

	/// Start driving `axis` to an absolute position. Does not wait.
	pub fn drive_absolute<N: Into<Number>>(&mut self, axis: Axis, position: N) -> Result<(), Error> {
		self.send(&Command::drive_absolute(axis, position)?)?;
		Ok(())
	}

	/// Drive `axis` continuously until it is stopped.
	pub fn jog(&mut self, axis: Axis, direction: Direction) -> Result<(), Error> {
		self.drive(axis, direction.jog_mode())
	}

	/// Drive every axis to teaching point `point` (0-63). Does not wait.
	pub fn drive_to_teaching_point(&mut self, point: u8) -> Result<(), Error> {
		self.send(&Command::drive_to_teaching_point(point)?)?;
		Ok(())
	}

	/// Linear interpolated incremental drive. Does not wait.
	pub fn drive_linear_incremental(&mut self, directions: &[(Axis, Direction)]) -> Result<(), Error> {
		self.send(&Command::drive_linear_incremental(directions)?)?;
		Ok(())
	}

	/// Linear interpolated absolute drive. Does not wait.
	pub fn drive_linear_absolute(&mut self, positions: &[(Axis, Number)]) -> Result<(), Error> {
		self.send(&Command::drive_linear_absolute(positions)?)?;
		Ok(())
	}

	/// Stop one axis, or every axis with [`Axis::All`].
	///
	/// This does not wait for the axis to come to rest.
	pub fn stop(&mut self, axis: Axis, mode: StopMode) -> Result<(), Error> {
		log::debug!("{} stopping {axis} ({mode:?})", self.name());
		self.send(&Command::stop(axis, mode))?;
		Ok(())
	}

	// -- Status --------------------------------------------------------------

	/// Get the current position of `axis`.
	pub fn get_position(&mut self, axis: Axis) -> Result<f64, Error> {
		Ok(self.send(&Command::get_position(axis)?)?.to_f64()?)
	}

	/// Read the three status bytes of `axis`.
	pub fn get_status(&mut self, axis: Axis) -> Result<AxisStatus, Error> {
		let [sb1, sb2, sb3] = Command::get_status_bytes(axis)?;
		let sb1 = self.send(&sb1)?.to_u8()?;
		let sb2 = self.send(&sb2)?.to_u8()?;
		let sb3 = self.send(&sb3)?.to_u8()?;
		Ok(AxisStatus::from_bytes(sb1, sb2, sb3))
	}

	/// Whether `axis` is moving.
	pub fn is_in_motion(&mut self, axis: Axis) -> Result<bool, Error> {
		Ok(self.send(&Command::get_motion(axis)?)?.to_flag()?)
	}

	/// Whether `axis` is ready to accept a drive.
	pub fn is_ready(&mut self, axis: Axis) -> Result<bool, Error> {
		Ok(self.send(&Command::get_ready(axis)?)?.to_flag()?)
	}

	/// Whether the emergency stop input is active.
	pub fn is_emergency_stop_active(&mut self) -> Result<bool, Error> {
		Ok(self.send(&Command::get_emergency())?.to_flag()?)
	}

	/// Get the set of axes that are moving.
	pub fn get_all_axes_motion_status(&mut self) -> Result<AxisMask, Error> {
		let bits = self.send(&Command::get_all_motion())?.to_u8()?;
		Ok(AxisMask::from_bits_truncate(bits))
	}

	/// Get the controller's identification string.
	pub fn get_controller_version(&mut self) -> Result<String, Error> {
		Ok(self.send(&Command::get_version())?.into_string())
	}

	// -- I/O -----------------------------------------------------------------

	/// Read input `input` (0-47).
	pub fn get_input_status(&mut self, input: u8) -> Result<bool, Error> {
		Ok(self.send(&Command::get_input(input)?)?.to_flag()?)
	}

	/// Read input port `port` (0-2).
	pub fn get_input_port(&mut self, port: u8) -> Result<u32, Error> {
		Ok(self.send(&Command::get_input_port(port)?)?.to_u32()?)
	}

	/// Turn output `output` (0-35) on or off.
	pub fn set_output(&mut self, output: u8, on: bool) -> Result<(), Error> {
		self.send(&Command::set_output(output, on)?)?;
		Ok(())
	}

	/// Write `value` (0-4095) to output port `port` (0-2).
	pub fn set_output_port(&mut self, port: u8, value: u16) -> Result<(), Error> {
		self.send(&Command::set_output_port(port, value)?)?;
		Ok(())
	}

	/// Read output port `port` (0-2).
	pub fn get_output_port(&mut self, port: u8) -> Result<u32, Error> {
		Ok(self.send(&Command::get_output_port(port)?)?.to_u32()?)
	}

	// -- Programs ------------------------------------------------------------

	/// Select stored program `program` (0-7).
	pub fn select_program(&mut self, program: u8) -> Result<(), Error> {
		self.send(&Command::select_program(program)?)?;
		Ok(())
	}

	/// Start the selected program.
	///
	/// Programs select axes themselves, so the cached selection is forgotten.
	pub fn run_program(&mut self, mode: ProgramMode) -> Result<(), Error> {
		self.selector.invalidate();
		self.send(&Command::run_program(mode))?;
		Ok(())
	}

	/// Get the number of the selected program.
	pub fn get_program_number(&mut self) -> Result<u8, Error> {
		Ok(self.send(&Command::get_program_number())?.to_u8()?)
	}

	/// Get whether a program is running, stepping or stopped.
	pub fn get_program_status(&mut self) -> Result<ProgramStatus, Error> {
		Ok(ProgramStatus::from_reply(
			self.send(&Command::get_program_status())?.as_str(),
		))
	}

	/// Delete stored program `program` (0-7).
	pub fn delete_program(&mut self, program: u8) -> Result<(), Error> {
		self.send(&Command::delete_program(program)?)?;
		Ok(())
	}

	/// Store one step of a program. The text is not interpreted.
	pub fn set_program_step(&mut self, program: u8, step: u8, text: &str) -> Result<(), Error> {
		self.send(&Command::set_program_step(program, step, text)?)?;
		Ok(())
	}

	/// Read one step of a stored program.
	pub fn get_program_step(&mut self, program: u8, step: u8) -> Result<String, Error> {
		Ok(self.send(&Command::get_program_step(program, step)?)?.into_string())
	}

	// -- Waiting -------------------------------------------------------------

	/// Call `done` every poll interval until it returns `true` or `timeout`
	/// has elapsed. `done` is always called at least once.
	fn poll_until<F>(&mut self, timeout: Duration, mut done: F) -> Result<bool, Error>
	where
		F: FnMut(&mut Self) -> Result<bool, Error>,
	{
		let deadline = Instant::now().checked_add(timeout);
		loop {
			if done(self)? {
				return Ok(true);
			}
			let remaining = match deadline {
				Some(deadline) => deadline.saturating_duration_since(Instant::now()),
				None => Duration::MAX,
			};
			if remaining.is_zero() {
				return Ok(false);
			}
			log::trace!("{} still moving, polling again", self.name());
			std::thread::sleep(self.motion.poll_interval.min(remaining));
		}
	}

	/// Wait until `axis` reports that it is not moving.
	///
	/// Returns `Ok(false)` if it is still moving after `timeout`.
	pub fn wait_for_stop(&mut self, axis: Axis, timeout: Duration) -> Result<bool, Error> {
		let stopped = self.poll_until(timeout, |c| Ok(!c.is_in_motion(axis)?))?;
		if !stopped {
			log::warn!("{} axis {axis} still moving after {timeout:?}", self.name());
		}
		Ok(stopped)
	}

	/// Wait until no axis reports that it is moving.
	///
	/// Returns `Ok(false)` if some axis is still moving after `timeout`.
	pub fn wait_for_all_axes_stop(&mut self, timeout: Duration) -> Result<bool, Error> {
		let stopped = self.poll_until(timeout, |c| Ok(c.get_all_axes_motion_status()?.is_empty()))?;
		if !stopped {
			log::warn!("{} axes still moving after {timeout:?}", self.name());
		}
		Ok(stopped)
	}

	/// Drive every axis in `request` to its target, then wait for all axes to
	/// stop.
	///
	/// All targets are checked before anything is sent. Returns `Ok(false)`
	/// if the axes are still moving after `timeout`.
	pub fn move_to_position(&mut self, request: &MotionRequest, timeout: Duration) -> Result<bool, Error> {
		let commands = request
			.iter()
			.map(|(axis, position)| Command::drive_absolute(axis, position))
			.collect::<Result<Vec<_>, ValidationError>>()?;
		log::debug!("{} moving to {:?}", self.name(), request.targets);
		self.send_all(commands)?;
		self.wait_for_all_axes_stop(timeout)
	}

	/// Drive X and Y to their home positions and wait for both to stop.
	///
	/// The whole operation is bounded by `timeout`. Returns `Ok(false)` if
	/// either axis is still moving once it is spent.
	pub fn home_all_axes(&mut self, timeout: Duration) -> Result<bool, Error> {
		let deadline = Instant::now().checked_add(timeout);
		self.drive(Axis::X, DriveMode::Home)?;
		self.drive(Axis::Y, DriveMode::Home)?;
		for axis in [Axis::X, Axis::Y] {
			let remaining = deadline.map_or(Duration::MAX, |d| d.saturating_duration_since(Instant::now()));
			if !self.wait_for_stop(axis, remaining)? {
				log::warn!("{} homing did not finish within {timeout:?}", self.name());
				return Ok(false);
			}
		}
		Ok(true)
	}

	/// Run the default provisioning sequence, see [`Initialization`].
	pub fn initialize(&mut self) -> Result<(), Error> {
		self.initialize_with(&Initialization::default())
	}

	/// Provision the stage from scratch.
	///
	/// This runs in phases, each sent to every axis before the next phase
	/// starts: set the origin return type, select the speed table, start an
	/// origin return. Once every axis has stopped, the position registers
	/// and then the home position registers are zeroed.
	///
	/// This overwrites any previous calibration. If the axes are still moving
	/// after [`MotionOptions::settle_timeout`], a [`TimeoutError`] is returned
	/// and the registers are left untouched.
	pub fn initialize_with(&mut self, init: &Initialization) -> Result<(), Error> {
		if init.axes.is_empty() {
			return Err(ValidationError::new("initialization", "at least one axis is required").into());
		}
		let mut setup = Vec::with_capacity(init.axes.len() * 3);
		let mut zero = Vec::with_capacity(init.axes.len() * 2);
		for &axis in &init.axes {
			setup.push(Command::origin_return_type(axis, init.origin_return_type)?);
		}
		for &axis in &init.axes {
			setup.push(Command::select_speed(axis, init.speed_table)?);
		}
		for &axis in &init.axes {
			setup.push(Command::drive(axis, DriveMode::Origin)?);
		}
		for &axis in &init.axes {
			zero.push(Command::set_position(axis, 0)?);
		}
		for &axis in &init.axes {
			zero.push(Command::home_position(axis, 0)?);
		}

		log::info!("{} initializing {:?}", self.name(), init.axes);
		self.send_all(setup)?;

		let settle_timeout = self.motion.settle_timeout;
		let axes = init.axes.clone();
		let settled = self.poll_until(settle_timeout, |c| {
			for &axis in &axes {
				if c.is_in_motion(axis)? {
					return Ok(false);
				}
			}
			Ok(true)
		})?;
		if !settled {
			log::warn!("{} origin return did not finish within {settle_timeout:?}", self.name());
			return Err(TimeoutError::new("waiting for the origin return to finish", Some(settle_timeout), &[]).into());
		}

		self.send_all(zero)?;
		log::info!("{} initialized", self.name());
		Ok(())
	}

	fn name(&self) -> String {
		self.port
			.name()
			.unwrap_or_else(|| crate::backend::UNKNOWN_BACKEND_NAME.to_string())
	}
}
