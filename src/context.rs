//! A shared handle to a stage: one controller connection and one plate.
//!
//! A [`StageContext`] is meant to be created once at startup and shared,
//! e.g. in an `Arc`, by whatever serves requests. Controller access is
//! serialized by a mutex, so only one command is ever in flight. The plate
//! calculator sits behind a read-write lock and is replaced as a whole, so
//! readers see either the old or the new plate, never a mix.

use crate::{
	backend::{Backend, Serial},
	config::{ControllerConfig, MotionOptions, StageConfig},
	controller::{Controller, MotionRequest},
	error::{ConnectionError, Error, ValidationError},
	plate::{Point, WellPlateCalculator, WellPlateConfig, WellPosition, Wells},
	port::Port,
	protocol::{Axis, Number, StopMode},
	selector::SelectionPolicy,
};
use std::{
	sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard},
	time::Duration,
};

/// The stage: an optional controller connection plus the mounted plate.
///
/// ## Example
///
/// ```rust
/// # use ds102::{StageContext, config::StageConfig, plate::WellPosition};
/// # use std::time::Duration;
/// # fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StageConfig::load("stage.toml")?;
/// let stage: StageContext = StageContext::from_config(&config)?;
/// stage.connect(&config.controller)?;
/// if !stage.move_to_well("B3", WellPosition::Center, Duration::from_secs(30))? {
///     println!("the stage did not settle in time");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StageContext<B: Backend = Serial> {
	controller: Mutex<Option<Controller<B>>>,
	plate: RwLock<WellPlateCalculator>,
	motion: MotionOptions,
}

impl StageContext<Serial> {
	/// Connect to the configured serial port.
	///
	/// An invalid configuration is rejected without touching the current
	/// connection. Otherwise any existing connection is closed before the
	/// port is opened, since the device may be the one already in use. If
	/// opening fails, the context is left disconnected.
	pub fn connect(&self, config: &ControllerConfig) -> Result<(), Error> {
		config.validate()?;
		let mut guard = self.lock_controller();
		if close(&mut guard) {
			log::info!("reconnecting to {}", config.port);
		}
		let port = config.open()?;
		*guard = Some(Controller::with_options(port, self.motion, SelectionPolicy::default()));
		Ok(())
	}
}

impl<B: Backend> StageContext<B> {
	/// Create a disconnected context for the given plate.
	pub fn new(plate: WellPlateCalculator, motion: MotionOptions) -> Self {
		StageContext {
			controller: Mutex::new(None),
			plate: RwLock::new(plate),
			motion,
		}
	}

	/// Create a disconnected context from a configuration.
	pub fn from_config(config: &StageConfig) -> Result<Self, ValidationError> {
		Ok(StageContext::new(WellPlateCalculator::new(config.plate.clone())?, config.motion))
	}

	fn lock_controller(&self) -> MutexGuard<'_, Option<Controller<B>>> {
		self.controller.lock().unwrap_or_else(|p| p.into_inner())
	}

	fn read_plate(&self) -> RwLockReadGuard<'_, WellPlateCalculator> {
		self.plate.read().unwrap_or_else(|p| p.into_inner())
	}

	fn write_plate(&self) -> RwLockWriteGuard<'_, WellPlateCalculator> {
		self.plate.write().unwrap_or_else(|p| p.into_inner())
	}

	/// Use an already open port as the connection.
	///
	/// Any existing connection is closed first.
	pub fn attach(&self, port: Port<B>) {
		let mut guard = self.lock_controller();
		close(&mut guard);
		*guard = Some(Controller::with_options(port, self.motion, SelectionPolicy::default()));
	}

	/// Close the connection. Returns whether there was one.
	pub fn disconnect(&self) -> bool {
		let mut guard = self.lock_controller();
		let was_connected = guard.as_ref().is_some_and(Controller::is_connected);
		close(&mut guard);
		was_connected
	}

	/// Whether a controller is connected.
	pub fn is_connected(&self) -> bool {
		self.lock_controller()
			.as_ref()
			.is_some_and(Controller::is_connected)
	}

	/// Run `f` with exclusive access to the controller.
	///
	/// Fails with a [`ConnectionError`] if there is no connection.
	pub fn with_controller<T, F>(&self, f: F) -> Result<T, Error>
	where
		F: FnOnce(&mut Controller<B>) -> Result<T, Error>,
	{
		let mut guard = self.lock_controller();
		let controller = guard.as_mut().ok_or_else(ConnectionError::not_connected)?;
		f(controller)
	}

	/// Start driving `axis` to `position`. Does not wait.
	pub fn drive_absolute<N: Into<Number>>(&self, axis: Axis, position: N) -> Result<(), Error> {
		let position = position.into();
		self.with_controller(|c| c.drive_absolute(axis, position))
	}

	/// Drive to the requested positions and wait, see
	/// [`Controller::move_to_position`].
	pub fn move_to(&self, request: &MotionRequest, timeout: Duration) -> Result<bool, Error> {
		self.with_controller(|c| c.move_to_position(request, timeout))
	}

	/// Drive X and Y to a position within a well and wait.
	///
	/// The well is resolved before the controller is touched, so an unknown
	/// well sends nothing.
	pub fn move_to_well(&self, name: &str, position: WellPosition, timeout: Duration) -> Result<bool, Error> {
		let target = self.well_position(name, position)?;
		log::debug!("moving to well {name} ({position}) at ({}, {})", target.x, target.y);
		let request = MotionRequest::new()
			.with(Axis::X, target.x)
			.with(Axis::Y, target.y);
		self.move_to(&request, timeout)
	}

	/// Home X and Y, see [`Controller::home_all_axes`].
	pub fn home_all(&self, timeout: Duration) -> Result<bool, Error> {
		self.with_controller(|c| c.home_all_axes(timeout))
	}

	/// Stop one axis, or all of them with [`Axis::All`].
	pub fn stop(&self, axis: Axis, mode: StopMode) -> Result<(), Error> {
		self.with_controller(|c| c.stop(axis, mode))
	}

	/// Get the position of `axis`.
	pub fn get_position(&self, axis: Axis) -> Result<f64, Error> {
		self.with_controller(|c| c.get_position(axis))
	}

	/// Resolve a position within a well to stage coordinates.
	pub fn well_position(&self, name: &str, position: WellPosition) -> Result<Point, ValidationError> {
		self.read_plate().get_well_position(name, position)
	}

	/// List every well of the current plate.
	pub fn wells(&self) -> Wells {
		self.read_plate().get_all_wells()
	}

	/// Move the plate origin.
	pub fn update_origin(&self, x: f64, y: f64) -> Result<(), ValidationError> {
		self.write_plate().update_origin(x, y)?;
		log::info!("plate origin moved to ({x}, {y})");
		Ok(())
	}

	/// Replace the plate.
	pub fn reconfigure_plate(&self, config: WellPlateConfig) -> Result<(), ValidationError> {
		let name = config.name();
		self.write_plate().reconfigure(config)?;
		log::info!("plate reconfigured as a {name}");
		Ok(())
	}

	/// Get a copy of the current plate configuration.
	pub fn plate_config(&self) -> WellPlateConfig {
		self.read_plate().config().clone()
	}
}

/// Close and remove the controller in `slot`. Returns whether there was one.
fn close<B: Backend>(slot: &mut Option<Controller<B>>) -> bool {
	match slot.take() {
		Some(mut controller) => {
			controller.close();
			true
		}
		None => false,
	}
}

impl<B: Backend> Drop for StageContext<B> {
	fn drop(&mut self) {
		let slot = self.controller.get_mut().unwrap_or_else(|p| p.into_inner());
		close(slot);
	}
}
