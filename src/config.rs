//! File based configuration.
//!
//! A [`StageConfig`] describes a whole setup: how to reach the controller,
//! how motion is waited for, and which plate is mounted. It is usually
//! loaded from a TOML file:
//!
//! ```toml
//! [controller]
//! port = "/dev/ttyUSB0"
//! baud_rate = 38400
//! timeout = "1s"
//! ack_window = "50ms"
//!
//! [motion]
//! poll_interval = "100ms"
//! settle_timeout = "2m"
//!
//! [plate]
//! rows = 4
//! cols = 6
//! well_spacing_x = 9500.0
//! well_spacing_y = 9500.0
//! well_diameter = 15.6
//! plate_origin_x = 58000.0
//! plate_origin_y = 32000.0
//! ```
//!
//! Everything except `controller.port` has a default.

use crate::{
	backend::Serial,
	error::{ConfigError, Error, ValidationError},
	plate::WellPlateConfig,
	port::{OpenSerialOptions, Port, DEFAULT_ACK_WINDOW},
};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// How to reach a controller over a serial port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
	/// The serial device, e.g. `/dev/ttyUSB0` or `COM3`.
	pub port: String,
	/// The baud rate. The default is 38,400.
	#[serde(default = "default_baud_rate")]
	pub baud_rate: u32,
	/// How long to wait for the answer to a query. The default is 1 second.
	#[serde(default = "default_timeout", with = "humantime_serde")]
	pub timeout: Duration,
	/// How long to wait for an error reply to any other command. The default
	/// is 50 milliseconds.
	#[serde(default = "default_ack_window", with = "humantime_serde")]
	pub ack_window: Duration,
}

fn default_baud_rate() -> u32 {
	OpenSerialOptions::DEFAULT_BAUD_RATE
}

fn default_timeout() -> Duration {
	OpenSerialOptions::DEFAULT_TIMEOUT
}

fn default_ack_window() -> Duration {
	DEFAULT_ACK_WINDOW
}

impl ControllerConfig {
	/// Create a configuration for `port` with default settings.
	pub fn new<S: Into<String>>(port: S) -> Self {
		ControllerConfig {
			port: port.into(),
			baud_rate: default_baud_rate(),
			timeout: default_timeout(),
			ack_window: default_ack_window(),
		}
	}

	/// Check that the values can be used to open a port.
	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.port.trim().is_empty() {
			return Err(ValidationError::new("serial port", "the port name is empty"));
		}
		if self.baud_rate == 0 {
			return Err(ValidationError::new("baud rate", "must be greater than 0"));
		}
		if self.timeout.is_zero() {
			return Err(ValidationError::new("timeout", "must be greater than 0"));
		}
		Ok(())
	}

	/// Get the [`OpenSerialOptions`] matching this configuration.
	pub fn serial_options(&self) -> OpenSerialOptions {
		let mut options = OpenSerialOptions::new();
		options
			.baud_rate(self.baud_rate)
			.timeout(Some(self.timeout))
			.ack_window(self.ack_window);
		options
	}

	/// Open the configured serial port.
	pub fn open(&self) -> Result<Port<Serial>, Error> {
		self.validate()?;
		self.serial_options().open(&self.port)
	}
}

/// How the [`Controller`](crate::Controller) waits for motion to finish.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionOptions {
	/// The pause between two motion status polls. The default is 100 ms.
	#[serde(with = "humantime_serde")]
	pub poll_interval: Duration,
	/// The longest [`initialize`](crate::Controller::initialize) waits for the
	/// origin return to finish. The default is 2 minutes.
	#[serde(with = "humantime_serde")]
	pub settle_timeout: Duration,
}

impl MotionOptions {
	/// The default pause between polls.
	pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
	/// The default bound on the initialization settle loop.
	pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(120);
}

impl Default for MotionOptions {
	fn default() -> Self {
		MotionOptions {
			poll_interval: MotionOptions::DEFAULT_POLL_INTERVAL,
			settle_timeout: MotionOptions::DEFAULT_SETTLE_TIMEOUT,
		}
	}
}

/// The complete configuration of a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
	/// The controller connection.
	pub controller: ControllerConfig,
	/// Motion waiting options.
	#[serde(default)]
	pub motion: MotionOptions,
	/// The mounted plate.
	#[serde(default)]
	pub plate: WellPlateConfig,
}

impl StageConfig {
	/// Read and validate a TOML configuration file.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.display().to_string(),
			source,
		})?;
		let config = StageConfig::from_toml_str(&text)?;
		log::debug!("loaded configuration from {}", path.display());
		Ok(config)
	}

	/// Parse and validate a TOML configuration.
	pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
		let config: StageConfig = toml::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	/// Check every section.
	pub fn validate(&self) -> Result<(), ValidationError> {
		self.controller.validate()?;
		if self.motion.poll_interval.is_zero() {
			return Err(ValidationError::new("poll interval", "must be greater than 0"));
		}
		self.plate.validate()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn minimal_file_uses_defaults() {
		let config = StageConfig::from_toml_str(
			r#"
			[controller]
			port = "/dev/ttyUSB0"
			"#,
		)
		.unwrap();
		assert_eq!(config.controller, ControllerConfig::new("/dev/ttyUSB0"));
		assert_eq!(config.controller.baud_rate, 38_400);
		assert_eq!(config.controller.timeout, Duration::from_secs(1));
		assert_eq!(config.controller.ack_window, Duration::from_millis(50));
		assert_eq!(config.motion, MotionOptions::default());
		assert_eq!(config.plate, WellPlateConfig::well_24_calibrated());
	}

	#[test]
	fn full_file() {
		let config = StageConfig::from_toml_str(
			r#"
			[controller]
			port = "COM3"
			baud_rate = 9600
			timeout = "500ms"
			ack_window = "20ms"

			[motion]
			poll_interval = "10ms"

			[plate]
			rows = 8
			cols = 12
			well_spacing_x = 9.0
			well_spacing_y = 9.0
			well_diameter = 6.4
			plate_origin_x = 100.0
			plate_origin_y = 50.0
			"#,
		)
		.unwrap();
		assert_eq!(config.controller.port, "COM3");
		assert_eq!(config.controller.baud_rate, 9600);
		assert_eq!(config.controller.timeout, Duration::from_millis(500));
		assert_eq!(config.controller.ack_window, Duration::from_millis(20));
		assert_eq!(config.motion.poll_interval, Duration::from_millis(10));
		assert_eq!(config.motion.settle_timeout, MotionOptions::DEFAULT_SETTLE_TIMEOUT);
		assert_eq!(config.plate.name(), "96-well plate");
		assert_eq!(config.plate.plate_origin_x, 100.0);
	}

	#[test]
	fn missing_port_is_a_parse_error() {
		let err = StageConfig::from_toml_str("[motion]\npoll_interval = \"1s\"\n").unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)), "{err:?}");
	}

	#[test]
	fn bad_duration_is_a_parse_error() {
		let err = StageConfig::from_toml_str("[controller]\nport = \"COM1\"\ntimeout = \"soon\"\n").unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)), "{err:?}");
	}

	#[test]
	fn invalid_values_are_rejected() {
		let err = StageConfig::from_toml_str("[controller]\nport = \"\"\n").unwrap_err();
		assert!(matches!(err, ConfigError::Invalid(_)), "{err:?}");

		let err = StageConfig::from_toml_str(
			"[controller]\nport = \"COM1\"\n[plate]\nrows = 0\ncols = 6\nwell_spacing_x = 1.0\nwell_spacing_y = 1.0\nwell_diameter = 1.0\nplate_origin_x = 0.0\nplate_origin_y = 0.0\n",
		)
		.unwrap_err();
		assert!(matches!(err, ConfigError::Invalid(_)), "{err:?}");
	}

	#[test]
	fn missing_file_is_an_io_error() {
		let err = StageConfig::load("/nonexistent/ds102/stage.toml").unwrap_err();
		match err {
			ConfigError::Io { path, .. } => assert!(path.ends_with("stage.toml")),
			e => panic!("unexpected error {e:?}"),
		}
	}

	#[test]
	fn open_rejects_invalid_config_before_touching_hardware() {
		let err = ControllerConfig::new(" ").open().unwrap_err();
		assert!(err.is_validation(), "{err:?}");
	}
}
