//! A library for driving DS102/DS112 stepping-motor stage controllers and
//! addressing well plates mounted on them.
//!
//! The crate is layered:
//!
//! * [`protocol`] encodes commands and decodes replies, without any I/O.
//! * [`Port`] exchanges one command at a time with a controller over a
//!   serial port or a TCP serial device server.
//! * [`Controller`] offers a typed method for every command, plus blocking
//!   conveniences such as [`Controller::move_to_position`] and
//!   [`Controller::home_all_axes`].
//! * [`plate`] maps well names such as `"B7"` to stage coordinates.
//! * [`StageContext`] ties a controller and a plate together behind locks,
//!   so it can be shared by concurrent request handlers.
//!
//! ## Example
//!
//! ```rust
//! use ds102::{Controller, controller::MotionRequest, protocol::Axis};
//! use std::time::Duration;
//! # fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let mut controller = Controller::new(ds102::Port::open_serial("/dev/ttyUSB0")?);
//! let request = MotionRequest::new().with(Axis::X, 48_500).with(Axis::Y, 22_500);
//! if !controller.move_to_position(&request, Duration::from_secs(30))? {
//!     println!("still moving after 30 seconds");
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(missing_debug_implementations)]

pub mod backend;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod plate;
pub mod port;
pub mod protocol;
pub mod selector;
pub mod timeout_guard;

pub use context::StageContext;
pub use controller::Controller;
pub use port::{OpenSerialOptions, OpenTcpOptions, Port};
