//! Types for opening and using a connection to a controller.
//!
//! A [`Port`] owns the connection exclusively and exchanges one command at a
//! time with the controller:
//!
//! 1. any stale input is discarded, so an old reply cannot be mistaken for
//!    the answer to the next command,
//! 2. the command is written, terminated by a single CR,
//! 3. the reply is read up to the next CR.
//!
//! Queries must be answered within the port's read timeout. Other commands
//! are only answered when they fail, so the port waits at most the
//! acknowledgement window for an error reply and treats silence as success.

mod options;
#[cfg(test)]
mod test;

#[cfg(any(test, feature = "mock"))]
use crate::backend::Mock;
use crate::{
	backend::{Backend, Serial, UNKNOWN_BACKEND_NAME},
	error::{ConnectionError, Error, TimeoutError},
	protocol::{Command, Reply, DELIMITER},
	timeout_guard::TimeoutGuard,
};
pub use options::*;
use std::{
	io,
	net::{TcpStream, ToSocketAddrs},
	time::{Duration, Instant},
};

/// The default time to wait for an error reply to a command that is not a query.
///
/// A rejection that arrives later is not reported as an error. It is
/// discarded, with a warning, before the next command is sent.
pub const DEFAULT_ACK_WINDOW: Duration = Duration::from_millis(50);

/// A connection to a DS102/DS112 controller.
///
/// A port is parameterized by the type of [`Backend`] used to send and
/// receive bytes. Use the convenience methods [`open_serial`] and
/// [`open_tcp`] to construct a serial port (`Port<Serial>`) or a TCP port
/// (`Port<TcpStream>`). To customize the construction of these types, or to
/// construct a port with a dynamic backend, use the [`OpenSerialOptions`]
/// and [`OpenTcpOptions`] builder types.
///
/// [`open_serial`]: Port::open_serial
/// [`open_tcp`]: Port::open_tcp
pub struct Port<B: Backend> {
	/// The underlying backend, or `None` once the port is closed.
	backend: Option<B>,
	/// How long to wait for an error reply to a non-query command.
	ack_window: Duration,
	/// If populated, the error that has "poisoned" the port. This error MUST be
	/// reported before the port is used for communication again.
	///
	/// A port becomes "poisoned" when an error occurs that cannot be reported
	/// where it happens, for instance when a [`TimeoutGuard`] cannot restore
	/// the original timeout in its Drop implementation.
	poison: Option<io::Error>,
}

impl<B: Backend> std::fmt::Debug for Port<B> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Port")
			.field("name", &self.name())
			.field("open", &self.is_open())
			.field("ack_window", &self.ack_window)
			.finish_non_exhaustive()
	}
}

impl Port<Serial> {
	/// Open the serial port at the specified path using the default options.
	///
	/// Alternatively, use [`Port::open_serial_options`] to customize how the port is opened.
	///
	/// ## Example
	///
	/// ```rust
	/// # use ds102::Port;
	/// # fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
	/// let mut port = Port::open_serial("/dev/ttyUSB0")?;
	/// // Or equivalently
	/// let mut port = Port::open_serial_options().open("/dev/ttyUSB0")?;
	/// # Ok(())
	/// # }
	/// ```
	pub fn open_serial(path: &str) -> Result<Port<Serial>, Error> {
		OpenSerialOptions::new().open(path)
	}

	/// Get an [`OpenSerialOptions`] to customize how a serial port is opened.
	pub fn open_serial_options() -> OpenSerialOptions {
		OpenSerialOptions::default()
	}
}

impl Port<TcpStream> {
	/// Open a TCP connection to a serial device server at the specified
	/// address using the default options.
	///
	/// Alternatively, use [`Port::open_tcp_options`] to customize how the port is opened.
	pub fn open_tcp<A: ToSocketAddrs>(address: A) -> Result<Port<TcpStream>, Error> {
		OpenTcpOptions::default().open(address)
	}

	/// Get an [`OpenTcpOptions`] to customize how a TCP port is opened.
	pub fn open_tcp_options() -> OpenTcpOptions {
		OpenTcpOptions::default()
	}
}

#[cfg(any(test, feature = "mock"))]
impl Port<Mock> {
	/// Open a port backed by a [`Mock`] that never replies.
	pub fn open_mock() -> Port<Mock> {
		Port::from_mock(Mock::new())
	}

	/// Open a port backed by the given [`Mock`].
	pub fn from_mock(mock: Mock) -> Port<Mock> {
		Port::from_backend(mock, DEFAULT_ACK_WINDOW)
	}
}

impl<B: Backend> Port<B> {
	/// Create a `Port` from a [`Backend`] type.
	pub(crate) fn from_backend(backend: B, ack_window: Duration) -> Self {
		log::info!(
			"{} opened",
			backend
				.name()
				.unwrap_or_else(|| UNKNOWN_BACKEND_NAME.to_string())
		);
		Port {
			backend: Some(backend),
			ack_window,
			poison: None,
		}
	}

	/// Check if the port is poisoned and report the error if it exists.
	fn check_poisoned(&mut self) -> Result<(), ConnectionError> {
		if let Some(poison) = self.poison.take() {
			Err(ConnectionError::io(poison))
		} else {
			Ok(())
		}
	}

	/// Poison the port. The error is reported on the next use.
	pub(crate) fn poison(&mut self, e: io::Error) {
		self.poison = Some(e);
	}

	/// Get the backend, or fail if the port has been closed.
	fn connected_backend(&mut self) -> Result<&mut B, ConnectionError> {
		self.backend
			.as_mut()
			.ok_or_else(ConnectionError::not_connected)
	}

	fn backend_name(&self) -> String {
		self.name()
			.unwrap_or_else(|| UNKNOWN_BACKEND_NAME.to_string())
	}

	/// Send a command and return the controller's reply.
	///
	/// Stale input is discarded before the command is written. Queries wait
	/// up to the read timeout for a reply. Other commands wait at most the
	/// [acknowledgement window](Port::ack_window) and return an empty reply
	/// if the controller stays silent.
	///
	/// `E`-coded replies are returned as [`ProtocolError`](crate::error::ProtocolError)s.
	/// Any settle time the command requires is waited out before returning.
	///
	/// ## Example
	///
	/// ```rust
	/// # use ds102::{Port, backend::Backend, protocol::Command};
	/// # fn wrapper<B: Backend>(mut port: Port<B>) -> Result<(), Box<dyn std::error::Error>> {
	/// let version = port.transact(&Command::get_version())?;
	/// println!("connected to {version}");
	/// # Ok(())
	/// # }
	/// ```
	pub fn transact(&mut self, command: &Command) -> Result<Reply, Error> {
		self.check_poisoned()?;
		let name = self.backend_name();
		let ack_window = self.ack_window;

		let stale = self.clear_input()?;
		if !stale.is_empty() {
			// Usually a rejection that arrived after the acknowledgement window.
			log::warn!(
				"{} discarded unread input before `{}`: {:?}",
				name,
				command.text(),
				String::from_utf8_lossy(&stale)
			);
		}
		log::debug!("{} TX:   {}", name, command.text());
		self.write(&command.to_bytes())?;

		let context = format!("waiting for a reply to `{}`", command.text());
		let raw = if command.is_query() {
			self.read_line(DELIMITER, None, &context)?
		} else {
			let mut guard = self.timeout_guard(Some(ack_window))?;
			match guard.read_line(DELIMITER, Some(ack_window), &context) {
				Ok(raw) => raw,
				Err(Error::Timeout(e)) if e.partial().is_empty() => {
					drop(guard);
					self.settle(command);
					return Ok(Reply::empty(command.text()));
				}
				Err(e) => return Err(e),
			}
		};

		let raw = String::from_utf8_lossy(&raw);
		log::debug!("{} RECV: {}", name, raw.trim_end());
		let reply = Reply::classify(command.text(), &raw).map_err(|e| {
			log::warn!("{name} `{}` failed: {e}", command.text());
			e
		})?;
		self.settle(command);
		Ok(reply)
	}

	/// Send a line verbatim and return the reply.
	///
	/// The line is treated like any other command: it is terminated with a
	/// single CR and, if it ends in `?`, must be answered.
	pub fn raw(&mut self, line: &str) -> Result<Reply, Error> {
		self.transact(&Command::global(line))
	}

	/// Wait for the controller to process `command`.
	fn settle(&self, command: &Command) {
		let settle = command.settle();
		if !settle.is_zero() {
			log::trace!("{} settling for {settle:?}", self.backend_name());
			std::thread::sleep(settle);
		}
	}

	/// Write all of `bytes` to the controller.
	pub fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
		self.check_poisoned()?;
		let backend = self.connected_backend()?;
		backend.write_all(bytes)?;
		backend.flush()?;
		Ok(())
	}

	/// Read until `delimiter` is received, and return the bytes before it.
	///
	/// If `timeout` is `None` the port's read timeout is used.
	pub fn read_until(&mut self, delimiter: u8, timeout: Option<Duration>) -> Result<Vec<u8>, Error> {
		self.check_poisoned()?;
		let context = format!("waiting for {:?}", char::from(delimiter));
		match timeout {
			Some(timeout) => {
				let mut guard = self.timeout_guard(Some(timeout))?;
				guard.read_line(delimiter, Some(timeout), &context)
			}
			None => self.read_line(delimiter, None, &context),
		}
	}

	/// Read bytes until `delimiter`, giving up once `timeout` (or the
	/// backend's timeout if `None`) has elapsed.
	fn read_line(&mut self, delimiter: u8, timeout: Option<Duration>, context: &str) -> Result<Vec<u8>, Error> {
		let backend = self.connected_backend()?;
		let timeout = match timeout {
			Some(timeout) => Some(timeout),
			None => backend.read_timeout().map_err(ConnectionError::io)?,
		};
		// A zero timeout still drains whatever is already buffered, so the
		// backend's own timeout ends the read instead of the deadline.
		let deadline = timeout
			.filter(|t| !t.is_zero())
			.and_then(|t| Instant::now().checked_add(t));

		let mut buf = Vec::with_capacity(32);
		let mut byte = [0u8];
		loop {
			match backend.read(&mut byte) {
				Ok(0) => return Err(ConnectionError::new("the connection was closed by the remote end").into()),
				Ok(_) if byte[0] == delimiter => return Ok(buf),
				Ok(_) => buf.push(byte[0]),
				Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
				Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
					return Err(TimeoutError::new(context, timeout, &buf).into());
				}
				Err(e) => return Err(ConnectionError::io(e).into()),
			}
			if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
				return Err(TimeoutError::new(context, timeout, &buf).into());
			}
		}
	}

	/// Discard any bytes received but not yet read, and return them.
	pub fn clear_input(&mut self) -> Result<Vec<u8>, Error> {
		self.check_poisoned()?;
		Ok(self
			.connected_backend()?
			.clear_input()
			.map_err(ConnectionError::io)?)
	}

	/// Close the port, releasing the underlying device.
	///
	/// Closing an already closed port does nothing. Any further use of the
	/// port fails with a [`ConnectionError`].
	pub fn close(&mut self) {
		if let Some(mut backend) = self.backend.take() {
			let name = backend
				.name()
				.unwrap_or_else(|| UNKNOWN_BACKEND_NAME.to_string());
			if let Err(e) = backend.flush() {
				log::debug!("{name} flush on close failed: {e}");
			}
			drop(backend);
			log::info!("{name} closed");
		}
	}

	/// Whether the port is open.
	pub fn is_open(&self) -> bool {
		self.backend.is_some()
	}

	/// Create a [`TimeoutGuard`] that will temporarily set the read timeout
	/// and reset it to the original value when dropped.
	///
	/// ## Example
	/// ```rust
	/// # use ds102::{Port, backend::Backend, error::Error, protocol::Command};
	/// # use std::time::Duration;
	/// # fn helper<B: Backend>(mut port: Port<B>) -> Result<(), Error> {
	/// {
	///     let mut guard = port.timeout_guard(Some(Duration::from_secs(3)))?;
	///     // All queries within this scope will use a 3 second timeout
	///     guard.transact(&Command::get_version())?;
	/// }  // The guard is dropped and the timeout is reset.
	/// # Ok(())
	/// # }
	/// ```
	pub fn timeout_guard(&mut self, timeout: Option<Duration>) -> Result<TimeoutGuard<'_, B>, Error> {
		self.check_poisoned()?;
		Ok(TimeoutGuard::new(self, timeout)?)
	}

	/// Set the read timeout and return the old timeout.
	///
	/// If timeout is `None`, reads will block indefinitely.
	pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<Option<Duration>, Error> {
		let backend = self.connected_backend()?;
		let old = backend.read_timeout().map_err(ConnectionError::io)?;
		backend
			.set_read_timeout(timeout)
			.map_err(ConnectionError::io)?;
		Ok(old)
	}

	/// Get the read timeout.
	///
	/// If it is `None`, reads will block indefinitely.
	pub fn read_timeout(&self) -> Result<Option<Duration>, Error> {
		let backend = self
			.backend
			.as_ref()
			.ok_or_else(ConnectionError::not_connected)?;
		Ok(backend.read_timeout().map_err(ConnectionError::io)?)
	}

	/// Get how long the port waits for an error reply to a command that is
	/// not a query.
	pub fn ack_window(&self) -> Duration {
		self.ack_window
	}

	/// Set the acknowledgement window and return the old one.
	pub fn set_ack_window(&mut self, window: Duration) -> Duration {
		std::mem::replace(&mut self.ack_window, window)
	}

	/// Get the "name" of the port's backend.
	///
	/// This is often the path passed to [`Port::open_serial`]. It is `None`
	/// once the port is closed.
	pub fn name(&self) -> Option<String> {
		self.backend.as_ref().and_then(Backend::name)
	}

	/// Get a reference to the backend, if the port is open.
	pub fn backend(&self) -> Option<&B> {
		self.backend.as_ref()
	}

	/// Get a mutable reference to the backend, if the port is open.
	pub fn backend_mut(&mut self) -> Option<&mut B> {
		self.backend.as_mut()
	}
}

impl<B: Backend> Drop for Port<B> {
	fn drop(&mut self) {
		self.close();
	}
}
