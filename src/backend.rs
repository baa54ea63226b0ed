//! Types that can exchange (read/write) bytes with a connected controller.
//!
//! The [`Backend`] trait represents all such types.

use std::io;
use std::time::Duration;

use serialport as sp;

#[cfg(windows)]
use sp::COMPort as ExternSerial;
use sp::SerialPort;
#[cfg(unix)]
use sp::TTYPort as ExternSerial;

/// The placeholder name for a backend that doesn't have a name.
pub(crate) const UNKNOWN_BACKEND_NAME: &str = "<unknown backend>";

/// Types that allow reading and writing bytes with a connected controller.
pub trait Backend: io::Read + io::Write + private::Sealed {
	/// Set the read timeout.
	///
	/// If timeout is `None`, reads will block indefinitely.
	fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error>;

	/// Get the read timeout.
	///
	/// If timeout is `None`, reads will block indefinitely.
	fn read_timeout(&self) -> Result<Option<Duration>, io::Error>;

	/// Discard any bytes that have been received but not yet read, and
	/// return what was discarded.
	fn clear_input(&mut self) -> Result<Vec<u8>, io::Error>;

	/// Get the "name" of the backend.
	///
	/// This can be in any format, but should uniquely identify the backend
	/// instance.
	fn name(&self) -> Option<String>;
}

impl<C: Backend + ?Sized> Backend for Box<C> {
	fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error> {
		(**self).set_read_timeout(timeout)
	}
	fn read_timeout(&self) -> Result<Option<Duration>, io::Error> {
		(**self).read_timeout()
	}
	fn clear_input(&mut self) -> Result<Vec<u8>, io::Error> {
		(**self).clear_input()
	}
	fn name(&self) -> Option<String> {
		(**self).name()
	}
}

impl<C: Backend + ?Sized> Backend for &mut C {
	fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error> {
		(**self).set_read_timeout(timeout)
	}
	fn read_timeout(&self) -> Result<Option<Duration>, io::Error> {
		(**self).read_timeout()
	}
	fn clear_input(&mut self) -> Result<Vec<u8>, io::Error> {
		(**self).clear_input()
	}
	fn name(&self) -> Option<String> {
		(**self).name()
	}
}

/// A raw TCP connection, typically to a serial device server that forwards
/// bytes to the controller's RS232C port.
impl Backend for std::net::TcpStream {
	fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error> {
		std::net::TcpStream::set_read_timeout(self, timeout)
	}
	fn read_timeout(&self) -> Result<Option<Duration>, io::Error> {
		std::net::TcpStream::read_timeout(self)
	}
	fn clear_input(&mut self) -> Result<Vec<u8>, io::Error> {
		use io::Read as _;

		self.set_nonblocking(true)?;
		let mut discarded = Vec::new();
		let mut scratch = [0u8; 256];
		let result = loop {
			match self.read(&mut scratch) {
				Ok(0) => break Ok(discarded),
				Ok(n) => discarded.extend_from_slice(&scratch[..n]),
				Err(e) if e.kind() == io::ErrorKind::WouldBlock => break Ok(discarded),
				Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
				Err(e) => break Err(e),
			}
		};
		self.set_nonblocking(false)?;
		result
	}
	fn name(&self) -> Option<String> {
		self.peer_addr().map(|addr| format!("{addr}")).ok()
	}
}

/// A platform agnostic serial port backend.
//
// `serialport` exposes `COMPort` on windows and `TTYPort` on unix. Wrapping
// whichever one the platform uses keeps consumers free of both dynamic
// dispatch and an extra type parameter.
#[derive(Debug)]
pub struct Serial(pub(crate) ExternSerial);

impl io::Read for Serial {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		self.0.read(buf)
	}
}

impl io::Write for Serial {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.write(buf)
	}

	fn flush(&mut self) -> io::Result<()> {
		self.0.flush()
	}
}

impl Backend for Serial {
	fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error> {
		// serialport has no infinite timeout, so use the largest one it accepts.
		Ok(self.0.set_timeout(timeout.unwrap_or(Duration::MAX))?)
	}
	fn read_timeout(&self) -> Result<Option<Duration>, io::Error> {
		Ok(Some(self.0.timeout()))
	}
	fn clear_input(&mut self) -> Result<Vec<u8>, io::Error> {
		use io::Read as _;

		let pending = usize::try_from(self.0.bytes_to_read()?).unwrap_or_default();
		let mut discarded = vec![0u8; pending];
		let read = if pending > 0 {
			self.0.read(&mut discarded)?
		} else {
			0
		};
		discarded.truncate(read);
		self.0.clear(sp::ClearBuffer::Input)?;
		Ok(discarded)
	}
	fn name(&self) -> Option<String> {
		self.0.name()
	}
}

#[cfg(any(test, feature = "mock"))]
pub use mock::Mock;

#[cfg(any(test, feature = "mock"))]
mod mock {
	use super::Backend;
	use std::{
		fmt, io,
		sync::{Arc, Mutex, PoisonError},
		time::Duration,
	};

	/// A function that emulates the controller: it receives each line written
	/// to the mock (without the trailing CR) and returns the reply, if any.
	type Responder = Box<dyn FnMut(&str) -> Option<String> + Send>;

	/// A mock backend for use in testing.
	///
	/// It has the following features:
	///   * Every CR-terminated line written to it is recorded and, if a
	///     responder is installed, answered. Replies are terminated with a CR
	///     automatically.
	///   * It can be filled with raw data for reading.
	///   * Specific errors can be inserted for calls to `read`, `write`,
	///     `flush`, and `set_read_timeout`.
	///   * Reading from an empty buffer fails immediately with
	///     [`TimedOut`](io::ErrorKind::TimedOut), simulating a silent
	///     controller.
	pub struct Mock {
		/// The buffer data is read from
		buffer: io::Cursor<Vec<u8>>,
		/// Bytes written since the last CR.
		pending: Vec<u8>,
		/// Every complete line written, shared so it can be inspected after
		/// the mock is moved into a port.
		written: Arc<Mutex<Vec<String>>>,
		responder: Option<Responder>,
		/// The error to surface on the next read, if any. It is only surfaced once.
		read_error: Option<io::Error>,
		/// The error to surface on the next write, if any. It is only surfaced once.
		write_error: Option<io::Error>,
		/// The error to surface on the next flush, if any. It is only surfaced once.
		flush_error: Option<io::Error>,
		/// The error to surface on the next set_read_timeout, if any. It is only surfaced once.
		set_read_timeout_error: Option<io::Error>,
		/// The read timeout. Reads never block, but the port bounds a reply
		/// by it.
		read_timeout: Option<Duration>,
	}

	impl Mock {
		/// Create a new Mock backend that never replies on its own.
		pub fn new() -> Self {
			Mock {
				buffer: io::Cursor::new(Vec::new()),
				pending: Vec::new(),
				written: Arc::default(),
				responder: None,
				read_error: None,
				write_error: None,
				flush_error: None,
				set_read_timeout_error: None,
				read_timeout: Some(Duration::from_secs(1)),
			}
		}

		/// Create a mock that answers every written line with `responder`.
		pub fn with_responder<F>(responder: F) -> Self
		where
			F: FnMut(&str) -> Option<String> + Send + 'static,
		{
			let mut mock = Mock::new();
			mock.respond_with(responder);
			mock
		}

		/// Replace the responder.
		pub fn respond_with<F>(&mut self, responder: F)
		where
			F: FnMut(&str) -> Option<String> + Send + 'static,
		{
			self.responder = Some(Box::new(responder));
		}

		/// Append data to the read buffer.
		///
		/// The data is not validated in any way.
		pub fn append_data<T: AsRef<[u8]>>(&mut self, bytes: T) {
			self.buffer.get_mut().extend_from_slice(bytes.as_ref());
		}

		/// Clear the read buffer.
		pub fn clear_buffer(&mut self) {
			self.buffer.get_mut().clear();
			self.buffer.set_position(0);
		}

		/// Whether the mock has any data available or not
		pub fn is_empty(&self) -> bool {
			usize::try_from(self.buffer.position()).map_or(true, |pos| pos >= self.buffer.get_ref().len())
		}

		/// Get a copy of every line written so far, without delimiters.
		pub fn written(&self) -> Vec<String> {
			self.written
				.lock()
				.unwrap_or_else(PoisonError::into_inner)
				.clone()
		}

		/// Get a shared handle to the written lines.
		///
		/// The handle stays valid after the mock has been moved into a port.
		pub fn written_handle(&self) -> Arc<Mutex<Vec<String>>> {
			Arc::clone(&self.written)
		}

		/// Forget all the lines written so far.
		pub fn clear_written(&mut self) {
			self.written
				.lock()
				.unwrap_or_else(PoisonError::into_inner)
				.clear();
		}

		/// Set the error for the next `read`, if any.
		pub fn read_error(&mut self, err: Option<io::Error>) {
			self.read_error = err;
		}
		/// Set the error for the next `write`, if any.
		pub fn write_error(&mut self, err: Option<io::Error>) {
			self.write_error = err;
		}
		/// Set the error for the next `flush`, if any.
		pub fn flush_error(&mut self, err: Option<io::Error>) {
			self.flush_error = err;
		}
		/// Set the error for the next `set_read_timeout`, if any.
		pub fn set_read_timeout_error(&mut self, err: Option<io::Error>) {
			self.set_read_timeout_error = err;
		}

		/// Record a complete line and queue the responder's answer.
		fn line_written(&mut self) {
			let line = String::from_utf8_lossy(&self.pending).into_owned();
			self.pending.clear();
			if let Some(responder) = self.responder.as_mut() {
				if let Some(mut reply) = responder(&line) {
					reply.push('\r');
					self.buffer.get_mut().extend_from_slice(reply.as_bytes());
				}
			}
			self.written
				.lock()
				.unwrap_or_else(PoisonError::into_inner)
				.push(line);
		}
	}

	impl Default for Mock {
		fn default() -> Self {
			Self::new()
		}
	}

	impl fmt::Debug for Mock {
		fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
			f.debug_struct("Mock")
				.field("buffer", &self.buffer)
				.field("pending", &self.pending)
				.field("has_responder", &self.responder.is_some())
				.finish_non_exhaustive()
		}
	}

	impl Backend for Mock {
		fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error> {
			if let Some(err) = self.set_read_timeout_error.take() {
				Err(err)
			} else {
				self.read_timeout = timeout;
				Ok(())
			}
		}

		fn read_timeout(&self) -> Result<Option<Duration>, io::Error> {
			Ok(self.read_timeout)
		}

		fn clear_input(&mut self) -> Result<Vec<u8>, io::Error> {
			let start = usize::try_from(self.buffer.position()).unwrap_or(usize::MAX);
			let discarded = self.buffer.get_ref().get(start..).unwrap_or_default().to_vec();
			self.clear_buffer();
			Ok(discarded)
		}

		fn name(&self) -> Option<String> {
			Some(format!("<mock {:p}>", self))
		}
	}

	impl io::Read for Mock {
		fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
			use io::Read as _;

			if let Some(err) = self.read_error.take() {
				Err(err)
			} else if self.is_empty() {
				// A real controller that has nothing to say makes the read
				// wait and then time out. Simulate that immediately.
				Err(io::Error::new(
					io::ErrorKind::TimedOut,
					"Simulated timeout error",
				))
			} else {
				self.buffer.read(buf)
			}
		}
	}

	impl io::Write for Mock {
		fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
			if let Some(err) = self.write_error.take() {
				return Err(err);
			}
			for &byte in buf {
				if byte == b'\r' {
					self.line_written();
				} else {
					self.pending.push(byte);
				}
			}
			Ok(buf.len())
		}

		fn flush(&mut self) -> io::Result<()> {
			if let Some(err) = self.flush_error.take() {
				Err(err)
			} else {
				Ok(())
			}
		}
	}
}

mod private {
	pub trait Sealed {}

	impl Sealed for super::Serial {}
	impl Sealed for std::net::TcpStream {}
	#[cfg(any(test, feature = "mock"))]
	impl Sealed for super::Mock {}
	impl<C: super::Backend + ?Sized> Sealed for Box<C> {}
	impl<C: super::Backend + ?Sized> Sealed for &mut C {}
}
