//! Types defining the different options when opening a port.

use super::{Port, DEFAULT_ACK_WINDOW};
use crate::{
    backend::{Backend, Serial},
    error::Error,
};
use serialport as sp;
use std::{
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

/// Options for configuring and opening a serial port.
///
/// The port is always opened as 8 data bits, no parity, 1 stop bit and no
/// flow control, which is the only framing the controller supports.
///
/// ## Example
///
/// ```rust
/// # use ds102::OpenSerialOptions;
/// # use std::time::Duration;
/// # fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
/// let mut port = OpenSerialOptions::new()
///     .baud_rate(9600)
///     .timeout(Some(Duration::from_millis(500)))
///     .open("/dev/ttyUSB0")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OpenSerialOptions {
    /// The custom baud rate
    baud_rate: u32,
    /// The custom timeout
    timeout: Option<Duration>,
    /// How long to wait for an error reply to a non-query command.
    ack_window: Duration,
}

impl OpenSerialOptions {
    /// The controller's factory default baud rate: 38,400.
    pub const DEFAULT_BAUD_RATE: u32 = 38_400;

    /// The default read timeout: 1 second.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

    /// Create a blank set of options ready for configuration.
    ///
    /// The default baud rate, read timeout and acknowledgement window are
    /// 38,400, 1 second and 50 milliseconds, respectively.
    ///
    /// Equivalent to [`default`](OpenSerialOptions::default).
    pub fn new() -> Self {
        OpenSerialOptions {
            baud_rate: OpenSerialOptions::DEFAULT_BAUD_RATE,
            timeout: Some(OpenSerialOptions::DEFAULT_TIMEOUT),
            ack_window: DEFAULT_ACK_WINDOW,
        }
    }

    /// Set a custom baud rate.
    ///
    /// The default is 38,400.
    pub fn baud_rate(&mut self, baud_rate: u32) -> &mut Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set a custom read timeout.
    ///
    /// If duration is `None`, reads will block indefinitely. The default is 1 second.
    pub fn timeout(&mut self, duration: Option<Duration>) -> &mut Self {
        self.timeout = duration;
        self
    }

    /// Set how long to wait for an error reply after a command that is not a query.
    ///
    /// The default is 50 milliseconds.
    pub fn ack_window(&mut self, window: Duration) -> &mut Self {
        self.ack_window = window;
        self
    }

    /// Open a [`Serial`] port at the specified path.
    fn open_serial_port(&self, path: &str) -> Result<Serial, Error> {
        // The baud rate passed to `new` can be ignored on some platforms, so
        // it is set again with the `baud_rate` method below.
        sp::new(path, self.baud_rate)
            .data_bits(sp::DataBits::Eight)
            .parity(sp::Parity::None)
            .flow_control(sp::FlowControl::None)
            .stop_bits(sp::StopBits::One)
            // The serialport API does not support infinite timeouts, so simply
            // set the timeout to the largest possible duration if `timeout` is
            // `None`, which is practically infinite.
            .timeout(self.timeout.unwrap_or(Duration::MAX))
            .baud_rate(self.baud_rate)
            .open_native()
            .map(Serial)
            .map_err(|err| {
                log::warn!("failed to open {path}: {err}");
                Error::from(sp::Error::new(
                    err.kind(),
                    format!("{path}: {}", err.description),
                ))
            })
    }

    /// Open the port at the specified path with the custom options.
    pub fn open(&self, path: &str) -> Result<Port<Serial>, Error> {
        Ok(Port::from_backend(
            self.open_serial_port(path)?,
            self.ack_window,
        ))
    }

    /// Open the port at the specified path with the custom options.
    ///
    /// The type of the underlying backend is erased via dynamic dispatch,
    /// which does have runtime overhead. [`OpenSerialOptions::open`] should
    /// generally be used instead, except when the type of the underlying
    /// backend may not be known at compile time.
    pub fn open_dyn(&self, path: &str) -> Result<Port<Box<dyn Backend + Send>>, Error> {
        Ok(Port::from_backend(
            Box::new(self.open_serial_port(path)?),
            self.ack_window,
        ))
    }
}

impl Default for OpenSerialOptions {
    fn default() -> Self {
        OpenSerialOptions::new()
    }
}

/// Options for configuring and opening a TCP port to a serial device server.
///
/// ## Example
///
/// ```rust
/// # use ds102::OpenTcpOptions;
/// # use std::time::Duration;
/// # fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
/// let mut port = OpenTcpOptions::new()
///     .timeout(Some(Duration::from_millis(500)))
///     .open("192.168.0.10:4001")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OpenTcpOptions {
    /// The custom timeout
    timeout: Option<Duration>,
    /// How long to wait for an error reply to a non-query command.
    ack_window: Duration,
}

impl OpenTcpOptions {
    /// Create a blank set of options ready for configuration.
    ///
    /// The default read timeout and acknowledgement window are 1 second and
    /// 50 milliseconds, respectively.
    ///
    /// Equivalent to [`default`](OpenTcpOptions::default).
    pub fn new() -> Self {
        OpenTcpOptions {
            timeout: Some(OpenSerialOptions::DEFAULT_TIMEOUT),
            ack_window: DEFAULT_ACK_WINDOW,
        }
    }

    /// Set a custom read timeout.
    ///
    /// If duration is `None`, reads will block indefinitely. The default is 1 second.
    pub fn timeout(&mut self, duration: Option<Duration>) -> &mut Self {
        self.timeout = duration;
        self
    }

    /// Set how long to wait for an error reply after a command that is not a query.
    ///
    /// The default is 50 milliseconds.
    pub fn ack_window(&mut self, window: Duration) -> &mut Self {
        self.ack_window = window;
        self
    }

    /// Open a [`TcpStream`] at the specified address.
    fn open_tcp_stream<A: ToSocketAddrs>(&self, address: A) -> Result<TcpStream, Error> {
        let stream = TcpStream::connect(address)?;
        stream.set_read_timeout(self.timeout)?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    /// Open the port at the specified address with the custom options.
    pub fn open<A: ToSocketAddrs>(&self, address: A) -> Result<Port<TcpStream>, Error> {
        Ok(Port::from_backend(
            self.open_tcp_stream(address)?,
            self.ack_window,
        ))
    }

    /// Open the port at the specified address with the custom options.
    ///
    /// The type of the underlying backend is erased via dynamic dispatch,
    /// which does have runtime overhead. [`OpenTcpOptions::open`] should
    /// generally be used instead, except when the type of the underlying
    /// backend may not be known at compile time.
    pub fn open_dyn<A: ToSocketAddrs>(&self, address: A) -> Result<Port<Box<dyn Backend + Send>>, Error> {
        Ok(Port::from_backend(
            Box::new(self.open_tcp_stream(address)?),
            self.ack_window,
        ))
    }
}

impl Default for OpenTcpOptions {
    fn default() -> Self {
        OpenTcpOptions::new()
    }
}
