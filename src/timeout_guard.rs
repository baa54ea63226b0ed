//! A "scope guard" that will reset a port's timeout when it is goes out of scope.

use crate::{backend::Backend, error::ConnectionError, port::Port};
use std::{io, time::Duration};

/// A "scope guard" that will update the port's timeout and then reset it when
/// it goes out of scope.
///
/// To create a guard, use the port's [`timeout_guard`](crate::Port::timeout_guard) method.
///
/// While the guard is in scope, the port can only be accessed through the guard.
/// However, because the guard implements [`Deref`](std::ops::Deref) and
/// [`DerefMut`](std::ops::DerefMut) callers can treat the guard as the port.
#[derive(Debug)]
pub struct TimeoutGuard<'a, B: Backend> {
    /// The underlying port.
    port: &'a mut Port<B>,
    /// The original timeout that will be restored when the guard is dropped.
    original_timeout: Option<Duration>,
}

impl<'a, B: Backend> TimeoutGuard<'a, B> {
    /// Update the port's timeout and return a [`TimeoutGuard`] wrapping the port.
    pub(crate) fn new(port: &'a mut Port<B>, timeout: Option<Duration>) -> Result<Self, ConnectionError> {
        let backend = port
            .backend_mut()
            .ok_or_else(ConnectionError::not_connected)?;
        let original_timeout = backend.read_timeout().map_err(ConnectionError::io)?;
        backend
            .set_read_timeout(timeout)
            .map_err(ConnectionError::io)?;
        Ok(TimeoutGuard {
            port,
            original_timeout,
        })
    }
}

impl<B: Backend> std::ops::Deref for TimeoutGuard<'_, B> {
    type Target = Port<B>;
    /// Get a shared reference to the underlying port.
    fn deref(&self) -> &Self::Target {
        self.port
    }
}

impl<B: Backend> std::ops::DerefMut for TimeoutGuard<'_, B> {
    /// Get an exclusive reference to the underlying port.
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.port
    }
}

impl<B: Backend> std::ops::Drop for TimeoutGuard<'_, B> {
    fn drop(&mut self) {
        // A port closed inside the guard has nothing left to restore.
        let Some(backend) = self.port.backend_mut() else {
            return;
        };
        if let Err(err) = backend.set_read_timeout(self.original_timeout) {
            let message = if let Some(timeout) = self.original_timeout {
                format!("failed to reset timeout to {timeout:?}: {err}")
            } else {
                format!("failed to reset to an infinite timeout: {err}")
            };
            self.port.poison(io::Error::other(message));
        }
    }
}
