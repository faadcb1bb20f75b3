//! Retrieve the sockets which launchd created for the calling process (socket activation) and
//! use them as listeners.
//!
//! launchd binds and listens on the sockets of the `Sockets` dictionary of a job, and hands
//! the descriptors over when the process asks for them by name. The descriptors are fetched
//! by calling `launch_activate_socket` of `libSystem` through a plain dynamic symbol, no C
//! compiler is involved.
//!
//! Only macOS is supported, every other platform (including iOS) gets
//! [`Error::UnsupportedPlatform`].
#[macro_use]
extern crate cfg_if;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

#[cfg(unix)]
mod activation;
#[cfg(unix)]
mod adapt;
#[cfg(unix)]
mod check_in;
#[cfg(feature = "cli")]
mod cmd;
#[cfg(feature = "cli")]
mod config;
mod error;
mod listener;
#[cfg(all(unix, feature = "cli"))]
mod run;
mod sys;
#[cfg(all(test, unix))]
mod testing;
#[cfg(all(unix, feature = "tokio"))]
mod tokio_net;
#[cfg(unix)]
mod trampoline;

#[cfg(feature = "cli")]
pub use cmd::get_command;
#[cfg(feature = "cli")]
pub use config::{Config, ConfigError};
pub use error::{Error, ErrorKind, Errors, Result};
pub use listener::{Listener, PacketListener, Sockets};
#[cfg(all(unix, feature = "cli"))]
pub use run::run;
#[cfg(all(unix, feature = "tokio"))]
pub use tokio_net::{TokioListener, TokioPacketListener};

use std::fs::File;

/// Returns the raw descriptors of the socket `name`, as listed in the `Sockets` dictionary of
/// the launchd job.
///
/// One name can have several descriptors, for example when a socket listens on both IPv4 and
/// IPv6. The caller owns the descriptors and is responsible for closing them.
///
/// launchd hands the descriptors of a name out once per process:
///
/// * [`ErrorKind::AlreadyActivated`] if the socket was already activated.
/// * [`ErrorKind::NotFound`] or [`ErrorKind::NotManaged`] if there is no such socket.
///   launchd is documented to answer `ENOENT` here but answers `ESRCH`.
/// * [`ErrorKind::NotManaged`] if the process is not managed by launchd.
/// * [`ErrorKind::InvalidName`] if `name` contains a NUL byte.
pub fn activate_socket(name: &str) -> Result<Vec<i32>> {
    sys::activate_socket(name)
}

/// Returns the descriptors of the socket `name` as files. Descriptors of `0` are skipped.
///
/// The errors are the same as for [`activate_socket`].
pub fn files(name: &str) -> Result<Vec<File>> {
    sys::files(name)
}

/// Returns the stream sockets of the socket `name` as listeners.
///
/// Descriptors which are not stream sockets are skipped and reported with
/// [`ErrorKind::UnsupportedSocketType`] through [`Sockets::error`], next to the listeners
/// which could be built. The skipped descriptors stay open and are handed back through
/// [`Sockets::rejected`].
pub fn listeners(name: &str) -> Result<Sockets<Listener>> {
    sys::listeners(name)
}

/// Returns the datagram sockets of the socket `name`.
///
/// Works like [`listeners`], for datagram sockets.
pub fn packet_listeners(name: &str) -> Result<Sockets<PacketListener>> {
    sys::packet_listeners(name)
}

/// Returns `true` if the calling process is managed by launchd, by sending it a check-in
/// message.
pub fn is_managed_by_launchd() -> Result<bool> {
    sys::is_managed_by_launchd()
}
