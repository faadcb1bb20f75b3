use std::ffi::NulError;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::Error as IoError;
use std::os::raw::c_int;
use thiserror::Error as ThisError;

/// The kind of an [`Error`], for matching without caring about the details.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidName,
    NotFound,
    NotManaged,
    AlreadyActivated,
    UnsupportedSocketType,
    UnsupportedPlatform,
    CallMechanismFailure,
    Unknown,
    Io,
    Multiple,
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Invalid socket name {0:?}: {1}")]
    InvalidName(String, NulError),
    #[error("No such socket: {0}")]
    NotFound(String),
    #[error("No sockets found: {0}")]
    NoSockets(String),
    #[error("Socket or process is not managed by launchd")]
    NotManaged,
    #[error("Socket {0} has already been activated")]
    AlreadyActivated(String),
    #[error("{name}: unsupported socket type: got {got} expected {expected}")]
    UnsupportedSocketType {
        name: String,
        got: c_int,
        expected: c_int,
    },
    #[error("{name}: unsupported address family: {family}")]
    UnsupportedAddressFamily { name: String, family: c_int },
    #[error("launchd socket activation is only supported on macOS")]
    UnsupportedPlatform,
    #[error("Error calling {0}: {1}")]
    CallMechanism(&'static str, IoError),
    #[error("{0} returned unknown error code: {1}")]
    Unknown(&'static str, c_int),
    #[error("{0} returned NULL")]
    ReturnedNull(&'static str),
    #[error("{0} returned unexpected data type: {1}")]
    UnexpectedDataType(&'static str, usize),
    #[error("{0}: {1}")]
    Syscall(&'static str, IoError),
    #[error("IO Error: {0}")]
    IoError(#[from] IoError),
    #[error("Error building listeners for {name}: {errors}")]
    Build { name: String, errors: Errors },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidName(..) => ErrorKind::InvalidName,
            Error::NotFound(_) | Error::NoSockets(_) => ErrorKind::NotFound,
            Error::NotManaged => ErrorKind::NotManaged,
            Error::AlreadyActivated(_) => ErrorKind::AlreadyActivated,
            Error::UnsupportedSocketType { .. } | Error::UnsupportedAddressFamily { .. } => {
                ErrorKind::UnsupportedSocketType
            }
            Error::UnsupportedPlatform => ErrorKind::UnsupportedPlatform,
            Error::CallMechanism(..) => ErrorKind::CallMechanismFailure,
            Error::Unknown(..) | Error::ReturnedNull(_) | Error::UnexpectedDataType(..) => {
                ErrorKind::Unknown
            }
            Error::Syscall(..) | Error::IoError(_) => ErrorKind::Io,
            Error::Build { .. } => ErrorKind::Multiple,
        }
    }

    /// Returns `true` if this error, or any error joined into it, is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        match self {
            Error::Build { errors, .. } => kind == ErrorKind::Multiple || errors.is(kind),
            error => error.kind() == kind,
        }
    }

    /// The POSIX error number matching this error, if there is one.
    #[cfg(unix)]
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Error::InvalidName(..) => Some(libc::EINVAL),
            Error::NotFound(_) | Error::NoSockets(_) => Some(libc::ENOENT),
            Error::NotManaged => Some(libc::ESRCH),
            Error::AlreadyActivated(_) => Some(libc::EALREADY),
            Error::UnsupportedSocketType { .. } | Error::UnsupportedAddressFamily { .. } => {
                Some(libc::ESOCKTNOSUPPORT)
            }
            Error::UnsupportedPlatform => Some(libc::ENOTSUP),
            Error::Unknown(_, code) => Some(*code),
            Error::CallMechanism(_, e) | Error::Syscall(_, e) | Error::IoError(e) => {
                e.raw_os_error()
            }
            Error::ReturnedNull(_) | Error::UnexpectedDataType(..) | Error::Build { .. } => None,
        }
    }
}

#[cfg(unix)]
impl From<Error> for IoError {
    fn from(error: Error) -> Self {
        match error {
            Error::IoError(e) => e,
            error => match error.raw_os_error() {
                Some(code) => IoError::new(IoError::from_raw_os_error(code).kind(), error),
                None => IoError::new(std::io::ErrorKind::Other, error),
            },
        }
    }
}

/// Several errors joined together, one per descriptor that could not be adapted.
#[derive(Debug, Default)]
pub struct Errors(Vec<Error>);

impl Errors {
    pub(crate) fn push(&mut self, error: Error) {
        self.0.push(error);
    }

    pub(crate) fn into_error(self, name: &str) -> Option<Error> {
        if self.0.is_empty() {
            None
        } else {
            Some(Error::Build {
                name: name.to_string(),
                errors: self,
            })
        }
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.0.iter().any(|e| e.is(kind))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Error> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Errors {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        for (i, error) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
