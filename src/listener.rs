use crate::{Error, Result};
use std::fs::File;
use std::net::{TcpListener, UdpSocket};
#[cfg(unix)]
use std::{
    io::Error as IoError,
    mem::{size_of, zeroed},
    os::raw::c_int,
    os::unix::io::{AsRawFd, FromRawFd, IntoRawFd, RawFd},
    os::unix::net::{UnixDatagram, UnixListener},
};

/// A connection oriented socket handed over by launchd.
#[derive(Debug)]
pub enum Listener {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

/// A message oriented socket handed over by launchd.
#[derive(Debug)]
pub enum PacketListener {
    Udp(UdpSocket),
    #[cfg(unix)]
    Unix(UnixDatagram),
}

/// The sockets built for one socket name.
///
/// Building can partially succeed: `sockets` holds everything that could be built, `rejected`
/// holds the descriptors which could not, as files, and `error` describes why. launchd hands
/// a socket out once per process, so nothing is closed on failure: dropping the container
/// closes the sockets and the rejected files.
#[derive(Debug)]
pub struct Sockets<T> {
    sockets: Vec<T>,
    rejected: Vec<File>,
    error: Option<Error>,
}

impl<T> Sockets<T> {
    pub(crate) fn new(sockets: Vec<T>, rejected: Vec<File>, error: Option<Error>) -> Sockets<T> {
        Sockets {
            sockets,
            rejected,
            error,
        }
    }

    pub fn sockets(&self) -> &[T] {
        &self.sockets
    }

    /// The descriptors which could not be built into a socket, still open.
    pub fn rejected(&self) -> &[File] {
        &self.rejected
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// `true` if every descriptor was built into a socket.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn len(&self) -> usize {
        self.sockets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sockets.is_empty()
    }

    pub fn into_parts(self) -> (Vec<T>, Vec<File>, Option<Error>) {
        (self.sockets, self.rejected, self.error)
    }
}

#[cfg(unix)]
fn getsockopt_int(fd: RawFd, option: c_int) -> Result<c_int> {
    let mut value: c_int = 0;
    let mut len = size_of::<c_int>() as libc::socklen_t;
    let ret = unsafe {
        libc::getsockopt(
            fd,
            libc::SOL_SOCKET,
            option,
            &mut value as *mut c_int as *mut libc::c_void,
            &mut len,
        )
    };
    if ret == 0 {
        Ok(value)
    } else {
        Err(Error::Syscall("getsockopt", IoError::last_os_error()))
    }
}

#[cfg(unix)]
fn address_family(fd: RawFd) -> Result<c_int> {
    let mut storage: libc::sockaddr_storage = unsafe { zeroed() };
    let mut len = size_of::<libc::sockaddr_storage>() as libc::socklen_t;
    let ret = unsafe {
        libc::getsockname(
            fd,
            &mut storage as *mut libc::sockaddr_storage as *mut libc::sockaddr,
            &mut len,
        )
    };
    if ret == 0 {
        Ok(storage.ss_family as c_int)
    } else {
        Err(Error::Syscall("getsockname", IoError::last_os_error()))
    }
}

/// Checks the socket type of `file` and returns its address family together with a
/// duplicate of its descriptor.
#[cfg(unix)]
fn checked_duplicate(name: &str, file: &File, expected: c_int) -> Result<(c_int, RawFd)> {
    let fd = file.as_raw_fd();
    let got = getsockopt_int(fd, libc::SO_TYPE)?;
    if got != expected {
        return Err(Error::UnsupportedSocketType {
            name: name.to_string(),
            got,
            expected,
        });
    }

    let family = address_family(fd)?;
    match family {
        libc::AF_INET | libc::AF_INET6 | libc::AF_UNIX => {}
        family => {
            return Err(Error::UnsupportedAddressFamily {
                name: name.to_string(),
                family,
            })
        }
    }

    // A separate descriptor, so that closing the socket leaves the file open and vice versa.
    let duplicate = file.try_clone()?;
    Ok((family, duplicate.into_raw_fd()))
}

#[cfg(unix)]
fn file_name(file: &File) -> String {
    format!("fd {}", file.as_raw_fd())
}

#[cfg(unix)]
impl Listener {
    /// Builds a listener on a duplicate of the descriptor of `file`, which must be a stream
    /// socket.
    pub fn from_file(file: &File) -> Result<Listener> {
        Listener::from_named_file(&file_name(file), file)
    }

    pub(crate) fn from_named_file(name: &str, file: &File) -> Result<Listener> {
        let (family, fd) = checked_duplicate(name, file, libc::SOCK_STREAM)?;
        let listener = if family == libc::AF_UNIX {
            Listener::Unix(unsafe { UnixListener::from_raw_fd(fd) })
        } else {
            Listener::Tcp(unsafe { TcpListener::from_raw_fd(fd) })
        };
        Ok(listener)
    }
}

#[cfg(unix)]
impl PacketListener {
    /// Builds a packet listener on a duplicate of the descriptor of `file`, which must be a
    /// datagram socket.
    pub fn from_file(file: &File) -> Result<PacketListener> {
        PacketListener::from_named_file(&file_name(file), file)
    }

    pub(crate) fn from_named_file(name: &str, file: &File) -> Result<PacketListener> {
        let (family, fd) = checked_duplicate(name, file, libc::SOCK_DGRAM)?;
        let listener = if family == libc::AF_UNIX {
            PacketListener::Unix(unsafe { UnixDatagram::from_raw_fd(fd) })
        } else {
            PacketListener::Udp(unsafe { UdpSocket::from_raw_fd(fd) })
        };
        Ok(listener)
    }
}

#[cfg(unix)]
impl AsRawFd for Listener {
    fn as_raw_fd(&self) -> RawFd {
        match self {
            Listener::Tcp(listener) => listener.as_raw_fd(),
            Listener::Unix(listener) => listener.as_raw_fd(),
        }
    }
}

#[cfg(unix)]
impl AsRawFd for PacketListener {
    fn as_raw_fd(&self) -> RawFd {
        match self {
            PacketListener::Udp(socket) => socket.as_raw_fd(),
            PacketListener::Unix(socket) => socket.as_raw_fd(),
        }
    }
}
