#![cfg_attr(not(target_os = "macos"), allow(dead_code))]

use crate::activation::{activate_socket, Routines};
use crate::error::Errors;
use crate::{Listener, PacketListener, Result, Sockets};
use std::fs::File;
use std::io::Error as IoError;
use std::os::unix::io::{FromRawFd, RawFd};

fn set_cloexec(fd: RawFd) -> std::io::Result<()> {
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFD);
        if flags == -1 || libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC) == -1 {
            return Err(IoError::last_os_error());
        }
    }
    Ok(())
}

pub(crate) fn files(routines: &Routines, name: &str) -> Result<Vec<File>> {
    let fds = activate_socket(routines, name)?;
    let mut files = Vec::with_capacity(fds.len());
    for fd in fds {
        if fd == 0 {
            continue;
        }
        if let Err(e) = set_cloexec(fd) {
            debug!("Could not set FD_CLOEXEC on {} of {}: {}", fd, name, e);
        }
        files.push(unsafe { File::from_raw_fd(fd) });
    }
    Ok(files)
}

fn build<T, F>(routines: &Routines, name: &str, from_file: F) -> Result<Sockets<T>>
where
    F: Fn(&str, &File) -> Result<T>,
{
    let files = files(routines, name)?;
    let mut sockets = Vec::with_capacity(files.len());
    let mut rejected = Vec::new();
    let mut errors = Errors::default();
    for file in files {
        match from_file(name, &file) {
            // The socket holds a duplicate, the original descriptor is closed here.
            Ok(socket) => sockets.push(socket),
            Err(e) => {
                debug!("Could not build socket {} from {:?}: {}", name, file, e);
                errors.push(e);
                rejected.push(file);
            }
        }
    }
    Ok(Sockets::new(sockets, rejected, errors.into_error(name)))
}

pub(crate) fn listeners(routines: &Routines, name: &str) -> Result<Sockets<Listener>> {
    build(routines, name, Listener::from_named_file)
}

pub(crate) fn packet_listeners(
    routines: &Routines,
    name: &str,
) -> Result<Sockets<PacketListener>> {
    build(routines, name, PacketListener::from_named_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{freed, register, routines, Entry};
    use crate::ErrorKind;
    use std::net::{TcpListener, UdpSocket};
    use std::os::unix::io::{AsRawFd, IntoRawFd};
    use std::os::unix::net::{UnixDatagram, UnixListener};

    fn tcp_fd() -> RawFd {
        TcpListener::bind("127.0.0.1:0").unwrap().into_raw_fd()
    }

    fn udp_fd() -> RawFd {
        UdpSocket::bind("127.0.0.1:0").unwrap().into_raw_fd()
    }

    fn cloexec(fd: RawFd) -> bool {
        unsafe { libc::fcntl(fd, libc::F_GETFD) & libc::FD_CLOEXEC != 0 }
    }

    #[test]
    fn files_skip_zero() {
        register("adapt-files", Entry::Fds(vec![tcp_fd(), 0, udp_fd()]));

        let files = files(&routines(), "adapt-files").unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|file| cloexec(file.as_raw_fd())));
        assert!(freed("adapt-files"));
    }

    #[test]
    fn two_listeners() {
        register("adapt-two", Entry::Fds(vec![tcp_fd(), tcp_fd()]));

        let sockets = listeners(&routines(), "adapt-two").unwrap();
        assert!(sockets.is_complete());
        assert!(sockets.rejected().is_empty());
        assert_eq!(sockets.len(), 2);
        assert!(sockets
            .sockets()
            .iter()
            .all(|listener| matches!(listener, Listener::Tcp(_))));
    }

    #[test]
    fn one_listener() {
        register("adapt-one", Entry::Fds(vec![tcp_fd()]));

        let sockets = listeners(&routines(), "adapt-one").unwrap();
        assert!(sockets.is_complete());
        assert_eq!(sockets.len(), 1);
    }

    #[test]
    fn unix_listener() {
        let dir = std::env::temp_dir().join(format!("launchd-activate-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("adapt-unix.sock");
        let _ = std::fs::remove_file(&path);
        let fd = UnixListener::bind(&path).unwrap().into_raw_fd();
        register("adapt-unix", Entry::Fds(vec![fd]));

        let sockets = listeners(&routines(), "adapt-unix").unwrap();
        assert!(sockets.is_complete());
        assert!(matches!(sockets.sockets(), [Listener::Unix(_)]));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn datagram_as_listener() {
        register("adapt-datagram", Entry::Fds(vec![udp_fd()]));

        let sockets = listeners(&routines(), "adapt-datagram").unwrap();
        assert!(sockets.is_empty());
        assert_eq!(sockets.rejected().len(), 1);
        let error = sockets.error().unwrap();
        assert_eq!(error.kind(), ErrorKind::Multiple);
        assert!(error.is(ErrorKind::UnsupportedSocketType));
    }

    #[test]
    fn datagram_as_packet_listener() {
        let (socket, _) = UnixDatagram::pair().unwrap();
        register(
            "adapt-packet",
            Entry::Fds(vec![udp_fd(), socket.into_raw_fd()]),
        );

        let sockets = packet_listeners(&routines(), "adapt-packet").unwrap();
        assert!(sockets.is_complete());
        assert!(matches!(
            sockets.sockets(),
            [PacketListener::Udp(_), PacketListener::Unix(_)]
        ));
    }

    fn is_open(fd: RawFd) -> bool {
        unsafe { libc::fcntl(fd, libc::F_GETFD) != -1 }
    }

    #[test]
    fn rejected_stay_open() {
        let tcp = tcp_fd();
        let udp = udp_fd();
        register("adapt-mixed", Entry::Fds(vec![tcp, udp]));

        let (sockets, rejected, error) = listeners(&routines(), "adapt-mixed")
            .unwrap()
            .into_parts();
        assert_eq!(sockets.len(), 1);
        assert!(error.unwrap().is(ErrorKind::UnsupportedSocketType));
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].as_raw_fd(), udp);
        assert!(is_open(udp));

        // The rejected datagram socket is still usable, without a second activation.
        let socket = PacketListener::from_file(&rejected[0]).unwrap();
        assert!(matches!(socket, PacketListener::Udp(_)));
    }

    #[test]
    fn partial() {
        register("adapt-partial", Entry::Fds(vec![udp_fd(), tcp_fd()]));

        let (sockets, rejected, error) = packet_listeners(&routines(), "adapt-partial")
            .unwrap()
            .into_parts();
        assert_eq!(sockets.len(), 1);
        assert_eq!(rejected.len(), 1);
        match error {
            Some(crate::Error::Build { errors, .. }) => {
                assert_eq!(errors.len(), 1);
                assert!(errors.is(ErrorKind::UnsupportedSocketType));
            }
            error => panic!("unexpected error: {:?}", error),
        }
    }

    #[test]
    fn activation_error() {
        register("adapt-already", Entry::Code(libc::EALREADY));

        let error = listeners(&routines(), "adapt-already").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::AlreadyActivated);
        let error = packet_listeners(&routines(), "adapt-missing").unwrap_err();
        assert!(matches!(
            error.kind(),
            ErrorKind::NotFound | ErrorKind::NotManaged
        ));
    }
}
