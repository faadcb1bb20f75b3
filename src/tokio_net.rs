use crate::{Listener, PacketListener};
use std::io::Result as IoResult;
use tokio::net::{
    TcpListener as TokioTcpListener, UdpSocket as TokioUdpSocket,
    UnixDatagram as TokioUnixDatagram, UnixListener as TokioUnixListener,
};

/// A [`Listener`] registered with the tokio runtime.
#[derive(Debug)]
pub enum TokioListener {
    Tcp(TokioTcpListener),
    Unix(TokioUnixListener),
}

/// A [`PacketListener`] registered with the tokio runtime.
#[derive(Debug)]
pub enum TokioPacketListener {
    Udp(TokioUdpSocket),
    Unix(TokioUnixDatagram),
}

impl Listener {
    /// Switches the socket to non-blocking mode and registers it with the current tokio
    /// runtime.
    pub fn into_tokio(self) -> IoResult<TokioListener> {
        let listener = match self {
            Listener::Tcp(listener) => {
                listener.set_nonblocking(true)?;
                TokioListener::Tcp(TokioTcpListener::from_std(listener)?)
            }
            Listener::Unix(listener) => {
                listener.set_nonblocking(true)?;
                TokioListener::Unix(TokioUnixListener::from_std(listener)?)
            }
        };
        Ok(listener)
    }
}

impl PacketListener {
    /// Switches the socket to non-blocking mode and registers it with the current tokio
    /// runtime.
    pub fn into_tokio(self) -> IoResult<TokioPacketListener> {
        let socket = match self {
            PacketListener::Udp(socket) => {
                socket.set_nonblocking(true)?;
                TokioPacketListener::Udp(TokioUdpSocket::from_std(socket)?)
            }
            PacketListener::Unix(socket) => {
                socket.set_nonblocking(true)?;
                TokioPacketListener::Unix(TokioUnixDatagram::from_std(socket)?)
            }
        };
        Ok(socket)
    }
}
