use crate::config::Config;
use crate::error::Result;
use crate::{is_managed_by_launchd, listeners, packet_listeners};
use crate::{TokioListener, TokioPacketListener};
use futures::future::join_all;
use std::io::Result as IoResult;
use tokio::io::{copy, split, AsyncRead, AsyncWrite};
use tokio::spawn;
use tokio::task::JoinHandle;

const MAXIMUM_PACKET_SIZE: usize = 65536;

fn spawn_echo<S>(name: String, stream: S)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    spawn(async move {
        let (mut reader, mut writer) = split(stream);
        match copy(&mut reader, &mut writer).await {
            Ok(n) => debug!("Connection on {} closed after {} bytes", name, n),
            Err(e) => error!("Could not echo on {}: {}", name, e),
        }
    });
}

async fn accept(name: &str, listener: &TokioListener) -> IoResult<()> {
    match listener {
        TokioListener::Tcp(listener) => {
            let (stream, addr) = listener.accept().await?;
            debug!("Accept connection on {} from {}", name, addr);
            spawn_echo(name.to_string(), stream);
        }
        TokioListener::Unix(listener) => {
            let (stream, addr) = listener.accept().await?;
            debug!("Accept connection on {} from {:?}", name, addr);
            spawn_echo(name.to_string(), stream);
        }
    }
    Ok(())
}

async fn stream_server(name: String, listener: TokioListener) {
    loop {
        if let Err(e) = accept(&name, &listener).await {
            error!("Could not accept on {}: {}", name, e);
            return;
        }
    }
}

async fn echo_packet(name: &str, socket: &TokioPacketListener, buffer: &mut [u8]) -> IoResult<()> {
    match socket {
        TokioPacketListener::Udp(socket) => {
            let (n, addr) = socket.recv_from(buffer).await?;
            debug!("Receive packet on {} from {}: {} bytes", name, addr, n);
            socket.send_to(&buffer[..n], addr).await?;
        }
        TokioPacketListener::Unix(socket) => {
            let (n, addr) = socket.recv_from(buffer).await?;
            match addr.as_pathname() {
                Some(path) => {
                    debug!("Receive packet on {} from {:?}: {} bytes", name, path, n);
                    socket.send_to(&buffer[..n], path).await?;
                }
                None => debug!("Receive packet on {} from unnamed socket: {} bytes", name, n),
            }
        }
    }
    Ok(())
}

async fn packet_server(name: String, socket: TokioPacketListener) {
    let mut buffer = vec![0; MAXIMUM_PACKET_SIZE];
    loop {
        if let Err(e) = echo_packet(&name, &socket, &mut buffer).await {
            error!("Could not echo packet on {}: {}", name, e);
            return;
        }
    }
}

/// Run the `launchd-activate` echo service with a specific configuration.
///
/// Sockets which could be built are served even if others of the same name failed.
pub async fn run(config: Config) -> Result<()> {
    if config.check_in() {
        info!("Managed by launchd: {}", is_managed_by_launchd()?);
    }

    let mut servers: Vec<JoinHandle<()>> = Vec::new();
    for name in config.stream_names() {
        let (sockets, rejected, error) = listeners(name)?.into_parts();
        if let Some(e) = error {
            error!("{} descriptors of {} are not served: {}", rejected.len(), name, e);
        }
        for listener in sockets {
            info!("Echo on stream socket {}: {:?}", name, listener);
            servers.push(spawn(stream_server(name.clone(), listener.into_tokio()?)));
        }
    }
    for name in config.packet_names() {
        let (sockets, rejected, error) = packet_listeners(name)?.into_parts();
        if let Some(e) = error {
            error!("{} descriptors of {} are not served: {}", rejected.len(), name, e);
        }
        for socket in sockets {
            info!("Echo on datagram socket {}: {:?}", name, socket);
            servers.push(spawn(packet_server(name.clone(), socket.into_tokio()?)));
        }
    }

    for result in join_all(servers).await {
        if let Err(e) = result {
            error!("Server task failed: {}", e);
        }
    }
    Ok(())
}
