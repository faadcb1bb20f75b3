use crate::{Error, Listener, PacketListener, Result, Sockets};
use std::fs::File;

pub(crate) fn activate_socket(_name: &str) -> Result<Vec<i32>> {
    Err(Error::UnsupportedPlatform)
}

pub(crate) fn files(_name: &str) -> Result<Vec<File>> {
    Err(Error::UnsupportedPlatform)
}

pub(crate) fn listeners(_name: &str) -> Result<Sockets<Listener>> {
    Err(Error::UnsupportedPlatform)
}

pub(crate) fn packet_listeners(_name: &str) -> Result<Sockets<PacketListener>> {
    Err(Error::UnsupportedPlatform)
}

pub(crate) fn is_managed_by_launchd() -> Result<bool> {
    Err(Error::UnsupportedPlatform)
}
