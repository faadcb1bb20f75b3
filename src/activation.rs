#![cfg_attr(not(target_os = "macos"), allow(dead_code))]

use crate::trampoline::call3;
use crate::{Error, Result};
use libc::{c_int, size_t};
use std::ffi::CString;
use std::io::Error as IoError;
use std::marker::PhantomPinned;
use std::os::unix::io::RawFd;
use std::pin::Pin;
use std::ptr::{addr_of_mut, null_mut};
use std::slice::from_raw_parts;

const LAUNCH_ACTIVATE_SOCKET: &str = "launch_activate_socket";

/// Addresses of the foreign routines used to activate sockets.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Routines {
    /// `int launch_activate_socket(const char *name, int **fds, size_t *cnt)`
    pub(crate) activate_socket: usize,
    /// `void free(void *ptr)`
    pub(crate) free: usize,
}

/// Written by `launch_activate_socket`, so it must not move while the call is running.
struct OutParams {
    fds: *mut c_int,
    count: size_t,
    _pin: PhantomPinned,
}

/// The descriptor array allocated by `launch_activate_socket`, released with `free` on drop.
struct ForeignFds {
    ptr: *mut c_int,
    len: usize,
    free: usize,
}

impl ForeignFds {
    fn to_vec(&self) -> Vec<RawFd> {
        if self.ptr.is_null() || self.len == 0 {
            return Vec::new();
        }
        unsafe { from_raw_parts(self.ptr, self.len) }.to_vec()
    }
}

impl Drop for ForeignFds {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            trace!("Free descriptor array at {:p}", self.ptr);
            // free(3) returns nothing, so there is nothing to check.
            unsafe { call3(self.free, self.ptr as usize, 0, 0) };
        }
    }
}

/// Asks launchd for the descriptors of the socket `name` of the calling process.
///
/// The returned descriptors are owned by the caller. launchd hands out the descriptors of a
/// socket once per process, so a second call for the same name fails with
/// [`Error::AlreadyActivated`].
pub(crate) fn activate_socket(routines: &Routines, name: &str) -> Result<Vec<RawFd>> {
    let c_name = CString::new(name).map_err(|e| Error::InvalidName(name.to_string(), e))?;

    let mut out_params = Box::pin(OutParams {
        fds: null_mut(),
        count: 0,
        _pin: PhantomPinned,
    });
    let (r1, _, errno) = unsafe {
        let out_params = Pin::get_unchecked_mut(out_params.as_mut());
        call3(
            routines.activate_socket,
            c_name.as_ptr() as usize,
            addr_of_mut!(out_params.fds) as usize,
            addr_of_mut!(out_params.count) as usize,
        )
    };

    // Takes ownership of the array, whatever the outcome.
    let fds = ForeignFds {
        ptr: out_params.fds,
        len: out_params.count,
        free: routines.free,
    };
    drop(out_params);

    if errno != 0 {
        return Err(Error::CallMechanism(
            LAUNCH_ACTIVATE_SOCKET,
            IoError::from_raw_os_error(errno),
        ));
    }

    match r1 as u32 as c_int {
        0 => {
            let fds = fds.to_vec();
            if fds.is_empty() {
                debug!("{}({}) succeeded without descriptors", LAUNCH_ACTIVATE_SOCKET, name);
                Err(Error::NoSockets(name.to_string()))
            } else {
                debug!("Activated socket {}: {:?}", name, fds);
                Ok(fds)
            }
        }
        libc::ENOENT => Err(Error::NotFound(name.to_string())),
        // launchd answers ESRCH for unknown names too, not only ENOENT as documented.
        libc::ESRCH => Err(Error::NotManaged),
        libc::EALREADY => Err(Error::AlreadyActivated(name.to_string())),
        code => Err(Error::Unknown(LAUNCH_ACTIVATE_SOCKET, code)),
    }
}
