//! launchd socket activation on macOS.
//!
//! <https://developer.apple.com/documentation/xpc/1505523-launch_activate_socket>

use crate::activation::{self, Routines};
use crate::adapt;
use crate::check_in::{self, CheckInRoutines};
use crate::{Listener, PacketListener, Result, Sockets};
use libc::{c_char, c_int, c_void, size_t};
use std::fs::File;
use std::os::unix::io::RawFd;

#[link(name = "System", kind = "dylib")]
extern "C" {
    fn launch_activate_socket(name: *const c_char, fds: *mut *mut c_int, cnt: *mut size_t)
        -> c_int;
    fn free(ptr: *mut c_void);
    fn launch_data_new_string(val: *const c_char) -> *mut c_void;
    fn launch_msg(msg: *const c_void) -> *mut c_void;
    fn launch_data_get_type(data: *const c_void) -> c_int;
    fn launch_data_get_errno(data: *const c_void) -> c_int;
    fn launch_data_free(data: *mut c_void);
}

lazy_static! {
    static ref ROUTINES: Routines = Routines {
        activate_socket: launch_activate_socket as usize,
        free: free as usize,
    };
    static ref CHECK_IN_ROUTINES: CheckInRoutines = CheckInRoutines {
        new_string: launch_data_new_string as usize,
        msg: launch_msg as usize,
        get_type: launch_data_get_type as usize,
        get_errno: launch_data_get_errno as usize,
        free: launch_data_free as usize,
    };
}

pub(crate) fn activate_socket(name: &str) -> Result<Vec<RawFd>> {
    activation::activate_socket(&ROUTINES, name)
}

pub(crate) fn files(name: &str) -> Result<Vec<File>> {
    adapt::files(&ROUTINES, name)
}

pub(crate) fn listeners(name: &str) -> Result<Sockets<Listener>> {
    adapt::listeners(&ROUTINES, name)
}

pub(crate) fn packet_listeners(name: &str) -> Result<Sockets<PacketListener>> {
    adapt::packet_listeners(&ROUTINES, name)
}

pub(crate) fn is_managed_by_launchd() -> Result<bool> {
    check_in::is_managed_by_launchd(&CHECK_IN_ROUTINES)
}
