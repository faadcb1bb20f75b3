#![cfg_attr(not(target_os = "macos"), allow(dead_code))]

use crate::trampoline::call3;
use crate::{Error, Result};
use libc::c_int;
use std::io::Error as IoError;

const LAUNCH_DATA_DICTIONARY: c_int = 1;
const LAUNCH_DATA_ERRNO: c_int = 9;

const LAUNCH_KEY_CHECKIN: &[u8] = b"CheckIn\0";

/// Addresses of the routines used for the check-in message.
#[derive(Debug, Copy, Clone)]
pub(crate) struct CheckInRoutines {
    /// `launch_data_t launch_data_new_string(const char *val)`
    pub(crate) new_string: usize,
    /// `launch_data_t launch_msg(launch_data_t msg)`
    pub(crate) msg: usize,
    /// `launch_data_type_t launch_data_get_type(launch_data_t data)`
    pub(crate) get_type: usize,
    /// `int launch_data_get_errno(launch_data_t data)`
    pub(crate) get_errno: usize,
    /// `void launch_data_free(launch_data_t data)`
    pub(crate) free: usize,
}

/// A `launch_data_t` owned by us, released with `launch_data_free` on drop.
struct LaunchData<'a> {
    ptr: usize,
    routines: &'a CheckInRoutines,
}

impl<'a> LaunchData<'a> {
    fn call(&self, routine: &'static str, addr: usize) -> Result<c_int> {
        let (r1, _, errno) = unsafe { call3(addr, self.ptr, 0, 0) };
        if errno != 0 {
            return Err(Error::CallMechanism(
                routine,
                IoError::from_raw_os_error(errno),
            ));
        }
        Ok(r1 as u32 as c_int)
    }
}

impl<'a> Drop for LaunchData<'a> {
    fn drop(&mut self) {
        trace!("Free launch data at {:#x}", self.ptr);
        unsafe { call3(self.routines.free, self.ptr, 0, 0) };
    }
}

/// Sends the `CheckIn` message to launchd and tells whether the calling process is one of its
/// jobs.
pub(crate) fn is_managed_by_launchd(routines: &CheckInRoutines) -> Result<bool> {
    let (ptr, _, errno) = unsafe {
        call3(
            routines.new_string,
            LAUNCH_KEY_CHECKIN.as_ptr() as usize,
            0,
            0,
        )
    };
    if errno != 0 {
        return Err(Error::CallMechanism(
            "launch_data_new_string",
            IoError::from_raw_os_error(errno),
        ));
    }
    if ptr == 0 {
        return Err(Error::ReturnedNull("launch_data_new_string"));
    }
    let message = LaunchData { ptr, routines };

    let (ptr, _, errno) = unsafe { call3(routines.msg, message.ptr, 0, 0) };
    if errno != 0 {
        return Err(Error::CallMechanism(
            "launch_msg",
            IoError::from_raw_os_error(errno),
        ));
    }
    if ptr == 0 {
        // launch_msg sets errno when it returns NULL.
        let e = IoError::last_os_error();
        return match e.raw_os_error() {
            Some(libc::ESRCH) => {
                debug!("launch_msg(CheckIn): {}", e);
                Ok(false)
            }
            Some(code) if code != 0 => Err(Error::Syscall("launch_msg", e)),
            _ => Err(Error::ReturnedNull("launch_msg")),
        };
    }
    let response = LaunchData { ptr, routines };

    match response.call("launch_data_get_type", routines.get_type)? {
        LAUNCH_DATA_DICTIONARY => Ok(true),
        LAUNCH_DATA_ERRNO => match response.call("launch_data_get_errno", routines.get_errno)? {
            0 => Ok(true),
            libc::ESRCH => Ok(false),
            code => Err(Error::Unknown("launch_msg", code)),
        },
        data_type => Err(Error::UnexpectedDataType("launch_msg", data_type as usize)),
    }
}
