//! Fake launchd routines, called through the trampoline like the real ones.

use crate::activation::Routines;
use crate::check_in::CheckInRoutines;
use libc::{c_char, c_int, c_void, size_t};
use std::cell::Cell;
use std::collections::HashMap;
use std::ffi::CStr;
use std::mem::{replace, size_of};
use std::os::unix::io::RawFd;
use std::ptr::{copy_nonoverlapping, null_mut};
use std::sync::Mutex;

pub(crate) enum Entry {
    /// Activates once, then answers `EALREADY`.
    Fds(Vec<RawFd>),
    /// Succeeds without any descriptor.
    Empty,
    /// Returns the code, like launchd does.
    Code(c_int),
    /// Returns `-1` and sets `errno`.
    Errno(c_int),
}

lazy_static! {
    static ref TABLE: Mutex<HashMap<String, Entry>> = Mutex::new(HashMap::new());
    static ref CALLS: Mutex<HashMap<String, usize>> = Mutex::new(HashMap::new());
    static ref ALLOCATED: Mutex<HashMap<String, usize>> = Mutex::new(HashMap::new());
    static ref FREED: Mutex<Vec<usize>> = Mutex::new(Vec::new());
}

pub(crate) fn set_errno(errno: c_int) {
    cfg_if! {
        if #[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))] {
            unsafe { *libc::__error() = errno };
        } else {
            unsafe { *libc::__errno_location() = errno };
        }
    }
}

pub(crate) fn register(name: &str, entry: Entry) {
    TABLE.lock().unwrap().insert(name.to_string(), entry);
}

pub(crate) fn routines() -> Routines {
    Routines {
        activate_socket: fake_activate_socket as usize,
        free: fake_free as usize,
    }
}

/// How often the fake `launch_activate_socket` was called for `name`.
pub(crate) fn calls(name: &str) -> usize {
    CALLS.lock().unwrap().get(name).copied().unwrap_or_default()
}

/// Whether the descriptor array handed out for `name` was passed to the fake `free`.
pub(crate) fn freed(name: &str) -> bool {
    match ALLOCATED.lock().unwrap().get(name) {
        Some(ptr) => FREED.lock().unwrap().contains(ptr),
        None => false,
    }
}

extern "C" fn fake_activate_socket(
    name: *const c_char,
    fds: *mut *mut c_int,
    count: *mut size_t,
) -> c_int {
    let name = unsafe { CStr::from_ptr(name) }
        .to_string_lossy()
        .into_owned();
    *CALLS.lock().unwrap().entry(name.clone()).or_default() += 1;

    let mut table = TABLE.lock().unwrap();
    let entry = match table.get_mut(&name) {
        Some(entry) => replace(entry, Entry::Code(libc::EALREADY)),
        None => return libc::ESRCH,
    };

    match entry {
        Entry::Fds(values) => unsafe {
            let ptr = libc::malloc(values.len() * size_of::<c_int>()) as *mut c_int;
            copy_nonoverlapping(values.as_ptr(), ptr, values.len());
            ALLOCATED.lock().unwrap().insert(name, ptr as usize);
            *fds = ptr;
            *count = values.len();
            0
        },
        Entry::Empty => unsafe {
            *fds = null_mut();
            *count = 0;
            0
        },
        Entry::Code(code) => {
            table.insert(name, Entry::Code(code));
            code
        }
        Entry::Errno(errno) => {
            table.insert(name, Entry::Errno(errno));
            drop(table);
            set_errno(errno);
            -1
        }
    }
}

extern "C" fn fake_free(ptr: *mut c_void) {
    FREED.lock().unwrap().push(ptr as usize);
    unsafe { libc::free(ptr) };
}

/// What the fake `launch_msg` answers to the check-in message.
#[derive(Debug, Copy, Clone)]
pub(crate) enum Reply {
    Dictionary,
    Errno(c_int),
    /// A reply of another launch data type.
    Type(c_int),
    /// `launch_msg` returns NULL and sets `errno`.
    Null(c_int),
    /// `launch_data_new_string` returns NULL.
    NoMessage,
}

enum FakeData {
    String,
    Dictionary,
    Errno(c_int),
    Type(c_int),
}

thread_local! {
    static REPLY: Cell<Reply> = Cell::new(Reply::Dictionary);
    static LIVE_DATA: Cell<isize> = Cell::new(0);
}

pub(crate) fn set_check_in_reply(reply: Reply) {
    REPLY.with(|r| r.set(reply));
}

/// Launch data allocated by the fakes on this thread and not freed yet.
pub(crate) fn live_launch_data() -> isize {
    LIVE_DATA.with(|live| live.get())
}

pub(crate) fn check_in_routines() -> CheckInRoutines {
    CheckInRoutines {
        new_string: fake_launch_data_new_string as usize,
        msg: fake_launch_msg as usize,
        get_type: fake_launch_data_get_type as usize,
        get_errno: fake_launch_data_get_errno as usize,
        free: fake_launch_data_free as usize,
    }
}

fn new_launch_data(data: FakeData) -> *mut c_void {
    LIVE_DATA.with(|live| live.set(live.get() + 1));
    Box::into_raw(Box::new(data)) as *mut c_void
}

extern "C" fn fake_launch_data_new_string(val: *const c_char) -> *mut c_void {
    assert_eq!(unsafe { CStr::from_ptr(val) }.to_bytes(), b"CheckIn");
    match REPLY.with(|r| r.get()) {
        Reply::NoMessage => null_mut(),
        _ => new_launch_data(FakeData::String),
    }
}

extern "C" fn fake_launch_msg(msg: *const c_void) -> *mut c_void {
    assert!(matches!(
        unsafe { &*(msg as *const FakeData) },
        FakeData::String
    ));
    match REPLY.with(|r| r.get()) {
        Reply::Dictionary => new_launch_data(FakeData::Dictionary),
        Reply::Errno(errno) => new_launch_data(FakeData::Errno(errno)),
        Reply::Type(data_type) => new_launch_data(FakeData::Type(data_type)),
        Reply::Null(errno) => {
            set_errno(errno);
            null_mut()
        }
        Reply::NoMessage => null_mut(),
    }
}

extern "C" fn fake_launch_data_get_type(data: *const c_void) -> c_int {
    match unsafe { &*(data as *const FakeData) } {
        FakeData::Dictionary => 1,
        FakeData::Errno(_) => 9,
        FakeData::Type(data_type) => *data_type,
        FakeData::String => 7,
    }
}

extern "C" fn fake_launch_data_get_errno(data: *const c_void) -> c_int {
    match unsafe { &*(data as *const FakeData) } {
        FakeData::Errno(errno) => *errno,
        _ => 0,
    }
}

extern "C" fn fake_launch_data_free(data: *mut c_void) {
    drop(unsafe { Box::from_raw(data as *mut FakeData) });
    LIVE_DATA.with(|live| live.set(live.get() - 1));
}
