#![cfg_attr(not(target_os = "macos"), allow(dead_code))]

use std::io::Error as IoError;
use std::mem::transmute;

/// Raw `errno` value reported by [`call3`], `0` if the call mechanism did not fail.
pub(crate) type Errno = i32;

/// The two result registers of a C call (`rax:rdx` on x86-64, `x0:x1` on aarch64).
#[repr(C)]
#[derive(Copy, Clone)]
struct Words {
    r1: usize,
    r2: usize,
}

type Routine = unsafe extern "C" fn(usize, usize, usize) -> Words;

/// Calls the C routine at `addr` with three machine word arguments.
///
/// Returns the primary and secondary result words and the raw `errno`. The `errno` is only
/// read when the routine signals failure by returning `-1`; routines reporting errors as
/// their return value leave it at `0`.
///
/// # Safety
///
/// `addr` must be the address of a C routine taking at most three word sized (or smaller
/// integer or pointer) arguments, and every pointer argument must stay valid until this
/// function returns.
pub(crate) unsafe fn call3(addr: usize, a1: usize, a2: usize, a3: usize) -> (usize, usize, Errno) {
    let routine: Routine = transmute(addr);
    let Words { r1, r2 } = routine(a1, a2, a3);
    let errno = if r1 as u32 as i32 == -1 {
        IoError::last_os_error().raw_os_error().unwrap_or(0)
    } else {
        0
    };
    (r1, r2, errno)
}
