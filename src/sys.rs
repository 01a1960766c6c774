//! Raw kernel entry points behind an injectable seam.
//!
//! Exactly two syscalls exist at this boundary: pledge(2) and unveil(2).
//! The [`Kernel`] trait lets unit tests inject recorded failures for every
//! errno branch without an OpenBSD kernel; production code uses [`Native`].

use std::ffi::CStr;
use std::io;

/// The two kernel-mediated restriction primitives.
///
/// `None` arguments are passed to the kernel as NULL pointers. For pledge
/// that means "leave this promise set unchanged"; for unveil, both-NULL is
/// the documented sentinel that locks the visibility set.
pub(crate) trait Kernel {
    fn pledge(&self, promises: Option<&CStr>, execpromises: Option<&CStr>) -> io::Result<()>;
    fn unveil(&self, path: Option<&CStr>, permissions: Option<&CStr>) -> io::Result<()>;
}

/// The real OpenBSD kernel.
#[cfg(target_os = "openbsd")]
pub(crate) struct Native;

#[cfg(target_os = "openbsd")]
impl Kernel for Native {
    fn pledge(&self, promises: Option<&CStr>, execpromises: Option<&CStr>) -> io::Result<()> {
        use std::ptr;

        let promises_ptr = promises.map_or(ptr::null(), CStr::as_ptr);
        let exec_ptr = execpromises.map_or(ptr::null(), CStr::as_ptr);
        // SAFETY: both pointers are either NULL or borrowed from live CStrs.
        let ret = unsafe { libc::pledge(promises_ptr, exec_ptr) };
        if ret == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    fn unveil(&self, path: Option<&CStr>, permissions: Option<&CStr>) -> io::Result<()> {
        use std::ptr;

        let path_ptr = path.map_or(ptr::null(), CStr::as_ptr);
        let perm_ptr = permissions.map_or(ptr::null(), CStr::as_ptr);
        // SAFETY: both pointers are either NULL or borrowed from live CStrs.
        let ret = unsafe { libc::unveil(path_ptr, perm_ptr) };
        if ret == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}
