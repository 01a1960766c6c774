//! # Path Visibility Restriction
//!
//! Wraps unveil(2): the process's filesystem namespace is reduced to an
//! explicit allow-list of (path, permissions) pairs. After the first
//! declaration, every undeclared path becomes unreachable; sealing the set
//! makes further declarations impossible for the lifetime of the process.
//!
//! Permission strings are composed of:
//!
//! * `r` — read access to existing files and directories
//! * `w` — write access to existing files and directories
//! * `c` — create/delete access for files and directories
//! * `x` — execute access to programs
//!
//! The empty string is valid and denies all access below the path, which is
//! how access granted on a parent directory is carved back out.
//!
//! The facility is only present on OpenBSD. [`PathVisibility::detect`]
//! reports availability up front so callers never discover absence through
//! a misleading runtime failure.

#[cfg(any(test, target_os = "openbsd"))]
use std::ffi::CString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
#[cfg(any(test, target_os = "openbsd"))]
use crate::error::unveil_error_from;
#[cfg(any(test, target_os = "openbsd"))]
use crate::sys::Kernel;

/// Returns true when the running kernel offers unveil(2).
pub const fn unveil_supported() -> bool {
    cfg!(target_os = "openbsd")
}

/// One (path, permissions) allow-list entry.
///
/// Entries for the same path accumulate under kernel rules: a later
/// declaration may narrow or, before any veil applies, extend the mode, but
/// never grants access beyond what an earlier veil already removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnveilEntry {
    pub path: PathBuf,
    pub permissions: String,
}

impl UnveilEntry {
    pub fn new(path: impl Into<PathBuf>, permissions: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            permissions: permissions.into(),
        }
    }
}

/// Whether the path-visibility facility exists on this kernel.
///
/// Constructed by [`PathVisibility::detect`]. The tagged form forces
/// callers to confront absence at initialization instead of deep inside a
/// restriction sequence.
#[derive(Debug)]
pub enum PathVisibility {
    /// unveil(2) is present; the handle performs declarations.
    Available(Unveiler),
    /// The kernel has no path-visibility facility. Non-goal: emulating it.
    Unavailable,
}

impl PathVisibility {
    /// Detects kernel support at load time.
    pub fn detect() -> Self {
        if unveil_supported() {
            Self::Available(Unveiler { _private: () })
        } else {
            Self::Unavailable
        }
    }

    /// Unwraps the handle or reports [`Error::Unsupported`].
    pub fn available(self) -> Result<Unveiler> {
        match self {
            Self::Available(unveiler) => Ok(unveiler),
            Self::Unavailable => Err(Error::Unsupported),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Handle over the process-wide unveil state.
///
/// The handle owns no kernel state — the allow-list lives in the process
/// itself and ends with it — but consuming `self` in [`Unveiler::seal`]
/// makes declare-after-seal a compile error on top of the kernel's `EPERM`.
/// Dropping the handle without sealing leaves the set open for a later
/// [`PathVisibility::detect`].
#[derive(Debug)]
pub struct Unveiler {
    _private: (),
}

impl Unveiler {
    /// Declares that `path` remains reachable with exactly `permissions`.
    pub fn declare(&self, path: impl AsRef<Path>, permissions: &str) -> Result<()> {
        unveil(path, permissions)
    }

    /// Permanently locks the visibility set. No further declarations can
    /// succeed afterwards, for the lifetime of the process.
    pub fn seal(self) -> Result<()> {
        unveil_lock()
    }

    /// Declares every entry, then seals. An empty list veils `/` with no
    /// permissions first, denying all filesystem access.
    pub fn apply(self, entries: &[UnveilEntry]) -> Result<()> {
        if entries.is_empty() {
            self.declare("/", "")?;
        }
        for entry in entries {
            self.declare(&entry.path, &entry.permissions)?;
        }
        self.seal()
    }
}

/// Registers `path` as visible with the given permission string.
///
/// # Errors
///
/// [`Error::InvalidArgument`] for embedded NUL bytes, [`Error::Unveil`]
/// with a cause-specific message for kernel failures, and
/// [`Error::Unsupported`] on platforms without unveil(2).
pub fn unveil(path: impl AsRef<Path>, permissions: &str) -> Result<()> {
    #[cfg(target_os = "openbsd")]
    {
        unveil_with(
            &crate::sys::Native,
            Some(path.as_ref()),
            Some(permissions),
        )
    }
    #[cfg(not(target_os = "openbsd"))]
    {
        let _ = (path.as_ref(), permissions);
        Err(Error::Unsupported)
    }
}

/// Locks the visibility set by invoking unveil(2) with both arguments NULL,
/// the kernel's documented sentinel for "lock now".
pub fn unveil_lock() -> Result<()> {
    #[cfg(target_os = "openbsd")]
    {
        unveil_with(&crate::sys::Native, None, None)
    }
    #[cfg(not(target_os = "openbsd"))]
    {
        Err(Error::Unsupported)
    }
}

#[cfg(any(test, target_os = "openbsd"))]
fn unveil_with<K: Kernel>(
    kernel: &K,
    path: Option<&Path>,
    permissions: Option<&str>,
) -> Result<()> {
    let path = path.map(cstring_from_path).transpose()?;
    let permissions = permissions
        .map(CString::new)
        .transpose()
        .map_err(|_| Error::InvalidArgument("permissions string contains a NUL byte".into()))?;

    let sealing = path.is_none() && permissions.is_none();
    kernel
        .unveil(path.as_deref(), permissions.as_deref())
        .map_err(unveil_error_from)?;

    if sealing {
        tracing::debug!("unveil set sealed");
    } else {
        tracing::debug!(path = ?path, permissions = ?permissions, "path unveiled");
    }
    Ok(())
}

#[cfg(all(unix, any(test, target_os = "openbsd")))]
fn cstring_from_path(path: &Path) -> Result<CString> {
    use std::os::unix::ffi::OsStrExt;

    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| Error::InvalidArgument("path contains a NUL byte".into()))
}

#[cfg(all(not(unix), test))]
fn cstring_from_path(path: &Path) -> Result<CString> {
    let utf8 = path
        .to_str()
        .ok_or_else(|| Error::InvalidArgument("path is not valid UTF-8".into()))?;
    CString::new(utf8).map_err(|_| Error::InvalidArgument("path contains a NUL byte".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnveilCause;
    use crate::sys::testing::{Call, FakeKernel};

    #[test]
    fn test_declare_passes_path_and_permissions() {
        let kernel = FakeKernel::new();
        unveil_with(&kernel, Some(Path::new("/tmp")), Some("rwc")).unwrap();
        assert_eq!(
            kernel.calls(),
            vec![Call::Unveil {
                path: Some("/tmp".into()),
                permissions: Some("rwc".into()),
            }]
        );
    }

    #[test]
    fn test_seal_uses_null_null_sentinel() {
        let kernel = FakeKernel::new();
        unveil_with(&kernel, None, None).unwrap();
        assert_eq!(
            kernel.calls(),
            vec![Call::Unveil {
                path: None,
                permissions: None,
            }]
        );
    }

    #[test]
    fn test_nul_bytes_rejected_before_kernel_call() {
        let kernel = FakeKernel::new();
        let err = unveil_with(&kernel, Some(Path::new("/tmp")), Some("r\0w")).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(kernel.calls().is_empty());
    }

    #[test]
    fn test_each_errno_has_a_distinguishing_message() {
        let cases = [
            (libc::EINVAL, "invalid unveil permissions"),
            (libc::EPERM, "attempt to increase permissions"),
            (libc::E2BIG, "per-process limit"),
            (libc::ENOENT, "directory in the path does not exist"),
        ];
        for (errno, phrase) in cases {
            let kernel = FakeKernel::failing_unveil(errno);
            let err = unveil_with(&kernel, Some(Path::new("/etc")), Some("r")).unwrap_err();
            assert!(matches!(err, Error::Unveil(_)), "errno {errno}");
            let rendered = err.to_string();
            assert!(
                rendered.contains(phrase),
                "errno {errno}: {rendered:?} should contain {phrase:?}"
            );
        }
    }

    #[test]
    fn test_sealed_set_rejects_further_declarations() {
        // After the kernel locks the set it answers EPERM to everything.
        let kernel = FakeKernel::failing_unveil(libc::EPERM);
        let err = unveil_with(&kernel, Some(Path::new("/tmp")), Some("r")).unwrap_err();
        assert!(matches!(err, Error::Unveil(UnveilCause::NotPermitted)));
    }

    #[test]
    fn test_apply_declares_then_seals() {
        let kernel = FakeKernel::new();
        let entries = vec![
            UnveilEntry::new("/tmp", "rwc"),
            UnveilEntry::new("/etc/resolv.conf", "r"),
        ];
        apply_with(&kernel, &entries).unwrap();
        assert_eq!(
            kernel.calls(),
            vec![
                Call::Unveil {
                    path: Some("/tmp".into()),
                    permissions: Some("rwc".into()),
                },
                Call::Unveil {
                    path: Some("/etc/resolv.conf".into()),
                    permissions: Some("r".into()),
                },
                Call::Unveil {
                    path: None,
                    permissions: None,
                },
            ]
        );
    }

    #[test]
    fn test_apply_empty_denies_all_access() {
        let kernel = FakeKernel::new();
        apply_with(&kernel, &[]).unwrap();
        assert_eq!(
            kernel.calls(),
            vec![
                Call::Unveil {
                    path: Some("/".into()),
                    permissions: Some(String::new()),
                },
                Call::Unveil {
                    path: None,
                    permissions: None,
                },
            ]
        );
    }

    // Mirrors Unveiler::apply against the injectable seam.
    fn apply_with(kernel: &FakeKernel, entries: &[UnveilEntry]) -> crate::Result<()> {
        if entries.is_empty() {
            unveil_with(kernel, Some(Path::new("/")), Some(""))?;
        }
        for entry in entries {
            unveil_with(kernel, Some(&entry.path), Some(&entry.permissions))?;
        }
        unveil_with(kernel, None, None)
    }

    #[cfg(not(target_os = "openbsd"))]
    #[test]
    fn test_detection_off_openbsd() {
        assert!(!unveil_supported());
        let visibility = PathVisibility::detect();
        assert!(!visibility.is_available());
        assert!(matches!(visibility.available(), Err(Error::Unsupported)));
        assert!(matches!(unveil("/tmp", "r"), Err(Error::Unsupported)));
        assert!(matches!(unveil_lock(), Err(Error::Unsupported)));
    }

    #[cfg(target_os = "openbsd")]
    #[test]
    fn test_detection_on_openbsd() {
        assert!(unveil_supported());
        assert!(PathVisibility::detect().is_available());
    }
}
