//! # Restriction Error Taxonomy
//!
//! Every failure surfaced by this crate is one of a closed set of kinds, so
//! callers can tell a configuration bug ("I typo'd a promise") apart from a
//! logic bug ("my own code tried to widen permissions") without string
//! matching. Kernel failures are translated from their errno in exactly one
//! place per syscall ([`pledge_error_from`], [`unveil_error_from`]), keeping
//! the call sites free of branching.

use std::fmt;
use std::io;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by the restriction layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Client-side validation failure, raised before any kernel call is
    /// attempted (for example an embedded NUL byte in a promise string or
    /// path).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The kernel rejected the promise string as malformed or containing an
    /// unknown promise token (`EINVAL`).
    #[error("invalid promise in promises string")]
    InvalidPromise,

    /// The requested promise set is not a subset of the currently active
    /// set (`EPERM`). Privilege is monotonic: once narrowed it can never be
    /// widened within the same process lifetime.
    #[error("attempt to increase permissions")]
    PermissionIncrease,

    /// Any other pledge failure reported by the kernel. The original OS
    /// error is preserved as the source.
    #[error("pledge failed: {0}")]
    Pledge(#[source] io::Error),

    /// An unveil failure. A single kind, but the cause carries a message
    /// specific to what the kernel reported.
    #[error("unveil failed: {0}")]
    Unveil(UnveilCause),

    /// The running kernel does not provide the requested facility. Raised
    /// instead of silently succeeding, so callers never mistake "nothing
    /// was restricted" for "restriction applied".
    #[error("pledge(2)/unveil(2) are not supported on this platform")]
    Unsupported,
}

impl Error {
    /// True when the error represents the platform lacking the facility
    /// rather than a failed restriction attempt.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported)
    }
}

/// Kernel-reported cause of an unveil failure.
///
/// unveil(2) distinguishes these through errno alone; the enum keeps the
/// messages apart so an operator reading a log can tell a bad permission
/// string from an exhausted path table.
#[derive(Debug)]
#[non_exhaustive]
pub enum UnveilCause {
    /// `EINVAL`: the permission string contains a letter outside `rwxc`.
    InvalidPermissions,
    /// `EPERM`: an attempt to add a path or widen permissions after the
    /// current veil no longer allows it — the path is not reachable, the
    /// requested mode is wider than previously granted, or the set has
    /// already been locked.
    NotPermitted,
    /// `E2BIG`: the per-process limit on unveiled paths was exceeded.
    TooManyPaths,
    /// `ENOENT`: a directory component of the path does not exist.
    MissingDirectory,
    /// Any other errno, preserved for diagnosis.
    Other(io::Error),
}

impl fmt::Display for UnveilCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPermissions => write!(f, "invalid unveil permissions string"),
            Self::NotPermitted => write!(
                f,
                "attempt to increase permissions, path not accessible, or veil already locked"
            ),
            Self::TooManyPaths => write!(f, "per-process limit of unveiled paths exceeded"),
            Self::MissingDirectory => write!(f, "a directory in the path does not exist"),
            Self::Other(err) => write!(f, "{err}"),
        }
    }
}

/// Translates a pledge(2) failure into the closed taxonomy.
#[cfg_attr(not(target_os = "openbsd"), allow(dead_code))]
pub(crate) fn pledge_error_from(err: io::Error) -> Error {
    match err.raw_os_error() {
        Some(libc::EINVAL) => Error::InvalidPromise,
        Some(libc::EPERM) => Error::PermissionIncrease,
        _ => Error::Pledge(err),
    }
}

/// Translates an unveil(2) failure into the closed taxonomy.
#[cfg_attr(not(target_os = "openbsd"), allow(dead_code))]
pub(crate) fn unveil_error_from(err: io::Error) -> Error {
    let cause = match err.raw_os_error() {
        Some(libc::EINVAL) => UnveilCause::InvalidPermissions,
        Some(libc::EPERM) => UnveilCause::NotPermitted,
        Some(libc::E2BIG) => UnveilCause::TooManyPaths,
        Some(libc::ENOENT) => UnveilCause::MissingDirectory,
        _ => UnveilCause::Other(err),
    };
    Error::Unveil(cause)
}
