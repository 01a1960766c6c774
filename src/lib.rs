//! # Verho
//!
//! Verho (Finnish for "curtain") lets a running process voluntarily and
//! irrevocably narrow its own operating-system privileges on OpenBSD: the
//! promise categories of system calls it will ever use, via pledge(2), and
//! the filesystem paths it will ever touch, via unveil(2).
//!
//! ## Security Model
//!
//! Both axes are monotonic and kernel-enforced. Privilege, once reduced,
//! can never be increased within the same process lifetime; the only way
//! forward is narrower. This crate is a thin, faithful wrapper: it performs
//! byte-level input validation, translates kernel failures into a closed
//! error taxonomy, and otherwise delegates every semantic decision —
//! subset checking, path accumulation, lock state — to the kernel. It never
//! retries, never downgrades a failure to a warning, and never pretends to
//! have restricted anything on platforms without the facility.
//!
//! ## Quick Start
//!
//! ```no_run
//! use verho::{PathVisibility, Restriction};
//!
//! # fn main() -> verho::Result<()> {
//! // Declare the visible filesystem, then seal it.
//! let unveiler = PathVisibility::detect().available()?;
//! unveiler.declare("/tmp", "rwc")?;
//! unveiler.declare("/etc/resolv.conf", "r")?;
//! unveiler.seal()?;
//!
//! // Commit a promise set; keep narrowing through the returned token.
//! let restriction = Restriction::commit("rpath wpath inet", None)?;
//! let restriction = restriction.narrow("rpath")?;
//! # let _ = restriction;
//! # Ok(())
//! # }
//! ```
//!
//! ## Process-Wide State
//!
//! The restricted state lives in the OS process, not in any value this
//! crate hands out. A pledge on one thread binds every thread, and the
//! [`Restriction`] and [`Unveiler`] types are witnesses, not owners.
//! Concurrent calls into `pledge`/`unveil`/`unveil_lock` from multiple
//! threads must be serialized by the embedding application: the kernel
//! interface is process-wide and single-call-at-a-time, and an internal
//! mutex here could not order calls against other users of the same
//! syscalls.
//!
//! ## Platform Support
//!
//! OpenBSD only. Elsewhere every operation reports
//! [`Error::Unsupported`] and [`PathVisibility::detect`] returns
//! `Unavailable` — emulation is explicitly out of scope, and absence is
//! never a silent no-op. Probe with [`pledge_supported`] /
//! [`unveil_supported`].
//!
//! ## Modules
//!
//! - **`promises`**: pledge(2) — promise-set narrowing and the
//!   [`Restriction`] capability token.
//! - **`unveil`**: unveil(2) — path visibility declarations and sealing.
//! - **`profile`**: declarative TOML restriction profiles.
//! - **`error`**: the closed error taxonomy.
//! - **`cli`** / **`logging`**: the `verho` wrapper binary.

pub mod cli;
pub mod error;
pub mod logging;
pub mod profile;
pub mod promises;
#[cfg_attr(not(target_os = "openbsd"), allow(dead_code))]
mod sys;
pub mod unveil;

pub use error::{Error, Result, UnveilCause};
pub use profile::RestrictionProfile;
pub use promises::{
    BASELINE_PROMISE, PromiseSet, Restriction, effective_promises, pledge, pledge_supported,
};
pub use unveil::{
    PathVisibility, UnveilEntry, Unveiler, unveil, unveil_lock, unveil_supported,
};
