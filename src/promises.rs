//! # Promise Restriction
//!
//! Wraps pledge(2): a process commits to a set of named system-call
//! categories ("promises") and the kernel enforces that commitment for the
//! remainder of the process lifetime. Every non-`None` request is silently
//! augmented with the `stdio` baseline promise, without which the Rust
//! runtime itself (allocator, stdout, exit) could not keep functioning.
//!
//! ## Monotonicity
//!
//! Once any promise set is committed, each later commit must be a subset of
//! the active set. That rule lives in the kernel, not here: this layer never
//! pre-checks subsets, it surfaces the kernel's `EPERM` as
//! [`Error::PermissionIncrease`] so callers see exactly what the OS decided.
//!
//! ## Concurrency
//!
//! The restricted state is process-wide, not thread-local. A pledge on any
//! thread binds every thread, and concurrent callers must serialize
//! externally; see the crate-level documentation.

use std::collections::BTreeSet;
#[cfg(any(test, target_os = "openbsd"))]
use std::ffi::CString;
use std::fmt;

use crate::error::{Error, Result};
#[cfg(any(test, target_os = "openbsd"))]
use crate::error::pledge_error_from;
#[cfg(any(test, target_os = "openbsd"))]
use crate::sys::Kernel;

/// The promise category required for basic process operation, appended to
/// every non-`None` request.
pub const BASELINE_PROMISE: &str = "stdio";

/// Returns true when the running kernel offers pledge(2).
pub const fn pledge_supported() -> bool {
    cfg!(target_os = "openbsd")
}

/// Computes the effective promise string committed to the kernel for a
/// requested set: whitespace-normalized, deduplicated (first occurrence
/// wins), and augmented with [`BASELINE_PROMISE`] exactly once.
///
/// Pure and kernel-free, so the augmentation contract is testable on any
/// platform. Idempotent: requests that already include the baseline come
/// out identical to ones that omit it.
///
/// ```
/// use verho::effective_promises;
///
/// assert_eq!(effective_promises("rpath wpath"), "rpath wpath stdio");
/// assert_eq!(effective_promises("  stdio   rpath "), "stdio rpath");
/// assert_eq!(effective_promises(""), "stdio");
/// ```
pub fn effective_promises(requested: &str) -> String {
    let mut tokens: Vec<&str> = Vec::new();
    for token in requested.split_whitespace() {
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    if !tokens.contains(&BASELINE_PROMISE) {
        tokens.push(BASELINE_PROMISE);
    }
    tokens.join(" ")
}

/// A parsed, baseline-augmented promise set.
///
/// Used by [`Restriction`] to keep a readable record of what was requested.
/// This is bookkeeping only: the authoritative state lives in the kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromiseSet {
    tokens: BTreeSet<String>,
}

impl PromiseSet {
    /// Parses a space-delimited promise string, adding the baseline token.
    pub fn parse(requested: &str) -> Self {
        let mut tokens: BTreeSet<String> =
            requested.split_whitespace().map(str::to_owned).collect();
        tokens.insert(BASELINE_PROMISE.to_owned());
        Self { tokens }
    }

    /// True when every token in `self` is present in `other`.
    pub fn is_subset_of(&self, other: &PromiseSet) -> bool {
        self.tokens.is_subset(&other.tokens)
    }

    /// True when the set contains the given promise token.
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// Iterates the tokens in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl fmt::Display for PromiseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for token in &self.tokens {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(token)?;
            first = false;
        }
        Ok(())
    }
}

/// Restricts the current process to the given promise set.
///
/// * `promises: Some(p)` — commit `p` (baseline-augmented) as the new
///   promise set; it must be a subset of the currently active set.
/// * `promises: None` — leave the current promise restriction unchanged.
///   Distinct from `Some("")`, which revokes everything except the baseline.
/// * `exec_promises: Some(e)` — promise set applied across the next exec
///   boundary, passed through unmodified (no baseline augmentation).
/// * `exec_promises: None` — leave the exec promise set unchanged.
///
/// This call is synchronous and never retried; on failure the kernel state
/// is unchanged and retrying with identical arguments will fail identically.
///
/// # Errors
///
/// [`Error::InvalidArgument`] for embedded NUL bytes,
/// [`Error::InvalidPromise`] for unknown or malformed promise tokens,
/// [`Error::PermissionIncrease`] when the request would widen the active
/// set, [`Error::Pledge`] for any other kernel failure, and
/// [`Error::Unsupported`] on platforms without pledge(2).
pub fn pledge(promises: Option<&str>, exec_promises: Option<&str>) -> Result<()> {
    #[cfg(target_os = "openbsd")]
    {
        pledge_with(&crate::sys::Native, promises, exec_promises)
    }
    #[cfg(not(target_os = "openbsd"))]
    {
        let _ = (promises, exec_promises);
        Err(Error::Unsupported)
    }
}

#[cfg(any(test, target_os = "openbsd"))]
fn pledge_with<K: Kernel>(
    kernel: &K,
    promises: Option<&str>,
    exec_promises: Option<&str>,
) -> Result<()> {
    let effective = promises
        .map(|p| CString::new(effective_promises(p)))
        .transpose()
        .map_err(|_| Error::InvalidArgument("promises string contains a NUL byte".into()))?;
    let exec = exec_promises
        .map(CString::new)
        .transpose()
        .map_err(|_| Error::InvalidArgument("execpromises string contains a NUL byte".into()))?;

    kernel
        .pledge(effective.as_deref(), exec.as_deref())
        .map_err(pledge_error_from)?;

    tracing::debug!(
        promises = ?effective,
        execpromises = ?exec,
        "pledge committed"
    );
    Ok(())
}

/// Capability token witnessing a committed promise restriction.
///
/// Returned by the first successful [`Restriction::commit`]; afterwards the
/// only promise-narrowing surface is [`Restriction::narrow`], which consumes
/// the token and returns one recording the narrower set. The token does not
/// own the restriction — that state lives in the kernel and ends with the
/// process — it only makes the one-way lattice visible in the type system.
#[derive(Debug)]
pub struct Restriction {
    active: PromiseSet,
}

impl Restriction {
    /// Commits an initial promise set, optionally with an exec-time set.
    pub fn commit(promises: &str, exec_promises: Option<&str>) -> Result<Self> {
        pledge(Some(promises), exec_promises)?;
        Ok(Self {
            active: PromiseSet::parse(promises),
        })
    }

    /// Narrows the committed set further. The kernel rejects any request
    /// that is not a subset of the active set.
    pub fn narrow(self, promises: &str) -> Result<Self> {
        pledge(Some(promises), None)?;
        Ok(Self {
            active: PromiseSet::parse(promises),
        })
    }

    /// The most recently requested promise set (baseline included).
    pub fn active(&self) -> &PromiseSet {
        &self.active
    }

    #[cfg(test)]
    fn commit_with<K: Kernel>(kernel: &K, promises: &str, exec_promises: Option<&str>) -> Result<Self> {
        pledge_with(kernel, Some(promises), exec_promises)?;
        Ok(Self {
            active: PromiseSet::parse(promises),
        })
    }

    #[cfg(test)]
    fn narrow_with<K: Kernel>(self, kernel: &K, promises: &str) -> Result<Self> {
        pledge_with(kernel, Some(promises), None)?;
        Ok(Self {
            active: PromiseSet::parse(promises),
        })
    }
}
