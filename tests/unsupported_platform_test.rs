//! Platforms without pledge(2)/unveil(2) must get a clear "unsupported"
//! signal, never a misleading success.

#![cfg(not(target_os = "openbsd"))]

use verho::{Error, PathVisibility, Restriction, RestrictionProfile};

#[test]
fn test_capability_flags_are_false() {
    assert!(!verho::pledge_supported());
    assert!(!verho::unveil_supported());
}

#[test]
fn test_pledge_is_not_a_silent_noop() {
    let err = verho::pledge(Some("stdio"), None).unwrap_err();
    assert!(err.is_unsupported());

    let err = Restriction::commit("stdio rpath", None).unwrap_err();
    assert!(matches!(err, Error::Unsupported));
}

#[test]
fn test_path_visibility_detects_absence() {
    let visibility = PathVisibility::detect();
    assert!(!visibility.is_available());
    assert!(matches!(visibility.available(), Err(Error::Unsupported)));

    assert!(matches!(verho::unveil("/tmp", "r"), Err(Error::Unsupported)));
    assert!(matches!(verho::unveil_lock(), Err(Error::Unsupported)));
}

#[test]
fn test_profile_apply_fails_loudly() {
    let profile = RestrictionProfile::from_toml(
        r#"
promises = "stdio"

[[unveil]]
path = "/tmp"
permissions = "rw"
"#,
    )
    .unwrap();
    assert!(matches!(profile.apply(), Err(Error::Unsupported)));
}

#[test]
fn test_pure_helpers_still_work_everywhere() {
    // The normalization contract is kernel-free and holds on any platform.
    assert_eq!(verho::effective_promises("rpath stdio rpath"), "rpath stdio");
    let set = verho::PromiseSet::parse("inet");
    assert!(set.contains(verho::BASELINE_PROMISE));
}
