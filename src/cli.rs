//! # verho Command-Line Interface
//!
//! Applies a restriction profile to the current process and then execs a
//! target command. Unveil state is inherited across exec, and the
//! `exec_promises` set becomes the command's pledge, so the wrapper itself
//! needs no privileges beyond what it takes to get the command started.
//!
//! ```text
//! verho -u /tmp:rwc -u /bin/cat:x -P "stdio rpath" -- /bin/cat /tmp/notes
//! ```
//!
//! Remember that exec itself is subject to the veil: the command's binary
//! path must be unveiled with `x`.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::logging::init_logging;
use crate::profile::RestrictionProfile;
use crate::unveil::UnveilEntry;

#[derive(Debug, Parser)]
#[command(
    name = "verho",
    about = "Run a command under pledge(2)/unveil(2) restrictions",
    after_help = "Permissions letters: r(ead), w(rite), c(reate/delete), x(ecute)."
)]
struct Cli {
    /// TOML restriction profile to apply before running the command
    #[arg(short = 'f', long, value_name = "FILE")]
    profile: Option<PathBuf>,

    /// Promise set for the executed command (passed as exec promises)
    #[arg(short = 'P', long, value_name = "PROMISES")]
    promises: Option<String>,

    /// Promise set for verho itself, applied before exec; must include
    /// "exec" or the command can never start
    #[arg(long, value_name = "PROMISES")]
    self_promises: Option<String>,

    /// Unveil PATH with PERMS (repeatable)
    #[arg(short = 'u', long = "unveil", value_name = "PATH:PERMS")]
    unveil: Vec<String>,

    /// Leave the unveil set open instead of sealing it
    #[arg(long)]
    no_lock: bool,

    /// Validate the profile and exit without applying anything
    #[arg(long)]
    check: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Command to run under the restriction
    #[arg(trailing_var_arg = true, value_name = "COMMAND")]
    command: Vec<String>,
}

fn parse_unveil_flag(raw: &str) -> Result<UnveilEntry> {
    // Split on the last colon so paths containing ':' still parse.
    let Some((path, perms)) = raw.rsplit_once(':') else {
        bail!("unveil flag {raw:?} is not of the form PATH:PERMS");
    };
    if path.is_empty() {
        bail!("unveil flag {raw:?} has an empty path");
    }
    Ok(UnveilEntry::new(path, perms))
}

fn build_profile(cli: &Cli) -> Result<RestrictionProfile> {
    let mut profile = match &cli.profile {
        Some(path) => RestrictionProfile::load_from_file(path)?,
        None => RestrictionProfile::default(),
    };

    if let Some(promises) = &cli.promises {
        profile.exec_promises = Some(promises.clone());
    }
    if let Some(promises) = &cli.self_promises {
        profile.promises = Some(promises.clone());
    }
    for raw in &cli.unveil {
        profile.unveil.push(parse_unveil_flag(raw)?);
    }
    if cli.no_lock {
        profile.lock = false;
    }
    Ok(profile)
}

/// Entry point for the `verho` binary.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let profile = build_profile(&cli)?;

    if cli.check {
        if profile.is_empty() {
            tracing::warn!("profile restricts nothing");
        }
        println!("{}", toml::to_string(&profile)?);
        return Ok(());
    }

    if cli.command.is_empty() {
        bail!("no command given; nothing to run under the restriction");
    }
    if profile.is_empty() {
        bail!("refusing to run without any restriction; pass --profile, -P, or -u");
    }

    profile
        .apply()
        .context("failed to apply restriction profile")?;

    exec(&cli.command)
}

#[cfg(unix)]
fn exec(command: &[String]) -> Result<()> {
    use std::os::unix::process::CommandExt;
    use std::process::Command;

    let err = Command::new(&command[0]).args(&command[1..]).exec();
    // exec only returns on failure.
    Err(err).with_context(|| format!("failed to exec {:?}", command[0]))
}

#[cfg(not(unix))]
fn exec(command: &[String]) -> Result<()> {
    let _ = command;
    bail!("running commands under a restriction requires a unix platform");
}
