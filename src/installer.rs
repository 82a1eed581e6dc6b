//! Package installation into a layer staging directory
//!
//! Installing is delegated to an external package manager. The [`Installer`]
//! trait is the seam: [`PipInstaller`] shells out to `pip`, tests substitute
//! their own implementation.
//!
//! A build runs three passes with increasingly permissive flags, see
//! [`InstallPass`].

use crate::config::InstallerConfig;
use crate::{Error, PackageSpec, Result};
use std::path::Path;
use std::process::{Command, Output};
use std::time::Instant;

/// One stage of the layer install sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPass {
    /// Each package alone, without dependencies
    Primary,
    /// Each package again, with dependencies and upgrades
    Dependencies,
    /// Every package at once, forcing reinstall to reconcile versions
    Reconcile,
}

impl InstallPass {
    /// Installer flags for this pass
    pub fn flags(self) -> &'static [&'static str] {
        match self {
            InstallPass::Primary => &["--no-cache-dir", "--no-deps"],
            InstallPass::Dependencies => &["--no-cache-dir", "--upgrade"],
            InstallPass::Reconcile => &["--no-cache-dir", "--upgrade", "--force-reinstall"],
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            InstallPass::Primary => "packages",
            InstallPass::Dependencies => "dependencies",
            InstallPass::Reconcile => "dependency tree verification",
        }
    }
}

/// Installs package specs into a target directory
pub trait Installer {
    fn install(&self, pass: InstallPass, target: &Path, specs: &[PackageSpec]) -> Result<()>;
}

/// [`Installer`] backed by `pip install --target`
#[derive(Debug, Clone)]
pub struct PipInstaller {
    program: String,
    args: Vec<String>,
    extra_args: Vec<String>,
}

impl PipInstaller {
    pub fn new(config: &InstallerConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            extra_args: config.extra_args.clone(),
        }
    }

    /// Build the command line for one invocation without running it
    pub fn command(&self, pass: InstallPass, target: &Path, specs: &[PackageSpec]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.arg("install");
        cmd.arg("--target");
        cmd.arg(target);
        cmd.args(pass.flags());
        cmd.args(&self.extra_args);
        cmd.args(specs.iter().map(|s| s.to_string()));
        cmd
    }
}

impl Default for PipInstaller {
    fn default() -> Self {
        Self::new(&InstallerConfig::default())
    }
}

fn joined(specs: &[PackageSpec]) -> String {
    specs
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Installer diagnostics for a failed run: stderr, or stdout when stderr is empty
fn diagnostics(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let text = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout)
    } else {
        stderr
    };
    let text = text.trim();

    if text.is_empty() {
        match output.status.code() {
            Some(code) => format!("installer exited with status {}", code),
            None => "installer terminated by signal".to_string(),
        }
    } else {
        text.to_string()
    }
}

impl Installer for PipInstaller {
    fn install(&self, pass: InstallPass, target: &Path, specs: &[PackageSpec]) -> Result<()> {
        let mut cmd = self.command(pass, target, specs);
        tracing::debug!("Running {:?}", cmd);

        let start = Instant::now();
        let output = cmd.output().map_err(|e| Error::Install {
            packages: joined(specs),
            details: format!("could not run '{}': {}", self.program, e),
        })?;
        tracing::debug!(
            "{:?} pass finished in {:.1}s ({})",
            pass,
            start.elapsed().as_secs_f32(),
            output.status
        );

        if !output.status.success() {
            return Err(Error::Install {
                packages: joined(specs),
                details: diagnostics(&output),
            });
        }

        Ok(())
    }
}
