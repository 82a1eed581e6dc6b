//! Lambda layer builder
//!
//! Builds a layer archive in a scoped staging directory:
//!
//! 1. Stage `python/` inside a temporary directory
//! 2. Install each package without dependencies
//! 3. Install each package again with dependencies
//! 4. Reinstall everything together to reconcile versions (non-fatal)
//! 5. Prune bytecode, metadata and test directories
//! 6. Zip the staging root
//!
//! The staging directory is removed when the build returns, whether it
//! succeeded or not.
//!
//! # Examples
//!
//! ```no_run
//! use layerpack::{parse_packages, LayerBuilder, PipInstaller, Reporter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let reporter = Reporter::human();
//! let packages = parse_packages("requests==2.28.0", &reporter)?;
//!
//! let builder = LayerBuilder::new(PipInstaller::default(), "python3.10");
//! let archive = builder.create_layer_zip(&packages, &reporter)?;
//! println!("{} bytes", archive.bytes.len());
//! # Ok(())
//! # }
//! ```

use crate::archive::{zip_directory, LayerArchive};
use crate::cleanup::prune_layer_dir;
use crate::installer::{InstallPass, Installer};
use crate::{PackageSpec, Reporter, Result};
use std::fs;
use std::path::Path;

/// Top-level directory Lambda adds to `sys.path` for Python layers
pub const LAYER_PYTHON_DIR: &str = "python";

pub struct LayerBuilder<I> {
    installer: I,
    python_version: String,
}

impl<I: Installer> LayerBuilder<I> {
    pub fn new(installer: I, python_version: &str) -> Self {
        Self {
            installer,
            python_version: python_version.to_string(),
        }
    }

    /// Build a layer zip containing `packages` and their dependencies
    pub fn create_layer_zip(
        &self,
        packages: &[PackageSpec],
        reporter: &Reporter,
    ) -> Result<LayerArchive> {
        reporter.step("Building Lambda layer");
        reporter.detail("Python version", &self.python_version);

        let staging = tempfile::Builder::new().prefix("layerpack-").tempdir()?;

        reporter.progress("Setting up layer directory structure", None);
        let layer_dir = staging.path().join(LAYER_PYTHON_DIR);
        fs::create_dir_all(&layer_dir)?;
        reporter.detail("Layer directory", &layer_dir.display().to_string());

        self.install_packages(packages, &layer_dir, reporter)?;

        reporter.progress("Creating layer zip file", None);
        let archive = zip_directory(staging.path(), reporter)?;

        reporter.success(&format!(
            "Layer zip created successfully ({:.2} MB)",
            archive.size_mb()
        ));
        Ok(archive)
    }

    fn install_packages(
        &self,
        packages: &[PackageSpec],
        target: &Path,
        reporter: &Reporter,
    ) -> Result<()> {
        reporter.progress("Installing packages and dependencies", None);

        reporter.info(&format!("📥 Installing {} packages...", packages.len()));
        self.install_each(InstallPass::Primary, packages, target, reporter)?;

        reporter.info("📥 Installing dependencies...");
        self.install_each(InstallPass::Dependencies, packages, target, reporter)?;

        if !packages.is_empty() {
            reporter.info("📥 Verifying complete dependency tree...");
            let pb = reporter
                .spinner("Final dependency verification (ensuring completeness)".to_string());
            let result = self.installer.install(InstallPass::Reconcile, target, packages);
            pb.finish_and_clear();

            match result {
                Ok(()) => reporter.success("Dependency tree verification completed"),
                Err(e) => {
                    tracing::warn!("Reconcile pass failed: {}", e);
                    reporter.warning(&format!(
                        "Verification step had issues but continuing: {}",
                        e
                    ));
                }
            }
        }

        reporter.progress("Cleaning up unnecessary files", None);
        let removed = prune_layer_dir(target)?;
        if removed > 0 {
            reporter.detail(
                "Cleanup",
                &format!("Removed {} unnecessary files/directories", removed),
            );
        } else {
            reporter.detail("Cleanup", "No unnecessary files found to remove");
        }

        reporter.success("Package installation completed");
        Ok(())
    }

    /// Run `pass` once per package, stopping at the first failure
    fn install_each(
        &self,
        pass: InstallPass,
        packages: &[PackageSpec],
        target: &Path,
        reporter: &Reporter,
    ) -> Result<()> {
        let total = packages.len();
        for (i, pkg) in packages.iter().enumerate() {
            let label = match pass {
                InstallPass::Primary => format!("Installing {}", pkg.name),
                _ => format!("Installing {} for {}", pass.description(), pkg.name),
            };
            let pb = reporter.spinner(format!("{} ({}/{})", label, i + 1, total));
            let result = self.installer.install(pass, target, std::slice::from_ref(pkg));
            pb.finish_and_clear();

            match result {
                Ok(()) => match pass {
                    InstallPass::Primary => reporter.success(&format!("Installed {}", pkg.name)),
                    _ => reporter.success(&format!("Dependencies installed for {}", pkg.name)),
                },
                Err(e) => {
                    reporter.error(&e.to_string());
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::path::PathBuf;

    /// Records calls and lays down a small site-packages tree
    #[derive(Default)]
    struct FakeInstaller {
        calls: RefCell<Vec<(InstallPass, Vec<String>)>>,
        fail_on: Option<InstallPass>,
        seen_targets: RefCell<Vec<PathBuf>>,
    }

    impl FakeInstaller {
        fn failing(pass: InstallPass) -> Self {
            Self {
                fail_on: Some(pass),
                ..Self::default()
            }
        }
    }

    impl Installer for FakeInstaller {
        fn install(&self, pass: InstallPass, target: &Path, specs: &[PackageSpec]) -> Result<()> {
            self.calls
                .borrow_mut()
                .push((pass, specs.iter().map(|s| s.to_string()).collect()));
            self.seen_targets.borrow_mut().push(target.to_path_buf());

            if self.fail_on == Some(pass) {
                return Err(Error::Install {
                    packages: specs[0].to_string(),
                    details: "ERROR: No matching distribution found".to_string(),
                });
            }

            for spec in specs {
                let pkg_dir = target.join(spec.clean_name());
                fs::create_dir_all(pkg_dir.join("__pycache__"))?;
                fs::write(pkg_dir.join("__init__.py"), b"VERSION = '1'")?;
                fs::write(pkg_dir.join("__pycache__/__init__.cpython-310.pyc"), b"\0")?;
                let dist_info = target.join(format!("{}-1.0.dist-info", spec.clean_name()));
                fs::create_dir_all(&dist_info)?;
                fs::write(dist_info.join("METADATA"), b"Name: x")?;
            }
            Ok(())
        }
    }

    fn specs() -> Vec<PackageSpec> {
        vec![
            PackageSpec::new("requests", Some("==2.28.0")),
            PackageSpec::new("pydantic", None),
        ]
    }

    fn entry_names(archive: &LayerArchive) -> Vec<String> {
        let zip = zip::ZipArchive::new(Cursor::new(archive.bytes.clone())).unwrap();
        zip.file_names().map(str::to_string).collect()
    }

    #[test]
    fn test_three_pass_sequence() {
        let builder = LayerBuilder::new(FakeInstaller::default(), "python3.10");
        builder.create_layer_zip(&specs(), &Reporter::silent()).unwrap();

        let calls = builder.installer.calls.borrow();
        assert_eq!(
            *calls,
            vec![
                (InstallPass::Primary, vec!["requests==2.28.0".to_string()]),
                (InstallPass::Primary, vec!["pydantic".to_string()]),
                (InstallPass::Dependencies, vec!["requests==2.28.0".to_string()]),
                (InstallPass::Dependencies, vec!["pydantic".to_string()]),
                (
                    InstallPass::Reconcile,
                    vec!["requests==2.28.0".to_string(), "pydantic".to_string()]
                ),
            ]
        );
    }

    #[test]
    fn test_installs_into_python_dir() {
        let builder = LayerBuilder::new(FakeInstaller::default(), "python3.10");
        builder.create_layer_zip(&specs(), &Reporter::silent()).unwrap();

        for target in builder.installer.seen_targets.borrow().iter() {
            assert_eq!(target.file_name().unwrap(), LAYER_PYTHON_DIR);
        }
    }

    #[test]
    fn test_archive_is_pruned_and_rooted_at_python() {
        let builder = LayerBuilder::new(FakeInstaller::default(), "python3.10");
        let archive = builder.create_layer_zip(&specs(), &Reporter::silent()).unwrap();

        let mut names = entry_names(&archive);
        names.sort();
        assert_eq!(names, vec!["python/pydantic/__init__.py", "python/requests/__init__.py"]);
        assert!(names.iter().all(|n| n.starts_with("python/")));
        assert!(!names.iter().any(|n| n.contains("__pycache__") || n.contains(".dist-info")));
    }

    #[test]
    fn test_primary_failure_is_fatal() {
        let builder = LayerBuilder::new(FakeInstaller::failing(InstallPass::Primary), "python3.10");
        let result = builder.create_layer_zip(&specs(), &Reporter::silent());

        assert!(matches!(result, Err(Error::Install { .. })));
        // Fails fast on the first package
        assert_eq!(builder.installer.calls.borrow().len(), 1);
    }

    #[test]
    fn test_dependency_failure_is_fatal() {
        let installer = FakeInstaller::failing(InstallPass::Dependencies);
        let builder = LayerBuilder::new(installer, "python3.10");
        let result = builder.create_layer_zip(&specs(), &Reporter::silent());

        assert!(matches!(result, Err(Error::Install { .. })));
        assert_eq!(builder.installer.calls.borrow().len(), 3);
    }

    #[test]
    fn test_reconcile_failure_is_not_fatal() {
        let installer = FakeInstaller::failing(InstallPass::Reconcile);
        let builder = LayerBuilder::new(installer, "python3.10");
        let archive = builder.create_layer_zip(&specs(), &Reporter::silent()).unwrap();

        assert_eq!(archive.file_count, 2);
    }

    #[test]
    fn test_staging_directory_removed_on_success() {
        let builder = LayerBuilder::new(FakeInstaller::default(), "python3.10");
        builder.create_layer_zip(&specs(), &Reporter::silent()).unwrap();

        let target = builder.installer.seen_targets.borrow()[0].clone();
        assert!(!target.exists());
        assert!(!target.parent().unwrap().exists());
    }

    #[test]
    fn test_staging_directory_removed_on_failure() {
        let builder = LayerBuilder::new(FakeInstaller::failing(InstallPass::Primary), "python3.10");
        let _ = builder.create_layer_zip(&specs(), &Reporter::silent());

        let target = builder.installer.seen_targets.borrow()[0].clone();
        assert!(!target.exists());
        assert!(!target.parent().unwrap().exists());
    }
}
