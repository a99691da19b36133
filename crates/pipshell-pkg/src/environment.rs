//! Local installation status without going through pip
//!
//! [`SitePackages`] reads the `*.dist-info` and `*.egg-info` entries that
//! installers leave in `site-packages` directories.

use std::path::{Path, PathBuf};
use std::time::Duration;

use pipshell_exec::{CommandExecutor, Invocation};
use tracing::{debug, instrument, warn};

use crate::error::PackageError;
use crate::types::FrozenPackage;

const SITE_DIRS_SCRIPT: &str =
    "import site; print('\\n'.join(site.getsitepackages() + [site.getusersitepackages()]))";

/// Source of local installation status
pub trait Environment: Send + Sync {
    /// Installed version of `name`, or `None` if it is not installed
    fn installed_version(&self, name: &str) -> Option<String>;

    /// Every installed package
    fn installed_packages(&self) -> Vec<FrozenPackage>;
}

/// Normalize a distribution name for comparison (PEP 503)
///
/// Lowercases and collapses every run of `-`, `_` and `.` into one `-`.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.extend(c.to_lowercase());
            in_separator = false;
        }
    }
    out
}

/// Split a metadata directory name into (name, version)
///
/// `requests-2.31.0.dist-info` -> `("requests", "2.31.0")`,
/// `six-1.16.0-py3.11.egg-info` -> `("six", "1.16.0")`.
fn parse_metadata_dir(file_name: &str) -> Option<(String, String)> {
    let stem = file_name
        .strip_suffix(".dist-info")
        .or_else(|| file_name.strip_suffix(".egg-info"))?;
    let (name, rest) = stem.split_once('-')?;
    let version = rest.split('-').next().unwrap_or(rest);
    if name.is_empty() || version.is_empty() {
        return None;
    }
    Some((name.to_string(), version.to_string()))
}

/// Installed packages found in a set of `site-packages` directories
#[derive(Debug, Clone, Default)]
pub struct SitePackages {
    dirs: Vec<PathBuf>,
}

impl SitePackages {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Ask `python` for its site directories
    ///
    /// Directories that do not exist are dropped.
    ///
    /// # Errors
    /// Returns an error if the interpreter cannot be run or exits non-zero,
    /// and [`PackageError::Environment`] if none of the reported directories
    /// exist.
    #[instrument(skip(executor))]
    pub async fn discover(
        executor: &dyn CommandExecutor,
        python: &str,
        timeout: Duration,
    ) -> Result<Self, PackageError> {
        let invocation = Invocation::new([python, "-c", SITE_DIRS_SCRIPT])?.with_timeout(timeout)?;
        let result = executor.run(&invocation).await?;

        let dirs: Vec<PathBuf> = result
            .stdout_lines()
            .into_iter()
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .filter(|dir| dir.is_dir())
            .collect();

        if dirs.is_empty() {
            warn!(python, output = %result.stdout.trim(), "no site-packages directory found");
            return Err(PackageError::Environment(format!(
                "{python} reported no existing site-packages directory"
            )));
        }

        debug!(count = dirs.len(), "discovered site-packages directories");
        Ok(Self::new(dirs))
    }

    fn scan_dir(dir: &Path) -> Vec<(String, String)> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot read site-packages directory");
                return Vec::new();
            }
        };

        entries
            .filter_map(Result::ok)
            .filter_map(|entry| parse_metadata_dir(&entry.file_name().to_string_lossy()))
            .collect()
    }

    fn entries(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.dirs.iter().flat_map(|dir| Self::scan_dir(dir))
    }
}

impl Environment for SitePackages {
    fn installed_version(&self, name: &str) -> Option<String> {
        let wanted = normalize_name(name);
        self.entries()
            .find(|(found, _)| normalize_name(found) == wanted)
            .map(|(_, version)| version)
    }

    fn installed_packages(&self) -> Vec<FrozenPackage> {
        let mut packages: Vec<FrozenPackage> = self
            .entries()
            .map(|(name, version)| FrozenPackage::new(normalize_name(&name), version))
            .collect();
        packages.sort();
        packages.dedup_by(|a, b| a.name == b.name);
        packages
    }
}
