//! pip package manager

use std::sync::Arc;

use async_trait::async_trait;
use pipshell_exec::{CommandExecutor, ExecutionResult, Invocation};
use tracing::{debug, info, instrument};

use crate::config::PipConfig;
use crate::environment::Environment;
use crate::error::PackageError;
use crate::parse::{parse_freeze, parse_search, parse_show};
use crate::traits::PackageManager;
use crate::types::{DetailedPackage, FrozenPackage, InstallOptions, Package, RegistryPackage};

/// pip package manager implementation
///
/// Every operation runs one pip command per package through the executor.
/// Installation status is always read back from the [`Environment`] rather
/// than trusted from pip's exit code.
pub struct Pip {
    /// Executor for running pip
    executor: Arc<dyn CommandExecutor>,
    /// Local installation status
    environment: Arc<dyn Environment>,
    config: PipConfig,
}

impl Pip {
    /// Create a new pip manager
    ///
    /// # Arguments
    /// * `executor` - Executor used to run pip
    /// * `environment` - Where installed packages are looked up
    /// * `config` - pip command and defaults
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        environment: Arc<dyn Environment>,
        config: PipConfig,
    ) -> Self {
        Self {
            executor,
            environment,
            config,
        }
    }

    pub fn config(&self) -> &PipConfig {
        &self.config
    }

    /// Build a pip invocation with the configured command prefix and timeout
    fn pip_cmd(&self, args: &[&str]) -> Result<Invocation, PackageError> {
        self.config.validate()?;
        let argv = self
            .config
            .command
            .iter()
            .map(String::as_str)
            .chain(args.iter().copied());
        Ok(Invocation::new(argv)?.with_timeout(self.config.timeout())?)
    }

    /// Version from pip's final `Successfully uninstalled foo-1.0` line
    fn removed_version(result: &ExecutionResult) -> Option<String> {
        let lines = result.stdout_lines();
        let last = lines.iter().rev().find(|l| !l.is_empty())?;
        let token = last.strip_prefix("Successfully uninstalled ")?.split_whitespace().last()?;
        let (_, version) = token.rsplit_once('-')?;
        (!version.is_empty()).then(|| version.to_string())
    }

    /// Map a failed install/uninstall to an error
    fn failure(
        name: &str,
        result: &ExecutionResult,
        make: fn(String, String) -> PackageError,
    ) -> PackageError {
        if result.stderr.contains("Permission denied") {
            PackageError::PermissionDenied(result.stderr.clone())
        } else {
            make(name.to_string(), result.stderr.clone())
        }
    }
}

#[async_trait]
impl PackageManager for Pip {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<FrozenPackage>, PackageError> {
        debug!("listing installed packages");

        let cmd = self.pip_cmd(&["list", "--format", "freeze"])?;
        let result = self.executor.run_with(&cmd, None, false).await?;

        if result.failed {
            return Err(PackageError::CommandFailed {
                status: result.return_code,
                message: result.stderr,
            });
        }

        let packages = parse_freeze(result.stdout_lines())?;
        info!(count = packages.len(), "found installed packages");

        Ok(packages)
    }

    fn installed(&self) -> Vec<FrozenPackage> {
        let mut packages = self.environment.installed_packages();
        packages.sort();
        packages
    }

    #[instrument(skip(self))]
    async fn show(&self, name: &str) -> Result<Option<DetailedPackage>, PackageError> {
        let cmd = self.pip_cmd(&["show", name])?;
        let result = self.executor.run_with(&cmd, None, false).await?;

        if result.failed {
            debug!(status = result.return_code, "package not installed");
            return Ok(None);
        }

        Ok(parse_show(result.stdout_lines()))
    }

    #[instrument(skip(self))]
    async fn search(&self, name: &str) -> Result<Vec<RegistryPackage>, PackageError> {
        let cmd = self.pip_cmd(&["search", name])?;
        let result = self.executor.run(&cmd).await?;

        let packages = parse_search(result.stdout_lines());
        debug!(count = packages.len(), "search completed");

        Ok(packages)
    }

    #[instrument(skip(self))]
    async fn install(
        &self,
        names: &[String],
        options: InstallOptions,
    ) -> Result<Vec<Package>, PackageError> {
        let (present, pending): (Vec<Package>, Vec<Package>) = names
            .iter()
            .map(|name| self.package(name))
            .partition(|pkg| pkg.installed && !options.upgrade);

        info!(count = names.len(), names = %names.join(", "), "installing packages");
        if !present.is_empty() {
            let skipped: Vec<&str> = present.iter().map(|p| p.name.as_str()).collect();
            info!(count = present.len(), names = %skipped.join(", "), "already installed");
        }

        let mut installed = Vec::with_capacity(pending.len());
        for pkg in pending {
            if self.config.verify_registry && self.get(&pkg.name).await?.is_none() {
                return Err(PackageError::PackageNotFound(pkg.name));
            }

            let mut args = vec!["install", pkg.name.as_str()];
            if options.no_dependencies {
                args.push("--no-dependencies");
            }
            if options.upgrade {
                args.extend(["--upgrade", "--upgrade-strategy", "only-if-needed"]);
            }

            info!(package = %pkg.name, "installing");
            let result = self.executor.run_with(&self.pip_cmd(&args)?, None, false).await?;

            let pkg = pkg.resolved(self.environment.as_ref());
            if !pkg.installed {
                return Err(Self::failure(&pkg.name, &result, |name, message| {
                    PackageError::InstallFailed { name, message }
                }));
            }

            info!(package = %pkg, "installed");
            installed.push(pkg);
        }

        if !installed.is_empty() {
            info!(count = installed.len(), "install completed");
        }
        Ok(installed)
    }

    #[instrument(skip(self))]
    async fn uninstall(&self, names: &[String]) -> Result<Vec<FrozenPackage>, PackageError> {
        let (present, absent): (Vec<Package>, Vec<Package>) = names
            .iter()
            .map(|name| self.package(name))
            .partition(|pkg| pkg.installed);

        info!(count = names.len(), names = %names.join(", "), "uninstalling packages");
        if !absent.is_empty() {
            let skipped: Vec<&str> = absent.iter().map(|p| p.name.as_str()).collect();
            info!(count = absent.len(), names = %skipped.join(", "), "not installed");
        }

        let mut removed = Vec::with_capacity(present.len());
        for pkg in present {
            info!(package = %pkg, "uninstalling");
            let cmd = self.pip_cmd(&["uninstall", pkg.name.as_str(), "--yes"])?;
            let result = self.executor.run_with(&cmd, None, false).await?;

            if self.package(&pkg.name).installed {
                return Err(Self::failure(&pkg.name, &result, |name, message| {
                    PackageError::UninstallFailed { name, message }
                }));
            }

            let version = Self::removed_version(&result)
                .or(pkg.version)
                .unwrap_or_default();
            info!(package = %pkg.name, version = %version, "uninstalled");
            removed.push(FrozenPackage {
                name: pkg.name,
                version,
                installed: false,
            });
        }

        Ok(removed)
    }

    fn package(&self, name: &str) -> Package {
        Package::new(name).resolved(self.environment.as_ref())
    }

    fn manager_type(&self) -> &'static str {
        "pip"
    }
}
