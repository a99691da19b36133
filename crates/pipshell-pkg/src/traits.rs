//! Package manager trait

use async_trait::async_trait;

use crate::error::PackageError;
use crate::types::{DetailedPackage, FrozenPackage, InstallOptions, Package, RegistryPackage};

#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Installed packages as reported by the package manager
    async fn list(&self) -> Result<Vec<FrozenPackage>, PackageError>;

    /// Installed packages read directly from the environment
    fn installed(&self) -> Vec<FrozenPackage>;

    /// Metadata of one installed package, `None` if it is not installed
    async fn show(&self, name: &str) -> Result<Option<DetailedPackage>, PackageError>;

    /// Registry search
    async fn search(&self, name: &str) -> Result<Vec<RegistryPackage>, PackageError>;

    /// Install every name that is not installed yet
    async fn install(
        &self,
        names: &[String],
        options: InstallOptions,
    ) -> Result<Vec<Package>, PackageError>;

    /// Uninstall every name that is installed
    async fn uninstall(&self, names: &[String]) -> Result<Vec<FrozenPackage>, PackageError>;

    /// Local installation status of `name`
    fn package(&self, name: &str) -> Package;

    fn manager_type(&self) -> &'static str;

    /// Search result whose name matches `name` exactly
    async fn get(&self, name: &str) -> Result<Option<RegistryPackage>, PackageError> {
        let results = self.search(name).await?;
        Ok(results.into_iter().find(|r| r.name == name))
    }

    /// Whether the registry has a package called `name`
    async fn is_available(&self, name: &str) -> Result<bool, PackageError> {
        Ok(self.get(name).await?.is_some())
    }

    /// Whether `name` is installed locally
    fn is_installed(&self, name: &str) -> bool {
        self.package(name).installed
    }
}
