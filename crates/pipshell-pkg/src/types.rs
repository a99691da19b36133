//! Type definitions for package records

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::environment::Environment;

/// Registry page of a package
#[must_use]
pub fn registry_url(name: &str) -> String {
    format!("https://pypi.org/project/{name}/")
}

/// A package known only by name
///
/// Constructed bare by [`Package::new`]; [`Package::resolve`] fills in the
/// installation status from an [`Environment`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Package {
    /// Package name
    pub name: String,
    /// Whether the package was found installed when last resolved
    pub installed: bool,
    /// Installed version, present exactly when `installed` is true
    pub version: Option<String>,
}

impl Package {
    /// Create an unresolved package reference
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            installed: false,
            version: None,
        }
    }

    /// Look the package up in `env` and update `installed` and `version`
    pub fn resolve(&mut self, env: &dyn Environment) {
        self.version = env.installed_version(&self.name);
        self.installed = self.version.is_some();
    }

    /// Consuming form of [`Package::resolve`]
    #[must_use]
    pub fn resolved(mut self, env: &dyn Environment) -> Self {
        self.resolve(env);
        self
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{} {v}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A package as reported by a bulk listing
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrozenPackage {
    /// Package name
    pub name: String,
    /// Version
    pub version: String,
    /// Installation status
    pub installed: bool,
}

impl FrozenPackage {
    /// Create an installed package entry
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            installed: true,
        }
    }
}

impl fmt::Display for FrozenPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={}", self.name, self.version)
    }
}

/// A package as reported by a registry search
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegistryPackage {
    /// Package name
    pub name: String,
    /// Version available in the registry
    pub version: String,
    /// Whether some version is installed locally
    pub installed: bool,
    /// Whether the installed copy is older than the registry version
    pub outdated: bool,
    /// Installed version, if reported
    pub installed_version: Option<String>,
    /// Registry description
    pub description: String,
    /// Registry page
    pub url: String,
}

impl RegistryPackage {
    /// Create a not-installed registry entry
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let url = registry_url(&name);
        Self {
            name,
            version: version.into(),
            installed: false,
            outdated: false,
            installed_version: None,
            description: description.into(),
            url,
        }
    }
}

/// `requires` / `required_by` value of a detailed record
///
/// A field written without commas is kept as a single reference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dependencies {
    Single(Package),
    List(Vec<Package>),
}

impl Dependencies {
    /// Referenced packages in source order
    pub fn packages(&self) -> &[Package] {
        match self {
            Dependencies::Single(pkg) => std::slice::from_ref(pkg),
            Dependencies::List(pkgs) => pkgs,
        }
    }

    /// Referenced package names in source order
    pub fn names(&self) -> Vec<&str> {
        self.packages().iter().map(|p| p.name.as_str()).collect()
    }
}

/// A package as reported by a single-package metadata query
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DetailedPackage {
    pub name: String,
    pub version: Option<String>,
    pub installed: bool,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub author_email: Option<String>,
    pub license: Option<String>,
    pub location: Option<String>,
    /// Registry page
    pub package_url: String,
    /// Home page, upgraded to https
    pub project_url: Option<String>,
    pub requires: Option<Dependencies>,
    pub required_by: Option<Dependencies>,
}

/// Flags for `install`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallOptions {
    /// Pass `--no-dependencies`
    pub no_dependencies: bool,
    /// Pass `--upgrade` and also reinstall packages that are already present
    pub upgrade: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            no_dependencies: true,
            upgrade: false,
        }
    }
}
