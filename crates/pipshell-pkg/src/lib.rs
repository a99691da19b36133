//! pipshell-pkg: Typed access to pip
//!
//! Package records, parsers for pip's text output, local environment
//! introspection and the [`Pip`] service that ties them to a
//! [`pipshell_exec::CommandExecutor`].

pub mod config;
pub mod environment;
pub mod error;
pub mod parse;
pub mod pip;
pub mod traits;
pub mod types;

pub use config::PipConfig;
pub use environment::{Environment, SitePackages};
pub use error::PackageError;
pub use pip::Pip;
pub use traits::PackageManager;
pub use types::{
    Dependencies, DetailedPackage, FrozenPackage, InstallOptions, Package, RegistryPackage,
};
