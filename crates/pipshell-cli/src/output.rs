//! Rendering of package records for the terminal

use std::fmt::Write as _;

use pipshell_pkg::{DetailedPackage, FrozenPackage, Package, RegistryPackage};
use serde::Serialize;

/// Print `value` as pretty JSON, or the plain-text rendering
pub fn emit<T: Serialize + ?Sized>(value: &T, json: bool, plain: impl FnOnce() -> String) -> eyre::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", plain());
    }
    Ok(())
}

pub fn frozen_table(packages: &[FrozenPackage]) -> String {
    let width = packages.iter().map(|p| p.name.len()).max().unwrap_or(0);
    packages.iter().fold(String::new(), |mut out, p| {
        let _ = writeln!(out, "{:<width$}  {}", p.name, p.version);
        out
    })
}

pub fn registry_table(packages: &[RegistryPackage]) -> String {
    let width = packages.iter().map(|p| p.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for p in packages {
        let status = match (&p.installed_version, p.outdated) {
            (Some(v), true) => format!("installed {v}, outdated"),
            (Some(v), false) => format!("installed {v}"),
            (None, _) if p.installed => "installed".to_string(),
            (None, _) => String::new(),
        };
        let _ = writeln!(out, "{:<width$}  {:<10}  {}", p.name, p.version, p.description);
        if !status.is_empty() {
            let _ = writeln!(out, "{:<width$}  {status}", "");
        }
    }
    out
}

pub fn detail_block(pkg: &DetailedPackage) -> String {
    let dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    let deps = |d: &Option<pipshell_pkg::Dependencies>| {
        d.as_ref()
            .map(|d| d.names().join(", "))
            .unwrap_or_else(|| "-".to_string())
    };

    let mut out = String::new();
    let _ = writeln!(out, "Name:         {}", pkg.name);
    let _ = writeln!(out, "Version:      {}", dash(&pkg.version));
    let _ = writeln!(out, "Summary:      {}", dash(&pkg.summary));
    let _ = writeln!(out, "Author:       {}", dash(&pkg.author));
    let _ = writeln!(out, "Author email: {}", dash(&pkg.author_email));
    let _ = writeln!(out, "License:      {}", dash(&pkg.license));
    let _ = writeln!(out, "Location:     {}", dash(&pkg.location));
    let _ = writeln!(out, "Project URL:  {}", dash(&pkg.project_url));
    let _ = writeln!(out, "Package URL:  {}", pkg.package_url);
    let _ = writeln!(out, "Requires:     {}", deps(&pkg.requires));
    let _ = writeln!(out, "Required by:  {}", deps(&pkg.required_by));
    out
}

pub fn package_line(pkg: &Package) -> String {
    match &pkg.version {
        Some(v) if pkg.installed => format!("{} {v} (installed)\n", pkg.name),
        _ => format!("{} (not installed)\n", pkg.name),
    }
}

pub fn package_lines(packages: &[Package]) -> String {
    packages.iter().map(package_line).collect()
}
