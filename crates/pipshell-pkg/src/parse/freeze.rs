use crate::error::PackageError;
use crate::types::FrozenPackage;

/// Parse `name==version` lines (`pip list --format freeze`)
///
/// Blank lines are skipped. Any other line without a name, a `==`
/// separator and a version is an error.
///
/// # Errors
/// Returns [`PackageError::Parse`] for the first malformed line.
pub fn parse_freeze<'a, I>(lines: I) -> Result<Vec<FrozenPackage>, PackageError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut packages = Vec::new();

    for (idx, line) in lines.into_iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parsed = line
            .split_once("==")
            .map(|(name, version)| (name.trim(), version.trim()))
            .filter(|(name, version)| {
                !name.is_empty() && !version.is_empty() && !version.contains("==")
            });

        match parsed {
            Some((name, version)) => packages.push(FrozenPackage::new(name, version)),
            None => {
                return Err(PackageError::Parse {
                    line: idx + 1,
                    message: format!("expected `name==version`, got {line:?}"),
                });
            }
        }
    }

    Ok(packages)
}
