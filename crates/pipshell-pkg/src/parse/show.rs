use std::collections::HashMap;

use crate::types::{Dependencies, DetailedPackage, Package, registry_url};

/// Parse the `Key: Value` block printed by `pip show`
///
/// Returns `None` if no `Name` field was found. Parsing stops at a `---`
/// separator, so only the first record of a multi-package query is read.
pub fn parse_show<'a, I>(lines: I) -> Option<DetailedPackage>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut fields: HashMap<String, Option<String>> = HashMap::new();

    for line in lines {
        let line = line.trim();
        if line == "---" {
            break;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        let value = (!value.is_empty()).then(|| value.to_string());
        fields.insert(normalize_key(key), value);
    }

    let mut take = |key: &str| fields.remove(key).flatten();

    let name = take("name")?;
    Some(DetailedPackage {
        package_url: registry_url(&name),
        version: take("version"),
        installed: true,
        summary: take("summary"),
        author: take("author"),
        author_email: take("author_email"),
        license: take("license"),
        location: take("location"),
        project_url: take("home_page").map(|url| normalize_project_url(&url)),
        requires: take("requires").as_deref().and_then(split_dependencies),
        required_by: take("required_by").as_deref().and_then(split_dependencies),
        name,
    })
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('-', "_")
}

fn split_dependencies(value: &str) -> Option<Dependencies> {
    if !value.contains(',') {
        return Some(Dependencies::Single(Package::new(value.trim())));
    }
    let packages: Vec<Package> = value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(Package::new)
        .collect();
    (!packages.is_empty()).then_some(Dependencies::List(packages))
}

/// Upgrade a home page URL to https
///
/// A leading `http://` becomes `https://`, and a scheme that lost its colon
/// (`https//`) gets it back. Anything else is returned unchanged.
#[must_use]
pub fn normalize_project_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("http://") {
        format!("https://{rest}")
    } else if let Some(rest) = url.strip_prefix("https//") {
        format!("https://{rest}")
    } else if let Some(rest) = url.strip_prefix("http//") {
        format!("https://{rest}")
    } else {
        url.to_string()
    }
}
