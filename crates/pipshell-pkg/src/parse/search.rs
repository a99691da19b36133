use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::types::RegistryPackage;

/// `widget (2.0)  - A widget library`
static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[A-Za-z0-9\-]+)\s\((?P<version>[.0-9\-A-Za-z]+)\)\s+-\s(?P<description>.+)$")
        .expect("header pattern is valid")
});

/// `INSTALLED: 1.0`, `LATEST: 2.0`, `2.0 (latest)`
static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<marker>INSTALLED|LATEST)?:?\s*(?P<version>[^)\s]+)\s?\(?(?P<latest>latest)?\)?$",
    )
    .expect("annotation pattern is valid")
});

/// Streaming parser for `pip search` output
///
/// Holds at most one open record. A header line closes the open record and
/// opens a new one; annotation lines update the open record and are ignored
/// when none is open.
#[derive(Debug, Default)]
pub struct SearchParser {
    current: Option<RegistryPackage>,
    closed: Vec<RegistryPackage>,
}

impl SearchParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one line of output
    pub fn feed(&mut self, line: &str) {
        if let Some(caps) = HEADER.captures(line) {
            let record = RegistryPackage::new(&caps["name"], &caps["version"], &caps["description"]);
            if let Some(done) = self.current.replace(record) {
                self.closed.push(done);
            }
        }

        if let Some(caps) = ANNOTATION.captures(line)
            && let Some(record) = self.current.as_mut()
        {
            annotate(record, &caps);
        }
    }

    /// Close the open record and return all records, shortest name first
    ///
    /// Records with names of equal length keep their output order.
    #[must_use]
    pub fn finish(mut self) -> Vec<RegistryPackage> {
        self.closed.extend(self.current.take());
        self.closed.sort_by_key(|r| r.name.chars().count());
        self.closed
    }
}

fn annotate(record: &mut RegistryPackage, caps: &Captures<'_>) {
    let version = caps["version"].to_string();
    let latest = caps.name("latest").is_some();

    match caps.name("marker").map(|m| m.as_str()) {
        Some("INSTALLED") => {
            record.installed = true;
            record.outdated = !latest;
            record.installed_version = Some(version);
        }
        Some(_) => {
            record.installed = true;
            // An INSTALLED line already reported the local copy.
            if record.installed_version.is_none() {
                record.installed_version = Some(version);
            }
        }
        None if latest => {
            record.installed = true;
            record.outdated = false;
            record.installed_version = Some(version);
        }
        None => {}
    }
}

/// Parse `pip search` output in one go
pub fn parse_search<'a, I>(lines: I) -> Vec<RegistryPackage>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parser = SearchParser::new();
    for line in lines {
        parser.feed(line);
    }
    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_installed_without_latest_is_outdated() {
        let records = parse_search(["widget (2.0) - A widget library", "  INSTALLED: 1.0"]);

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.name, "widget");
        assert_eq!(r.version, "2.0");
        assert_eq!(r.description, "A widget library");
        assert!(r.installed);
        assert!(r.outdated);
        assert_eq!(r.installed_version.as_deref(), Some("1.0"));
    }

    #[test]
    fn test_latest_annotation_is_up_to_date() {
        let records = parse_search(["widget (2.0) - A widget library", "  2.0 (latest)"]);

        let r = &records[0];
        assert!(r.installed);
        assert!(!r.outdated);
        assert_eq!(r.installed_version.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_installed_latest_on_one_line() {
        let records = parse_search(["widget (2.0)  - A widget library", "INSTALLED: 2.0 (latest)"]);

        let r = &records[0];
        assert!(r.installed);
        assert!(!r.outdated);
        assert_eq!(r.installed_version.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_latest_marker_keeps_installed_version() {
        let records = parse_search([
            "widget (2.0)  - A widget library",
            "  INSTALLED: 1.0",
            "  LATEST:    2.0",
        ]);

        let r = &records[0];
        assert_eq!(r.version, "2.0");
        assert!(r.installed);
        assert!(r.outdated);
        assert_eq!(r.installed_version.as_deref(), Some("1.0"));
    }

    #[test]
    fn test_latest_marker_alone() {
        let records = parse_search(["widget (2.0) - A widget library", "LATEST: 2.0"]);

        let r = &records[0];
        assert!(r.installed);
        assert!(!r.outdated);
        assert_eq!(r.installed_version.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_plain_header_is_not_installed() {
        let records = parse_search(["widget (2.0) - A widget library"]);

        let r = &records[0];
        assert!(!r.installed);
        assert!(!r.outdated);
        assert!(r.installed_version.is_none());
        assert_eq!(r.url, "https://pypi.org/project/widget/");
    }

    #[test]
    fn test_annotation_applies_to_most_recent_header() {
        let records = parse_search([
            "alpha (1.0) - first",
            "gamma (3.0) - second",
            "INSTALLED: 2.9",
        ]);

        let alpha = records.iter().find(|r| r.name == "alpha").unwrap();
        let gamma = records.iter().find(|r| r.name == "gamma").unwrap();
        assert!(!alpha.installed);
        assert!(gamma.installed);
        assert_eq!(gamma.installed_version.as_deref(), Some("2.9"));
    }

    #[test]
    fn test_annotation_before_any_header_is_ignored() {
        let records = parse_search(["INSTALLED: 1.0", "widget (2.0) - A widget library"]);

        assert_eq!(records.len(), 1);
        assert!(!records[0].installed);
    }

    #[test]
    fn test_sorted_by_name_length_stable() {
        let records = parse_search([
            "abcde (1) - five",
            "xyz (1) - three",
            "abcdefg (1) - seven",
            "abc (1) - three again",
        ]);

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["xyz", "abc", "abcde", "abcdefg"]);
    }

    #[test]
    fn test_noise_is_skipped() {
        let records = parse_search([
            "ERROR: XMLRPC request failed [code: -32500]",
            "",
            "widget (2.0) - A widget library",
        ]);

        assert_eq!(records.len(), 1);
    }
}
