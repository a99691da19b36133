//! Parsers for the text output of `pip list`, `pip show` and `pip search`
//!
//! The listing parser is strict and fails on the first malformed line. The
//! show and search parsers skip lines they do not recognise, since pip mixes
//! warnings and banners into its output.

mod freeze;
mod search;
mod show;

pub use freeze::parse_freeze;
pub use search::{SearchParser, parse_search};
pub use show::{normalize_project_url, parse_show};
