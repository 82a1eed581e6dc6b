//! Package specification parsing
//!
//! Turns a comma-separated string such as `"boto3>=1.26.1,requests==2.28.0"`
//! into [`PackageSpec`] values. Each spec keeps its constraint exactly as
//! written so it can be handed to the installer unchanged.
//!
//! # Examples
//!
//! ```
//! use layerpack::{parse_packages, Reporter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let specs = parse_packages("boto3>=1.26.1, requests", &Reporter::silent())?;
//! assert_eq!(specs.len(), 2);
//! assert_eq!(specs[0].to_string(), "boto3>=1.26.1");
//! assert!(specs[1].version_constraint.is_none());
//! # Ok(())
//! # }
//! ```

use crate::{Error, Reporter, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Name followed by one of the pip comparison operators and a version
const SPEC_PATTERN: &str = r"^([a-zA-Z0-9_.-]+)\s*(>=|>|<=|<|==|~=|!=)\s*(.+)$";

/// Trailing version token of a constraint (`>=1.26.1` -> `1.26.1`)
const VERSION_TOKEN_PATTERN: &str = r"[\w.-]+$";

fn spec_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SPEC_PATTERN).expect("package spec pattern is valid"))
}

fn version_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VERSION_TOKEN_PATTERN).expect("version token pattern is valid"))
}

/// A requested package with an optional version constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    /// Operator and version, e.g. `>=1.26.1`. `None` means latest.
    pub version_constraint: Option<String>,
}

impl PackageSpec {
    pub fn new(name: &str, version_constraint: Option<&str>) -> Self {
        Self {
            name: name.trim().to_string(),
            version_constraint: version_constraint
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        }
    }

    /// Lower-cased name with everything outside `[a-z0-9_-]` removed
    pub fn clean_name(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
            .collect()
    }

    /// Version number shown in layer descriptions
    pub fn version_for_description(&self) -> Option<&str> {
        let constraint = self.version_constraint.as_deref()?;
        Some(
            version_token_regex()
                .find(constraint)
                .map(|m| m.as_str())
                .unwrap_or(constraint),
        )
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version_constraint {
            Some(constraint) => write!(f, "{}{}", self.name, constraint),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Parse one comma-delimited segment. The segment must already be trimmed and non-empty.
fn parse_segment(segment: &str) -> PackageSpec {
    match spec_regex().captures(segment) {
        Some(caps) => {
            let constraint = format!("{}{}", &caps[2], &caps[3]);
            PackageSpec::new(&caps[1], Some(&constraint))
        }
        None => PackageSpec::new(segment, None),
    }
}

/// Parse a comma-separated list of package specifications
///
/// Empty segments (for example a trailing comma) are skipped. Segments that
/// carry no recognizable operator are taken as bare package names.
pub fn parse_packages(package_string: &str, reporter: &Reporter) -> Result<Vec<PackageSpec>> {
    reporter.step("Parsing package specifications");

    if package_string.trim().is_empty() {
        return Err(Error::EmptyInput);
    }

    reporter.detail("Raw input", package_string);

    let mut packages = Vec::new();
    for segment in package_string.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let spec = parse_segment(segment);
        match &spec.version_constraint {
            Some(constraint) => reporter.info(&format!(
                "Parsed: {} with version constraint {}",
                spec.name, constraint
            )),
            None => reporter.info(&format!("Parsed: {} (latest version)", spec.name)),
        }
        packages.push(spec);
    }

    if packages.is_empty() {
        return Err(Error::NoValidPackages);
    }

    tracing::debug!("Parsed {} package specs", packages.len());
    reporter.packages_summary(&packages);
    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Vec<PackageSpec>> {
        parse_packages(input, &Reporter::silent())
    }

    #[test]
    fn test_parse_versioned_packages() {
        let specs = parse("boto3>=1.26.1,requests==2.28.0").unwrap();
        assert_eq!(
            specs,
            vec![
                PackageSpec::new("boto3", Some(">=1.26.1")),
                PackageSpec::new("requests", Some("==2.28.0")),
            ]
        );
    }

    #[test]
    fn test_parse_bare_name() {
        let specs = parse("requests").unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "requests");
        assert!(specs[0].version_constraint.is_none());
    }

    #[test]
    fn test_parse_all_operators() {
        for op in [">=", ">", "<=", "<", "==", "~=", "!="] {
            let input = format!("pkg{}1.0", op);
            let specs = parse(&input).unwrap();
            assert_eq!(specs[0].name, "pkg");
            assert_eq!(specs[0].version_constraint.as_deref(), Some(format!("{}1.0", op).as_str()));
        }
    }

    #[test]
    fn test_parse_whitespace_around_operator() {
        let specs = parse("  pydantic >= 2.5.0 , numpy").unwrap();
        assert_eq!(specs[0].name, "pydantic");
        assert_eq!(specs[0].version_constraint.as_deref(), Some(">=2.5.0"));
        assert_eq!(specs[1].name, "numpy");
    }

    #[test]
    fn test_parse_skips_empty_segments() {
        let specs = parse("requests,,pydantic,").unwrap();
        assert_eq!(specs.len(), 2);
    }

    #[test]
    fn test_spec_count_matches_non_empty_segments() {
        let inputs = ["a", "a,b", "a, ,b,", " a , b , c ", "x==1,y,z>2,,"];
        for input in inputs {
            let expected = input.split(',').filter(|s| !s.trim().is_empty()).count();
            assert_eq!(parse(input).unwrap().len(), expected, "input: {:?}", input);
        }
    }

    #[test]
    fn test_parse_preserves_input_order() {
        let names: Vec<String> = parse("zed,ape,mid")
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["zed", "ape", "mid"]);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(matches!(parse(""), Err(Error::EmptyInput)));
        assert!(matches!(parse("   "), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_parse_only_commas() {
        assert!(matches!(parse(",,,"), Err(Error::NoValidPackages)));
        assert!(matches!(parse(" , , "), Err(Error::NoValidPackages)));
    }

    #[test]
    fn test_unmatched_segment_is_name_only() {
        let specs = parse("requests[security]").unwrap();
        assert_eq!(specs[0].name, "requests[security]");
        assert!(specs[0].version_constraint.is_none());
    }

    #[test]
    fn test_display_concatenates_constraint() {
        assert_eq!(PackageSpec::new("boto3", Some(">=1.26.1")).to_string(), "boto3>=1.26.1");
        assert_eq!(PackageSpec::new("requests", None).to_string(), "requests");
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(PackageSpec::new("Zope.Interface", None).clean_name(), "zopeinterface");
        assert_eq!(PackageSpec::new("typing_extensions", None).clean_name(), "typing_extensions");
        assert_eq!(PackageSpec::new("My-Pkg2", None).clean_name(), "my-pkg2");
    }

    #[test]
    fn test_version_for_description() {
        assert_eq!(
            PackageSpec::new("requests", Some("==2.28.0")).version_for_description(),
            Some("2.28.0")
        );
        assert_eq!(
            PackageSpec::new("numpy", Some("~=1.26.0rc1")).version_for_description(),
            Some("1.26.0rc1")
        );
        assert_eq!(PackageSpec::new("requests", None).version_for_description(), None);
    }
}
