//! Environment loading
//!
//! Reads an optional `.env` file and resolves the AWS region. Variables that
//! are already set in the process environment win over the file.

use crate::{Error, Reporter, Result};
use std::fs;
use std::path::Path;

/// Name of the optional environment file in the working directory
pub const ENV_FILE_NAME: &str = ".env";

/// Region variables, in lookup order
pub const REGION_VARS: &[&str] = &["AWS_DEFAULT_REGION", "AWS_REGION"];

/// Parse `KEY=VALUE` lines, skipping blanks and `#` comments
///
/// Surrounding whitespace and single or double quotes are stripped from
/// values. Lines without `=` are ignored.
pub fn parse_env_file(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.trim().to_string(), value.to_string())
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Load `dir/.env` into the process environment without overriding existing variables
///
/// Returns the number of variables set. A missing file is not an error.
/// Must be called before any other threads are started.
pub fn load_env_file(dir: &Path, reporter: &Reporter) -> Result<usize> {
    let path = dir.join(ENV_FILE_NAME);
    if !path.is_file() {
        reporter.info("No .env file found, using system environment variables");
        return Ok(0);
    }

    reporter.info("Found .env file, loading configuration");
    let content = fs::read_to_string(&path)?;

    let mut loaded = 0;
    for (key, value) in parse_env_file(&content) {
        if std::env::var_os(&key).is_some() {
            tracing::debug!("Keeping existing {} over .env value", key);
            continue;
        }
        std::env::set_var(&key, value);
        loaded += 1;
    }

    reporter.success("Environment variables loaded from .env file");
    reporter.detail("Variables loaded", &loaded.to_string());
    Ok(loaded)
}

/// Resolve the region from a variable lookup; empty values count as unset
pub fn region_from<F>(lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    REGION_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .ok_or(Error::MissingRegion)
}

/// Resolve the region from the process environment
pub fn resolve_region() -> Result<String> {
    region_from(|var| std::env::var(var).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_env_file() {
        let content = r#"
# AWS settings
AWS_DEFAULT_REGION=us-east-1
AWS_ACCESS_KEY_ID = "AKIAEXAMPLE"
AWS_SECRET_ACCESS_KEY='secret=with=equals'
not a pair
"#;
        let vars = parse_env_file(content);
        assert_eq!(
            vars,
            vec![
                ("AWS_DEFAULT_REGION".to_string(), "us-east-1".to_string()),
                ("AWS_ACCESS_KEY_ID".to_string(), "AKIAEXAMPLE".to_string()),
                ("AWS_SECRET_ACCESS_KEY".to_string(), "secret=with=equals".to_string()),
            ]
        );
    }

    #[test]
    fn test_region_prefers_default_region() {
        let region = region_from(lookup(&[
            ("AWS_DEFAULT_REGION", "eu-west-1"),
            ("AWS_REGION", "us-east-2"),
        ]));
        assert_eq!(region.unwrap(), "eu-west-1");
    }

    #[test]
    fn test_region_falls_back_to_aws_region() {
        let region =
            region_from(lookup(&[("AWS_DEFAULT_REGION", ""), ("AWS_REGION", "us-east-2")]));
        assert_eq!(region.unwrap(), "us-east-2");
    }

    #[test]
    fn test_missing_region() {
        assert!(matches!(region_from(lookup(&[])), Err(Error::MissingRegion)));
    }

    #[test]
    fn test_load_sets_only_unset_variables() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(ENV_FILE_NAME),
            "LAYERPACK_TEST_ENV_NEW=from-file\nLAYERPACK_TEST_ENV_KEPT=from-file\n",
        )
        .unwrap();
        std::env::set_var("LAYERPACK_TEST_ENV_KEPT", "from-process");

        let loaded = load_env_file(temp_dir.path(), &Reporter::silent()).unwrap();

        assert_eq!(loaded, 1);
        assert_eq!(std::env::var("LAYERPACK_TEST_ENV_NEW").unwrap(), "from-file");
        assert_eq!(std::env::var("LAYERPACK_TEST_ENV_KEPT").unwrap(), "from-process");
    }

    #[test]
    fn test_missing_env_file_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(load_env_file(temp_dir.path(), &Reporter::silent()).unwrap(), 0);
    }
}
