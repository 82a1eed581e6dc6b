//! Pruning of files a Lambda layer does not need
//!
//! Removes compiled bytecode, package metadata directories and test, example
//! or benchmark directories. A directory such as `tests` is only removed when
//! its parent's name also mentions tests, examples or benchmarks, so a package
//! that legitimately ships a module named `test` keeps it.

use crate::Result;
use std::fs;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Bytecode file suffixes
const BYTECODE_SUFFIXES: &[&str] = &[".pyc", ".pyo", ".pyd"];

/// Bytecode cache directory name
const BYTECODE_DIR: &str = "__pycache__";

/// Directory names that are candidates for removal
const TEST_DIR_NAMES: &[&str] = &[
    "tests",
    "test",
    "testing",
    "examples",
    "example",
    "benchmarks",
    "benchmark",
];

/// A candidate's parent must contain one of these (lower-cased)
const TEST_PARENT_KEYWORDS: &[&str] = &["test", "example", "benchmark"];

/// Package metadata directory suffixes
const METADATA_SUFFIXES: &[&str] = &[".dist-info", ".egg-info"];

/// Why an entry is pruned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneReason {
    Bytecode,
    TestDirectory,
    Metadata,
}

fn parent_mentions_tests(entry: &DirEntry) -> bool {
    let parent_name = entry
        .path()
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    TEST_PARENT_KEYWORDS.iter().any(|kw| parent_name.contains(kw))
}

/// Decide whether a walked entry should be removed
pub fn classify(entry: &DirEntry) -> Option<PruneReason> {
    let name = entry.file_name().to_string_lossy();
    let file_type = entry.file_type();

    if file_type.is_dir() {
        if name == BYTECODE_DIR {
            return Some(PruneReason::Bytecode);
        }
        if METADATA_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            return Some(PruneReason::Metadata);
        }
        if TEST_DIR_NAMES.contains(&&*name) && parent_mentions_tests(entry) {
            return Some(PruneReason::TestDirectory);
        }
        None
    } else if file_type.is_file() && BYTECODE_SUFFIXES.iter().any(|s| name.ends_with(s)) {
        Some(PruneReason::Bytecode)
    } else {
        None
    }
}

/// Remove unneeded files and directories under `layer_dir`
///
/// Returns the number of removed entries. A removed directory counts once,
/// whatever it contained.
pub fn prune_layer_dir(layer_dir: &Path) -> Result<usize> {
    let mut removed = 0;
    let mut walker = WalkDir::new(layer_dir).min_depth(1).into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry?;
        let Some(reason) = classify(&entry) else {
            continue;
        };

        tracing::trace!("Pruning {} ({:?})", entry.path().display(), reason);
        if entry.file_type().is_dir() {
            walker.skip_current_dir();
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
        removed += 1;
    }

    Ok(removed)
}
