//! Zip archive creation for layer contents

use crate::{Reporter, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Cursor};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Report compression progress every this many files
const PROGRESS_INTERVAL: usize = 100;

/// A compressed layer ready for upload
#[derive(Debug, Clone)]
pub struct LayerArchive {
    pub bytes: Vec<u8>,
    pub file_count: usize,
}

impl LayerArchive {
    pub fn size_mb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0 / 1024.0
    }

    /// Hex-encoded SHA256 of the archive bytes
    pub fn sha256(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

/// Archive entry name for `path`: relative to `root`, `/`-separated
fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|e| crate::Error::Other(format!("{}: {}", path.display(), e)))?;

    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

#[cfg(unix)]
fn file_options(base: SimpleFileOptions, metadata: &std::fs::Metadata) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;
    base.unix_permissions(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn file_options(base: SimpleFileOptions, _metadata: &std::fs::Metadata) -> SimpleFileOptions {
    base
}

/// Deflate-compress every regular file under `source_dir`
///
/// Entry names are relative to `source_dir`, so a staging root containing
/// `python/` yields entries that all start with `python/`.
pub fn zip_directory(source_dir: &Path, reporter: &Reporter) -> Result<LayerArchive> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    let total = files.len();
    reporter.detail("Files to compress", &total.to_string());

    let base = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for (i, path) in files.iter().enumerate() {
        let name = entry_name(source_dir, path)?;
        let mut file = File::open(path)?;
        let options = file_options(base, &file.metadata()?);

        writer.start_file(name, options)?;
        io::copy(&mut file, &mut writer)?;

        let done = i + 1;
        if done % PROGRESS_INTERVAL == 0 || done == total {
            reporter.progress("Compressing files", Some(&format!("{}/{}", done, total)));
        }
    }

    let bytes = writer.finish()?.into_inner();
    Ok(LayerArchive {
        bytes,
        file_count: total,
    })
}
