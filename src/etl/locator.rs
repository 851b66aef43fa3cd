//! Source file discovery.

use super::error::EtlError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Returns the absolute paths of every file under `root` (recursively) whose
/// extension is `extension`, sorted so the order does not depend on the
/// directory traversal order.
///
/// Hidden files (name starting with a dot) are skipped; hidden directories are
/// still walked. Returns an empty list, not an error, when nothing matches.
pub fn find_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>, EtlError> {
    let root = root.canonicalize().map_err(|source| EtlError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root.as_path()).to_path_buf();
            EtlError::Io {
                path,
                source: e.into(),
            }
        })?;
        if entry.file_type().is_file()
            && !is_hidden(&entry)
            && entry.path().extension() == Some(OsStr::new(extension))
        {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}
