//! Discovery of input documents under a root directory.

use crate::error::{EtlError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const INPUT_EXTENSION: &str = "json";

/// Lazily yields the absolute paths of `*.json` files below a root, walking
/// directories recursively in file-name order. Symlinks are followed.
pub struct JsonFiles {
    inner: walkdir::IntoIter,
}

pub fn json_files(root: &Path) -> Result<JsonFiles> {
    let root = root.canonicalize().map_err(|source| EtlError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    Ok(JsonFiles {
        inner: WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter(),
    })
}

impl Iterator for JsonFiles {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                    return Some(Err(EtlError::Io { path, source }));
                }
            };

            let is_json = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == INPUT_EXTENSION)
                .unwrap_or(false);

            if entry.file_type().is_file() && is_json {
                return Some(Ok(entry.into_path()));
            }
        }
    }
}
