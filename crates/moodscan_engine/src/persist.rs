//! Whole-file replacement for the history file, CSV exports and artifacts.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{0:?} is not a directory")]
    NotADirectory(PathBuf),
    #[error("could not write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Replaces `dir/filename` with `content` through a sibling temp file, creating
/// `dir` if needed. Readers see either the old file or the new one.
pub fn replace_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
    if dir.exists() && !dir.is_dir() {
        return Err(PersistError::NotADirectory(dir.to_path_buf()));
    }
    let target = dir.join(filename);
    let failed = |source: io::Error| PersistError::Write {
        path: target.clone(),
        source,
    };

    fs::create_dir_all(dir).map_err(failed)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(failed)?;
    tmp.write_all(content).map_err(failed)?;
    tmp.as_file().sync_all().map_err(failed)?;
    tmp.persist(&target).map_err(|err| failed(err.error))?;
    Ok(target)
}
