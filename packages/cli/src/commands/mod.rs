pub mod apply;
pub mod check;
pub mod init;
pub mod show;

pub use apply::{apply, ApplyArgs};
pub use check::{check, CheckArgs};
pub use init::{init, InitArgs};
pub use show::{show, ShowArgs};

use crate::config::Config;
use anyhow::{Context, Result};
use folio_editor::Document;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve a document path against the working directory
pub(crate) fn resolve(cwd: &str, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        PathBuf::from(cwd).join(file)
    }
}

/// Read a document file with the project's catalog and removal policy
pub(crate) fn open_document(cwd: &str, file: &Path) -> Result<(Document, PathBuf)> {
    let config = Config::load(cwd)?;
    let path = resolve(cwd, file);
    debug!(path = %path.display(), "Opening document");

    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let doc = Document::from_json(&json, config.load_catalog(cwd)?)
        .with_context(|| format!("Cannot load {}", path.display()))?
        .with_config(config.editor_config());

    Ok((doc, path))
}
