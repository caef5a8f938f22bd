//! Index directory resolution for the CLI.
//!
//! A documentation build drops its search index next to the generated
//! pages; this module finds it without requiring a flag on every call.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use waystone_core::config::MANIFEST_FILE_NAME;

/// Environment variable overriding the index directory.
const INDEX_DIR_ENV: &str = "WAYSTONE_INDEX_DIR";

/// Conventional index directory inside a documentation build.
const DEFAULT_INDEX_DIR: &str = "search";

/// Finds the index directory containing `manifest.json` and shard files.
///
/// Search order:
/// 1. `--index-dir` flag
/// 2. `$WAYSTONE_INDEX_DIR` environment variable
/// 3. `./search` (the generator's conventional output location)
pub fn find_index_dir(flag: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return require_manifest(dir.clone());
    }

    if let Ok(dir) = std::env::var(INDEX_DIR_ENV) {
        return require_manifest(PathBuf::from(dir));
    }

    require_manifest(PathBuf::from(DEFAULT_INDEX_DIR))
}

fn require_manifest(dir: PathBuf) -> Result<PathBuf> {
    if manifest_exists(&dir) {
        Ok(dir)
    } else {
        Err(anyhow!(
            "no search index at {} (expected {}).\n\
             Point --index-dir or ${} at a documentation build's search directory.",
            dir.display(),
            MANIFEST_FILE_NAME,
            INDEX_DIR_ENV
        ))
    }
}

fn manifest_exists(dir: &Path) -> bool {
    dir.join(MANIFEST_FILE_NAME).exists()
}
