//! Regex-based file renaming, typically used to bring `1x02`-style episode
//! names into the `S01E02` convention before generation.

use std::path::{Path, PathBuf};

use anyhow::Context;
use regex::Regex;
use tracing::{debug, error, info};

use nfoforge_scanner::{ScanError, walk};

#[derive(Debug, Clone)]
pub struct RenameConfig {
    pub dir: PathBuf,
    pub find: String,
    pub replace: String,
    pub recursive: bool,
    pub dry_run: bool,
}

pub fn run_rename(cfg: &RenameConfig) -> anyhow::Result<()> {
    // an unparseable pattern is a configuration error, fatal up front
    let find = Regex::new(&cfg.find)
        .with_context(|| format!("invalid find pattern `{}`", cfg.find))?;
    let anchored = Regex::new(&format!("^(?:{})", cfg.find))
        .with_context(|| format!("invalid find pattern `{}`", cfg.find))?;

    let mut dirs = walk::collect_dirs(&cfg.dir, cfg.recursive)
        .with_context(|| format!("traversing {}", cfg.dir.display()))?;
    dirs.sort();
    info!(count = dirs.len(), "directories to process");

    for dir in &dirs {
        info!(dir = %dir.display(), "current dir");
        if let Err(e) = rename_in_dir(dir, &anchored, &find, &cfg.replace, cfg.dry_run) {
            error!(dir = %dir.display(), error = %e, "rename failed");
        }
    }
    Ok(())
}

fn rename_in_dir(
    dir: &Path,
    anchored: &Regex,
    find: &Regex,
    replace: &str,
    dry_run: bool,
) -> Result<(), ScanError> {
    for name in walk::list_file_names(dir)? {
        if !anchored.is_match(&name) {
            continue;
        }
        let renamed = find.replace_all(&name, replace).into_owned();
        debug!(from = %name, to = %renamed, "match");
        if renamed == name {
            continue;
        }
        if dry_run {
            println!("{name} -> {renamed}");
        } else {
            debug!("renaming file");
            std::fs::rename(dir.join(&name), dir.join(&renamed))?;
        }
    }
    Ok(())
}
