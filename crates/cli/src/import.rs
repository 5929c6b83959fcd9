//! CSV import: write identifier files into the directories named by the
//! rows. Column roles resolve by exact header name or 1-based index.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use tracing::{info, warn};

use nfoforge_scanner::ids;

use crate::prompt;

#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub input: PathBuf,
    pub dir: PathBuf,
    pub id_type: String,
    pub col_id: String,
    pub col_dir: String,
    pub col_file: Option<String>,
    pub dry_run: bool,
    pub overwrite: bool,
    pub interactive: bool,
}

pub fn run_import(cfg: &ImportConfig) -> anyhow::Result<()> {
    let mut reader = csv::Reader::from_path(&cfg.input)
        .with_context(|| format!("opening {}", cfg.input.display()))?;
    let headers = reader.headers()?.clone();

    // missing id/dir columns are a configuration error, fatal before any
    // row is processed
    let Some(id_index) = resolve_column(&headers, &cfg.col_id) else {
        bail!("ID column not found ('{}')", cfg.col_id);
    };
    let Some(dir_index) = resolve_column(&headers, &cfg.col_dir) else {
        bail!("Dir column not found ('{}')", cfg.col_dir);
    };
    let file_index = cfg
        .col_file
        .as_deref()
        .and_then(|col| resolve_column(&headers, col));
    info!(id = id_index, dir = dir_index, file = ?file_index, "column indices (0-based)");

    for row in reader.records() {
        let row = row?;
        let id = row.get(id_index).unwrap_or("").trim();
        if id.is_empty() {
            warn!(?row, "no ID, skipping row");
            continue;
        }
        let raw_dir = row.get(dir_index).unwrap_or("");
        if raw_dir.is_empty() {
            warn!(?row, "no directory, skipping row");
            continue;
        }
        let file = file_index
            .and_then(|i| row.get(i))
            .map(str::trim)
            .filter(|f| !f.is_empty());

        let dir = resolve_dir(&cfg.dir, raw_dir);
        info!(id, dir = %dir.display(), file = ?file, "row");

        if cfg.interactive && prompt::skip() {
            if prompt::proceed() {
                continue;
            }
            break;
        }

        if cfg.dry_run {
            match file {
                Some(file) => println!("{} -> {}", dir.join(file).display(), id),
                None => println!("{} -> {}", dir.display(), id),
            }
        } else {
            let base = match file {
                Some(file) => file.to_string(),
                None => ids::guess_file_name(&dir),
            };
            let id_path = dir.join(format!("{base}.{}", cfg.id_type));
            info!(file = %id_path.display(), "id file");
            if !cfg.overwrite && id_path.exists() {
                info!("already exists, skipping");
            } else {
                std::fs::write(&id_path, id)
                    .with_context(|| format!("writing {}", id_path.display()))?;
            }
        }

        if cfg.interactive && !prompt::proceed() {
            break;
        }
    }
    Ok(())
}

fn resolve_dir(base: &Path, raw: &str) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Header name match first, then a 1-based numeric index.
fn resolve_column(headers: &csv::StringRecord, column: &str) -> Option<usize> {
    if let Some(index) = headers.iter().position(|h| h == column) {
        return Some(index);
    }
    column
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .filter(|i| *i < headers.len())
}
