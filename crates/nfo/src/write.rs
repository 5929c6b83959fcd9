use std::path::Path;

use tracing::info;

use nfoforge_core::WriteOptions;

use crate::NfoError;

/// Write sidecar content.
///
/// Dry-run prints to stdout and never touches the filesystem. An existing
/// file without overwrite is skipped, not an error. Returns whether a file
/// was actually written.
pub fn write_nfo(content: &str, path: &Path, opts: &WriteOptions) -> Result<bool, NfoError> {
    if opts.dry_run {
        println!("{content}");
        return Ok(false);
    }
    if path.exists() && !opts.overwrite {
        info!(path = %path.display(), "file already exists, skipping");
        return Ok(false);
    }
    info!(path = %path.display(), "writing file");
    std::fs::write(path, format!("{content}\n"))?;
    Ok(true)
}

/// Concatenate episode fragments into one document, keeping only the first
/// fragment's XML prolog, then write with the usual semantics.
pub fn write_multi(
    fragments: &[String],
    path: &Path,
    opts: &WriteOptions,
) -> Result<bool, NfoError> {
    let mut lines: Vec<&str> = Vec::new();
    for (index, fragment) in fragments.iter().enumerate() {
        for (line_no, line) in fragment.lines().enumerate() {
            if index > 0 && line_no == 0 && line.contains("<?xml") {
                continue;
            }
            lines.push(line);
        }
    }
    write_nfo(&lines.join("\n"), path, opts)
}
