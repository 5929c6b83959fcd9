use std::path::{Path, PathBuf};

use tracing::debug;

use nfoforge_core::TVSHOW_FILENAME;

use crate::{ScanError, glob, walk};

/// Read the identifier from an id file: first line, whitespace-trimmed.
pub fn read_id(path: &Path) -> Result<String, ScanError> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.lines().next().unwrap_or("").trim().to_string())
}

/// Normalize an identifier for API use: strip any query suffix and, when the
/// value is a full title URL, keep only the id segment after `/title/`.
/// Anything else is passed through as an opaque string.
pub fn strip_id(raw: &str) -> String {
    let mut id = raw.trim();
    if let Some(pos) = id.find('?') {
        id = &id[..pos];
    }
    if let Some(pos) = id.find("/title/") {
        id = &id[pos + "/title/".len()..];
    }
    id.trim_end_matches('/').to_string()
}

/// The sidecar already present in `dir`, if any: the movie-style
/// `<basename>.nfo` first, then the fixed series sidecar.
pub fn existing_nfo(dir: &Path) -> Option<PathBuf> {
    if let Some(name) = dir.file_name() {
        let movie = dir.join(format!("{}.nfo", name.to_string_lossy()));
        if movie.exists() {
            return Some(movie);
        }
    }
    let tvshow = dir.join(TVSHOW_FILENAME);
    if tvshow.exists() {
        return Some(tvshow);
    }
    None
}

/// File names in `dir` matching the id-file glob, sorted.
pub fn id_files(dir: &Path, pattern: &str) -> Result<Vec<String>, ScanError> {
    let re = glob::compile(pattern)?;
    let names = walk::list_file_names(dir)?;
    Ok(glob::filter(&names, &re)
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// Guess the base filename (without extension) for a directory: a single
/// `.nfo`, then a single video file, then the directory basename.
pub fn guess_file_name(dir: &Path) -> String {
    let names = walk::list_file_names(dir).unwrap_or_default();
    for ext in ["nfo", "mp4", "mkv", "avi"] {
        let matching: Vec<&String> = names
            .iter()
            .filter(|n| n.to_lowercase().ends_with(&format!(".{ext}")))
            .collect();
        if matching.len() == 1 {
            let stem = matching[0]
                .rsplit_once('.')
                .map(|(stem, _)| stem)
                .unwrap_or(matching[0]);
            debug!(dir = %dir.display(), name = %stem, "guessed file name");
            return stem.to_string();
        }
    }
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
