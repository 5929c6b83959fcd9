use std::path::{Path, PathBuf};

use nfoforge_core::{MULTI_EPISODE_FILENAME, TVSHOW_FILENAME};

/// Movie sidecar: `<directory>/<directory-basename>.nfo`.
pub fn movie_nfo_path(dir: &Path) -> PathBuf {
    let basename = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dir.join(format!("{basename}.nfo"))
}

/// Series sidecar: fixed filename inside the directory.
pub fn tvshow_nfo_path(dir: &Path) -> PathBuf {
    dir.join(TVSHOW_FILENAME)
}

/// Episode sidecar: next to the episode file, same stem.
pub fn episode_nfo_path(video_file: &Path) -> PathBuf {
    video_file.with_extension("nfo")
}

/// Concatenated multi-episode sidecar for a series directory.
pub fn multi_episode_path(dir: &Path) -> PathBuf {
    dir.join(MULTI_EPISODE_FILENAME)
}
