use serde::{Deserialize, Serialize};

use crate::types::FanartMode;

/// Request headers applied to every provider fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Preferred language for titles (ISO 639-1), sent as `Accept-Language`.
    pub language: String,
    /// `User-Agent` header; empty string disables it.
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            user_agent: "Mozilla".to_string(),
        }
    }
}

/// How episode files are located on disk and matched against remote data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeOptions {
    /// Shell glob(s) pre-filtering candidate filenames; applied independently
    /// and unioned.
    pub patterns: Vec<String>,
    /// Regex extracting the season number (exactly one capture group).
    pub season_group: String,
    /// Regex extracting the episode number (exactly one capture group).
    pub episode_group: String,
    /// Concatenate all episode fragments into one multi-episode file.
    pub multi_episode: bool,
}

impl Default for EpisodeOptions {
    fn default() -> Self {
        Self {
            patterns: vec!["*S??E??*.*".to_string()],
            season_group: ".*S([0-9]+)E.*".to_string(),
            episode_group: ".*E([0-9]+).*".to_string(),
            multi_episode: false,
        }
    }
}

/// Sidecar write behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOptions {
    pub dry_run: bool,
    pub overwrite: bool,
}

/// Fanart handling for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanartOptions {
    pub mode: FanartMode,
    pub file_name: String,
}

impl Default for FanartOptions {
    fn default() -> Self {
        Self {
            mode: FanartMode::None,
            file_name: "folder.jpg".to_string(),
        }
    }
}
