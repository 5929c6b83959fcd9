use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed sidecar filename for series directories.
pub const TVSHOW_FILENAME: &str = "tvshow.nfo";
/// Fixed sidecar filename holding concatenated episode fragments.
pub const MULTI_EPISODE_FILENAME: &str = "multi-episode.nfo";

/// What kind of title a record describes; decides the sidecar root tag
/// and the sidecar filename convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleKind {
    Movie,
    Series,
}

impl TitleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "tvshow",
        }
    }
}

impl std::fmt::Display for TitleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cast entry. Only the name survives into the sidecar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
}

/// Aggregate rating attached to a title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleRating {
    pub name: String,
    pub max: u8,
    pub value: f64,
}

impl TitleRating {
    pub fn imdb(value: f64) -> Self {
        Self {
            name: "imdb".to_string(),
            max: 10,
            value,
        }
    }
}

/// Normalized metadata for one title, built fresh per fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleRecord {
    /// Provider-qualified external id, always present (attributed to "imdb").
    pub id: String,
    pub title: String,
    pub original_title: Option<String>,
    pub plot: Option<String>,
    pub mpaa: Option<String>,
    pub premiered: Option<NaiveDate>,
    pub directors: Vec<String>,
    pub genres: Vec<String>,
    pub cast: Vec<CastMember>,
    pub trailer: Option<String>,
    pub rating: Option<TitleRating>,
    pub poster_url: Option<String>,
    pub kind: TitleKind,
}

impl TitleRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            original_title: None,
            plot: None,
            mpaa: None,
            premiered: None,
            directors: Vec::new(),
            genres: Vec::new(),
            cast: Vec::new(),
            trailer: None,
            rating: None,
            poster_url: None,
            kind: TitleKind::Movie,
        }
    }
}

/// Rating attached to an episode; votes are not always recoverable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRating {
    pub value: f64,
    pub votes: Option<u64>,
}

/// Normalized metadata for one episode of a series.
///
/// Season and episode numbers are kept as decimal strings without leading
/// zeros so that disk-derived and provider-derived keys compare equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub season: String,
    pub episode: String,
    pub title: String,
    pub plot: Option<String>,
    pub aired: Option<NaiveDate>,
    pub id: Option<String>,
    pub rating: Option<EpisodeRating>,
}

impl EpisodeRecord {
    pub fn new(
        season: impl Into<String>,
        episode: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            season: season.into(),
            episode: episode.into(),
            title: title.into(),
            plot: None,
            aired: None,
            id: None,
            rating: None,
        }
    }
}

/// One entry of a provider search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
}

/// How to handle fanart, as requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FanartMode {
    None,
    Download,
    DownloadMissing,
    UseExisting,
}

/// The resolved fanart action that actually drives serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFanart {
    None,
    Download,
    UseExisting,
}

impl FanartMode {
    /// Resolve against the target file: `DownloadMissing` becomes
    /// `UseExisting` when the file is already there, `Download` otherwise.
    pub fn resolve(self, target: &Path) -> ResolvedFanart {
        match self {
            Self::None => ResolvedFanart::None,
            Self::Download => ResolvedFanart::Download,
            Self::UseExisting => ResolvedFanart::UseExisting,
            Self::DownloadMissing => {
                if target.exists() {
                    ResolvedFanart::UseExisting
                } else {
                    ResolvedFanart::Download
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tag_names() {
        assert_eq!(TitleKind::Movie.as_str(), "movie");
        assert_eq!(TitleKind::Series.as_str(), "tvshow");
    }

    #[test]
    fn fanart_download_missing_resolves_on_file_presence() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("folder.jpg");

        assert_eq!(
            FanartMode::DownloadMissing.resolve(&target),
            ResolvedFanart::Download
        );

        std::fs::write(&target, b"jpg").unwrap();
        assert_eq!(
            FanartMode::DownloadMissing.resolve(&target),
            ResolvedFanart::UseExisting
        );
    }

    #[test]
    fn fanart_none_stays_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            FanartMode::None.resolve(&dir.path().join("folder.jpg")),
            ResolvedFanart::None
        );
    }
}
