use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use nfoforge_core::{EpisodeOptions, EpisodeRecord};

use crate::{ScanError, glob, walk};

/// Compiled filename-matching rules for locating episode files.
pub struct EpisodeMatcher {
    patterns: Vec<Regex>,
    season: Regex,
    episode: Regex,
}

impl EpisodeMatcher {
    pub fn new(opts: &EpisodeOptions) -> Result<Self, ScanError> {
        let patterns = opts
            .patterns
            .iter()
            .map(|p| glob::compile(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns,
            season: compile_group(&opts.season_group)?,
            episode: compile_group(&opts.episode_group)?,
        })
    }

    /// Extract the normalized (season, episode) pair from a filename.
    ///
    /// Both regexes must match with exactly one capture group; the captures
    /// are parsed as integers and re-rendered without leading zeros, so
    /// `S01E02`, `S1E2` and `S001E002` all yield `("1", "2")`. Anything
    /// else is silently excluded.
    pub fn extract(&self, name: &str) -> Option<(String, String)> {
        let season = single_group(&self.season, name)?;
        let episode = single_group(&self.episode, name)?;
        Some((season, episode))
    }

    fn prefilter(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(name))
    }
}

fn compile_group(pattern: &str) -> Result<Regex, ScanError> {
    Regex::new(pattern).map_err(|e| ScanError::Pattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

fn single_group(re: &Regex, name: &str) -> Option<String> {
    if re.captures_len() != 2 {
        return None;
    }
    let caps = re.captures(name)?;
    let raw = caps.get(1)?.as_str();
    let n: u32 = raw.parse().ok()?;
    Some(n.to_string())
}

/// An episode file found on disk with its normalized season/episode keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeFile {
    pub path: PathBuf,
    pub season: String,
    pub episode: String,
}

/// Scan the directory subtree and build the season -> episodes map observed
/// on disk. Purely derived, rebuilt on every run.
pub fn scan_disk(
    root: &Path,
    matcher: &EpisodeMatcher,
) -> Result<BTreeMap<String, BTreeSet<String>>, ScanError> {
    let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for file in locate_episode_files(root, matcher)? {
        map.entry(file.season).or_default().insert(file.episode);
    }
    Ok(map)
}

/// Locate every episode file under `root`: glob pre-filter, then
/// season/episode extraction. Sidecar files are never episode files.
///
/// When the same (season, episode) pair appears under two different files,
/// the first match in sorted walk order wins, deterministically.
pub fn locate_episode_files(
    root: &Path,
    matcher: &EpisodeMatcher,
) -> Result<Vec<EpisodeFile>, ScanError> {
    let mut dirs = walk::collect_dirs(root, true)?;
    dirs.sort();

    let mut seen: BTreeSet<(String, String)> = BTreeSet::new();
    let mut files = Vec::new();
    for dir in &dirs {
        let names = walk::list_file_names(dir)?;
        for name in &names {
            if name.ends_with(".nfo") || !matcher.prefilter(name) {
                continue;
            }
            let Some((season, episode)) = matcher.extract(name) else {
                continue;
            };
            if !seen.insert((season.clone(), episode.clone())) {
                debug!(file = %name, season = %season, episode = %episode, "duplicate episode file, keeping first");
                continue;
            }
            files.push(EpisodeFile {
                path: dir.join(name),
                season,
                episode,
            });
        }
    }
    Ok(files)
}

/// Pair disk files with remote episode records: a pairing is produced only
/// when the (season, episode) key exists on both sides. Remote-only records
/// have no file to attach to; disk-only files have no record.
pub fn reconcile(
    files: &[EpisodeFile],
    remote: &BTreeMap<String, BTreeMap<String, EpisodeRecord>>,
) -> Vec<(PathBuf, EpisodeRecord)> {
    files
        .iter()
        .filter_map(|f| {
            remote
                .get(&f.season)
                .and_then(|eps| eps.get(&f.episode))
                .map(|rec| (f.path.clone(), rec.clone()))
        })
        .collect()
}
