//! Generation orchestrator: drives walker, identifier store, provider
//! adapter, reconciler and serializer over the sorted directory sequence.
//!
//! One directory's failure never aborts the batch; outcomes are aggregated
//! into a run summary.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info, warn};

use nfoforge_core::{
    EpisodeOptions, FanartOptions, ResolvedFanart, TitleKind, TitleRecord, WriteOptions,
};
use nfoforge_metadata::{ImdbClient, MetadataProvider, OmdbClient};
use nfoforge_nfo::{
    episode_nfo_path, movie_nfo_path, multi_episode_path, render_episode, render_title,
    tvshow_nfo_path, write_multi, write_nfo,
};
use nfoforge_scanner::episodes::{self, EpisodeMatcher};
use nfoforge_scanner::{ids, walk};

use crate::prompt;

/// Run-scoped settings shared by both backends, built once at startup and
/// passed by reference.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub dir: PathBuf,
    pub recursive: bool,
    pub pattern: String,
    pub delay: Duration,
    pub write: WriteOptions,
    pub fanart: FanartOptions,
    pub interactive: bool,
}

/// Episode generation settings for the IMDB backend.
#[derive(Debug, Clone, Default)]
pub struct EpisodeConfig {
    pub enabled: bool,
    pub opts: EpisodeOptions,
}

/// Per-directory terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirOutcome {
    Generated,
    SkippedExisting,
    NothingToDo,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub async fn run_imdb(
    client: &ImdbClient,
    cfg: &GenerateConfig,
    episodes: &EpisodeConfig,
) -> anyhow::Result<RunSummary> {
    run(cfg, |dir, id| process_imdb_dir(client, dir, id, cfg, episodes)).await
}

pub async fn run_omdb(client: &OmdbClient, cfg: &GenerateConfig) -> anyhow::Result<RunSummary> {
    run(cfg, |dir, id| process_omdb_dir(client, dir, id, cfg)).await
}

async fn run<F, Fut>(cfg: &GenerateConfig, mut process: F) -> anyhow::Result<RunSummary>
where
    F: FnMut(PathBuf, String) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<DirOutcome>>,
{
    let mut dirs = walk::collect_dirs(&cfg.dir, cfg.recursive)
        .with_context(|| format!("traversing {}", cfg.dir.display()))?;
    dirs.sort();
    info!(count = dirs.len(), "directories to process");

    // interactive mode paces itself, so the politeness delay is zeroed
    let delay = if cfg.interactive {
        Duration::ZERO
    } else {
        cfg.delay
    };

    let mut summary = RunSummary::default();
    'dirs: for dir in &dirs {
        info!(dir = %dir.display(), "current dir");
        let id_file_names = ids::id_files(dir, &cfg.pattern)?;

        for name in &id_file_names {
            let id_path = dir.join(name);
            info!(file = %id_path.display(), "id file");
            let id = match ids::read_id(&id_path) {
                Ok(id) => id,
                Err(e) => {
                    error!(file = %id_path.display(), error = %e, "cannot read id file");
                    summary.failed += 1;
                    continue;
                }
            };
            info!(id = %id, "id");

            if cfg.interactive && prompt::skip() {
                summary.skipped += 1;
                if prompt::proceed() {
                    continue;
                }
                break 'dirs;
            }

            // per-directory error boundary: log and keep the batch alive
            let generated = match process(dir.clone(), id).await {
                Ok(DirOutcome::Generated) => {
                    summary.generated += 1;
                    true
                }
                Ok(DirOutcome::SkippedExisting) | Ok(DirOutcome::NothingToDo) => {
                    summary.skipped += 1;
                    false
                }
                Err(e) => {
                    error!(dir = %dir.display(), error = %e, "processing failed");
                    summary.failed += 1;
                    false
                }
            };

            if cfg.interactive && !prompt::proceed() {
                break 'dirs;
            }
            if generated && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    info!(
        generated = summary.generated,
        skipped = summary.skipped,
        failed = summary.failed,
        "run complete"
    );
    Ok(summary)
}

async fn process_imdb_dir(
    client: &ImdbClient,
    dir: PathBuf,
    id: String,
    cfg: &GenerateConfig,
    episodes: &EpisodeConfig,
) -> anyhow::Result<DirOutcome> {
    if let Some(outcome) = skip_existing(&dir, &cfg.write) {
        return Ok(outcome);
    }

    let Some(record) = client.fetch_title(&id).await? else {
        return Ok(DirOutcome::NothingToDo);
    };

    let thumb = resolve_fanart(client, &record, &dir, cfg).await?;

    let mut generated = false;
    if record.kind == TitleKind::Series && episodes.enabled {
        generated |= generate_episodes(client, &dir, &id, &episodes.opts, &cfg.write).await?;
    }

    generated |= write_title(&record, thumb.as_deref(), &dir, &cfg.write)?;
    Ok(outcome_of(generated))
}

async fn process_omdb_dir(
    client: &OmdbClient,
    dir: PathBuf,
    id: String,
    cfg: &GenerateConfig,
) -> anyhow::Result<DirOutcome> {
    if let Some(outcome) = skip_existing(&dir, &cfg.write) {
        return Ok(outcome);
    }

    let id = ids::strip_id(&id);
    let Some(record) = client.fetch_title(&id).await? else {
        return Ok(DirOutcome::NothingToDo);
    };

    let thumb = resolve_fanart(client, &record, &dir, cfg).await?;
    let generated = write_title(&record, thumb.as_deref(), &dir, &cfg.write)?;
    Ok(outcome_of(generated))
}

fn skip_existing(dir: &Path, write: &WriteOptions) -> Option<DirOutcome> {
    if write.overwrite {
        return None;
    }
    let existing = ids::existing_nfo(dir)?;
    info!(path = %existing.display(), "sidecar already exists, skipping");
    Some(DirOutcome::SkippedExisting)
}

fn write_title(
    record: &TitleRecord,
    thumb: Option<&str>,
    dir: &Path,
    write: &WriteOptions,
) -> anyhow::Result<bool> {
    let xml = render_title(record, thumb)?;
    let path = match record.kind {
        TitleKind::Movie => movie_nfo_path(dir),
        TitleKind::Series => tvshow_nfo_path(dir),
    };
    Ok(write_nfo(&xml, &path, write)?)
}

fn outcome_of(generated: bool) -> DirOutcome {
    if generated {
        DirOutcome::Generated
    } else {
        DirOutcome::NothingToDo
    }
}

/// Resolve the fanart action once per title and carry it out. The returned
/// file name, when present, becomes the sidecar's `thumb` element.
async fn resolve_fanart<P: MetadataProvider + ?Sized>(
    provider: &P,
    record: &TitleRecord,
    dir: &Path,
    cfg: &GenerateConfig,
) -> anyhow::Result<Option<String>> {
    let target = dir.join(&cfg.fanart.file_name);
    match cfg.fanart.mode.resolve(&target) {
        ResolvedFanart::None => Ok(None),
        ResolvedFanart::UseExisting => Ok(Some(cfg.fanart.file_name.clone())),
        ResolvedFanart::Download => {
            let Some(url) = &record.poster_url else {
                warn!("no image associated, cannot download");
                return Ok(None);
            };
            if cfg.write.dry_run {
                info!(url = %url, "dry-run, skipping fanart download");
                return Ok(Some(cfg.fanart.file_name.clone()));
            }
            info!(url = %url, "downloading fanart");
            let resp = provider.download(url).await?;
            if !resp.is_ok() {
                error!(status = resp.status, url = %url, "failed to download fanart");
                return Ok(None);
            }
            std::fs::write(&target, &resp.body)
                .with_context(|| format!("writing fanart {}", target.display()))?;
            Ok(Some(cfg.fanart.file_name.clone()))
        }
    }
}

/// Series sub-procedure: reconcile disk seasons with remote episode data
/// and emit per-episode sidecars (or one concatenated file).
async fn generate_episodes(
    client: &ImdbClient,
    dir: &Path,
    id: &str,
    opts: &EpisodeOptions,
    write: &WriteOptions,
) -> anyhow::Result<bool> {
    let available = client.fetch_seasons(id).await?;
    info!(seasons = %available.join(", "), "available seasons");

    let matcher = EpisodeMatcher::new(opts)?;
    let files = episodes::locate_episode_files(dir, &matcher)?;
    let mut on_disk: Vec<String> = files
        .iter()
        .map(|f| f.season.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    on_disk.sort_by_key(|s| s.parse::<u64>().unwrap_or(u64::MAX));
    info!(seasons = %on_disk.join(", "), "seasons located on disk");

    // fetch only the seasons observed on disk
    let remote = client.fetch_episodes(id, &on_disk).await?;
    let pairs = episodes::reconcile(&files, &remote);

    let mut generated = false;
    if opts.multi_episode {
        let mut fragments = Vec::new();
        for (_, record) in &pairs {
            fragments.push(render_episode(record)?);
        }
        if !fragments.is_empty() {
            generated |= write_multi(&fragments, &multi_episode_path(dir), write)?;
        }
    } else {
        for (path, record) in &pairs {
            let xml = render_episode(record)?;
            generated |= write_nfo(&xml, &episode_nfo_path(path), write)?;
        }
    }
    Ok(generated)
}
