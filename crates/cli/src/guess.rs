//! Interactive guess flow: search a provider with the directory name,
//! present ranked candidates, persist the chosen identifier.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{error, info};

use nfoforge_metadata::MetadataProvider;
use nfoforge_scanner::{ids, walk};

use crate::prompt;

#[derive(Debug, Clone)]
pub struct GuessConfig {
    pub dir: PathBuf,
    pub recursive: bool,
    pub pattern: String,
    pub dry_run: bool,
    pub overwrite: bool,
}

pub async fn run_guess<P: MetadataProvider>(provider: &P, cfg: &GuessConfig) -> anyhow::Result<()> {
    let mut dirs = walk::collect_dirs(&cfg.dir, cfg.recursive)
        .with_context(|| format!("traversing {}", cfg.dir.display()))?;
    dirs.sort();
    info!(count = dirs.len(), "directories to process");

    for dir in &dirs {
        info!(dir = %dir.display(), "current dir");
        if !cfg.overwrite && !ids::id_files(dir, &cfg.pattern)?.is_empty() {
            continue;
        }

        let Some(name) = dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        println!("\n{name}\n{}", "=".repeat(name.len()));

        match guess_dir(provider, dir, &name, cfg).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => error!(dir = %dir.display(), error = %e, "guess failed"),
        }
    }
    Ok(())
}

/// Returns whether to continue with the next directory.
async fn guess_dir<P: MetadataProvider>(
    provider: &P,
    dir: &Path,
    title: &str,
    cfg: &GuessConfig,
) -> anyhow::Result<bool> {
    let hits = provider.search_title(title).await?;

    let meta_path = dir.join(format!("{title}.imdb"));
    let current = if meta_path.exists() {
        ids::read_id(&meta_path).ok()
    } else {
        None
    };

    let mut choices: Vec<String> = Vec::new();
    if hits.is_empty() {
        println!("0. No results, continue...");
    } else {
        for (i, hit) in hits.iter().enumerate() {
            let marker = if current.as_deref() == Some(hit.id.as_str()) {
                " <-- current"
            } else {
                ""
            };
            println!("{}. {}: {}{}", i + 1, hit.id, hit.title, marker);
            choices.push((i + 1).to_string());
        }
        println!("0. None of the above, continue...");
    }
    println!("X. Exit");
    choices.push("0".to_string());
    choices.push("X".to_string());

    let choice_refs: Vec<&str> = choices.iter().map(String::as_str).collect();
    let message = format!("Your selection ({})? ", choice_refs.join("/"));
    let Some(choice) = prompt::prompt(&message, &choice_refs) else {
        return Ok(false);
    };

    match choice.as_str() {
        "X" => {
            println!("User requested exit.");
            Ok(false)
        }
        "0" => Ok(true),
        number => {
            let index: usize = number.parse()?;
            let id = &hits[index - 1].id;
            if cfg.dry_run {
                println!("{id}");
            } else {
                info!(id = %id, file = %meta_path.display(), "writing id file");
                std::fs::write(&meta_path, id)
                    .with_context(|| format!("writing {}", meta_path.display()))?;
            }
            Ok(true)
        }
    }
}
