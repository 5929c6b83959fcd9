//! CSV export: one row per discovered identifier, from id files first and
//! then from sidecars whose stem was not already covered.

use std::collections::BTreeSet;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use nfoforge_nfo::read_id_from_nfo;
use nfoforge_scanner::{ids, walk};

use crate::prompt;

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub dir: PathBuf,
    pub recursive: bool,
    pub pattern: String,
    pub output: PathBuf,
    pub id_type: String,
    pub interactive: bool,
}

pub fn run_export(cfg: &ExportConfig) -> anyhow::Result<()> {
    let mut dirs = walk::collect_dirs(&cfg.dir, cfg.recursive)
        .with_context(|| format!("traversing {}", cfg.dir.display()))?;
    dirs.sort();
    info!(count = dirs.len(), "directories to process");

    let file = std::fs::File::create(&cfg.output)
        .with_context(|| format!("creating {}", cfg.output.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "Directory,File,ID")?;

    for dir in &dirs {
        info!(dir = %dir.display(), "current dir");
        if cfg.interactive && prompt::skip() {
            if prompt::proceed() {
                continue;
            }
            break;
        }

        let mut processed: BTreeSet<String> = BTreeSet::new();

        for name in ids::id_files(dir, &cfg.pattern)? {
            let id_path = dir.join(&name);
            let id = ids::read_id(&id_path)
                .with_context(|| format!("reading {}", id_path.display()))?;
            info!(id = %id, "id");
            let stem = file_stem(&name);
            processed.insert(stem.to_string());
            write_row(&mut out, dir, stem, &id)?;
        }

        for name in ids::id_files(dir, "*.nfo")? {
            let stem = file_stem(&name);
            if processed.contains(stem) {
                continue;
            }
            let nfo_path = dir.join(&name);
            let id = read_id_from_nfo(&nfo_path, &cfg.id_type)
                .with_context(|| format!("reading {}", nfo_path.display()))?;
            info!(id = %id, "id");
            write_row(&mut out, dir, stem, &id)?;
        }

        if cfg.interactive && !prompt::proceed() {
            break;
        }
    }

    out.flush()?;
    Ok(())
}

/// Directory and file are quoted, the identifier is not.
fn write_row<W: Write>(out: &mut W, dir: &Path, name: &str, id: &str) -> std::io::Result<()> {
    writeln!(out, "\"{}\",\"{}\",{}", dir.display(), name.replace('"', ""), id)
}

fn file_stem(name: &str) -> &str {
    name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_id_files_and_uncovered_sidecars() {
        let tmp = tempfile::tempdir().unwrap();
        let movie = tmp.path().join("Movie (2020)");
        std::fs::create_dir(&movie).unwrap();
        std::fs::write(movie.join("Movie (2020).imdb"), "tt1\n").unwrap();
        std::fs::write(
            movie.join("Movie (2020).nfo"),
            "<movie><uniqueid type=\"imdb\">tt1</uniqueid></movie>",
        )
        .unwrap();

        let other = tmp.path().join("Other");
        std::fs::create_dir(&other).unwrap();
        std::fs::write(
            other.join("Other.nfo"),
            "<movie><uniqueid type=\"imdb\">tt2</uniqueid></movie>",
        )
        .unwrap();

        let output = tmp.path().join("kodi.csv");
        let cfg = ExportConfig {
            dir: tmp.path().to_path_buf(),
            recursive: true,
            pattern: "*.imdb".to_string(),
            output: output.clone(),
            id_type: "imdb".to_string(),
            interactive: false,
        };
        run_export(&cfg).unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Directory,File,ID");
        // the id file row covers the sidecar with the same stem
        assert_eq!(
            content.matches("\"Movie (2020)\",tt1").count(),
            1,
            "{content}"
        );
        assert!(content.contains("\"Other\",tt2"));
        assert_eq!(lines.len(), 3);
    }
}
