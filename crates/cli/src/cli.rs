use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use nfoforge_core::FanartMode;

/// Generates media-center sidecar files from per-title identifier files,
/// with metadata retrieved from internet sources.
#[derive(Parser)]
#[command(name = "nfoforge", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Use IMDB as backend: https://www.imdb.com/
    Imdb(ImdbArgs),
    /// Use the OMDb API as backend: https://www.omdbapi.com/
    Omdb(OmdbArgs),
    /// Interactively guess identifier files from provider search results
    Guess(GuessArgs),
    /// Export identifier-to-directory associations to CSV
    Export(ExportArgs),
    /// Import identifier files from CSV
    Import(ImportArgs),
    /// Rename files per directory using a regular expression
    Rename(RenameArgs),
}

#[derive(Args)]
pub struct LogArgs {
    /// Output logging information
    #[arg(long)]
    pub verbose: bool,
    /// Output debugging information
    #[arg(long)]
    pub debug: bool,
}

#[derive(Args)]
pub struct ImdbArgs {
    /// The directory to traverse
    #[arg(long, value_name = "DIR")]
    pub dir: PathBuf,
    /// Traverse the directory recursively
    #[arg(long)]
    pub recursive: bool,
    /// Glob for the files that contain the movie/TV series IDs
    #[arg(long, value_name = "GLOB", default_value = "*.imdb")]
    pub pattern: String,
    /// Delay in seconds between web queries (to avoid blacklisting)
    #[arg(long, value_name = "SECONDS", default_value_t = 1)]
    pub delay: u64,
    /// Only output the sidecar content, do not save it
    #[arg(long)]
    pub dry_run: bool,
    /// Recreate existing sidecar files with freshly retrieved data
    #[arg(long)]
    pub overwrite: bool,
    /// Generate sidecar files for episodes as well
    #[arg(long)]
    pub episodes: bool,
    /// Shell pattern(s) for locating episode files
    #[arg(long = "episode-pattern", value_name = "GLOB", default_value = "*S??E??*.*")]
    pub episode_pattern: Vec<String>,
    /// Regular expression extracting the season (first group)
    #[arg(long, value_name = "REGEXP", default_value = ".*S([0-9]+)E.*")]
    pub season_group: String,
    /// Regular expression extracting the episode (first group)
    #[arg(long, value_name = "REGEXP", default_value = ".*E([0-9]+).*")]
    pub episode_group: String,
    /// Store all episode info in a single multi-episode file
    #[arg(long)]
    pub multi_episodes: bool,
    /// Preferred language for titles (ISO 639-1)
    #[arg(long, value_name = "LANG", default_value = "en")]
    pub preferred_language: String,
    /// How to deal with fanart
    #[arg(long, value_enum, default_value_t = FanartArg::None)]
    pub fanart: FanartArg,
    /// Filename for downloaded or existing fanart
    #[arg(long, value_name = "FILE", default_value = "folder.jpg")]
    pub fanart_file: String,
    /// User agent for HTTP requests
    #[arg(long = "user-agent", alias = "ua", value_name = "UA", default_value = "Mozilla")]
    pub user_agent: String,
    /// Enable interactive mode
    #[arg(long)]
    pub interactive: bool,
    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Args)]
pub struct OmdbArgs {
    /// The API key to use
    #[arg(long, value_name = "KEY")]
    pub key: String,
    /// The directory to traverse
    #[arg(long, value_name = "DIR")]
    pub dir: PathBuf,
    /// Traverse the directory recursively
    #[arg(long)]
    pub recursive: bool,
    /// Glob for the files that contain the movie IDs
    #[arg(long, value_name = "GLOB", default_value = "*.imdb")]
    pub pattern: String,
    /// Delay in seconds between web queries (to avoid blacklisting)
    #[arg(long, value_name = "SECONDS", default_value_t = 1)]
    pub delay: u64,
    /// Only output the sidecar content, do not save it
    #[arg(long)]
    pub dry_run: bool,
    /// Recreate existing sidecar files with freshly retrieved data
    #[arg(long)]
    pub overwrite: bool,
    /// How to deal with fanart
    #[arg(long, value_enum, default_value_t = FanartArg::None)]
    pub fanart: FanartArg,
    /// Filename for downloaded or existing fanart
    #[arg(long, value_name = "FILE", default_value = "folder.jpg")]
    pub fanart_file: String,
    /// Enable interactive mode
    #[arg(long)]
    pub interactive: bool,
    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Args)]
pub struct GuessArgs {
    /// The directory to traverse
    #[arg(long, value_name = "DIR")]
    pub dir: PathBuf,
    /// Traverse the directory recursively
    #[arg(long)]
    pub recursive: bool,
    /// Glob for the files that contain the movie IDs
    #[arg(long, value_name = "GLOB", default_value = "*.imdb")]
    pub pattern: String,
    /// Provider to search against
    #[arg(long, value_enum, default_value_t = Backend::Imdb)]
    pub backend: Backend,
    /// OMDb API key (required with the omdb backend)
    #[arg(long, value_name = "KEY")]
    pub key: Option<String>,
    /// Preferred language for titles (ISO 639-1)
    #[arg(long, value_name = "LANG", default_value = "en")]
    pub preferred_language: String,
    /// User agent for HTTP requests
    #[arg(long = "user-agent", alias = "ua", value_name = "UA", default_value = "Mozilla")]
    pub user_agent: String,
    /// Only output the chosen IDs, do not save them
    #[arg(long)]
    pub dry_run: bool,
    /// Also offer directories that already have an ID file
    #[arg(long)]
    pub overwrite: bool,
    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Args)]
pub struct ExportArgs {
    /// The directory to traverse
    #[arg(long, value_name = "DIR")]
    pub dir: PathBuf,
    /// Traverse the directory recursively
    #[arg(long)]
    pub recursive: bool,
    /// Glob for the files that contain the movie IDs
    #[arg(long, value_name = "GLOB", default_value = "*.imdb")]
    pub pattern: String,
    /// The CSV output file
    #[arg(long, value_name = "CSV")]
    pub output: PathBuf,
    /// Enable interactive mode
    #[arg(long)]
    pub interactive: bool,
    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Args)]
pub struct ImportArgs {
    /// The CSV file to read
    #[arg(long, value_name = "CSV")]
    pub input: PathBuf,
    /// Top-level directory for relative paths in the CSV file
    #[arg(long, value_name = "DIR")]
    pub dir: PathBuf,
    /// Column holding the ID (header name or 1-based index)
    #[arg(long = "col-id", value_name = "COL")]
    pub col_id: String,
    /// Column holding the directory (header name or 1-based index)
    #[arg(long = "col-dir", value_name = "COL")]
    pub col_dir: String,
    /// Column holding the file name (header name or 1-based index)
    #[arg(long = "col-file", value_name = "COL")]
    pub col_file: Option<String>,
    /// Only output the ID file content, do not save it
    #[arg(long)]
    pub dry_run: bool,
    /// Overwrite existing ID files
    #[arg(long)]
    pub overwrite: bool,
    /// Enable interactive mode
    #[arg(long)]
    pub interactive: bool,
    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Args)]
pub struct RenameArgs {
    /// The directory to traverse
    #[arg(long, value_name = "DIR")]
    pub dir: PathBuf,
    /// Regular expression files must match to be renamed
    #[arg(long, value_name = "REGEXP", default_value = "([0-9]?[0-9])x([0-9][0-9]).(.*)")]
    pub find: String,
    /// Replacement pattern for the new file name
    #[arg(long, value_name = "PATTERN", default_value = "S${1}E${2}.${3}")]
    pub replace: String,
    /// Traverse the directory recursively
    #[arg(long)]
    pub recursive: bool,
    /// Only output the planned renames, do not perform them
    #[arg(long)]
    pub dry_run: bool,
    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FanartArg {
    None,
    Download,
    DownloadMissing,
    UseExisting,
}

impl From<FanartArg> for FanartMode {
    fn from(arg: FanartArg) -> Self {
        match arg {
            FanartArg::None => FanartMode::None,
            FanartArg::Download => FanartMode::Download,
            FanartArg::DownloadMissing => FanartMode::DownloadMissing,
            FanartArg::UseExisting => FanartMode::UseExisting,
        }
    }
}

impl std::fmt::Display for FanartArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Download => "download",
            Self::DownloadMissing => "download-missing",
            Self::UseExisting => "use-existing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Imdb,
    Omdb,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Imdb => "imdb",
            Self::Omdb => "omdb",
        })
    }
}
