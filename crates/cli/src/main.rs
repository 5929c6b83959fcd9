use std::time::Duration;

use anyhow::bail;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use nfoforge_cli::cli::{Backend, Cli, Command, LogArgs};
use nfoforge_cli::{export, generate, guess, import, rename};
use nfoforge_core::{EpisodeOptions, FanartOptions, FetchOptions, WriteOptions};
use nfoforge_metadata::{ImdbClient, OmdbClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Imdb(args) => {
            init_logging(&args.log, args.interactive);
            let client = ImdbClient::new(FetchOptions {
                language: args.preferred_language,
                user_agent: args.user_agent,
            });
            let cfg = generate::GenerateConfig {
                dir: args.dir,
                recursive: args.recursive,
                pattern: args.pattern,
                delay: Duration::from_secs(args.delay),
                write: WriteOptions {
                    dry_run: args.dry_run,
                    overwrite: args.overwrite,
                },
                fanart: FanartOptions {
                    mode: args.fanart.into(),
                    file_name: args.fanart_file,
                },
                interactive: args.interactive,
            };
            let episodes = generate::EpisodeConfig {
                enabled: args.episodes,
                opts: EpisodeOptions {
                    patterns: args.episode_pattern,
                    season_group: args.season_group,
                    episode_group: args.episode_group,
                    multi_episode: args.multi_episodes,
                },
            };
            generate::run_imdb(&client, &cfg, &episodes).await?;
        }
        Command::Omdb(args) => {
            init_logging(&args.log, args.interactive);
            let client = OmdbClient::new(args.key);
            let cfg = generate::GenerateConfig {
                dir: args.dir,
                recursive: args.recursive,
                pattern: args.pattern,
                delay: Duration::from_secs(args.delay),
                write: WriteOptions {
                    dry_run: args.dry_run,
                    overwrite: args.overwrite,
                },
                fanart: FanartOptions {
                    mode: args.fanart.into(),
                    file_name: args.fanart_file,
                },
                interactive: args.interactive,
            };
            generate::run_omdb(&client, &cfg).await?;
        }
        Command::Guess(args) => {
            init_logging(&args.log, false);
            let cfg = guess::GuessConfig {
                dir: args.dir,
                recursive: args.recursive,
                pattern: args.pattern,
                dry_run: args.dry_run,
                overwrite: args.overwrite,
            };
            match args.backend {
                Backend::Imdb => {
                    let client = ImdbClient::new(FetchOptions {
                        language: args.preferred_language,
                        user_agent: args.user_agent,
                    });
                    guess::run_guess(&client, &cfg).await?;
                }
                Backend::Omdb => {
                    let Some(key) = args.key else {
                        bail!("--key is required with the omdb backend");
                    };
                    let client = OmdbClient::new(key);
                    guess::run_guess(&client, &cfg).await?;
                }
            }
        }
        Command::Export(args) => {
            init_logging(&args.log, args.interactive);
            export::run_export(&export::ExportConfig {
                dir: args.dir,
                recursive: args.recursive,
                pattern: args.pattern,
                output: args.output,
                id_type: "imdb".to_string(),
                interactive: args.interactive,
            })?;
        }
        Command::Import(args) => {
            init_logging(&args.log, args.interactive);
            import::run_import(&import::ImportConfig {
                input: args.input,
                dir: args.dir,
                id_type: "imdb".to_string(),
                col_id: args.col_id,
                col_dir: args.col_dir,
                col_file: args.col_file,
                dry_run: args.dry_run,
                overwrite: args.overwrite,
                interactive: args.interactive,
            })?;
        }
        Command::Rename(args) => {
            init_logging(&args.log, false);
            rename::run_rename(&rename::RenameConfig {
                dir: args.dir,
                find: args.find,
                replace: args.replace,
                recursive: args.recursive,
                dry_run: args.dry_run,
            })?;
        }
    }
    Ok(())
}

/// Interactive mode turns on verbose output; `RUST_LOG` overrides both.
fn init_logging(log: &LogArgs, interactive: bool) {
    let level = if log.debug {
        "debug"
    } else if log.verbose || interactive {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .init();
    if interactive {
        tracing::info!("entering interactive mode");
    }
}
