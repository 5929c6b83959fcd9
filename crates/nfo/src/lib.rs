pub mod paths;
pub mod read;
pub mod render;
pub mod write;

use thiserror::Error;

pub use paths::{episode_nfo_path, movie_nfo_path, multi_episode_path, tvshow_nfo_path};
pub use read::read_id_from_nfo;
pub use render::{render_episode, render_title};
pub use write::{write_multi, write_nfo};

#[derive(Debug, Error)]
pub enum NfoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("generated document is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
