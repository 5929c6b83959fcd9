pub mod episodes;
pub mod glob;
pub mod ids;
pub mod walk;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad pattern `{pattern}`: {reason}")]
    Pattern { pattern: String, reason: String },
}
