pub mod options;
pub mod types;

pub use options::{EpisodeOptions, FanartOptions, FetchOptions, WriteOptions};
pub use types::{
    CastMember, EpisodeRating, EpisodeRecord, FanartMode, MULTI_EPISODE_FILENAME, ResolvedFanart,
    SearchHit, TVSHOW_FILENAME, TitleKind, TitleRating, TitleRecord,
};
