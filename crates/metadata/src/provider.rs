use async_trait::async_trait;

use nfoforge_core::{SearchHit, TitleRecord};

use crate::MetadataError;
use crate::fetch::FetchResponse;

/// A metadata provider that can fetch one title and search by free text.
///
/// `fetch_title` returns `Ok(None)` when the provider answered but no
/// usable record could be extracted; transport failures that make the
/// whole title unusable are errors.
#[async_trait]
pub trait MetadataProvider {
    fn name(&self) -> &str;

    async fn fetch_title(&self, id: &str) -> Result<Option<TitleRecord>, MetadataError>;

    async fn search_title(&self, query: &str) -> Result<Vec<SearchHit>, MetadataError>;

    /// Fetch arbitrary bytes (fanart) through the same transport.
    async fn download(&self, url: &str) -> Result<FetchResponse, MetadataError>;
}
