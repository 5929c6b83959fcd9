pub mod fetch;
pub mod imdb;
pub mod imdb_series;
pub mod jsonfind;
pub mod omdb;
pub mod provider;
pub mod unescape;

use thiserror::Error;

pub use fetch::{FetchResponse, Fetcher, HttpFetcher};
pub use imdb::ImdbClient;
pub use omdb::OmdbClient;
pub use provider::MetadataProvider;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("HTTP status {status} for {url}")]
    Http { status: u16, url: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::fetch::{FetchResponse, Fetcher};
    use crate::MetadataError;

    /// Canned-response fetcher for network-free tests; records every URL.
    pub struct MockFetcher {
        responses: HashMap<String, (u16, String)>,
        pub calls: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self {
                responses: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn with(mut self, url: &str, status: u16, body: &str) -> Self {
            self.responses
                .insert(url.to_string(), (status, body.to_string()));
            self
        }
    }

    #[async_trait]
    impl Fetcher for MockFetcher {
        async fn fetch(
            &self,
            url: &str,
            _headers: &[(String, String)],
        ) -> Result<FetchResponse, MetadataError> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.responses.get(url) {
                Some((status, body)) => Ok(FetchResponse {
                    status: *status,
                    body: body.clone().into_bytes(),
                }),
                None => Ok(FetchResponse {
                    status: 404,
                    body: Vec::new(),
                }),
            }
        }
    }
}
