//! OMDb API client: one keyed JSON request per title, movies and series,
//! no per-episode data.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, error};

use nfoforge_core::{CastMember, SearchHit, TitleKind, TitleRecord, TitleRating};

use crate::MetadataError;
use crate::fetch::{FetchResponse, Fetcher, HttpFetcher};
use crate::provider::MetadataProvider;

const BASE_URL: &str = "http://www.omdbapi.com/";

pub struct OmdbClient {
    fetcher: Box<dyn Fetcher>,
    api_key: String,
}

impl OmdbClient {
    pub fn new(api_key: String) -> Self {
        Self::with_fetcher(Box::new(HttpFetcher::new()), api_key)
    }

    pub fn with_fetcher(fetcher: Box<dyn Fetcher>, api_key: String) -> Self {
        Self { fetcher, api_key }
    }

    async fn get(&self, url: &str) -> Result<FetchResponse, MetadataError> {
        debug!(url, "OMDb request");
        self.fetcher.fetch(url, &[]).await
    }
}

#[async_trait]
impl MetadataProvider for OmdbClient {
    fn name(&self) -> &str {
        "omdb"
    }

    /// This is the sole fetch for a title, so a bad status is fatal here
    /// rather than an empty result.
    async fn fetch_title(&self, id: &str) -> Result<Option<TitleRecord>, MetadataError> {
        let url = format!(
            "{BASE_URL}?apikey={}&i={}&plot=full",
            urlencoding::encode(&self.api_key),
            urlencoding::encode(id),
        );
        let resp = self.get(&url).await?;
        if !resp.is_ok() {
            error!(status = resp.status, url = %url, "failed to retrieve title");
            return Err(MetadataError::Http {
                status: resp.status,
                url,
            });
        }
        let json: Value = serde_json::from_str(&resp.text())
            .map_err(|e| MetadataError::Parse(e.to_string()))?;
        parse_record(&json, id).map(Some)
    }

    async fn search_title(&self, query: &str) -> Result<Vec<SearchHit>, MetadataError> {
        let url = format!(
            "{BASE_URL}?apikey={}&s={}",
            urlencoding::encode(&self.api_key),
            urlencoding::encode(query),
        );
        let resp = self.get(&url).await?;
        if !resp.is_ok() {
            error!(status = resp.status, url = %url, "failed to retrieve search results");
            return Ok(Vec::new());
        }
        let json: Value = serde_json::from_str(&resp.text())
            .map_err(|e| MetadataError::Parse(e.to_string()))?;
        let Some(matches) = json["Search"].as_array() else {
            return Ok(Vec::new());
        };
        Ok(matches
            .iter()
            .filter_map(|m| {
                Some(SearchHit {
                    id: m["imdbID"].as_str()?.to_string(),
                    title: m["Title"].as_str()?.to_string(),
                })
            })
            .collect())
    }

    async fn download(&self, url: &str) -> Result<FetchResponse, MetadataError> {
        self.get(url).await
    }
}

fn parse_record(json: &Value, requested_id: &str) -> Result<TitleRecord, MetadataError> {
    let Some(title) = field(json, "Title") else {
        let reason = field(json, "Error").unwrap_or_else(|| "no title in response".to_string());
        return Err(MetadataError::Parse(reason));
    };
    let id = field(json, "imdbID").unwrap_or_else(|| requested_id.to_string());

    let mut record = TitleRecord::new(id, title);
    record.plot = field(json, "Plot");
    record.premiered = field(json, "Released").and_then(|s| parse_date(&s));
    // Director is not always present in the payload
    record.directors = field(json, "Director").map(|d| vec![d]).unwrap_or_default();
    record.genres = split_list(field(json, "Genre"));
    record.cast = split_list(field(json, "Actors"))
        .into_iter()
        .map(|name| CastMember { name })
        .collect();
    record.rating = field(json, "imdbRating")
        .and_then(|r| r.parse::<f64>().ok())
        .map(TitleRating::imdb);
    record.poster_url = field(json, "Poster");
    if field(json, "Type").as_deref() == Some("series") {
        record.kind = TitleKind::Series;
    }
    Ok(record)
}

/// String field access; the API uses the literal `"N/A"` for absent values.
fn field(json: &Value, name: &str) -> Option<String> {
    json[name]
        .as_str()
        .filter(|v| !v.is_empty() && *v != "N/A")
        .map(str::to_string)
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Parse dates like `17 May 2019`, trying the abbreviated month name first,
/// then the full one. Unparseable dates are dropped.
fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%d %b %Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d %B %Y"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockFetcher;
    use serde_json::json;

    #[test]
    fn date_parsing_both_month_forms() {
        assert_eq!(
            parse_date("17 May 2019"),
            NaiveDate::from_ymd_opt(2019, 5, 17)
        );
        assert_eq!(
            parse_date("3 January 2001"),
            NaiveDate::from_ymd_opt(2001, 1, 3)
        );
        assert_eq!(parse_date("sometime 2019"), None);
    }

    #[test]
    fn maps_movie_payload() {
        let payload = json!({
            "Title": "Heat",
            "imdbID": "tt0113277",
            "Type": "movie",
            "Plot": "A crew of thieves.",
            "Released": "15 Dec 1995",
            "Director": "Michael Mann",
            "Genre": "Action, Crime, Drama",
            "Actors": "Al Pacino, Robert De Niro",
            "imdbRating": "8.3",
            "Poster": "https://img.example/heat.jpg"
        });
        let record = parse_record(&payload, "tt0113277").unwrap();
        assert_eq!(record.title, "Heat");
        assert_eq!(record.id, "tt0113277");
        assert_eq!(record.kind, TitleKind::Movie);
        assert_eq!(record.premiered, NaiveDate::from_ymd_opt(1995, 12, 15));
        assert_eq!(record.directors, vec!["Michael Mann"]);
        assert_eq!(record.genres, vec!["Action", "Crime", "Drama"]);
        assert_eq!(record.cast.len(), 2);
        assert_eq!(record.cast[1].name, "Robert De Niro");
        assert_eq!(record.rating.as_ref().unwrap().value, 8.3);
    }

    #[test]
    fn series_type_and_missing_director() {
        let payload = json!({
            "Title": "Show",
            "imdbID": "tt1",
            "Type": "series",
            "Director": "N/A"
        });
        let record = parse_record(&payload, "tt1").unwrap();
        assert_eq!(record.kind, TitleKind::Series);
        assert!(record.directors.is_empty());
    }

    #[test]
    fn na_fields_are_dropped() {
        let payload = json!({
            "Title": "Obscure",
            "imdbID": "tt2",
            "Plot": "N/A",
            "Released": "N/A",
            "Poster": "N/A",
            "imdbRating": "N/A"
        });
        let record = parse_record(&payload, "tt2").unwrap();
        assert!(record.plot.is_none());
        assert!(record.premiered.is_none());
        assert!(record.poster_url.is_none());
        assert!(record.rating.is_none());
    }

    #[test]
    fn error_payload_is_a_parse_error() {
        let payload = json!({"Response": "False", "Error": "Incorrect IMDb ID."});
        let err = parse_record(&payload, "bogus").unwrap_err();
        assert!(matches!(err, MetadataError::Parse(_)));
    }

    #[tokio::test]
    async fn non_200_fetch_is_fatal() {
        let url = "http://www.omdbapi.com/?apikey=k&i=tt1&plot=full";
        let fetcher = MockFetcher::new().with(url, 401, "");
        let client = OmdbClient::with_fetcher(Box::new(fetcher), "k".to_string());
        let err = client.fetch_title("tt1").await.unwrap_err();
        assert!(matches!(err, MetadataError::Http { status: 401, .. }));
    }

    #[tokio::test]
    async fn search_maps_hits() {
        let url = "http://www.omdbapi.com/?apikey=k&s=heat";
        let body = json!({"Search": [
            {"imdbID": "tt0113277", "Title": "Heat"},
            {"imdbID": "tt1219289", "Title": "Heat 2"}
        ]})
        .to_string();
        let fetcher = MockFetcher::new().with(url, 200, &body);
        let client = OmdbClient::with_fetcher(Box::new(fetcher), "k".to_string());
        let hits = client.search_title("heat").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "tt0113277");
    }

    #[tokio::test]
    async fn search_without_matches_is_empty() {
        let url = "http://www.omdbapi.com/?apikey=k&s=zzz";
        let fetcher = MockFetcher::new().with(url, 200, r#"{"Response":"False"}"#);
        let client = OmdbClient::with_fetcher(Box::new(fetcher), "k".to_string());
        assert!(client.search_title("zzz").await.unwrap().is_empty());
    }
}
