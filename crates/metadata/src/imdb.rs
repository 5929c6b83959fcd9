//! IMDB provider client.
//!
//! Scrapes the title page's embedded `application/ld+json` structured-data
//! block and falls back to page HTML where the block has regressed over
//! time (cast listing, series signal).

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, error, warn};

use nfoforge_core::{
    CastMember, EpisodeRecord, FetchOptions, SearchHit, TitleKind, TitleRecord, TitleRating,
};

use crate::fetch::{FetchResponse, Fetcher, HttpFetcher};
use crate::jsonfind::find_by_key;
use crate::provider::MetadataProvider;
use crate::unescape::unescape_value;
use crate::{MetadataError, imdb_series};

const BASE_URL: &str = "https://www.imdb.com";

static LD_JSON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static NEXT_DATA: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script#__NEXT_DATA__"#).unwrap());
static STAR_RATING_WIDGET: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#star-rating-widget").unwrap());
// series marker on page generations that predate the @type tag
static LEGACY_EPISODES_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href="episodes/?ref_=tt_ov_epl"]"#).unwrap());

pub struct ImdbClient {
    fetcher: Box<dyn Fetcher>,
    opts: FetchOptions,
}

impl ImdbClient {
    pub fn new(opts: FetchOptions) -> Self {
        Self::with_fetcher(Box::new(HttpFetcher::new()), opts)
    }

    pub fn with_fetcher(fetcher: Box<dyn Fetcher>, opts: FetchOptions) -> Self {
        Self { fetcher, opts }
    }

    /// Canonical title URL, or the input verbatim when it already is one.
    pub fn title_url(id: &str) -> String {
        if id.starts_with("http") {
            id.to_string()
        } else {
            format!("{BASE_URL}/title/{id}/")
        }
    }

    pub fn episodes_url(id: &str, season: Option<&str>) -> String {
        match season {
            Some(season) => format!("{BASE_URL}/title/{id}/episodes/?season={season}"),
            None => format!("{BASE_URL}/title/{id}/episodes/"),
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![("Accept-Language".to_string(), self.opts.language.clone())];
        if !self.opts.user_agent.is_empty() {
            headers.push(("User-Agent".to_string(), self.opts.user_agent.clone()));
        }
        headers
    }

    async fn get(&self, url: &str) -> Result<FetchResponse, MetadataError> {
        debug!(url, "IMDB request");
        self.fetcher.fetch(url, &self.headers()).await
    }

    /// Seasons available on the episodes index page; empty when the page
    /// cannot be retrieved or carries no recognizable season control.
    pub async fn fetch_seasons(&self, id: &str) -> Result<Vec<String>, MetadataError> {
        let url = Self::episodes_url(id, None);
        let resp = self.get(&url).await?;
        if !resp.is_ok() {
            error!(status = resp.status, url = %url, "failed to retrieve episodes page");
            return Ok(Vec::new());
        }
        Ok(imdb_series::extract_seasons(&resp.text()))
    }

    /// Episode records for the requested seasons, keyed season -> episode.
    ///
    /// A season whose page cannot be retrieved comes back empty; the
    /// remaining seasons are still fetched.
    pub async fn fetch_episodes(
        &self,
        id: &str,
        seasons: &[String],
    ) -> Result<BTreeMap<String, BTreeMap<String, EpisodeRecord>>, MetadataError> {
        let mut result = BTreeMap::new();
        for season in seasons {
            let url = Self::episodes_url(id, Some(season));
            let resp = self.get(&url).await?;
            if !resp.is_ok() {
                error!(status = resp.status, url = %url, "failed to retrieve season page");
                result.insert(season.clone(), BTreeMap::new());
                continue;
            }
            let episodes = imdb_series::extract_episodes(&resp.text(), season);
            debug!(season = %season, count = episodes.len(), "season episodes extracted");
            result.insert(season.clone(), episodes);
        }
        Ok(result)
    }
}

#[async_trait]
impl MetadataProvider for ImdbClient {
    fn name(&self) -> &str {
        "imdb"
    }

    async fn fetch_title(&self, id: &str) -> Result<Option<TitleRecord>, MetadataError> {
        let url = Self::title_url(id.trim());
        let resp = self.get(&url).await?;
        if !resp.is_ok() {
            error!(status = resp.status, url = %url, "failed to retrieve title page");
            return Ok(None);
        }
        Ok(parse_title_page(&resp.text()))
    }

    async fn search_title(&self, query: &str) -> Result<Vec<SearchHit>, MetadataError> {
        let url = format!("{BASE_URL}/find/?q={}", urlencoding::encode(query));
        let resp = self.get(&url).await?;
        if !resp.is_ok() {
            error!(status = resp.status, url = %url, "failed to retrieve search page");
        }
        Ok(parse_search_page(&resp.text()))
    }

    async fn download(&self, url: &str) -> Result<FetchResponse, MetadataError> {
        self.get(url).await
    }
}

/// Build a title record from the page content. Absence of a usable
/// structured-data block yields `None` rather than an error.
fn parse_title_page(html: &str) -> Option<TitleRecord> {
    let doc = Html::parse_document(html);

    // page-language-aware title, present on older page generations
    let preflang_title = doc
        .select(&STAR_RATING_WIDGET)
        .next()
        .and_then(|el| el.value().attr("data-title"))
        .map(str::to_string);
    let legacy_series = doc.select(&LEGACY_EPISODES_LINK).next().is_some();

    for script in doc.select(&LD_JSON) {
        let text: String = script.text().collect();
        let Ok(mut json) = serde_json::from_str::<Value>(&text) else {
            continue;
        };
        unescape_value(&mut json);
        if let Some(mut record) = title_from_ld_json(&json, preflang_title.as_deref()) {
            // the type tag wins; the episodes link only decides on page
            // generations whose structured data carries no type at all
            if json.get("@type").is_none() && legacy_series {
                record.kind = TitleKind::Series;
            }
            if record.cast.is_empty() {
                record.cast = next_data_cast(&doc);
            }
            return Some(record);
        }
    }
    warn!("no usable structured-data block on title page");
    None
}

fn title_from_ld_json(json: &Value, preflang_title: Option<&str>) -> Option<TitleRecord> {
    let name = json["name"].as_str()?;
    let id = json["url"]
        .as_str()?
        .replace("/title/", "")
        .replace('/', "");

    let mut record = TitleRecord::new(id, preflang_title.unwrap_or(name));
    record.original_title = Some(name.to_string());
    record.plot = json["description"].as_str().map(str::to_string);
    record.mpaa = json["contentRating"].as_str().map(str::to_string);
    record.premiered = json["datePublished"]
        .as_str()
        .and_then(|s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
    record.directors = name_list(&json["director"]);
    record.genres = match &json["genre"] {
        Value::String(one) => vec![one.clone()],
        Value::Array(many) => many
            .iter()
            .filter_map(|g| g.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };
    record.cast = json["actor"]
        .as_array()
        .map(|actors| {
            actors
                .iter()
                .filter_map(|a| a["name"].as_str())
                .map(|name| CastMember {
                    name: name.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();
    record.trailer = json["trailer"]["embedUrl"].as_str().map(str::to_string);
    record.rating = json["aggregateRating"]["ratingValue"]
        .as_f64()
        .map(TitleRating::imdb);
    record.poster_url = json["image"].as_str().map(str::to_string);
    if json["@type"].as_str() == Some("TVSeries") {
        record.kind = TitleKind::Series;
    }
    Some(record)
}

fn name_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|d| d["name"].as_str().map(str::to_string))
            .collect(),
        Value::Object(_) => value["name"]
            .as_str()
            .map(|n| vec![n.to_string()])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Cast fallback for the structured-data regression: locate a cast listing
/// anywhere in the page-state JSON and rebuild the entries from it.
fn next_data_cast(doc: &Html) -> Vec<CastMember> {
    let Some(script) = doc.select(&NEXT_DATA).next() else {
        return Vec::new();
    };
    let text: String = script.text().collect();
    let Ok(json) = serde_json::from_str::<Value>(&text) else {
        return Vec::new();
    };

    for key in ["credits", "cast"] {
        if let Some(listing) = find_by_key(&json, key) {
            let cast = cast_entries(listing);
            if !cast.is_empty() {
                debug!(key, count = cast.len(), "cast recovered from page-state JSON");
                return cast;
            }
        }
    }
    Vec::new()
}

fn cast_entries(listing: &Value) -> Vec<CastMember> {
    let entries = match listing {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => match listing["edges"].as_array() {
            Some(edges) => edges.as_slice(),
            None => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    entries
        .iter()
        .filter_map(|entry| {
            find_by_key(entry, "nameText")
                .and_then(|n| n["text"].as_str())
                .map(|name| CastMember {
                    name: name.to_string(),
                })
        })
        .collect()
}

fn parse_search_page(html: &str) -> Vec<SearchHit> {
    let doc = Html::parse_document(html);
    for script in doc.select(&NEXT_DATA) {
        let text: String = script.text().collect();
        let Ok(mut json) = serde_json::from_str::<Value>(&text) else {
            continue;
        };
        unescape_value(&mut json);
        let results = &json["props"]["pageProps"]["titleResults"]["results"];
        let Some(results) = results.as_array() else {
            continue;
        };
        return results
            .iter()
            .filter_map(|r| {
                let id = r["id"].as_str()?;
                let title = r["titleNameText"].as_str()?;
                Some(SearchHit {
                    id: id.to_string(),
                    title: title.to_string(),
                })
            })
            .collect();
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockFetcher;

    const MOVIE_PAGE: &str = r#"<html><head>
        <script type="application/ld+json">{
            "@type": "Movie",
            "name": "Movie",
            "url": "/title/tt1234567/",
            "description": "A film.",
            "contentRating": "PG-13",
            "datePublished": "2020-03-01",
            "director": [{"name": "Jane Doe"}],
            "genre": ["Drama"],
            "actor": [{"name": "Alice"}],
            "trailer": {"embedUrl": "https://www.imdb.com/video/vi1/"},
            "aggregateRating": {"ratingValue": 7.5},
            "image": "https://img.example/poster.jpg"
        }</script>
        </head><body></body></html>"#;

    #[test]
    fn title_url_building() {
        assert_eq!(
            ImdbClient::title_url("tt1234567"),
            "https://www.imdb.com/title/tt1234567/"
        );
        assert_eq!(
            ImdbClient::title_url("https://www.imdb.com/title/tt1/"),
            "https://www.imdb.com/title/tt1/"
        );
        assert_eq!(
            ImdbClient::episodes_url("tt1", Some("2")),
            "https://www.imdb.com/title/tt1/episodes/?season=2"
        );
    }

    #[test]
    fn parses_movie_structured_data() {
        let record = parse_title_page(MOVIE_PAGE).unwrap();
        assert_eq!(record.id, "tt1234567");
        assert_eq!(record.title, "Movie");
        assert_eq!(record.original_title.as_deref(), Some("Movie"));
        assert_eq!(record.plot.as_deref(), Some("A film."));
        assert_eq!(record.mpaa.as_deref(), Some("PG-13"));
        assert_eq!(
            record.premiered,
            chrono::NaiveDate::from_ymd_opt(2020, 3, 1)
        );
        assert_eq!(record.directors, vec!["Jane Doe"]);
        assert_eq!(record.genres, vec!["Drama"]);
        assert_eq!(record.cast.len(), 1);
        assert_eq!(record.cast[0].name, "Alice");
        assert_eq!(
            record.trailer.as_deref(),
            Some("https://www.imdb.com/video/vi1/")
        );
        assert_eq!(record.rating.as_ref().unwrap().value, 7.5);
        assert_eq!(record.kind, TitleKind::Movie);
    }

    #[test]
    fn series_detected_from_type_tag() {
        let page = r#"<script type="application/ld+json">
            {"@type": "TVSeries", "name": "Show", "url": "/title/tt2/"}
        </script>"#;
        let record = parse_title_page(page).unwrap();
        assert_eq!(record.kind, TitleKind::Series);
    }

    #[test]
    fn series_detected_from_legacy_episodes_link() {
        let page = r#"<html><body>
            <a href="episodes/?ref_=tt_ov_epl">Episodes</a>
            <script type="application/ld+json">
                {"name": "Show", "url": "/title/tt3/"}
            </script>
        </body></html>"#;
        let record = parse_title_page(page).unwrap();
        assert_eq!(record.kind, TitleKind::Series);
    }

    #[test]
    fn type_tag_wins_over_legacy_link() {
        let page = r#"<html><body>
            <a href="episodes/?ref_=tt_ov_epl">Episodes</a>
            <script type="application/ld+json">
                {"@type": "Movie", "name": "M", "url": "/title/tt8/"}
            </script>
        </body></html>"#;
        let record = parse_title_page(page).unwrap();
        assert_eq!(record.kind, TitleKind::Movie);
    }

    #[test]
    fn preflang_title_wins_over_structured_name() {
        let page = r#"<html><body>
            <div id="star-rating-widget" data-title="Der Film"></div>
            <script type="application/ld+json">
                {"name": "The Movie", "url": "/title/tt4/"}
            </script>
        </body></html>"#;
        let record = parse_title_page(page).unwrap();
        assert_eq!(record.title, "Der Film");
        assert_eq!(record.original_title.as_deref(), Some("The Movie"));
    }

    #[test]
    fn single_director_object_and_genre_string() {
        let page = r#"<script type="application/ld+json">
            {"name": "M", "url": "/title/tt5/",
             "director": {"name": "Solo"}, "genre": "Thriller"}
        </script>"#;
        let record = parse_title_page(page).unwrap();
        assert_eq!(record.directors, vec!["Solo"]);
        assert_eq!(record.genres, vec!["Thriller"]);
    }

    #[test]
    fn entities_in_structured_data_are_unescaped() {
        let page = r#"<script type="application/ld+json">
            {"name": "Tom &amp; Jerry", "url": "/title/tt6/",
             "description": "Cat &quot;vs&quot; mouse."}
        </script>"#;
        let record = parse_title_page(page).unwrap();
        assert_eq!(record.title, "Tom & Jerry");
        assert_eq!(record.plot.as_deref(), Some("Cat \"vs\" mouse."));
    }

    #[test]
    fn cast_falls_back_to_page_state_json() {
        let page = r#"<html><body>
            <script type="application/ld+json">
                {"name": "M", "url": "/title/tt7/"}
            </script>
            <script id="__NEXT_DATA__" type="application/json">
                {"props": {"deep": {"credits": {"edges": [
                    {"node": {"name": {"nameText": {"text": "Bob"}}}},
                    {"node": {"name": {"nameText": {"text": "Carol"}}}}
                ]}}}}
            </script>
        </body></html>"#;
        let record = parse_title_page(page).unwrap();
        let names: Vec<&str> = record.cast.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Carol"]);
    }

    #[test]
    fn missing_structured_data_yields_none() {
        assert!(parse_title_page("<html><body>nothing here</body></html>").is_none());
    }

    #[test]
    fn search_results_from_page_state_json() {
        let page = r#"<script id="__NEXT_DATA__" type="application/json">
            {"props": {"pageProps": {"titleResults": {"results": [
                {"id": "tt1", "titleNameText": "First"},
                {"id": "tt2", "titleNameText": "Second"}
            ]}}}}
        </script>"#;
        let hits = parse_search_page(page);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "tt1");
        assert_eq!(hits[1].title, "Second");
    }

    #[test]
    fn search_without_results_block_is_empty() {
        let page = r#"<script id="__NEXT_DATA__" type="application/json">
            {"props": {"pageProps": {}}}
        </script>"#;
        assert!(parse_search_page(page).is_empty());
    }

    #[tokio::test]
    async fn non_200_title_fetch_yields_none() {
        let fetcher =
            MockFetcher::new().with("https://www.imdb.com/title/tt0/", 503, "overloaded");
        let client = ImdbClient::with_fetcher(Box::new(fetcher), FetchOptions::default());
        let record = client.fetch_title("tt0").await.unwrap();
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn season_failure_leaves_other_seasons_intact() {
        let season2 = r#"<script type="application/json">
            {"content": {"episodes": {"items": [
                {"season": 2, "episode": 1, "id": "tt21", "titleText": "Opener"}
            ]}}}
        </script>"#;
        let fetcher = MockFetcher::new()
            .with("https://www.imdb.com/title/tt9/episodes/?season=1", 500, "")
            .with(
                "https://www.imdb.com/title/tt9/episodes/?season=2",
                200,
                season2,
            );
        let client = ImdbClient::with_fetcher(Box::new(fetcher), FetchOptions::default());
        let map = client
            .fetch_episodes("tt9", &["1".to_string(), "2".to_string()])
            .await
            .unwrap();
        assert!(map["1"].is_empty());
        assert_eq!(map["2"]["1"].title, "Opener");
    }
}
