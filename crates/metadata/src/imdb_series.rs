//! Episode-listing extraction for the IMDB season pages.
//!
//! Three page generations coexist upstream. Extraction is an ordered chain
//! of variant-specific strategies, each returning empty on non-match; the
//! first non-empty result wins: embedded JSON, then the item-description
//! HTML layout, then the card/article HTML layout.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

use nfoforge_core::{EpisodeRating, EpisodeRecord};

use crate::jsonfind::find_by_key;
use crate::unescape::unescape_value;

static SEASON_DROPDOWN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("select#bySeason option").unwrap());
static SEASON_TABS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"li[data-testid="tab-season-entry"]"#).unwrap());

static APP_JSON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/json"]"#).unwrap());

static EPISODE_DIV: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div[itemprop="episodes"]"#).unwrap());
static EPISODE_NUMBER_META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[itemprop="episodeNumber"]"#).unwrap());
static TITLE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[itemprop="name"]"#).unwrap());
static ITEM_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div.item_description[itemprop="description"]"#).unwrap());
static AIRDATE_DIV: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.airdate").unwrap());
static RATING_SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.ipl-rating-star__rating").unwrap());
static VOTES_SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.ipl-rating-star__total-votes").unwrap());

static EPISODE_CARD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article.episode-item-wrapper").unwrap());
static CARD_OVERLAY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.ipc-lockup-overlay").unwrap());
static CARD_PLOT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.ipc-html-content-inner-div").unwrap());
static CARD_SPAN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());
static CARD_RATING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.ipc-rating-star").unwrap());

static RE_EP_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".*ttep_ep([0-9]+)").unwrap());
static RE_EP_HREF_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".*ttep_ep_([0-9]+)").unwrap());

const AIRDATE_FORMAT: &str = "%d %b. %Y";
const CARD_AIRDATE_FORMAT: &str = "%B %d, %Y";

/// Season identifiers from the episodes index page: the season dropdown on
/// older pages, the tab-button list on newer ones.
pub fn extract_seasons(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);

    let dropdown: Vec<String> = doc
        .select(&SEASON_DROPDOWN)
        .filter_map(|opt| opt.value().attr("value").map(str::to_string))
        .collect();
    if !dropdown.is_empty() {
        debug!("seasons from dropdown");
        return dropdown;
    }

    let tabs: Vec<String> = doc
        .select(&SEASON_TABS)
        .map(|li| element_text(li))
        .filter(|t| !t.is_empty())
        .collect();
    if !tabs.is_empty() {
        debug!("seasons from tab buttons");
        return tabs;
    }

    warn!("failed to get seasons from HTML");
    Vec::new()
}

/// Extract the episodes of one season page, keyed by normalized episode
/// number. `season` is the season this page was requested for.
pub fn extract_episodes(html: &str, season: &str) -> BTreeMap<String, EpisodeRecord> {
    let doc = Html::parse_document(html);

    let episodes = extract_episodes_json(&doc);
    if !episodes.is_empty() {
        debug!("episodes from embedded JSON");
        return episodes;
    }

    let episodes = extract_episodes_items(&doc, season);
    if !episodes.is_empty() {
        debug!("episodes from item-description layout");
        return episodes;
    }

    let episodes = extract_episodes_cards(&doc, season);
    if episodes.is_empty() {
        warn!(season, "no episode data extracted");
    } else {
        debug!("episodes from card layout");
    }
    episodes
}

fn extract_episodes_json(doc: &Html) -> BTreeMap<String, EpisodeRecord> {
    let mut result = BTreeMap::new();
    for script in doc.select(&APP_JSON) {
        let text: String = script.text().collect();
        let Ok(mut json) = serde_json::from_str::<Value>(&text) else {
            continue;
        };
        unescape_value(&mut json);
        let Some(items) = find_by_key(&json, "episodes").and_then(|e| e["items"].as_array())
        else {
            continue;
        };
        for item in items {
            let Some(season) = number_string(&item["season"]) else {
                continue;
            };
            let Some(episode) = number_string(&item["episode"]) else {
                continue;
            };
            let Some(title) = item["titleText"].as_str() else {
                continue;
            };
            let mut record = EpisodeRecord::new(season, episode.clone(), title);
            record.id = item["id"].as_str().map(str::to_string);
            record.plot = item["plot"].as_str().map(str::to_string);
            record.aired = item["releaseDate"].as_object().and_then(|d| {
                NaiveDate::from_ymd_opt(
                    d.get("year")?.as_i64()? as i32,
                    d.get("month")?.as_u64()? as u32,
                    d.get("day")?.as_u64()? as u32,
                )
            });
            record.rating = item["aggregateRating"].as_f64().map(|value| EpisodeRating {
                value,
                votes: item["voteCount"].as_u64(),
            });
            result.insert(episode, record);
        }
    }
    result
}

fn extract_episodes_items(doc: &Html, season: &str) -> BTreeMap<String, EpisodeRecord> {
    let mut result = BTreeMap::new();
    for div in doc.select(&EPISODE_DIV) {
        let Some(episode) = div
            .select(&EPISODE_NUMBER_META)
            .next()
            .and_then(|m| m.value().attr("content"))
            .and_then(normalize_number_str)
        else {
            debug!("no episode number tag found");
            continue;
        };
        let Some(link) = div.select(&TITLE_LINK).next() else {
            debug!("no title tag found");
            continue;
        };
        let title = element_text(link);

        let mut record = EpisodeRecord::new(season, episode.clone(), title);
        record.id = link.value().attr("href").and_then(title_id_from_href);
        record.plot = div
            .select(&ITEM_DESCRIPTION)
            .next()
            .map(element_text)
            .filter(|p| !p.is_empty());
        record.aired = div
            .select(&AIRDATE_DIV)
            .next()
            .and_then(|d| NaiveDate::parse_from_str(element_text(d).as_str(), AIRDATE_FORMAT).ok());
        record.rating = div
            .select(&RATING_SPAN)
            .next()
            .and_then(|r| element_text(r).parse::<f64>().ok())
            .map(|value| EpisodeRating {
                value,
                votes: div.select(&VOTES_SPAN).next().and_then(parse_votes),
            });

        result.insert(episode, record);
    }
    result
}

fn extract_episodes_cards(doc: &Html, season: &str) -> BTreeMap<String, EpisodeRecord> {
    let mut result = BTreeMap::new();
    for article in doc.select(&EPISODE_CARD) {
        let Some(overlay) = article.select(&CARD_OVERLAY).next() else {
            continue;
        };
        let Some(title) = overlay.value().attr("aria-label") else {
            continue;
        };
        let Some(href) = overlay.value().attr("href") else {
            continue;
        };
        let pattern = if href.contains("ttep_ep_") {
            &RE_EP_HREF_UNDERSCORE
        } else if href.contains("ttep_ep") {
            &RE_EP_HREF
        } else {
            continue;
        };
        let Some(episode) = pattern
            .captures(href)
            .and_then(|c| c.get(1))
            .and_then(|m| normalize_number_str(m.as_str()))
        else {
            debug!(href, "no episode number in link");
            continue;
        };

        let mut record = EpisodeRecord::new(season, episode.clone(), title);
        record.id = title_id_from_href(href);
        record.plot = article
            .select(&CARD_PLOT)
            .next()
            .map(element_text)
            .filter(|p| !p.is_empty());
        record.aired = article.select(&CARD_SPAN).find_map(|span| {
            NaiveDate::parse_from_str(element_text(span).as_str(), CARD_AIRDATE_FORMAT).ok()
        });
        record.rating = article
            .select(&CARD_RATING)
            .next()
            .and_then(|r| r.value().attr("aria-label"))
            .and_then(|label| label.split_once(':'))
            .and_then(|(_, value)| value.trim().parse::<f64>().ok())
            .map(|value| EpisodeRating { value, votes: None });

        result.insert(episode, record);
    }
    result
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// `/title/tt0123/...` -> `tt0123`
fn title_id_from_href(href: &str) -> Option<String> {
    let rest = href.strip_prefix("/title/")?;
    let end = rest.find('/').unwrap_or(rest.len());
    Some(rest[..end].to_string())
}

/// Render a JSON number or numeric string as a decimal string without
/// leading zeros, so remote keys line up with disk-derived keys.
fn number_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n.to_string()),
        Value::String(s) => normalize_number_str(s),
        _ => None,
    }
}

fn normalize_number_str(s: &str) -> Option<String> {
    let trimmed = s.trim();
    match trimmed.parse::<u64>() {
        Ok(n) => Some(n.to_string()),
        Err(_) if !trimmed.is_empty() => Some(trimmed.to_string()),
        Err(_) => None,
    }
}

fn parse_votes(span: ElementRef<'_>) -> Option<u64> {
    element_text(span)
        .replace(['(', ')', ','], "")
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seasons_from_dropdown() {
        let html = r#"<select id="bySeason">
            <option value="1">1</option>
            <option value="2">2</option>
        </select>"#;
        assert_eq!(extract_seasons(html), vec!["1", "2"]);
    }

    #[test]
    fn seasons_from_tab_buttons() {
        let html = r#"<ul>
            <li data-testid="tab-season-entry">1</li>
            <li data-testid="tab-season-entry">2</li>
            <li data-testid="tab-season-entry">3</li>
        </ul>"#;
        assert_eq!(extract_seasons(html), vec!["1", "2", "3"]);
    }

    #[test]
    fn no_season_control_is_empty() {
        assert!(extract_seasons("<html><body></body></html>").is_empty());
    }

    #[test]
    fn episodes_from_embedded_json() {
        let html = r#"<script type="application/json">
            {"props": {"content": {"episodes": {"items": [
                {"season": 1, "episode": 1, "id": "tt11", "titleText": "Pilot",
                 "plot": "It begins.",
                 "releaseDate": {"year": 2020, "month": 1, "day": 5},
                 "aggregateRating": 8.1, "voteCount": 1000},
                {"season": 1, "episode": 2, "id": "tt12", "titleText": "Second"}
            ]}}}}
        </script>"#;
        let eps = extract_episodes(html, "1");
        assert_eq!(eps.len(), 2);
        let pilot = &eps["1"];
        assert_eq!(pilot.title, "Pilot");
        assert_eq!(pilot.id.as_deref(), Some("tt11"));
        assert_eq!(pilot.plot.as_deref(), Some("It begins."));
        assert_eq!(pilot.aired, NaiveDate::from_ymd_opt(2020, 1, 5));
        let rating = pilot.rating.as_ref().unwrap();
        assert_eq!(rating.value, 8.1);
        assert_eq!(rating.votes, Some(1000));
        assert!(eps["2"].rating.is_none());
    }

    #[test]
    fn episodes_from_item_description_layout() {
        let html = r#"<div itemprop="episodes">
            <meta itemprop="episodeNumber" content="3"/>
            <a itemprop="name" href="/title/tt33/?ref_=ttep">Third One</a>
            <div class="airdate">17 May. 2019</div>
            <div class="item_description" itemprop="description">Things happen.</div>
            <span class="ipl-rating-star__rating">7.9</span>
            <span class="ipl-rating-star__total-votes">(1,234)</span>
        </div>"#;
        let eps = extract_episodes(html, "2");
        assert_eq!(eps.len(), 1);
        let ep = &eps["3"];
        assert_eq!(ep.season, "2");
        assert_eq!(ep.title, "Third One");
        assert_eq!(ep.id.as_deref(), Some("tt33"));
        assert_eq!(ep.plot.as_deref(), Some("Things happen."));
        assert_eq!(ep.aired, NaiveDate::from_ymd_opt(2019, 5, 17));
        let rating = ep.rating.as_ref().unwrap();
        assert_eq!(rating.value, 7.9);
        assert_eq!(rating.votes, Some(1234));
    }

    #[test]
    fn episodes_from_card_layout() {
        let html = r#"<article class="episode-item-wrapper">
            <a class="ipc-lockup-overlay" aria-label="S2.E4 Fourth"
               href="/title/tt44/?ref_=ttep_ep_4"></a>
            <div class="ipc-html-content-inner-div">A twist.</div>
            <span>February 3, 2023</span>
            <span class="ipc-rating-star" aria-label="IMDb rating: 8.4"></span>
        </article>"#;
        let eps = extract_episodes(html, "2");
        assert_eq!(eps.len(), 1);
        let ep = &eps["4"];
        assert_eq!(ep.title, "S2.E4 Fourth");
        assert_eq!(ep.id.as_deref(), Some("tt44"));
        assert_eq!(ep.plot.as_deref(), Some("A twist."));
        assert_eq!(ep.aired, NaiveDate::from_ymd_opt(2023, 2, 3));
        assert_eq!(ep.rating.as_ref().unwrap().value, 8.4);
        assert_eq!(ep.rating.as_ref().unwrap().votes, None);
    }

    #[test]
    fn card_layout_without_underscore_marker() {
        let html = r#"<article class="episode-item-wrapper">
            <a class="ipc-lockup-overlay" aria-label="Old Style"
               href="/title/tt55/?ref_=ttep_ep7"></a>
        </article>"#;
        let eps = extract_episodes(html, "1");
        assert_eq!(eps.len(), 1);
        assert!(eps.contains_key("7"));
    }

    #[test]
    fn json_takes_priority_over_html_layouts() {
        let html = r#"
        <script type="application/json">
            {"episodes": {"items": [
                {"season": 1, "episode": 9, "id": "tt9", "titleText": "From JSON"}
            ]}}
        </script>
        <div itemprop="episodes">
            <meta itemprop="episodeNumber" content="1"/>
            <a itemprop="name" href="/title/tt1/">From HTML</a>
        </div>"#;
        let eps = extract_episodes(html, "1");
        assert_eq!(eps.len(), 1);
        assert_eq!(eps["9"].title, "From JSON");
    }

    #[test]
    fn empty_page_yields_no_episodes() {
        assert!(extract_episodes("<html><body></body></html>", "1").is_empty());
    }

    #[test]
    fn episode_keys_lose_leading_zeros() {
        let html = r#"<div itemprop="episodes">
            <meta itemprop="episodeNumber" content="03"/>
            <a itemprop="name" href="/title/tt3/">Padded</a>
        </div>"#;
        let eps = extract_episodes(html, "1");
        assert!(eps.contains_key("3"));
    }
}
