//! Render normalized records into the sidecar XML vocabulary.
//!
//! Documents are pretty-printed with two-space indentation and start with
//! an XML prolog; the prolog matters to multi-episode concatenation.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use nfoforge_core::{EpisodeRecord, TitleKind, TitleRecord};

use crate::NfoError;

/// Render one title record. `thumb` is the fanart file name to reference,
/// present only when fanart was resolved and succeeded.
pub fn render_title(record: &TitleRecord, thumb: Option<&str>) -> Result<String, NfoError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let root = record.kind.as_str();
    writer.write_event(Event::Start(BytesStart::new(root)))?;

    text_tag(&mut writer, "title", &record.title)?;
    if record.kind == TitleKind::Movie {
        if let Some(original) = &record.original_title {
            text_tag(&mut writer, "originaltitle", original)?;
        }
    }
    unique_id(&mut writer, &record.id)?;
    if let Some(plot) = &record.plot {
        text_tag(&mut writer, "plot", plot)?;
        if record.kind == TitleKind::Movie {
            text_tag(&mut writer, "outline", plot)?;
        }
    }
    if let Some(mpaa) = &record.mpaa {
        text_tag(&mut writer, "mpaa", mpaa)?;
    }
    if let Some(premiered) = &record.premiered {
        text_tag(&mut writer, "premiered", &premiered.format("%Y-%m-%d").to_string())?;
    }
    for director in &record.directors {
        text_tag(&mut writer, "director", director)?;
    }
    for genre in &record.genres {
        text_tag(&mut writer, "genre", genre)?;
    }
    for actor in &record.cast {
        writer.write_event(Event::Start(BytesStart::new("actor")))?;
        text_tag(&mut writer, "name", &actor.name)?;
        writer.write_event(Event::End(BytesEnd::new("actor")))?;
    }
    if let Some(trailer) = &record.trailer {
        text_tag(&mut writer, "trailer", trailer)?;
    }
    if let Some(rating) = &record.rating {
        writer.write_event(Event::Start(BytesStart::new("ratings")))?;
        let mut tag = BytesStart::new("rating");
        tag.push_attribute(("name", rating.name.as_str()));
        tag.push_attribute(("max", rating.max.to_string().as_str()));
        writer.write_event(Event::Start(tag))?;
        text_tag(&mut writer, "value", &format_rating(rating.value))?;
        writer.write_event(Event::End(BytesEnd::new("rating")))?;
        writer.write_event(Event::End(BytesEnd::new("ratings")))?;
    }
    if let Some(thumb) = thumb {
        let mut tag = BytesStart::new("thumb");
        tag.push_attribute(("aspect", "poster"));
        writer.write_event(Event::Start(tag))?;
        writer.write_event(Event::Text(BytesText::new(thumb)))?;
        writer.write_event(Event::End(BytesEnd::new("thumb")))?;
    }

    writer.write_event(Event::End(BytesEnd::new(root)))?;
    Ok(String::from_utf8(writer.into_inner())?)
}

/// Render one episode record as an `episodedetails` fragment.
pub fn render_episode(record: &EpisodeRecord) -> Result<String, NfoError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("episodedetails")))?;

    text_tag(&mut writer, "season", &record.season)?;
    text_tag(&mut writer, "episode", &record.episode)?;
    text_tag(&mut writer, "title", &record.title)?;
    if let Some(plot) = &record.plot {
        text_tag(&mut writer, "plot", plot)?;
    }
    if let Some(aired) = &record.aired {
        text_tag(&mut writer, "aired", &aired.format("%Y-%m-%d").to_string())?;
    }
    if let Some(id) = &record.id {
        unique_id(&mut writer, id)?;
    }
    if let Some(rating) = &record.rating {
        writer.write_event(Event::Start(BytesStart::new("ratings")))?;
        // the consumer accepts the doubled tag name here
        let mut tag = BytesStart::new("ratings");
        tag.push_attribute(("name", "imdb"));
        tag.push_attribute(("max", "10"));
        tag.push_attribute(("default", "true"));
        writer.write_event(Event::Start(tag))?;
        text_tag(&mut writer, "value", &format_rating(rating.value))?;
        if let Some(votes) = rating.votes {
            text_tag(&mut writer, "votes", &votes.to_string())?;
        }
        writer.write_event(Event::End(BytesEnd::new("ratings")))?;
        writer.write_event(Event::End(BytesEnd::new("ratings")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("episodedetails")))?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn text_tag<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), NfoError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn unique_id<W: std::io::Write>(writer: &mut Writer<W>, id: &str) -> Result<(), NfoError> {
    let mut tag = BytesStart::new("uniqueid");
    tag.push_attribute(("type", "imdb"));
    tag.push_attribute(("default", "true"));
    writer.write_event(Event::Start(tag))?;
    writer.write_event(Event::Text(BytesText::new(id)))?;
    writer.write_event(Event::End(BytesEnd::new("uniqueid")))?;
    Ok(())
}

/// Ratings keep their source precision: `7.5` stays `7.5`, `8` stays `8`.
fn format_rating(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use nfoforge_core::{CastMember, EpisodeRating, TitleRating};

    fn movie_record() -> TitleRecord {
        let mut record = TitleRecord::new("tt1234567", "Movie");
        record.original_title = Some("Movie".to_string());
        record.plot = Some("A film.".to_string());
        record.genres = vec!["Drama".to_string()];
        record.cast = vec![CastMember {
            name: "Alice".to_string(),
        }];
        record
    }

    #[test]
    fn movie_document_shape() {
        let xml = render_title(&movie_record(), None).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<movie>"));
        assert!(xml.contains("  <title>Movie</title>"));
        assert!(xml.contains("  <originaltitle>Movie</originaltitle>"));
        assert!(xml.contains(
            "  <uniqueid type=\"imdb\" default=\"true\">tt1234567</uniqueid>"
        ));
        assert!(xml.contains("  <plot>A film.</plot>"));
        assert!(xml.contains("  <outline>A film.</outline>"));
        assert!(xml.contains("  <genre>Drama</genre>"));
        assert!(xml.contains("<actor>\n    <name>Alice</name>\n  </actor>"));
        assert!(!xml.contains("<premiered>"));
        assert!(!xml.contains("<thumb"));
        assert!(xml.trim_end().ends_with("</movie>"));
    }

    #[test]
    fn series_root_tag_and_no_movie_only_tags() {
        let mut record = movie_record();
        record.kind = TitleKind::Series;
        let xml = render_title(&record, None).unwrap();
        assert!(xml.contains("<tvshow>"));
        assert!(!xml.contains("<originaltitle>"));
        assert!(!xml.contains("<outline>"));
    }

    #[test]
    fn optional_title_tags_present_when_set() {
        let mut record = movie_record();
        record.mpaa = Some("PG-13".to_string());
        record.premiered = NaiveDate::from_ymd_opt(2020, 3, 1);
        record.directors = vec!["Jane Doe".to_string()];
        record.trailer = Some("https://example/trailer".to_string());
        record.rating = Some(TitleRating::imdb(7.5));
        let xml = render_title(&record, Some("folder.jpg")).unwrap();
        assert!(xml.contains("<mpaa>PG-13</mpaa>"));
        assert!(xml.contains("<premiered>2020-03-01</premiered>"));
        assert!(xml.contains("<director>Jane Doe</director>"));
        assert!(xml.contains("<trailer>https://example/trailer</trailer>"));
        assert!(xml.contains("<rating name=\"imdb\" max=\"10\">"));
        assert!(xml.contains("<value>7.5</value>"));
        assert!(xml.contains("<thumb aspect=\"poster\">folder.jpg</thumb>"));
    }

    #[test]
    fn special_characters_are_escaped() {
        let mut record = movie_record();
        record.title = "Fast & <Furious>".to_string();
        record.original_title = Some("Fast & <Furious>".to_string());
        let xml = render_title(&record, None).unwrap();
        assert!(xml.contains("<title>Fast &amp; &lt;Furious&gt;</title>"));
    }

    #[test]
    fn episode_document_shape() {
        let mut record = EpisodeRecord::new("1", "2", "Second");
        record.plot = Some("More things.".to_string());
        record.aired = NaiveDate::from_ymd_opt(2020, 1, 12);
        record.id = Some("tt12".to_string());
        record.rating = Some(EpisodeRating {
            value: 8.1,
            votes: Some(1000),
        });
        let xml = render_episode(&record).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<episodedetails>"));
        assert!(xml.contains("<season>1</season>"));
        assert!(xml.contains("<episode>2</episode>"));
        assert!(xml.contains("<title>Second</title>"));
        assert!(xml.contains("<aired>2020-01-12</aired>"));
        assert!(xml.contains("<ratings name=\"imdb\" max=\"10\" default=\"true\">"));
        assert!(xml.contains("<votes>1000</votes>"));
    }

    #[test]
    fn episode_optionals_are_omitted() {
        let xml = render_episode(&EpisodeRecord::new("1", "1", "Pilot")).unwrap();
        assert!(!xml.contains("<plot>"));
        assert!(!xml.contains("<aired>"));
        assert!(!xml.contains("<uniqueid"));
        assert!(!xml.contains("<ratings"));
    }
}
