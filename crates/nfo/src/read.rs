use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::NfoError;

/// Read back the external id stored in a sidecar: the text of the first
/// `<uniqueid>` element whose `type` attribute matches. Returns an empty
/// string when no such element exists.
pub fn read_id_from_nfo(path: &Path, id_type: &str) -> Result<String, NfoError> {
    let content = std::fs::read_to_string(path)?;
    let mut reader = Reader::from_str(&content);

    let mut inside_matching = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"uniqueid" => {
                inside_matching = e.attributes().flatten().any(|a| {
                    a.key.as_ref() == b"type"
                        && a.unescape_value()
                            .map(|v| v == id_type)
                            .unwrap_or(false)
                });
            }
            Event::Text(t) if inside_matching => {
                let value = t.unescape()?;
                return Ok(value.trim().to_string());
            }
            Event::End(e) if e.name().as_ref() == b"uniqueid" => {
                inside_matching = false;
            }
            Event::Eof => return Ok(String::new()),
            _ => {}
        }
    }
}
