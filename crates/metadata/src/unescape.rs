use serde_json::Value;

/// Unescape HTML entities in every string of a JSON tree, in place.
///
/// Structured-data blocks lifted out of scraped pages routinely carry
/// `&amp;`, `&quot;` and numeric references inside their string values.
pub fn unescape_value(value: &mut Value) {
    match value {
        Value::String(s) => *s = unescape_str(s),
        Value::Object(map) => {
            for (_, v) in map.iter_mut() {
                unescape_value(v);
            }
        }
        Value::Array(items) => {
            for v in items.iter_mut() {
                unescape_value(v);
            }
        }
        _ => {}
    }
}

/// Single-pass HTML entity unescape: the named basics plus decimal and
/// hexadecimal character references. Unknown entities are left untouched.
pub fn unescape_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail[1..].find(';').map(|i| &tail[1..i + 1]) {
            Some(entity) if entity.len() <= 8 => {
                if let Some(decoded) = decode_entity(entity) {
                    out.push(decoded);
                    rest = &tail[entity.len() + 2..];
                    continue;
                }
                out.push('&');
                rest = &tail[1..];
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}
