use regex::Regex;

use crate::ScanError;

/// Compile a shell-style glob (`*`, `?`, `[...]`) into an anchored regex.
///
/// Matching is case-sensitive, mirroring POSIX fnmatch.
pub fn compile(pattern: &str) -> Result<Regex, ScanError> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            '[' => {
                let mut class = String::new();
                let mut closed = false;
                if chars.peek() == Some(&'!') {
                    chars.next();
                    class.push('^');
                }
                if chars.peek() == Some(&']') {
                    chars.next();
                    class.push(']');
                }
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    if c == '\\' {
                        class.push('\\');
                    }
                    class.push(c);
                }
                if closed {
                    re.push('[');
                    re.push_str(&class);
                    re.push(']');
                } else {
                    // unterminated class matches literally
                    re.push_str(&regex::escape("["));
                    re.push_str(&regex::escape(&class.replace('^', "!")));
                }
            }
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|e| ScanError::Pattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Filter `names` down to those matching the glob `pattern`.
pub fn filter<'a>(names: &'a [String], pattern: &Regex) -> Vec<&'a str> {
    names
        .iter()
        .map(String::as_str)
        .filter(|n| pattern.is_match(n))
        .collect()
}
