//! Console prompting for interactive mode.

use std::io::{BufRead, Write};

/// Prompt until one of `choices` is entered; matching falls back to the
/// uppercased input. Returns `None` when stdin is closed.
pub fn prompt(msg: &str, choices: &[&str]) -> Option<String> {
    let stdin = std::io::stdin();
    loop {
        print!("{msg}");
        std::io::stdout().flush().ok();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => return None,
            Ok(_) => {}
        }
        let entered = line.trim();
        if choices.contains(&entered) {
            return Some(entered.to_string());
        }
        let upper = entered.to_uppercase();
        if choices.contains(&upper.as_str()) {
            return Some(upper);
        }
    }
}

/// Ask whether to proceed; a closed stdin counts as "no".
pub fn proceed() -> bool {
    prompt("Proceed (y/n)? ", &["y", "n"]).as_deref() == Some("y")
}

/// Ask whether to skip the current entry.
pub fn skip() -> bool {
    prompt("Skip (y/n)? ", &["y", "n"]).as_deref() == Some("y")
}
