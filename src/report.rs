// Console presentation. Operations build plain lines of text; this module
// is the only place that writes them to stdout.

use crossterm::style::Stylize;
use serde_json::Value;

pub const OK: &str = "✓";
pub const FAIL: &str = "✗";

/// `✓ text` / `✗ text`
pub fn outcome(ok: bool, text: impl AsRef<str>) -> String {
    format!("{} {}", if ok { OK } else { FAIL }, text.as_ref())
}

/// Header line announcing an operation, preceded by a blank line.
pub fn banner(text: impl AsRef<str>) {
    println!("\n {}", text.as_ref().bold());
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        if line.starts_with(OK) {
            println!("{}", line.as_str().green());
        } else if line.starts_with(FAIL) {
            println!("{}", line.as_str().red());
        } else {
            println!("{}", line);
        }
    }
}

/// Failure header followed by the server's error text when a response
/// came back at all.
pub fn failure_lines(header: &str, response: Option<&Value>) -> Vec<String> {
    let mut lines = vec![outcome(false, header)];
    if response.is_some() {
        lines.push(format!("  Error: {}", crate::payload::error_message(response)));
    }
    lines
}

/// Pretty JSON for the debug log; falls back to compact on error.
pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_lines_include_error_only_with_response() {
        assert_eq!(failure_lines("Search failed", None), vec!["✗ Search failed"]);
        assert_eq!(
            failure_lines("Search failed", Some(&json!({"success": false, "message": "bad text"}))),
            vec!["✗ Search failed", "  Error: bad text"]
        );
    }
}
