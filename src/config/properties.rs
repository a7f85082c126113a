/*!
 * Properties File Parsing
 *
 * Java `.properties` syntax: `#`/`!` comments, `=`, `:` or whitespace between
 * key and value, backslash line continuations and `\=`, `\:`, `\ `, `\t`,
 * `\n`, `\r`, `\f`, `\uXXXX` escapes.
 */

use crate::core::ConfigError;
use std::collections::HashMap;
use std::path::Path;

/// Parse properties text into a key/value map
///
/// Later duplicates win. A key without a value maps to the empty string,
/// which the resolver then ignores.
pub fn parse_properties(text: &str) -> HashMap<String, String> {
    logical_lines(text)
        .iter()
        .map(|line| split_entry(line))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Join continued physical lines; comments and blanks are dropped
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending: Option<String> = None;

    for raw in text.lines() {
        let line = raw.trim_end();
        let line = match pending {
            // Leading whitespace of a continuation line is not part of the value
            Some(_) => line.trim_start(),
            None => {
                let trimmed = line.trim_start();
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                trimmed
            }
        };

        let trailing = line.chars().rev().take_while(|&c| c == '\\').count();
        let (body, continues) = if trailing % 2 == 1 {
            (&line[..line.len() - 1], true)
        } else {
            (line, false)
        };

        let mut joined = pending.take().unwrap_or_default();
        joined.push_str(body);
        if continues {
            pending = Some(joined);
        } else {
            lines.push(joined);
        }
    }

    // A continuation on the last line ends the entry
    lines.extend(pending);
    lines
}

/// Split one logical line at the first unescaped `=`, `:` or whitespace
fn split_entry(line: &str) -> (String, String) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || c.is_whitespace() {
            key_end = idx;
            break;
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start();
    if let Some(after) = rest.strip_prefix(['=', ':']) {
        rest = after.trim_start();
    }
    (unescape(key), unescape(rest))
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let code: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&code, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if code.len() == 4 => out.push(decoded),
                    // Malformed escapes are kept literally
                    _ => {
                        out.push_str("\\u");
                        out.push_str(&code);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Load a properties file; a missing file yields an empty map
pub fn load_properties(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(parse_properties(&text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
        Err(e) => Err(ConfigError::FileUnreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        }),
    }
}
