//! Flat `key=value` property text
//!
//! A small subset of the classic properties format: one entry per line,
//! `#`/`!` comments, and backslash escapes for separators, control
//! characters and `\uXXXX` code points. Line continuations are not
//! supported; the writer never produces them.

use std::collections::HashMap;

use thiserror::Error;

/// Errors produced while parsing property text
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropertiesError {
    /// A non-comment line has no `=` or `:` separator
    #[error("Line {0}: missing key/value separator")]
    MissingSeparator(usize),

    /// An escape sequence is not recognized
    #[error("Line {line}: invalid escape sequence '\\{found}'")]
    InvalidEscape {
        /// 1-based line number
        line: usize,
        /// Character following the backslash
        found: char,
    },

    /// A `\u` escape is not followed by four hex digits
    #[error("Line {0}: malformed unicode escape")]
    MalformedUnicode(usize),

    /// A backslash ends the line
    #[error("Line {0}: dangling escape")]
    DanglingEscape(usize),

    /// A key appears with an empty name
    #[error("Line {0}: empty key")]
    EmptyKey(usize),
}

/// Serializes entries to property text, preceded by `# <comment>` lines
#[must_use]
pub fn write_properties<'a, I>(comments: &[&str], entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = String::new();
    for comment in comments {
        for line in comment.lines() {
            out.push_str("# ");
            out.push_str(line);
            out.push('\n');
        }
    }
    for (key, value) in entries {
        escape_into(&mut out, key);
        out.push('=');
        escape_into(&mut out, value);
        out.push('\n');
    }
    out
}

fn escape_into(out: &mut String, text: &str) {
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            ' ' if i == 0 => out.push_str("\\ "),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
}

/// Parses property text into a map; later duplicates win
///
/// # Errors
///
/// Returns a `PropertiesError` describing the first malformed line
pub fn parse_properties(text: &str) -> Result<HashMap<String, String>, PropertiesError> {
    let mut map = HashMap::new();
    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_start();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let split = find_separator(line).ok_or(PropertiesError::MissingSeparator(line_no))?;
        let key = unescape(&line[..split], line_no)?;
        let value = unescape(&line[split + 1..], line_no)?;
        let key = key.trim_end().to_string();
        if key.is_empty() {
            return Err(PropertiesError::EmptyKey(line_no));
        }
        map.insert(key, value);
    }
    Ok(map)
}

/// Byte offset of the first unescaped `=` or `:`
fn find_separator(line: &str) -> Option<usize> {
    let mut escaped = false;
    for (offset, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return Some(offset),
            _ => {}
        }
    }
    None
}

fn unescape(text: &str, line: usize) -> Result<String, PropertiesError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            return Err(PropertiesError::DanglingEscape(line));
        };
        match next {
            '\\' | '=' | ':' | '#' | '!' | ' ' => out.push(next),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 {
                    return Err(PropertiesError::MalformedUnicode(line));
                }
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or(PropertiesError::MalformedUnicode(line))?;
                out.push(decoded);
            }
            found => return Err(PropertiesError::InvalidEscape { line, found }),
        }
    }
    Ok(out)
}
