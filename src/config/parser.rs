//! Git configuration file parser.
//!
//! Parses the INI-like format used by Git configuration files.

use super::Config;
use crate::error::Result;

/// Parses a Git configuration file content into a `Config` instance.
pub fn parse(content: &str) -> Result<Config> {
    let mut config = Config::new();
    let mut current_section = String::new();
    let mut current_subsection = String::new();

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        // Section header
        if line.starts_with('[') {
            if let Some((section, subsection)) = parse_section_header(line) {
                current_section = section;
                current_subsection = subsection;
            }
            continue;
        }

        // Key-value pair
        if !current_section.is_empty() {
            if let Some((key, value)) = parse_key_value(line) {
                config.set(&current_section, &current_subsection, &key, &value);
            }
        }
    }

    Ok(config)
}

/// Parses a section header like `[section]` or `[section "subsection"]`.
fn parse_section_header(line: &str) -> Option<(String, String)> {
    let line = line.trim();

    if !line.starts_with('[') || !line.ends_with(']') {
        return None;
    }

    // Remove brackets
    let inner = &line[1..line.len() - 1];

    // Check for subsection: [section "subsection"]
    if let Some(quote_start) = inner.find('"') {
        let section = inner[..quote_start].trim().to_string();
        let rest = &inner[quote_start + 1..];

        // Find closing quote
        if let Some(quote_end) = rest.rfind('"') {
            let subsection = unescape_subsection(&rest[..quote_end]);
            return Some((section, subsection));
        }
    }

    // Simple section without subsection
    Some((inner.trim().to_string(), String::new()))
}

/// Unescapes a subsection name.
///
/// Git allows escaping backslash and double-quote in subsection names.
fn unescape_subsection(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                match next {
                    '\\' | '"' => {
                        result.push(next);
                        chars.next();
                    }
                    _ => {
                        result.push(c);
                    }
                }
            } else {
                result.push(c);
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Parses a key-value line like `key = value` or `key=value`.
fn parse_key_value(line: &str) -> Option<(String, String)> {
    // Find the first = sign
    let eq_pos = line.find('=')?;

    let key = line[..eq_pos].trim().to_string();
    let value_part = line[eq_pos + 1..].trim();

    let value = parse_value(value_part);

    if key.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parses a value, handling quotes and escapes.
fn parse_value(s: &str) -> String {
    let s = s.trim();

    // Handle inline comments (not within quotes)
    let s = remove_inline_comment(s);

    // Handle quoted values
    if s.starts_with('"') {
        if let Some(end) = s[1..].find('"') {
            return unescape_value(&s[1..1 + end]);
        }
    }

    // Plain value
    unescape_value(&s)
}

/// Removes inline comments from a value.
fn remove_inline_comment(s: &str) -> &str {
    let mut in_quotes = false;
    let mut escape_next = false;

    for (i, c) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' => escape_next = true,
            '"' => in_quotes = !in_quotes,
            '#' | ';' if !in_quotes => return s[..i].trim_end(),
            _ => {}
        }
    }

    s
}

/// Unescapes a value string.
fn unescape_value(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                match next {
                    'n' => {
                        result.push('\n');
                        chars.next();
                    }
                    't' => {
                        result.push('\t');
                        chars.next();
                    }
                    '\\' => {
                        result.push('\\');
                        chars.next();
                    }
                    '"' => {
                        result.push('"');
                        chars.next();
                    }
                    _ => {
                        result.push(c);
                    }
                }
            } else {
                result.push(c);
            }
        } else {
            result.push(c);
        }
    }

    result
}
