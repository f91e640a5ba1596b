//! Parser for the INI-style `.mygit/config` format: `[section]` headers,
//! `key = value` lines, `#`- or `;`-prefixed comments, blank lines ignored.
//! No subsections, no include directives.

use std::collections::BTreeMap;

/// `section -> key -> value`, both names lowercased for case-insensitive
/// lookup.
pub fn parse(content: &str) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    let mut current_section = String::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            current_section = line[1..line.len() - 1].trim().to_lowercase();
            continue;
        }

        if current_section.is_empty() {
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            sections.entry(current_section.clone()).or_default().insert(key, value);
        }
    }

    sections
}

fn parse_key_value(line: &str) -> Option<(String, String)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim().to_lowercase();
    if key.is_empty() {
        return None;
    }
    let value = strip_inline_comment(line[eq_pos + 1..].trim());
    Some((key, value.trim().to_string()))
}

fn strip_inline_comment(s: &str) -> &str {
    match s.find(['#', ';']) {
        Some(i) => s[..i].trim_end(),
        None => s,
    }
}
