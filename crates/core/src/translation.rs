//! Translation bundles.
//!
//! A bundle is built from a flat `.properties` resource in two pure steps:
//! [`parse_properties`] turns the text into ordered `(key, value)` pairs, and
//! [`expand_dotted`] nests every dot-delimited key, so that `label.last_name`
//! becomes `bundle["label"]["last_name"]`. File I/O and language fallback live
//! in the API crate.

use std::collections::BTreeMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Languages
// ---------------------------------------------------------------------------

/// Language used whenever the requested one is unknown or unavailable.
pub const DEFAULT_LANGUAGE: &str = "ru";

/// The only codes with translation resources.
pub const SUPPORTED_LANGUAGES: &[&str] = &["ru", "en"];

/// Separator between path segments in resource keys.
pub const KEY_DELIMITER: char = '.';

/// Lower-case `code` and collapse anything unsupported to [`DEFAULT_LANGUAGE`].
pub fn normalize_language(code: &str) -> &'static str {
    let code = code.trim().to_lowercase();
    SUPPORTED_LANGUAGES
        .iter()
        .copied()
        .find(|supported| *supported == code)
        .unwrap_or(DEFAULT_LANGUAGE)
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// A node in a translation bundle: either a display string or a nested group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TranslationNode {
    Text(String),
    Group(BTreeMap<String, TranslationNode>),
}

impl TranslationNode {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TranslationNode::Text(text) => Some(text),
            TranslationNode::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&BTreeMap<String, TranslationNode>> {
        match self {
            TranslationNode::Group(group) => Some(group),
            TranslationNode::Text(_) => None,
        }
    }
}

/// Nested display strings for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TranslationBundle(BTreeMap<String, TranslationNode>);

impl TranslationBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Top-level entry by key.
    pub fn get(&self, key: &str) -> Option<&TranslationNode> {
        self.0.get(key)
    }

    /// Look up a display string by its dotted path (`"label.last_name"`).
    pub fn text(&self, path: &str) -> Option<&str> {
        let mut segments = path.split(KEY_DELIMITER);
        let mut node = self.0.get(segments.next()?)?;
        for segment in segments {
            node = node.as_group()?.get(segment)?;
        }
        node.as_text()
    }

    /// The group under `key`, or an empty map when absent or not a group.
    ///
    /// `bundle.group("label")` is the set of form-field label overrides.
    pub fn group(&self, key: &str) -> Labels<'_> {
        Labels(self.0.get(key).and_then(TranslationNode::as_group))
    }

    /// Set `value` at the position named by `segments`.
    ///
    /// Intermediate nodes that are missing, or that hold text, are replaced
    /// by groups; the leaf is overwritten.
    fn insert_path(&mut self, segments: &[&str], value: String) {
        let Some((leaf, parents)) = segments.split_last() else {
            return;
        };
        let mut level = &mut self.0;
        for part in parents {
            let node = level
                .entry((*part).to_string())
                .or_insert_with(|| TranslationNode::Group(BTreeMap::new()));
            if let TranslationNode::Text(_) = node {
                *node = TranslationNode::Group(BTreeMap::new());
            }
            let TranslationNode::Group(group) = node else {
                return;
            };
            level = group;
        }
        level.insert((*leaf).to_string(), TranslationNode::Text(value));
    }
}

/// A borrowed view of one group in a bundle, tolerant of absence.
#[derive(Debug, Clone, Copy, Default)]
pub struct Labels<'a>(Option<&'a BTreeMap<String, TranslationNode>>);

impl<'a> Labels<'a> {
    /// Text stored directly under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.0?.get(name)?.as_text()
    }

    /// Text under `name`, or `fallback` when the bundle has none.
    pub fn get_or<'b>(&self, name: &str, fallback: &'b str) -> &'b str
    where
        'a: 'b,
    {
        self.get(name).unwrap_or(fallback)
    }
}

// ---------------------------------------------------------------------------
// Expansion
// ---------------------------------------------------------------------------

/// Expand ordered `(path, value)` pairs into a nested bundle.
///
/// A key containing [`KEY_DELIMITER`] is split into segments and nested; any
/// other key is stored at the top level unchanged. Later pairs win.
pub fn expand_dotted<I, K, V>(pairs: I) -> TranslationBundle
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut bundle = TranslationBundle::new();
    for (key, value) in pairs {
        let key = key.as_ref();
        if key.contains(KEY_DELIMITER) {
            let segments: Vec<&str> = key.split(KEY_DELIMITER).collect();
            bundle.insert_path(&segments, value.into());
        } else {
            bundle
                .0
                .insert(key.to_string(), TranslationNode::Text(value.into()));
        }
    }
    bundle
}

// ---------------------------------------------------------------------------
// Properties parsing
// ---------------------------------------------------------------------------

/// Parse `.properties` text into ordered `(key, value)` pairs.
///
/// Supports `#`/`!` comments, `=` or `:` separators, backslash line
/// continuations and the `\n`, `\t`, `\uXXXX` family of escapes. Duplicate
/// keys are kept in order; [`expand_dotted`] lets the last one win.
pub fn parse_properties(text: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut lines = text.lines();

    while let Some(first) = lines.next() {
        let first = first.trim_start_matches('\u{feff}').trim_start();
        if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
            continue;
        }

        let mut logical = String::from(first);
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (key, value) = split_entry(&logical);
        pairs.push((unescape(key.trim_end()), unescape(value.trim_start())));
    }

    pairs
}

/// An odd number of trailing backslashes continues the line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Split at the first unescaped `=` or `:`. No separator means an empty value.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '=' | ':' if !escaped => return (&line[..idx], &line[idx + c.len_utf8()..]),
            _ => escaped = false,
        }
    }
    (line, "")
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
