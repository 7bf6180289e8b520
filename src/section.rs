use std::ops::Range;

use crate::dialect::Dialect;
use crate::line::Line;

/// The lines owned by one section, as positions in the document's line list.
///
/// `header` is `None` for the default section, which starts at the top of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub header: Option<usize>,
    pub body: (usize, usize),
}

impl Span {
    pub fn body(&self) -> Range<usize> {
        self.body.0..self.body.1
    }
}

/// Split `lines` into the default section followed by one span per header, in document order.
pub(crate) fn index(lines: &[Line]) -> Vec<Span> {
    let mut spans = Vec::<Span>::with_capacity(16);
    let mut current = Span {
        header: None,
        body: (0, lines.len()),
    };

    for (i, line) in lines.iter().enumerate() {
        if line.section_raw().is_some() {
            current.body.1 = i;
            spans.push(current);
            current = Span {
                header: Some(i),
                body: (i + 1, lines.len()),
            };
        }
    }

    spans.push(current);
    spans
}

/// Case-insensitive comparison of two keys, ignoring surrounding whitespace.
pub(crate) fn keys_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// A read-only view of one section of a document.
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    raw_name: &'a str,
    lines: &'a [Line],
    dialect: &'a dyn Dialect,
}

impl<'a> Section<'a> {
    #[must_use]
    pub(crate) fn new(raw_name: &'a str, lines: &'a [Line], dialect: &'a dyn Dialect) -> Self {
        Self {
            raw_name,
            lines,
            dialect,
        }
    }

    /// The resolved name. Empty for the default section.
    #[must_use]
    pub fn name(&self) -> String {
        self.dialect.section_name(self.raw_name)
    }

    /// The bracket interior exactly as written.
    #[must_use]
    pub fn raw_name(&self) -> &'a str {
        self.raw_name
    }

    /// Keys in document order, trimmed.
    #[must_use]
    pub fn keys(&self) -> Vec<&'a str> {
        self.raw_keys().into_iter().map(str::trim).collect()
    }

    /// Keys in document order, exactly as written.
    #[must_use]
    pub fn raw_keys(&self) -> Vec<&'a str> {
        self.lines.iter().filter_map(Line::key_raw).collect()
    }

    /// Resolved value of the first entry named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.lines.iter().find_map(|line| match (line.key_raw(), line.value_raw()) {
            (Some(k), Some(v)) if keys_match(k, key) => Some(self.dialect.value(v)),
            _ => None,
        })
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.lines
            .iter()
            .filter_map(Line::key_raw)
            .any(|k| keys_match(k, key))
    }

    /// Trimmed keys paired with resolved values, in document order.
    pub fn entries(&self) -> impl Iterator<Item = (&'a str, String)> + '_ {
        self.lines.iter().filter_map(|line| {
            let key = line.key_raw()?.trim();
            let value = line.value_raw()?;
            Some((key, self.dialect.value(value)))
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.raw_keys().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.key_raw().is_none())
    }
}
