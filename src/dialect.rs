//! Section naming rules.
//!
//! A [`Dialect`] decides how the text between a header's brackets maps to a section name, how a
//! name is written back into a header, how a qualified key like `section.key` splits, and how a
//! raw value is cleaned up before it is handed out. Raw text is always kept verbatim in the
//! document, so a dialect can be swapped at any time without reparsing.

use std::fmt;

pub trait Dialect: fmt::Debug + Send + Sync {
    /// Resolve the bracket interior of a header to the name used for lookups.
    fn section_name(&self, raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    /// Normalize a section name supplied by a caller so it compares against [`section_name`].
    ///
    /// [`section_name`]: Dialect::section_name
    fn lookup_name(&self, name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Produce the bracket interior for `name`. `existing` is the current interior when a header
    /// is being renamed.
    fn render_section(&self, name: &str, existing: Option<&str>) -> String {
        _ = existing;
        name.to_owned()
    }

    fn sections_match(&self, a: &str, b: &str) -> bool {
        a == b
    }

    /// Split a qualified key into section name and key. No separator means the default section.
    fn split_key<'k>(&self, key: &'k str) -> (&'k str, &'k str) {
        key.split_once('.').unwrap_or(("", key))
    }

    /// Inverse of [`split_key`](Dialect::split_key).
    fn join_key(&self, section: &str, key: &str) -> String {
        if section.is_empty() {
            key.to_owned()
        } else {
            format!("{section}.{key}")
        }
    }

    /// Turn the raw value token into the value returned to callers.
    ///
    /// A quoted token loses its quotes, and `\\` and `\"` inside it become `\` and `"`. Other
    /// backslashes, and everything in a bare token, are kept as written.
    fn value(&self, raw: &str) -> String {
        let raw = raw.trim();

        match unquote(raw) {
            Some(inner) => unescape(inner),
            None => raw.to_owned(),
        }
    }
}

/// Plain INI: `[ Name ]` resolves to `name`, and `name.key` splits on the first dot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Plain;

impl Dialect for Plain {}

/// Git config style subsections: `[remote "origin"]` resolves to `remote.origin`.
///
/// The base name is case-insensitive while the subsection keeps its case. Qualified keys split
/// on the last dot, so `remote.origin.url` addresses key `url` in section `remote.origin`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Git;

impl Dialect for Git {
    fn section_name(&self, raw: &str) -> String {
        let raw = raw.trim();

        match raw.split_once('"') {
            Some((base, sub)) => {
                let sub = sub.strip_suffix('"').unwrap_or(sub);
                format!("{}.{sub}", base.trim().to_lowercase())
            }
            None => raw.to_lowercase(),
        }
    }

    fn lookup_name(&self, name: &str) -> String {
        let name = name.trim();

        match name.split_once('.') {
            Some((base, sub)) => format!("{}.{sub}", base.to_lowercase()),
            None => name.to_lowercase(),
        }
    }

    fn render_section(&self, name: &str, _existing: Option<&str>) -> String {
        match name.split_once('.') {
            Some((base, sub)) => format!("{base} \"{sub}\""),
            None => name.to_owned(),
        }
    }

    fn split_key<'k>(&self, key: &'k str) -> (&'k str, &'k str) {
        key.rsplit_once('.').unwrap_or(("", key))
    }
}

/// Wraps a dialect so that every section matches every lookup.
///
/// The document then behaves as one flat namespace: a read returns the first matching key in
/// document order, whatever section it sits in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnySection<D>(pub D);

impl<D: Dialect> Dialect for AnySection<D> {
    fn section_name(&self, raw: &str) -> String {
        self.0.section_name(raw)
    }

    fn lookup_name(&self, name: &str) -> String {
        self.0.lookup_name(name)
    }

    fn render_section(&self, name: &str, existing: Option<&str>) -> String {
        self.0.render_section(name, existing)
    }

    fn sections_match(&self, _a: &str, _b: &str) -> bool {
        true
    }

    fn split_key<'k>(&self, key: &'k str) -> (&'k str, &'k str) {
        self.0.split_key(key)
    }

    fn join_key(&self, section: &str, key: &str) -> String {
        self.0.join_key(section, key)
    }

    fn value(&self, raw: &str) -> String {
        self.0.value(raw)
    }
}

fn unquote(value: &str) -> Option<&str> {
    if value.len() >= 2 {
        value.strip_prefix('"')?.strip_suffix('"')
    } else {
        None
    }
}

fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some(&(next @ ('\\' | '"')))) => {
                out.push(next);
                _ = chars.next();
            }
            _ => out.push(c),
        }
    }

    out
}
