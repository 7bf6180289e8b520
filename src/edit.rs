//! Edits that keep the rest of the document untouched.

use tracing::{trace, warn};

use crate::Ini;
use crate::line::Line;
use crate::parser::{is_valid_header, is_valid_key};
use crate::section;

/// Indentation for the first key of a named section.
const DEFAULT_INDENT: &str = "\t";

impl Ini {
    /// Set a qualified key, creating the key and its section as needed.
    ///
    /// An existing entry only has its value token replaced. A new entry goes right after the last
    /// non-blank line of its section, indented like the section's other keys.
    pub fn set_key(&mut self, key: &str, value: &str) {
        let (section, name) = self.dialect.split_key(key);
        self.set_in(section, name, value);
    }

    /// Apply [`set_key`](Ini::set_key) for every qualified key, in sorted key order.
    pub fn set_flat_map<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut entries = entries
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().to_owned()))
            .collect::<Vec<_>>();
        entries.sort();

        for (key, value) in entries {
            self.set_key(&key, &value);
        }
    }

    /// Set every key of every section, in sorted order. `""` names the default section.
    pub fn set_map<I, S, M, K, V>(&mut self, sections: I)
    where
        I: IntoIterator<Item = (S, M)>,
        S: AsRef<str>,
        M: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut entries = Vec::<(String, String, String)>::new();
        for (section, keys) in sections {
            let section = section.as_ref();
            entries.extend(keys.into_iter().map(|(k, v)| {
                (
                    section.to_owned(),
                    k.as_ref().to_owned(),
                    v.as_ref().to_owned(),
                )
            }));
        }
        entries.sort();

        for (section, key, value) in entries {
            self.set_in(&section, &key, &value);
        }
    }

    /// Append a header for `name` at the end of the document.
    ///
    /// Empty names are ignored, as are names whose header would not parse back, such as one
    /// containing `]` or a newline.
    pub fn add_section(&mut self, name: &str) {
        self.push_section(name);
    }

    /// Rewrite the bracket interior of the first header resolving to `old`.
    ///
    /// Indentation, trailing comment and the section's keys are left alone. Does nothing if no
    /// such header exists, or if `new` is empty or would not parse back.
    pub fn rename_section(&mut self, old: &str, new: &str) {
        if new.trim().is_empty() {
            return;
        }

        let Some(header) = self
            .matching_spans(old)
            .find_map(|i| self.spans[i].header)
        else {
            return;
        };

        let existing = self.lines[header].section_raw().unwrap_or_default();
        let raw = self.dialect.render_section(new, Some(existing));
        if !is_valid_header(&raw) {
            warn!(old, new, raw = %raw, "section name would not parse back, not renaming");
            return;
        }
        trace!(old, new, raw = %raw, "renaming section");

        self.lines[header].set_section_raw(raw);
    }

    /// Delete every section resolving to `name`, header and body.
    ///
    /// The default section has no header; removing it deletes its entries and keeps its comments
    /// and blank lines.
    pub fn remove_section(&mut self, name: &str) {
        let targets = self
            .matching_spans(name)
            .map(|i| self.spans[i])
            .collect::<Vec<_>>();

        // Back to front so earlier positions stay valid.
        for span in targets.iter().rev() {
            match span.header {
                Some(header) => {
                    trace!(name, header, "removing section");
                    self.lines.drain(header..span.body.1);
                }
                None => {
                    let body = span.body();
                    let mut i = body.end;
                    while i > body.start {
                        i -= 1;
                        if self.lines[i].key_raw().is_some() {
                            self.lines.remove(i);
                        }
                    }
                }
            }
        }

        if !targets.is_empty() {
            self.restore_placeholder();
            self.reindex();
        }
    }

    /// Delete the line holding a qualified key. Surrounding lines are kept.
    pub fn remove_key(&mut self, key: &str) {
        let (section, name) = self.dialect.split_key(key);

        if let Some(i) = self.find_in(section, name) {
            trace!(key, line = i, "removing key");
            self.lines.remove(i);
            self.restore_placeholder();
            self.reindex();
        }
    }

    fn set_in(&mut self, section: &str, key: &str, value: &str) {
        let key = key.trim();
        if !is_valid_key(key) {
            warn!(section, key, "key would not parse back, not setting");
            return;
        }

        if let Some(i) = self.find_in(section, key) {
            trace!(section, key, line = i, "replacing value");
            self.lines[i].set_value(value);
            return;
        }

        let found = self.matching_spans(section).next();
        let span = match found {
            Some(i) => i,
            None if section.trim().is_empty() => 0,
            None => {
                if !self.push_section(section) {
                    return;
                }
                self.spans.len() - 1
            }
        };

        self.insert_entry(span, key, value);
    }

    /// Append a header for `name`. Returns false, leaving the document alone, when `name` is
    /// empty or its header would not parse back.
    fn push_section(&mut self, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }

        let raw = self.dialect.render_section(name, None);
        if !is_valid_header(&raw) {
            warn!(name, raw = %raw, "section name would not parse back, not adding");
            return false;
        }

        let ending = self.line_ending();
        self.take_placeholder();
        trace!(name, raw = %raw, "adding section");

        self.lines.push(Line::section(raw).ending_with(ending));
        self.reindex();
        true
    }

    fn insert_entry(&mut self, span: usize, key: &str, value: &str) {
        let ending = self.line_ending();
        if self.take_placeholder() {
            self.reindex();
        }

        let span = self.spans[span];
        let body = span.body();

        let indent = self.lines[body.clone()]
            .iter()
            .rev()
            .find(|line| line.key_raw().is_some())
            .map_or_else(
                || match span.header {
                    Some(_) => DEFAULT_INDENT.to_owned(),
                    None => String::new(),
                },
                |line| line.indent().to_owned(),
            );

        let mut at = body.end;
        while at > body.start && self.lines[at - 1].is_blank() {
            at -= 1;
        }

        trace!(key, line = at, "inserting key");
        self.lines.insert(at, Line::entry(indent, key, value).ending_with(ending));
        self.reindex();
    }

    /// `"\r"` when the document's first line ends in CRLF, so new lines match it.
    fn line_ending(&self) -> &'static str {
        match self.lines.first() {
            Some(line) if line.to_string().ends_with('\r') => "\r",
            _ => "",
        }
    }

    /// Drop the lone blank line of an empty document so new content replaces it.
    fn take_placeholder(&mut self) -> bool {
        let is_placeholder = matches!(self.lines.as_slice(), [line] if line.is_placeholder());
        if is_placeholder {
            self.lines.clear();
        }
        is_placeholder
    }

    fn restore_placeholder(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(Line::blank());
        }
    }

    pub(crate) fn reindex(&mut self) {
        self.spans = section::index(&self.lines);
    }
}
