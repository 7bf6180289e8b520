#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]
//! Read, query and edit INI files without disturbing their formatting.
//!
//! Every line of the input is kept, so unmodified documents serialize back byte for byte and
//! edits only touch the text they change.
//!
//! ```
//! use ini::Ini;
//!
//! let mut ini: Ini = "[server]\nport = 8080 ; default\n".parse()?;
//! assert_eq!(ini.get_int("server.port"), 8080);
//!
//! ini.set_key("server.port", "9090");
//! assert_eq!(ini.to_string(), "[server]\nport = 9090 ; default\n");
//! # Ok::<(), ini::Error>(())
//! ```

mod dialect;
mod edit;
mod error;
mod line;
mod parser;
mod section;

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::{fmt, fs};

use tracing::debug;

pub use crate::dialect::{AnySection, Dialect, Git, Plain};
pub use crate::error::{Error, ParseError, Result};
pub use crate::line::{Comment, Line, LineKind};
pub use crate::section::Section;

use crate::parser::Parser;
use crate::section::{Span, keys_match};

/// An INI document.
///
/// A document is not synchronized; share it behind a lock if it must be edited from several
/// threads.
#[derive(Debug, Clone)]
pub struct Ini {
    lines: Vec<Line>,
    spans: Vec<Span>,
    filename: Option<PathBuf>,
    dialect: Arc<dyn Dialect>,
}

/// Configures how a document is named and resolved before it is loaded.
#[derive(Debug, Clone)]
pub struct Builder {
    dialect: Arc<dyn Dialect>,
    filename: Option<PathBuf>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            dialect: Arc::new(Plain),
            filename: None,
        }
    }
}

impl Builder {
    #[must_use]
    pub fn dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.dialect = Arc::new(dialect);
        self
    }

    #[must_use]
    pub fn filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// An empty document.
    #[must_use]
    pub fn build(self) -> Ini {
        Ini::from_lines(vec![Line::blank()], self.filename, self.dialect)
    }

    pub fn parse(self, text: &str) -> Result<Ini> {
        self.load("<string>", text)
    }

    pub fn from_reader<R: Read>(self, mut reader: R) -> Result<Ini> {
        let mut buffer = Vec::<u8>::with_capacity(4096);
        reader.read_to_end(&mut buffer)?;
        let text = String::from_utf8(buffer)?;

        self.load("<reader>", &text)
    }

    /// Load the file at `path`, remembering it as the document's filename.
    ///
    /// A missing file is not an error: the result is an empty document that [`Ini::save`] will
    /// create.
    pub fn open(self, path: impl AsRef<Path>) -> Result<Ini> {
        let path = path.as_ref();
        let builder = self.filename(path);

        match fs::read(path) {
            Ok(bytes) => {
                let text = String::from_utf8(bytes)?;
                builder.load(&path.display().to_string(), &text)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "file does not exist, starting empty");
                Ok(builder.build())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn load(self, name: &str, text: &str) -> Result<Ini> {
        // Every line, including the last, must be newline-terminated.
        let text = if text.ends_with('\n') {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(format!("{text}\n"))
        };

        let lines = Parser::new(&text)
            .into_lines()
            .map_err(|source| Error::Parse {
                name: name.to_owned(),
                source,
            })?;

        debug!(name, lines = lines.len(), "parsed document");
        Ok(Ini::from_lines(lines, self.filename, self.dialect))
    }
}

impl Ini {
    /// An empty document using the [`Plain`] dialect.
    #[must_use]
    pub fn new() -> Self {
        Builder::default().build()
    }

    #[must_use]
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn parse(text: &str) -> Result<Self> {
        Builder::default().parse(text)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Builder::default().from_reader(reader)
    }

    /// See [`Builder::open`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Builder::default().open(path)
    }

    fn from_lines(lines: Vec<Line>, filename: Option<PathBuf>, dialect: Arc<dyn Dialect>) -> Self {
        let spans = section::index(&lines);
        Self {
            lines,
            spans,
            filename,
            dialect,
        }
    }

    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, filename: impl Into<PathBuf>) {
        self.filename = Some(filename.into());
    }

    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        &*self.dialect
    }

    pub fn set_dialect(&mut self, dialect: impl Dialect + 'static) {
        self.dialect = Arc::new(dialect);
    }

    /// Write the document to its filename.
    pub fn save(&self) -> Result<()> {
        let path = self.filename.as_deref().ok_or(Error::NoFilename)?;
        self.write_to(path)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_string())?;

        debug!(path = %path.display(), lines = self.lines.len(), "wrote document");
        Ok(())
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Resolved section names in document order, starting with `""` for the default section.
    #[must_use]
    pub fn section_names(&self) -> Vec<String> {
        self.spans
            .iter()
            .map(|span| self.dialect.section_name(self.raw_name(span)))
            .collect()
    }

    /// Bracket interiors as written, in document order, starting with `""`.
    #[must_use]
    pub fn raw_section_names(&self) -> Vec<&str> {
        self.spans.iter().map(|span| self.raw_name(span)).collect()
    }

    pub fn sections(&self) -> impl Iterator<Item = Section<'_>> {
        self.spans.iter().map(|span| self.view(span))
    }

    /// The first section resolving to `name`. `""` is the default section.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<Section<'_>> {
        self.matching_spans(name)
            .next()
            .map(|i| self.view(&self.spans[i]))
    }

    /// Resolved value of a qualified key such as `section.key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let (section, name) = self.dialect.split_key(key);
        self.find_in(section, name)
            .and_then(|i| self.lines[i].value_raw())
            .map(|raw| self.dialect.value(raw))
    }

    /// Like [`get`](Ini::get), but absent keys read as an empty string.
    #[must_use]
    pub fn get_key(&self, key: &str) -> String {
        self.get(key).unwrap_or_default()
    }

    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        let (section, name) = self.dialect.split_key(key);
        self.find_in(section, name).is_some()
    }

    /// Parse a value, keeping absence and malformed text apart.
    pub fn try_get<T: FromStr>(&self, key: &str) -> std::result::Result<Option<T>, T::Err> {
        self.get(key).map(|value| value.parse()).transpose()
    }

    // The typed getters read missing and malformed values alike as zero. Each parses the
    // resolved value with `str::parse`, so only the forms listed are accepted.

    /// `true` only for the exact text `true`. `True`, `yes`, `on` and `1` all read as `false`.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        self.try_get(key).ok().flatten().unwrap_or_default()
    }

    /// A decimal `i32`, with an optional sign. Values outside the range read as zero; use
    /// [`get_i64`](Ini::get_i64) for wider ones.
    #[must_use]
    pub fn get_int(&self, key: &str) -> i32 {
        self.try_get(key).ok().flatten().unwrap_or_default()
    }

    #[must_use]
    pub fn get_i64(&self, key: &str) -> i64 {
        self.try_get(key).ok().flatten().unwrap_or_default()
    }

    /// A decimal `u64`. Negative values read as zero.
    #[must_use]
    pub fn get_u64(&self, key: &str) -> u64 {
        self.try_get(key).ok().flatten().unwrap_or_default()
    }

    /// Any float `f64::from_str` accepts, including `1e3`, `inf` and `NaN`.
    #[must_use]
    pub fn get_f64(&self, key: &str) -> f64 {
        self.try_get(key).ok().flatten().unwrap_or_default()
    }

    /// Section name to key to value. Earlier entries win over later duplicates.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, HashMap<String, String>> {
        let mut map = HashMap::<String, HashMap<String, String>>::with_capacity(self.spans.len());

        for section in self.sections() {
            let entries = map.entry(section.name()).or_default();
            for (key, value) in section.entries() {
                entries.entry(key.to_owned()).or_insert(value);
            }
        }

        map
    }

    /// Qualified key to value.
    #[must_use]
    pub fn to_flat_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::<String, String>::new();

        for section in self.sections() {
            let name = section.name();
            for (key, value) in section.entries() {
                map.entry(self.dialect.join_key(&name, key))
                    .or_insert(value);
            }
        }

        map
    }

    fn raw_name(&self, span: &Span) -> &str {
        span.header
            .and_then(|i| self.lines[i].section_raw())
            .unwrap_or_default()
    }

    fn view(&self, span: &Span) -> Section<'_> {
        Section::new(self.raw_name(span), &self.lines[span.body()], &*self.dialect)
    }

    /// Indices into `spans` of every section matching `name`, in document order.
    fn matching_spans(&self, name: &str) -> impl Iterator<Item = usize> + '_ {
        let wanted = self.dialect.lookup_name(name);

        self.spans.iter().enumerate().filter_map(move |(i, span)| {
            let resolved = self.dialect.section_name(self.raw_name(span));
            self.dialect
                .sections_match(&wanted, &resolved)
                .then_some(i)
        })
    }

    /// Line index of the first entry `key` in any section matching `section`.
    fn find_in(&self, section: &str, key: &str) -> Option<usize> {
        self.matching_spans(section).find_map(|i| {
            self.spans[i]
                .body()
                .find(|&n| self.lines[n].key_raw().is_some_and(|k| keys_match(k, key)))
        })
    }
}

impl Default for Ini {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Ini {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Ini {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }

        Ok(())
    }
}
