use std::fmt;

/// An inline or full-line comment: the delimiter (`;` or `#`) and everything after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub delimiter: char,
    pub text: String,
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.delimiter, self.text)
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Whitespace only. The whitespace lives in [`Line::indent`].
    Blank,
    Comment(Comment),
    Section {
        /// Text between the brackets, untouched.
        raw: String,
        trailing: String,
        comment: Option<Comment>,
    },
    Entry {
        /// Text between the indentation and `=`, including any spaces before `=`.
        key: String,
        /// Whitespace between `=` and the value.
        lead: String,
        /// The value token. A quoted value may span several physical lines.
        value: String,
        trailing: String,
        comment: Option<Comment>,
    },
}

/// One logical line of a document.
///
/// Rendering a line yields exactly the text it was parsed from, minus the terminating newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    indent: String,
    kind: LineKind,
}

impl Line {
    #[must_use]
    pub(crate) fn new(indent: String, kind: LineKind) -> Self {
        Self { indent, kind }
    }

    #[must_use]
    pub(crate) fn blank() -> Self {
        Self::new(String::new(), LineKind::Blank)
    }

    #[must_use]
    pub(crate) fn section(raw: String) -> Self {
        Self::new(
            String::new(),
            LineKind::Section {
                raw,
                trailing: String::new(),
                comment: None,
            },
        )
    }

    #[must_use]
    pub(crate) fn entry(indent: String, key: &str, value: &str) -> Self {
        Self::new(
            indent,
            LineKind::Entry {
                key: key.to_owned(),
                lead: String::new(),
                value: encode_value(value),
                trailing: String::new(),
                comment: None,
            },
        )
    }

    /// Set the text between the end of a new header or entry and its newline, such as the `\r`
    /// of a CRLF document.
    #[must_use]
    pub(crate) fn ending_with(mut self, ending: &str) -> Self {
        if let LineKind::Section { trailing, .. } | LineKind::Entry { trailing, .. } =
            &mut self.kind
        {
            ending.clone_into(trailing);
        }
        self
    }

    #[must_use]
    pub fn indent(&self) -> &str {
        &self.indent
    }

    #[must_use]
    pub fn kind(&self) -> &LineKind {
        &self.kind
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self.kind, LineKind::Blank)
    }

    /// True for the lone empty line that stands in for an empty document.
    pub(crate) fn is_placeholder(&self) -> bool {
        self.is_blank() && self.indent.is_empty()
    }

    #[must_use]
    pub fn section_raw(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Section { raw, .. } => Some(raw),
            _ => None,
        }
    }

    #[must_use]
    pub fn key_raw(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Entry { key, .. } => Some(key),
            _ => None,
        }
    }

    #[must_use]
    pub fn value_raw(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Entry { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Replace the bracket interior of a section header. No-op on other lines.
    pub(crate) fn set_section_raw(&mut self, name: String) {
        if let LineKind::Section { raw, .. } = &mut self.kind {
            *raw = name;
        }
    }

    /// Replace the value token of an entry, keeping every other character of the line.
    pub(crate) fn set_value(&mut self, new: &str) {
        if let LineKind::Entry { value, .. } = &mut self.kind {
            *value = encode_value(new);
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.indent)?;

        match &self.kind {
            LineKind::Blank => Ok(()),
            LineKind::Comment(comment) => comment.fmt(f),
            LineKind::Section {
                raw,
                trailing,
                comment,
            } => {
                write!(f, "[{raw}]{trailing}")?;
                comment.as_ref().map_or(Ok(()), |c| c.fmt(f))
            }
            LineKind::Entry {
                key,
                lead,
                value,
                trailing,
                comment,
            } => {
                write!(f, "{key}={lead}{value}{trailing}")?;
                comment.as_ref().map_or(Ok(()), |c| c.fmt(f))
            }
        }
    }
}

/// Write `value` so that it parses back to itself.
///
/// Bare text is kept when it can be read back unchanged. Otherwise the value is quoted, with `\\`
/// and `"` escaped so the parser finds the real closing quote.
fn encode_value(value: &str) -> String {
    let needs_quotes = value.starts_with('"')
        || value.ends_with('\\')
        || value.contains([';', '#', '\n'])
        || value.trim() != value;

    if !needs_quotes {
        return value.to_owned();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '\\' | '"') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
