use crate::error::ParseError;
use crate::line::{Comment, Line, LineKind};

/// Represents an on-going parse.
///
/// Each call to `parse_line` consumes one logical line: a single physical line, or
/// several when a quoted value contains newlines.
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    text: &'a str,
    position: usize,
    line: usize,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            position: 0,
            line: 1,
        }
    }
}

impl Parser<'_> {
    pub fn into_lines(mut self) -> Result<Vec<Line>, ParseError> {
        let mut lines = Vec::<Line>::with_capacity(self.text.len() / 16 + 1);

        while self.position < self.text.len() {
            lines.push(self.parse_line()?);
        }

        Ok(lines)
    }

    fn parse_line(&mut self) -> Result<Line, ParseError> {
        let text = self.text;
        let start = self.position;
        let eol = end_of_line(text, start);
        let physical = &text[start..eol];
        let body = physical.trim_start();
        let indent = physical[..physical.len() - body.len()].to_owned();

        let (kind, end) = match body.chars().next() {
            None => (LineKind::Blank, eol),
            Some(delimiter @ (';' | '#')) => {
                let comment = Comment {
                    delimiter,
                    text: body[1..].to_owned(),
                };
                (LineKind::Comment(comment), eol)
            }
            Some('[') => (self.parse_section(&body[1..])?, eol),
            Some(_) => self.parse_entry(eol - body.len(), eol)?,
        };

        self.advance_to(end);
        Ok(Line::new(indent, kind))
    }

    /// Move past the newline at `end`, counting any newlines swallowed by a quoted value.
    fn advance_to(&mut self, end: usize) {
        self.line += 1 + self.text[self.position..end].matches('\n').count();
        self.position = (end + 1).min(self.text.len());
    }

    /// `inner` is everything after the opening bracket up to the end of the line.
    fn parse_section(&self, inner: &str) -> Result<LineKind, ParseError> {
        let line = self.line;
        let mut chars = inner.char_indices();
        let mut within_quotes = false;

        let close = loop {
            match chars.next() {
                Some((_, '\\')) => {
                    _ = chars.next();
                }
                Some((_, '"')) => within_quotes = !within_quotes,
                Some((i, ']')) if !within_quotes => break i,
                Some(_) => {}
                None => return Err(ParseError::UnterminatedSection { line }),
            }
        };

        let (trailing, comment) = split_trailer(&inner[close + 1..], line)?;

        Ok(LineKind::Section {
            raw: inner[..close].to_owned(),
            trailing,
            comment,
        })
    }

    /// Parse a key-value line whose first non-blank character is at `body_start`.
    ///
    /// Returns the entry and the offset of the newline that ends it, which lies past `eol` when
    /// the value is a quoted string spanning several lines.
    fn parse_entry(&self, body_start: usize, eol: usize) -> Result<(LineKind, usize), ParseError> {
        let text = self.text;
        let line = self.line;
        let body = &text[body_start..eol];

        let eq = match body
            .char_indices()
            .find(|&(_, c)| matches!(c, '=' | ';' | '#'))
        {
            Some((i, '=')) => i,
            _ => return Err(ParseError::MissingSeparator { line }),
        };

        let key = &body[..eq];
        if key.trim().is_empty() {
            return Err(ParseError::EmptyKey { line });
        }

        let after_eq = body_start + eq + 1;
        let rest = &text[after_eq..];
        let lead_len = rest.len()
            - rest
                .trim_start_matches(|c: char| c.is_whitespace() && c != '\n')
                .len();
        let value_start = after_eq + lead_len;

        let mut cursor = value_start;
        if text[value_start..].starts_with('"') {
            let close = find_closing_quote(&text[value_start + 1..])
                .ok_or(ParseError::UnterminatedString { line })?;
            cursor = value_start + 1 + close + 1;
        }

        let (offset, delimiter) = scan_unquoted(&text[cursor..]);
        let stop = cursor + offset;
        let end = end_of_line(text, stop);

        let comment = delimiter.map(|delimiter| Comment {
            delimiter,
            text: text[stop + 1..end].to_owned(),
        });

        let token = &text[value_start..stop];
        let value = token.trim_end();

        let kind = LineKind::Entry {
            key: key.to_owned(),
            lead: text[after_eq..value_start].to_owned(),
            value: value.to_owned(),
            trailing: token[value.len()..].to_owned(),
            comment,
        };

        Ok((kind, end))
    }
}

/// True when `[raw]` parses back as one header whose bracket interior is exactly `raw`.
pub(crate) fn is_valid_header(raw: &str) -> bool {
    let text = format!("[{raw}]\n");
    matches!(
        Parser::new(&text).into_lines().as_deref(),
        Ok([line]) if line.section_raw() == Some(raw)
    )
}

/// True when `key=` parses back as one entry whose key is exactly `key`.
pub(crate) fn is_valid_key(key: &str) -> bool {
    let text = format!("{key}=\n");
    matches!(
        Parser::new(&text).into_lines().as_deref(),
        Ok([line]) if line.key_raw() == Some(key)
    )
}

fn end_of_line(text: &str, from: usize) -> usize {
    text[from..].find('\n').map_or(text.len(), |i| from + i)
}

/// Split what follows a section header's closing bracket into whitespace and an optional comment.
fn split_trailer(after: &str, line: usize) -> Result<(String, Option<Comment>), ParseError> {
    let rest = after.trim_start();
    let trailing = after[..after.len() - rest.len()].to_owned();

    let comment = match rest.chars().next() {
        None => None,
        Some(delimiter @ (';' | '#')) => Some(Comment {
            delimiter,
            text: rest[1..].to_owned(),
        }),
        Some(c) => return Err(ParseError::UnexpectedCharacter { line, c }),
    };

    Ok((trailing, comment))
}

/// Offset of the first unescaped `"` in `s`. Newlines do not terminate the search.
fn find_closing_quote(s: &str) -> Option<usize> {
    let mut chars = s.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                _ = chars.next();
            }
            '"' => return Some(i),
            _ => {}
        }
    }

    None
}

/// Scan to the end of the line or the first unescaped comment delimiter, whichever comes first.
fn scan_unquoted(s: &str) -> (usize, Option<char>) {
    let mut chars = s.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '\n' => return (i, None),
            ';' | '#' => return (i, Some(c)),
            // An escape never swallows the newline.
            '\\' if chars.peek().is_some_and(|&(_, n)| n != '\n') => {
                _ = chars.next();
            }
            _ => {}
        }
    }

    (s.len(), None)
}
