//! Span tokenizer: turns one raw sample into text runs, open tags, close tags and
//! error tokens.
//!
//! The tokenizer never gives up on a sample. When a tag cannot be scanned it emits an
//! [`TokenKind::Error`] covering the broken markup and resumes at the next
//! recoverable boundary: right after the tag's `>` when the tag was terminated, or
//! at the next `<` (or the end of input) otherwise.

use crate::{TokenError, model::SpanKind};

/// A `name="value"` pair as scanned, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawAttribute<'a> {
    pub(crate) name: &'a str,
    pub(crate) value: &'a str,
    /// Byte range of the whole `name="value"` text.
    pub(crate) start: usize,
    pub(crate) end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind<'a> {
    Text,
    TagOpen {
        kind: SpanKind,
        attributes: Vec<RawAttribute<'a>>,
    },
    TagClose {
        kind: SpanKind,
    },
    Error {
        error: TokenError,
        /// Byte offset of the offending character.
        at: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub(crate) kind: TokenKind<'a>,
    /// Byte range in the input, end exclusive.
    pub(crate) start: usize,
    pub(crate) end: usize,
    /// The source text of the token.
    pub(crate) raw: &'a str,
}

pub(crate) struct Tokenizer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Tokenizer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn byte(&self, at: usize) -> Option<u8> {
        self.input.as_bytes().get(at).copied()
    }

    fn char_at(&self, at: usize) -> Option<char> {
        self.input.get(at..).and_then(|rest| rest.chars().next())
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        self.input.get(start..end).unwrap_or_default()
    }

    /// Whether a tag starts at `at`. A `<` that is not followed by a letter (or by `/`
    /// and a letter) is ordinary text, as in `a < b`.
    fn starts_tag(&self, at: usize) -> bool {
        if self.byte(at) != Some(b'<') {
            return false;
        }
        match self.byte(at + 1) {
            Some(b'/') => self.byte(at + 2).is_some_and(|b| b.is_ascii_alphabetic()),
            Some(b) => b.is_ascii_alphabetic(),
            None => false,
        }
    }

    fn skip_whitespace(&self, mut cursor: usize) -> usize {
        while let Some(ch) = self.char_at(cursor) {
            if !ch.is_whitespace() {
                break;
            }
            cursor += ch.len_utf8();
        }
        cursor
    }

    fn read_name(&self, start: usize) -> usize {
        let mut cursor = start;
        while let Some(b) = self.byte(cursor) {
            let accepted = if cursor == start {
                b.is_ascii_alphabetic() || b == b'_'
            } else {
                b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
            };
            if !accepted {
                break;
            }
            cursor += 1;
        }
        cursor
    }

    fn next_tag_start(&self, from: usize) -> usize {
        self.input
            .get(from..)
            .and_then(|rest| rest.find('<'))
            .map_or(self.input.len(), |offset| from + offset)
    }

    /// End of a tag that is syntactically terminated: one past its `>`, provided the
    /// `>` comes before any other `<`.
    fn terminated_tag_end(&self, from: usize) -> Option<usize> {
        let rest = self.input.get(from..)?;
        let gt = rest.find('>')?;
        match rest.find('<') {
            Some(lt) if lt < gt => None,
            Some(_) | None => Some(from + gt + 1),
        }
    }

    fn text(&mut self) -> Token<'a> {
        let start = self.position;
        // A run is all the prose up to the next tag, so clusters inside it are never
        // split. The tag itself is a hard boundary even when a prepended mark (U+0600,
        // U+0D4E) would join its `<` into one grapheme cluster.
        let end = self
            .slice(start, self.input.len())
            .match_indices('<')
            .map(|(offset, _)| start + offset)
            .find(|&at| at > start && self.starts_tag(at))
            .unwrap_or(self.input.len());
        self.position = end;
        Token {
            kind: TokenKind::Text,
            start,
            end,
            raw: self.slice(start, end),
        }
    }

    fn error(&mut self, start: usize, error: TokenError, at: usize, resume: usize) -> Token<'a> {
        tracing::debug!(%error, at, "recovering from malformed tag");
        let end = resume.max(start + 1).min(self.input.len());
        self.position = end;
        Token {
            kind: TokenKind::Error { error, at },
            start,
            end,
            raw: self.slice(start, end),
        }
    }

    fn error_to_next_tag(&mut self, start: usize, error: TokenError, at: usize) -> Token<'a> {
        let resume = self.next_tag_start(start + 1);
        self.error(start, error, at, resume)
    }

    fn tag(&mut self) -> Token<'a> {
        let start = self.position;
        let mut cursor = start + 1;
        let closing = self.byte(cursor) == Some(b'/');
        if closing {
            cursor += 1;
        }

        let name_end = self.read_name(cursor);
        let name = self.slice(cursor, name_end);
        let Some(kind) = SpanKind::from_tag_name(name) else {
            let error = TokenError::UnknownTag(name.to_string());
            return match self.terminated_tag_end(name_end) {
                Some(resume) => self.error(start, error, cursor, resume),
                None => self.error_to_next_tag(start, error, cursor),
            };
        };
        cursor = name_end;

        if closing {
            cursor = self.skip_whitespace(cursor);
            return match self.char_at(cursor) {
                Some('>') => {
                    self.position = cursor + 1;
                    Token {
                        kind: TokenKind::TagClose { kind },
                        start,
                        end: self.position,
                        raw: self.slice(start, self.position),
                    }
                }
                None => self.error_to_next_tag(start, TokenError::UnterminatedTag, cursor),
                Some(ch) => {
                    let error = if ch.is_ascii_alphabetic() {
                        TokenError::AttributesOnClosingTag
                    } else {
                        TokenError::UnexpectedCharacter(ch)
                    };
                    match self.terminated_tag_end(cursor) {
                        Some(resume) => self.error(start, error, cursor, resume),
                        None => self.error_to_next_tag(start, error, cursor),
                    }
                }
            };
        }

        let mut attributes = Vec::new();
        loop {
            cursor = self.skip_whitespace(cursor);
            match self.char_at(cursor) {
                None | Some('<') => {
                    return self.error_to_next_tag(start, TokenError::UnterminatedTag, cursor);
                }
                Some('>') => {
                    self.position = cursor + 1;
                    return Token {
                        kind: TokenKind::TagOpen { kind, attributes },
                        start,
                        end: self.position,
                        raw: self.slice(start, self.position),
                    };
                }
                Some('/') if self.byte(cursor + 1) == Some(b'>') => {
                    return self.error(start, TokenError::SelfClosingTag, cursor, cursor + 2);
                }
                Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
                    match self.attribute(cursor) {
                        Ok(attribute) => {
                            cursor = attribute.end;
                            attributes.push(attribute);
                        }
                        Err((error, at)) => return self.error_to_next_tag(start, error, at),
                    }
                }
                Some(ch) => {
                    return self.error_to_next_tag(start, TokenError::UnexpectedCharacter(ch), cursor);
                }
            }
        }
    }

    fn attribute(&self, start: usize) -> Result<RawAttribute<'a>, (TokenError, usize)> {
        let name_end = self.read_name(start);
        let name = self.slice(start, name_end);

        let mut cursor = self.skip_whitespace(name_end);
        if self.byte(cursor) != Some(b'=') {
            return Err((TokenError::MissingAttributeValue(name.to_string()), cursor));
        }
        cursor = self.skip_whitespace(cursor + 1);

        let quote = match self.byte(cursor) {
            Some(q @ (b'"' | b'\'')) => char::from(q),
            Some(_) | None => {
                return Err((TokenError::UnquotedAttributeValue(name.to_string()), cursor));
            }
        };
        let value_start = cursor + 1;
        let rest = self.slice(value_start, self.input.len());
        // A value never runs into the next tag: `<quote id="q1>text <author ...` is an
        // unterminated value, not a value containing a tag.
        let length = match (rest.find(quote), rest.find('<')) {
            (Some(length), Some(lt)) if length < lt => length,
            (Some(length), None) => length,
            (Some(_) | None, Some(_)) | (None, None) => {
                return Err((TokenError::UnterminatedAttributeValue(name.to_string()), cursor));
            }
        };
        let value_end = value_start + length;

        Ok(RawAttribute {
            name,
            value: self.slice(value_start, value_end),
            start,
            end: value_end + 1,
        })
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.input.len() {
            return None;
        }
        if self.starts_tag(self.position) {
            Some(self.tag())
        } else {
            Some(self.text())
        }
    }
}
