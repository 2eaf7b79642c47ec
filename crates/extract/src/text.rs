use regex::Match;

use crate::schema::Span;

/// Note text indexed by character.
///
/// Entity and evidence offsets count characters, while `regex` reports byte
/// offsets; this keeps the two in step for non-ASCII notes.
pub struct NoteText<'a> {
    text: &'a str,
    chars: Vec<char>,
    /// Byte offset of each char, plus a trailing `text.len()`.
    byte_offsets: Vec<usize>,
}

impl<'a> NoteText<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut byte_offsets = Vec::with_capacity(text.len() + 1);
        for (offset, c) in text.char_indices() {
            chars.push(c);
            byte_offsets.push(offset);
        }
        byte_offsets.push(text.len());

        Self {
            text,
            chars,
            byte_offsets,
        }
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn char_len(&self) -> usize {
        self.chars.len()
    }

    /// Char index of a byte offset; offsets inside a char round up.
    pub fn byte_to_char(&self, byte: usize) -> usize {
        match self.byte_offsets.binary_search(&byte) {
            Ok(index) => index,
            Err(index) => index.min(self.chars.len()),
        }
    }

    pub fn char_to_byte(&self, index: usize) -> usize {
        self.byte_offsets[index.min(self.chars.len())]
    }

    pub fn span_of(&self, m: &Match<'_>) -> Span {
        Span::new(self.byte_to_char(m.start()), self.byte_to_char(m.end()))
    }

    /// Text covered by a char span, clamped to the note.
    pub fn slice(&self, span: Span) -> &'a str {
        let end = self.char_to_byte(span.end);
        let start = self.char_to_byte(span.start).min(end);
        &self.text[start..end]
    }

    /// The `len` chars that follow `from`, clamped to the note.
    pub fn window_after(&self, from: usize, len: usize) -> &'a str {
        let end = from.saturating_add(len);
        self.slice(Span::new(from, end))
    }
}
