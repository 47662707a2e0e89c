//! Source-file flavour of the codec.
//!
//! A source file may start with an optional first line (a shebang) and a
//! comment line declaring its encoding:
//!
//! ```text
//! #!/usr/bin/env python3
//! # -*- coding: utf-1-source -*-
//! ```
//!
//! That header is kept as plain UTF-8 in front of the encoded body, so tools
//! that only look at the first lines can still read it. Only the very first
//! chunk of a stream is searched for it.

use crate::{
    DecodeError, Decoder, DecoderState, Encoder, EncoderState, ErrorPolicy, StateError, TextDecoder,
};

/// Snapshot of a source encoder or decoder: the core state plus whether the
/// header has already been looked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceState<S> {
    pub started: bool,
    pub inner: S,
}

struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a [u8], pos: usize) -> Self {
        Cursor { input, pos }
    }

    fn eat(&mut self, pred: impl Fn(u8) -> bool) -> bool {
        match self.input.get(self.pos) {
            Some(&b) if pred(b) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn expect(&mut self, pred: impl Fn(u8) -> bool) -> Option<()> {
        self.eat(pred).then_some(())
    }

    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.eat(&pred) {}
    }

    fn expect_literal(&mut self, literal: &[u8], ignore_case: bool) -> Option<()> {
        let rest = self.input.get(self.pos..self.pos + literal.len())?;
        let matched = if ignore_case {
            rest.eq_ignore_ascii_case(literal)
        } else {
            rest == literal
        };
        if matched {
            self.pos += literal.len();
            Some(())
        } else {
            None
        }
    }

    /// `\r\n?` or `\n\r?`
    fn eat_line_end(&mut self) -> bool {
        if self.eat(|b| b == b'\r') {
            self.eat(|b| b == b'\n');
            true
        } else if self.eat(|b| b == b'\n') {
            self.eat(|b| b == b'\r');
            true
        } else {
            false
        }
    }
}

fn is_line_break(b: u8) -> bool {
    b == b'\r' || b == b'\n'
}

/// Length of the encoding header at the start of `input`, line ending
/// included. The declaration may sit on the first or the second line.
pub fn find_header(input: &[u8]) -> Option<usize> {
    let mut first_line = Cursor::new(input, 0);
    first_line.eat_while(|b| !is_line_break(b));
    if first_line.eat_line_end() {
        if let Some(end) = coding_line(input, first_line.pos) {
            return Some(end);
        }
    }
    coding_line(input, 0)
}

fn coding_line(input: &[u8], start: usize) -> Option<usize> {
    let mut cur = Cursor::new(input, start);
    cur.eat_while(|b| matches!(b, b' ' | b'\t' | 0x0B));
    cur.expect(|b| b == b'#')?;
    let comment = cur.pos;
    let limit = input[comment..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(input.len(), |n| comment + n);
    (comment..limit).find_map(|at| declaration_at(input, at))
}

/// `coding[:=][ \t]*utf[-_]?1[-_]?source`, then the rest of the line.
fn declaration_at(input: &[u8], at: usize) -> Option<usize> {
    let is_sep = |b| b == b'-' || b == b'_';
    let mut cur = Cursor::new(input, at);
    cur.expect_literal(b"coding", false)?;
    cur.expect(|b| b == b':' || b == b'=')?;
    cur.eat_while(|b| b == b' ' || b == b'\t');
    cur.expect_literal(b"utf", true)?;
    cur.eat(is_sep);
    cur.expect(|b| b == b'1')?;
    cur.eat(is_sep);
    cur.expect_literal(b"source", true)?;
    cur.eat_while(|b| !is_line_break(b));
    cur.eat_line_end();
    Some(cur.pos)
}

/// [`Encoder`] that passes a leading encoding header through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceEncoder {
    inner: Encoder,
    started: bool,
}

impl SourceEncoder {
    pub fn new() -> Self {
        SourceEncoder::default()
    }

    pub fn encode_into(&mut self, input: &str, last: bool, out: &mut Vec<u8>) {
        let mut body = input;
        if !self.started {
            if let Some(end) = find_header(input.as_bytes()) {
                debug_assert!(input.is_char_boundary(end));
                debug!("keep {end} byte(s) of source header");
                let (header, rest) = input.split_at(end);
                out.extend_from_slice(header.as_bytes());
                body = rest;
            }
        }
        self.inner.encode(body.chars(), last, out);
        self.started = !last;
    }

    pub fn encode_str(&mut self, input: &str, last: bool) -> Vec<u8> {
        let mut out = Vec::with_capacity(input.len() + 1);
        self.encode_into(input, last, &mut out);
        out
    }

    pub fn reset(&mut self) {
        self.inner.reset();
        self.started = false;
    }

    pub fn state(&self) -> SourceState<EncoderState> {
        SourceState {
            started: self.started,
            inner: self.inner.state(),
        }
    }

    pub fn set_state(&mut self, state: SourceState<EncoderState>) -> Result<(), StateError> {
        self.inner.set_state(state.inner)?;
        self.started = state.started;
        Ok(())
    }
}

/// [`Decoder`] that copies a leading UTF-8 encoding header through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceDecoder {
    inner: TextDecoder,
    started: bool,
}

impl SourceDecoder {
    pub fn new(policy: ErrorPolicy) -> Self {
        SourceDecoder {
            inner: TextDecoder::new(policy),
            started: false,
        }
    }

    pub fn decode_into(
        &mut self,
        input: &[u8],
        last: bool,
        out: &mut String,
    ) -> Result<(), DecodeError> {
        let start = out.len();
        let mut body = input;
        if !self.started {
            if let Some(end) = find_header(input) {
                debug!("keep {end} byte(s) of source header");
                let (header, rest) = input.split_at(end);
                out.push_str(std::str::from_utf8(header)?);
                body = rest;
            }
        }
        if let Err(err) = self.inner.decode_into(body, last, out) {
            out.truncate(start);
            return Err(err);
        }
        self.started = !last;
        Ok(())
    }

    pub fn decode(&mut self, input: &[u8], last: bool) -> Result<String, DecodeError> {
        let mut out = String::with_capacity(input.len() / 4);
        self.decode_into(input, last, &mut out)?;
        Ok(out)
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.inner.policy()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
        self.started = false;
    }

    pub fn state(&self) -> SourceState<DecoderState> {
        SourceState {
            started: self.started,
            inner: self.inner.decoder().state(),
        }
    }

    pub fn set_state(&mut self, state: SourceState<DecoderState>) {
        *self.inner.decoder_mut() = Decoder::from(state.inner);
        self.started = state.started;
    }
}
