//! `io` adapters around any incremental encoder or decoder.

use crate::{DecodeError, Encoder, SourceDecoder, SourceEncoder, TextDecoder};
use std::io;

const DEFAULT_CAPACITY: usize = 8 * 1024;

/// Text to bytes, fed one chunk at a time.
pub trait IncrementalEncode {
    /// Encodes `input` onto `out`. `last` flushes and resets the encoder.
    fn encode_chunk(&mut self, input: &str, last: bool, out: &mut Vec<u8>);

    fn reset(&mut self);
}

/// Bytes to text, fed one chunk at a time.
pub trait IncrementalDecode {
    /// Decodes `input` onto `out`. `last` flushes and resets the decoder.
    fn decode_chunk(
        &mut self,
        input: &[u8],
        last: bool,
        out: &mut String,
    ) -> Result<(), DecodeError>;

    fn reset(&mut self);
}

impl IncrementalEncode for Encoder {
    fn encode_chunk(&mut self, input: &str, last: bool, out: &mut Vec<u8>) {
        self.encode(input.chars(), last, out);
    }

    fn reset(&mut self) {
        Encoder::reset(self);
    }
}

impl IncrementalEncode for SourceEncoder {
    fn encode_chunk(&mut self, input: &str, last: bool, out: &mut Vec<u8>) {
        self.encode_into(input, last, out);
    }

    fn reset(&mut self) {
        SourceEncoder::reset(self);
    }
}

impl<E: IncrementalEncode + ?Sized> IncrementalEncode for Box<E> {
    fn encode_chunk(&mut self, input: &str, last: bool, out: &mut Vec<u8>) {
        (**self).encode_chunk(input, last, out);
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

impl IncrementalDecode for TextDecoder {
    fn decode_chunk(
        &mut self,
        input: &[u8],
        last: bool,
        out: &mut String,
    ) -> Result<(), DecodeError> {
        self.decode_into(input, last, out)
    }

    fn reset(&mut self) {
        TextDecoder::reset(self);
    }
}

impl IncrementalDecode for SourceDecoder {
    fn decode_chunk(
        &mut self,
        input: &[u8],
        last: bool,
        out: &mut String,
    ) -> Result<(), DecodeError> {
        self.decode_into(input, last, out)
    }

    fn reset(&mut self) {
        SourceDecoder::reset(self);
    }
}

impl<D: IncrementalDecode + ?Sized> IncrementalDecode for Box<D> {
    fn decode_chunk(
        &mut self,
        input: &[u8],
        last: bool,
        out: &mut String,
    ) -> Result<(), DecodeError> {
        (**self).decode_chunk(input, last, out)
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

/// Encodes text written to it into an underlying [`io::Write`].
///
/// Call [`StreamWriter::finish`] to write the padded last byte.
pub struct StreamWriter<E, W> {
    encoder: E,
    writer: W,
    buf: Vec<u8>,
}

impl<E: IncrementalEncode, W: io::Write> StreamWriter<E, W> {
    pub fn new(encoder: E, writer: W) -> Self {
        StreamWriter {
            encoder,
            writer,
            buf: Vec::new(),
        }
    }

    pub fn write_str(&mut self, input: &str) -> io::Result<()> {
        self.buf.clear();
        self.encoder.encode_chunk(input, false, &mut self.buf);
        self.writer.write_all(&self.buf)
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.buf.clear();
        self.encoder.encode_chunk("", true, &mut self.buf);
        self.writer.write_all(&self.buf)?;
        self.writer.flush()?;
        Ok(self.writer)
    }

    /// Drops the pending partial byte; nothing already written is affected.
    pub fn reset(&mut self) {
        self.encoder.reset();
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }
}

/// Decodes text out of an underlying [`io::Read`].
///
/// Decoding failures surface as [`io::ErrorKind::InvalidData`] errors that
/// wrap the [`DecodeError`]. The failing chunk is already consumed, so every
/// later read repeats the error until [`StreamReader::reset`].
pub struct StreamReader<D, R> {
    decoder: D,
    reader: R,
    buf: Vec<u8>,
    done: bool,
    failed: Option<DecodeError>,
}

impl<D: IncrementalDecode, R: io::Read> StreamReader<D, R> {
    pub fn new(decoder: D, reader: R) -> Self {
        StreamReader::with_capacity(DEFAULT_CAPACITY, decoder, reader)
    }

    pub fn with_capacity(capacity: usize, decoder: D, reader: R) -> Self {
        StreamReader {
            decoder,
            reader,
            buf: vec![0; capacity.max(1)],
            done: false,
            failed: None,
        }
    }

    /// Reads one chunk of input and appends what it decodes to `out`.
    ///
    /// Returns the number of bytes consumed. `Ok(0)` means the end of the
    /// stream was reached and the decoder has been flushed.
    pub fn read_chunk(&mut self, out: &mut String) -> io::Result<usize> {
        if let Some(err) = &self.failed {
            return Err(invalid_data(err.clone()));
        }
        if self.done {
            return Ok(0);
        }
        let n = loop {
            match self.reader.read(&mut self.buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        let last = n == 0;
        trace!("read {n} byte(s), last: {last}");
        if let Err(err) = self.decoder.decode_chunk(&self.buf[..n], last, out) {
            debug!("decoding failed, {n} byte(s) dropped: {err}");
            self.failed = Some(err.clone());
            return Err(invalid_data(err));
        }
        self.done = last;
        Ok(n)
    }

    /// Decodes everything up to the end of the stream, returning the number
    /// of bytes appended to `out`.
    pub fn read_to_string(&mut self, out: &mut String) -> io::Result<usize> {
        let start = out.len();
        while self.read_chunk(out)? != 0 {}
        Ok(out.len() - start)
    }

    /// Starts over on the remaining input with a fresh decoder, clearing a
    /// previous failure.
    pub fn reset(&mut self) {
        self.decoder.reset();
        self.done = false;
        self.failed = None;
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

fn invalid_data(err: DecodeError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}

#[cfg(test)]
mod tests {
    use super::{IncrementalDecode, StreamReader, StreamWriter};
    use crate::test_util::setup;
    use crate::{
        encode, encode_scalars, DecodeError, Encoder, ErrorPolicy, SourceDecoder, TextDecoder,
    };
    use std::io::{self, Cursor};

    const TEXT: &str = "The quick brown fox\njumps over the lazy dog.\n";

    #[test]
    fn test_writer() {
        setup();
        let mut writer = StreamWriter::new(Encoder::new(), vec![]);
        for line in TEXT.split_inclusive('\n') {
            writer.write_str(line).unwrap();
        }
        assert_eq!(writer.finish().unwrap(), encode(TEXT));
    }

    #[test]
    fn test_writer_empty() {
        setup();
        let writer = StreamWriter::new(Encoder::new(), vec![]);
        assert_eq!(writer.finish().unwrap(), [0xFF]);
    }

    #[test]
    fn test_reader_small_chunks() {
        setup();
        let input = encode(TEXT);
        for capacity in [1, 2, 3, 7, 64] {
            let mut reader = StreamReader::with_capacity(
                capacity,
                TextDecoder::new(ErrorPolicy::Strict),
                Cursor::new(&input),
            );
            let mut out = String::new();
            reader.read_to_string(&mut out).unwrap();
            assert_eq!(out, TEXT, "capacity {capacity}");
            assert_eq!(reader.read_chunk(&mut out).unwrap(), 0);
        }
    }

    #[test]
    fn test_reader_invalid_data() {
        setup();
        let input = encode_scalars(&[0x41, 0x110000]);
        let mut reader = StreamReader::new(TextDecoder::default(), Cursor::new(input));
        let err = reader.read_to_string(&mut String::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        let inner = err.into_inner().unwrap().downcast::<DecodeError>().unwrap();
        assert_eq!(*inner, DecodeError::Unrepresentable { value: 0x110000 });
    }

    #[test]
    fn test_reader_failure_is_sticky() {
        setup();
        let input = encode_scalars(&[0x41, 0x110000, 0x42]);
        let capacity = input.len();
        let mut reader =
            StreamReader::with_capacity(capacity, TextDecoder::default(), Cursor::new(input));
        let mut out = String::new();
        for _ in 0..2 {
            let err = reader.read_chunk(&mut out).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidData);
            let inner = err.into_inner().unwrap().downcast::<DecodeError>().unwrap();
            assert_eq!(*inner, DecodeError::Unrepresentable { value: 0x110000 });
        }
        assert!(out.is_empty());

        reader.reset();
        assert_eq!(reader.read_chunk(&mut out).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_writer_reset_midway() {
        setup();
        let mut writer = StreamWriter::new(Encoder::new(), vec![]);
        // 65 set bits and a terminator: eight full bytes out, two bits pending
        writer.write_str("A").unwrap();
        assert_eq!(writer.get_ref(), &[0xFF; 8]);
        writer.reset();
        writer.get_mut().clear();
        writer.write_str(TEXT).unwrap();

        let mut fresh = StreamWriter::new(Encoder::new(), vec![]);
        fresh.write_str(TEXT).unwrap();
        assert_eq!(writer.finish().unwrap(), fresh.finish().unwrap());
    }

    #[test]
    fn test_reader_reset_midway() {
        setup();
        // a 7, then eight set bits of an unfinished run
        let input = [&[0xFE, 0xFF][..], &encode(TEXT)].concat();
        let mut reader = StreamReader::with_capacity(
            2,
            TextDecoder::new(ErrorPolicy::Strict),
            Cursor::new(input.clone()),
        );
        let mut out = String::new();
        assert_eq!(reader.read_chunk(&mut out).unwrap(), 2);
        assert_eq!(out, "\x07");

        reader.reset();
        out.clear();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(reader.get_ref().position(), input.len() as u64);

        let mut fresh = StreamReader::new(TextDecoder::default(), Cursor::new(encode(TEXT)));
        let mut expected = String::new();
        fresh.read_to_string(&mut expected).unwrap();
        assert_eq!(out, expected);
        assert_eq!(reader.into_inner().into_inner(), input);
    }

    #[test]
    fn test_boxed_source_roundtrip() {
        setup();
        let text = format!("#!/bin/sh\n# coding: utf-1-source\n{TEXT}");
        let mut writer = StreamWriter::new(Box::new(crate::SourceEncoder::new()), vec![]);
        writer.write_str(&text).unwrap();
        let bytes = writer.finish().unwrap();

        let decoder: Box<dyn IncrementalDecode> = Box::new(SourceDecoder::new(ErrorPolicy::Strict));
        let mut reader = StreamReader::new(decoder, Cursor::new(bytes));
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, text);
    }
}
