//! Codec lookup by name.
//!
//! Names are compared after [`normalize`], so `UTF-1`, `utf_1` and `Utf1`
//! all resolve to [`Codec::Utf1`].

use crate::{
    encode, DecodeError, Encoder, ErrorPolicy, IncrementalDecode, IncrementalEncode, SourceDecoder,
    SourceEncoder, StreamReader, StreamWriter, TextDecoder, UnknownCodec,
};
use std::fmt;
use std::io;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// The plain unary run codec.
    Utf1,
    /// [`Codec::Utf1`] with a verbatim leading encoding header, see
    /// [`crate::source`].
    Utf1Source,
}

/// Lowercases `name` and drops every `-` and `_`.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn lookup(name: &str) -> Option<Codec> {
    let normalized = normalize(name);
    let codec = Codec::ALL
        .into_iter()
        .find(|codec| codec.aliases().contains(&normalized.as_str()));
    debug!("lookup {name:?} as {normalized:?}: {codec:?}");
    codec
}

type BoxedEncoder = Box<dyn IncrementalEncode>;
type BoxedDecoder = Box<dyn IncrementalDecode>;

impl Codec {
    pub const ALL: [Codec; 2] = [Codec::Utf1, Codec::Utf1Source];

    pub fn name(self) -> &'static str {
        match self {
            Codec::Utf1 => "UTF-1",
            Codec::Utf1Source => "UTF-1-SOURCE",
        }
    }

    /// Normalized names this codec is found under.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Codec::Utf1 => &["utf1", "1"],
            Codec::Utf1Source => &["utf1source"],
        }
    }

    pub fn encode(self, input: &str) -> Vec<u8> {
        match self {
            Codec::Utf1 => encode(input),
            Codec::Utf1Source => SourceEncoder::new().encode_str(input, true),
        }
    }

    pub fn decode(self, input: &[u8], policy: ErrorPolicy) -> Result<String, DecodeError> {
        let mut out = String::with_capacity(input.len() / 4);
        self.incremental_decoder(policy)
            .decode_chunk(input, true, &mut out)?;
        Ok(out)
    }

    pub fn incremental_encoder(self) -> BoxedEncoder {
        match self {
            Codec::Utf1 => Box::new(Encoder::new()),
            Codec::Utf1Source => Box::new(SourceEncoder::new()),
        }
    }

    pub fn incremental_decoder(self, policy: ErrorPolicy) -> BoxedDecoder {
        match self {
            Codec::Utf1 => Box::new(TextDecoder::new(policy)),
            Codec::Utf1Source => Box::new(SourceDecoder::new(policy)),
        }
    }

    pub fn stream_writer<W: io::Write>(self, writer: W) -> StreamWriter<BoxedEncoder, W> {
        StreamWriter::new(self.incremental_encoder(), writer)
    }

    pub fn stream_reader<R: io::Read>(
        self,
        reader: R,
        policy: ErrorPolicy,
    ) -> StreamReader<BoxedDecoder, R> {
        StreamReader::new(self.incremental_decoder(policy), reader)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Codec {
    type Err = UnknownCodec;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(s).ok_or_else(|| UnknownCodec(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::{lookup, normalize, Codec};
    use crate::test_util::setup;
    use crate::{encode, ErrorPolicy, UnknownCodec};
    use std::io::Cursor;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("UTF-1"), "utf1");
        assert_eq!(normalize("utf_1-SOURCE"), "utf1source");
        assert_eq!(normalize("--"), "");
    }

    #[test]
    fn test_lookup() {
        setup();
        for name in ["utf-1", "UTF_1", "Utf1", "1", "u-t-f-1"] {
            assert_eq!(lookup(name), Some(Codec::Utf1), "name {name:?}");
        }
        for name in ["utf-1-source", "UTF_1_SOURCE", "utf1Source"] {
            assert_eq!(lookup(name), Some(Codec::Utf1Source), "name {name:?}");
        }
        for name in ["utf-8", "", "utf 1", "source"] {
            assert_eq!(lookup(name), None, "name {name:?}");
        }
        assert_eq!("UTF-1".parse::<Codec>(), Ok(Codec::Utf1));
        assert_eq!(
            "latin-1".parse::<Codec>(),
            Err(UnknownCodec("latin-1".to_owned()))
        );
    }

    #[test]
    fn test_names_resolve_to_themselves() {
        for codec in Codec::ALL {
            assert_eq!(lookup(codec.name()), Some(codec));
            assert_eq!(codec.to_string().parse::<Codec>(), Ok(codec));
        }
    }

    #[test]
    fn test_codec_roundtrip() {
        setup();
        let text = "# coding: utf-1-source\nprint('hi')\n";
        for codec in Codec::ALL {
            let bytes = codec.encode(text);
            assert_eq!(codec.decode(&bytes, ErrorPolicy::Strict).unwrap(), text);
        }
        assert_eq!(Codec::Utf1.encode(text), encode(text));
        assert!(Codec::Utf1Source
            .encode(text)
            .starts_with(b"# coding: utf-1-source\n"));
    }

    #[test]
    fn test_codec_streams() {
        setup();
        let text = "streamed\ttext\u{1F980}";
        let mut writer = Codec::Utf1.stream_writer(vec![]);
        for part in ["str", "eamed\t", "text\u{1F980}"] {
            writer.write_str(part).unwrap();
        }
        let bytes = writer.finish().unwrap();
        assert_eq!(bytes, encode(text));

        let mut reader = Codec::Utf1.stream_reader(Cursor::new(bytes), ErrorPolicy::Strict);
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, text);
    }
}
