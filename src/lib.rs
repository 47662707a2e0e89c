//! # Unary Run Encoding Scheme
//!
//! Every scalar value `V` is written as `V` set bits followed by one clear bit.
//! The codes of consecutive values are concatenated into a single bitstream:
//!
//! ```text
//!          2     0   1    pad
//!         ┌───┐ ┌─┐ ┌──┐ ┌──┐
//!         1 1 0  0  1 0  1 1    ──▶  0xCB
//!             ▲  ▲    ▲
//!             └──┴────┴─terminators
//! ```
//!
//! The bitstream is cut into bytes with the first produced bit as the MSB:
//!
//! ```text
//!          MSB              LSB
//!           │                │
//!           ▼                ▼
//!           b0 b1 b2 b3 b4 b5 b6 b7     (bN = Nth bit of the stream)
//! ```
//!
//! The encoder assembles bits LSB first and mirrors each completed byte with
//! [`reverse_byte`] before emitting it.
//!
//! When the stream ends, the unfilled tail of the last byte is padded with
//! set bits. An empty stream therefore encodes to a single `0xFF`.
//!
//! # Decoding
//!
//! The decoder consumes one byte at a time and keeps a single carry: the
//! number of set bits seen since the last terminator. A `0xFF` byte cannot
//! contain a terminator and is taken as a whole (`carry += 8`). Any other
//! byte is scanned MSB first. The unterminated carry left at the end of the
//! stream is padding and is discarded.
//!
//! # Streaming
//!
//! Both halves accept input in arbitrarily small chunks; the `last` flag of
//! the final call flushes and resets them. Splitting the input differently
//! never changes the output.

#[macro_use]
extern crate log;

mod bits;
pub mod decoder;
pub mod encoder;
mod error;
mod policy;
pub mod registry;
pub mod source;
pub mod stream;

pub use bits::{pad_mask, reverse_byte};
pub use decoder::{decode, decode_scalars, Decoder, DecoderState, Scalar, TextDecoder};
pub use encoder::{encode, encode_scalars, Encoder, EncoderState};
pub use error::{DecodeError, PolicyError, StateError, UnknownCodec};
pub use policy::{ErrorPolicy, REPLACEMENT_CHARACTER};
pub use registry::{lookup, Codec};
pub use source::{SourceDecoder, SourceEncoder, SourceState};
pub use stream::{IncrementalDecode, IncrementalEncode, StreamReader, StreamWriter};

/// a byte made of set bits only, never holds a terminator
const FULL_BYTE: u8 = 0xFF;
/// bits carried by one byte of the stream
const BYTE_BITS: u8 = 8;

#[cfg(test)]
pub(crate) mod test_util {
    use std::sync::Once;

    pub const TEST_VECTOR: [(&str, &str); 11] = [
        ("", "ff"),
        ("\0", "7f"),
        ("\0\0\0", "1f"),
        ("\x07", "feff"),
        ("\x08", "ff7f"),
        ("\x01\x02\x03", "b77f"),
        ("A", "ffffffffffffffffbf"),
        (
            "é",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffbf",
        ),
        (
            "hi",
            "ffffffffffffffffffffffffff7fffffffffffffffffffffffffdf",
        ),
        (
            "ab\0c",
            "ffffffffffffffffffffffffbffffffffffffffffffffffff3ffffffffffffffffffffffffbf",
        ),
        (
            "Hello, world!",
            "ffffffffffffffffff7ffffffffffffffffffffffffdffffffffffffffffffffffffffefffffff\
             ffffffffffffffffffff7fffffffffffffffffffffffffff7ffffffffffbfffffffdffffffffff\
             fffffffffffffffffffdfffffffffffffffffffffffffffdffffffffffffffffffffffffffffbf\
             fffffffffffffffffffffffffdffffffffffffffffffffffffeffffffffb",
        ),
    ];

    static INIT: Once = Once::new();

    /// Setup function that is only run once, even if called multiple times.
    pub fn setup() {
        INIT.call_once(|| {
            pretty_env_logger::init();
        });
    }
}
