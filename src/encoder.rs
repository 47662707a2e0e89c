use crate::{pad_mask, reverse_byte, StateError, BYTE_BITS, FULL_BYTE};

/// Snapshot of an [`Encoder`]: the bits of the not yet emitted byte.
///
/// `buffer` holds `filled_bits` stream bits, the first produced one at bit 0.
/// Every bit at or above `filled_bits` is clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncoderState {
    pub filled_bits: u8,
    pub buffer: u8,
}

/// Incremental unary run encoder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Encoder {
    buf: u8,
    filled: u8,
}

impl Encoder {
    pub fn new() -> Self {
        Encoder { buf: 0, filled: 0 }
    }

    /// Appends the run of every value to the bitstream, pushing each byte
    /// that gets completed onto `out`.
    ///
    /// When `last` is set, the partial byte is padded with set bits and
    /// emitted as well, and the encoder goes back to its initial state. This
    /// always emits one byte, even when nothing is pending.
    pub fn encode<I>(&mut self, values: I, last: bool, out: &mut Vec<u8>)
    where
        I: IntoIterator,
        I::Item: Into<u32>,
    {
        let start = out.len();
        for value in values {
            self.push_run(value.into(), out);
        }
        if last {
            self.flush(out);
        }
        trace!(
            "emit {} byte(s): {}, buf: {:08b}, filled: {}",
            out.len() - start,
            hex::encode(&out[start..]),
            self.buf,
            self.filled
        );
    }

    pub fn encode_str(&mut self, input: &str, last: bool) -> Vec<u8> {
        let mut out = Vec::with_capacity(input.len() + 1);
        self.encode(input.chars(), last, &mut out);
        out
    }

    #[inline(always)]
    fn push_run(&mut self, value: u32, out: &mut Vec<u8>) {
        trace!(
            "push run {value}, buf: {:08b}, filled: {}",
            self.buf,
            self.filled
        );
        let mut ones = value;
        if self.filled != 0 {
            let free = (BYTE_BITS - self.filled) as u32;
            if ones >= free {
                self.buf |= pad_mask(self.filled);
                ones -= free;
                self.emit(out);
            }
        }
        if self.filled == 0 && ones >= BYTE_BITS as u32 {
            let whole = (ones / BYTE_BITS as u32) as usize;
            trace!("push {whole} full byte(s)");
            out.resize(out.len() + whole, FULL_BYTE);
            ones %= BYTE_BITS as u32;
        }
        debug_assert!(ones + (self.filled as u32) < BYTE_BITS as u32);
        self.buf |= (((1u16 << ones) - 1) as u8) << self.filled;
        self.filled += ones as u8;

        // terminator, the bit at `filled` is already clear
        self.filled += 1;
        if self.filled == BYTE_BITS {
            self.emit(out);
        }
        debug_assert_eq!(self.buf & pad_mask(self.filled), 0);
    }

    #[inline(always)]
    fn emit(&mut self, out: &mut Vec<u8>) {
        out.push(reverse_byte(self.buf));
        self.buf = 0;
        self.filled = 0;
    }

    fn flush(&mut self, out: &mut Vec<u8>) {
        debug!("flush, pad {} bit(s)", BYTE_BITS - self.filled);
        self.buf |= pad_mask(self.filled);
        self.emit(out);
    }

    pub fn reset(&mut self) {
        self.buf = 0;
        self.filled = 0;
    }

    pub fn state(&self) -> EncoderState {
        EncoderState {
            filled_bits: self.filled,
            buffer: self.buf,
        }
    }

    pub fn set_state(&mut self, state: EncoderState) -> Result<(), StateError> {
        *self = Encoder::try_from(state)?;
        Ok(())
    }
}

impl TryFrom<EncoderState> for Encoder {
    type Error = StateError;

    fn try_from(state: EncoderState) -> Result<Self, Self::Error> {
        let EncoderState {
            filled_bits,
            buffer,
        } = state;
        if filled_bits >= BYTE_BITS {
            return Err(StateError::FilledBits { filled_bits });
        }
        if buffer & pad_mask(filled_bits) != 0 {
            return Err(StateError::StrayBits {
                filled_bits,
                buffer,
            });
        }
        Ok(Encoder {
            buf: buffer,
            filled: filled_bits,
        })
    }
}

/// Encodes a whole string in one go.
pub fn encode(input: &str) -> Vec<u8> {
    Encoder::new().encode_str(input, true)
}

/// Encodes a whole sequence of integer scalar values in one go.
pub fn encode_scalars(values: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    Encoder::new().encode(values.iter().copied(), true, &mut out);
    out
}
