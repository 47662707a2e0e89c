use crate::{DecodeError, ErrorPolicy, BYTE_BITS, FULL_BYTE};

/// A scalar space the decoder can map run lengths into.
pub trait Scalar: Copy {
    /// `None` when `run` names no value of this space.
    fn from_run(run: u64) -> Option<Self>;
}

/// Unicode scalar values: `0..=0x10FFFF` minus the surrogate range.
impl Scalar for char {
    #[inline(always)]
    fn from_run(run: u64) -> Option<Self> {
        u32::try_from(run).ok().and_then(char::from_u32)
    }
}

impl Scalar for u32 {
    #[inline(always)]
    fn from_run(run: u64) -> Option<Self> {
        u32::try_from(run).ok()
    }
}

/// Snapshot of a [`Decoder`]: set bits seen since the last terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecoderState {
    pub carry: u64,
}

/// Incremental unary run decoder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decoder {
    carry: u64,
}

impl Decoder {
    pub fn new() -> Self {
        Decoder { carry: 0 }
    }

    /// Decodes `input` into `out`, carrying an unterminated run over to the
    /// next call.
    ///
    /// With `last` set, the trailing unterminated run is padding: it is
    /// dropped and the decoder goes back to its initial state.
    ///
    /// Under [`ErrorPolicy::Strict`] the first unrepresentable run fails the
    /// whole call. Nothing is appended to `out` and the decoder keeps the
    /// state it had before the call.
    pub fn decode<T: Scalar>(
        &mut self,
        input: &[u8],
        last: bool,
        policy: ErrorPolicy<T>,
        out: &mut Vec<T>,
    ) -> Result<(), DecodeError> {
        let start = out.len();
        let result = self.scan(input, last, |run| {
            if let Some(value) = map_run(run, policy)? {
                out.push(value);
            }
            Ok(())
        });
        if result.is_err() {
            out.truncate(start);
        }
        result
    }

    /// Same as [`Decoder::decode`], appending characters to a string.
    pub fn decode_into(
        &mut self,
        input: &[u8],
        last: bool,
        policy: ErrorPolicy,
        out: &mut String,
    ) -> Result<(), DecodeError> {
        let start = out.len();
        let result = self.scan(input, last, |run| {
            if let Some(c) = map_run(run, policy)? {
                out.push(c);
            }
            Ok(())
        });
        if result.is_err() {
            out.truncate(start);
        }
        result
    }

    pub fn decode_str(
        &mut self,
        input: &[u8],
        last: bool,
        policy: ErrorPolicy,
    ) -> Result<String, DecodeError> {
        let mut out = String::with_capacity(input.len() / 4);
        self.decode_into(input, last, policy, &mut out)?;
        Ok(out)
    }

    /// Walks the runs of `input`, committing the new carry only once every
    /// run was accepted by `on_run`.
    fn scan<F>(&mut self, input: &[u8], last: bool, mut on_run: F) -> Result<(), DecodeError>
    where
        F: FnMut(u64) -> Result<(), DecodeError>,
    {
        let mut carry = self.carry;
        for &byte in input {
            if byte == FULL_BYTE {
                carry += BYTE_BITS as u64;
                continue;
            }
            trace!("scan byte {byte:08b}, carry: {carry}");
            let mut rest = byte;
            let mut left = BYTE_BITS as u32;
            while left > 0 {
                let ones = rest.leading_ones().min(left);
                if ones == left {
                    carry += ones as u64;
                    break;
                }
                let run = carry + ones as u64;
                trace!("run ends: {run}");
                on_run(run)?;
                carry = 0;
                rest = rest.checked_shl(ones + 1).unwrap_or(0);
                left -= ones + 1;
            }
        }
        if last {
            if carry != 0 {
                debug!("discard {carry} bit(s) of padding");
            }
            carry = 0;
        }
        self.carry = carry;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.carry = 0;
    }

    pub fn state(&self) -> DecoderState {
        DecoderState { carry: self.carry }
    }

    pub fn set_state(&mut self, state: DecoderState) {
        self.carry = state.carry;
    }
}

impl From<DecoderState> for Decoder {
    fn from(state: DecoderState) -> Self {
        Decoder { carry: state.carry }
    }
}

#[inline(always)]
fn map_run<T: Scalar>(run: u64, policy: ErrorPolicy<T>) -> Result<Option<T>, DecodeError> {
    if let Some(value) = T::from_run(run) {
        return Ok(Some(value));
    }
    debug!("unrepresentable run {run}, policy: {policy}");
    match policy {
        ErrorPolicy::Strict => Err(DecodeError::Unrepresentable { value: run }),
        ErrorPolicy::Ignore => Ok(None),
        ErrorPolicy::Replace(placeholder) => Ok(Some(placeholder)),
    }
}

/// A [`Decoder`] bound to one text error policy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextDecoder {
    decoder: Decoder,
    policy: ErrorPolicy,
}

impl TextDecoder {
    pub fn new(policy: ErrorPolicy) -> Self {
        TextDecoder {
            decoder: Decoder::new(),
            policy,
        }
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ErrorPolicy) {
        self.policy = policy;
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn decoder_mut(&mut self) -> &mut Decoder {
        &mut self.decoder
    }

    pub fn decode(&mut self, input: &[u8], last: bool) -> Result<String, DecodeError> {
        self.decoder.decode_str(input, last, self.policy)
    }

    pub fn decode_into(
        &mut self,
        input: &[u8],
        last: bool,
        out: &mut String,
    ) -> Result<(), DecodeError> {
        self.decoder.decode_into(input, last, self.policy, out)
    }

    pub fn reset(&mut self) {
        self.decoder.reset();
    }
}

/// Decodes a complete byte stream into a string.
pub fn decode(input: &[u8], policy: ErrorPolicy) -> Result<String, DecodeError> {
    Decoder::new().decode_str(input, true, policy)
}

/// Decodes a complete byte stream into integer scalar values.
pub fn decode_scalars(input: &[u8], policy: ErrorPolicy<u32>) -> Result<Vec<u32>, DecodeError> {
    let mut out = Vec::with_capacity(input.len());
    Decoder::new().decode(input, true, policy, &mut out)?;
    Ok(out)
}
