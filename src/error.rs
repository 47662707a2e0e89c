use std::str::Utf8Error;

/// Failure while turning a byte stream back into scalar values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A recovered run length does not name a value of the target scalar
    /// space, and the active policy is [`ErrorPolicy::Strict`](crate::ErrorPolicy::Strict).
    #[error("run length {value} is not a valid scalar value")]
    Unrepresentable { value: u64 },

    /// The header line detected by the source variant is not valid UTF-8.
    #[error("source header is not valid UTF-8")]
    Header(#[from] Utf8Error),
}

/// A snapshot handed to `set_state` / `try_from` that no encoder could have
/// produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("invalid encoder state: {filled_bits} filled bits, at most 7 allowed")]
    FilledBits { filled_bits: u8 },

    #[error("invalid encoder state: buffer {buffer:#010b} has bits above {filled_bits}")]
    StrayBits { filled_bits: u8, buffer: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("unknown error policy: {0:?}")]
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown codec: {0:?}")]
pub struct UnknownCodec(pub String);
