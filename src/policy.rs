use crate::PolicyError;
use std::fmt;
use std::str::FromStr;

/// Placeholder used by [`ErrorPolicy::replace`].
pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

/// What the decoder does with a run length that has no scalar value.
///
/// The type parameter is the scalar space being decoded into, so that
/// `Replace` can carry a placeholder of that type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy<T = char> {
    /// Abort the call with [`DecodeError::Unrepresentable`](crate::DecodeError::Unrepresentable).
    #[default]
    Strict,
    /// Drop the value and keep decoding.
    Ignore,
    /// Emit the placeholder instead of the value and keep decoding.
    Replace(T),
}

impl ErrorPolicy<char> {
    /// `Replace` with U+FFFD REPLACEMENT CHARACTER.
    pub const fn replace() -> Self {
        ErrorPolicy::Replace(REPLACEMENT_CHARACTER)
    }
}

impl<T> ErrorPolicy<T> {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorPolicy::Strict => "strict",
            ErrorPolicy::Ignore => "ignore",
            ErrorPolicy::Replace(_) => "replace",
        }
    }
}

impl<T> fmt::Display for ErrorPolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ErrorPolicy<char> {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(ErrorPolicy::Strict),
            "ignore" => Ok(ErrorPolicy::Ignore),
            "replace" => Ok(ErrorPolicy::replace()),
            _ => Err(PolicyError::Unknown(s.to_owned())),
        }
    }
}
