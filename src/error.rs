use std::fmt;

/// Errors produced while seeding, restoring or attacking an MT19937 generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrngError {
    /// Wrong number of state words or observed outputs.
    InvalidInputLength { expected: usize, actual: usize },
    /// A restored cursor points past the end of the state array.
    InvalidState { index: usize },
    /// No candidate seed reproduced the observed output.
    SeedNotFound,
    /// No candidate key reproduced the recovered keystream.
    KeyNotFound,
    /// The known plaintext is empty or longer than the ciphertext.
    InvalidKnownPlaintext {
        suffix_len: usize,
        ciphertext_len: usize,
    },
    /// A bounded draw was requested from an empty range.
    EmptyRange,
}

impl fmt::Display for PrngError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrngError::InvalidInputLength { expected, actual } => {
                write!(f, "expected {} values, got {}", expected, actual)
            }
            PrngError::InvalidState { index } => {
                write!(f, "state index {} is out of range", index)
            }
            PrngError::SeedNotFound => write!(f, "no candidate seed matched"),
            PrngError::KeyNotFound => write!(f, "no candidate key matched"),
            PrngError::InvalidKnownPlaintext {
                suffix_len,
                ciphertext_len,
            } => write!(
                f,
                "known plaintext of {} bytes cannot be aligned with a {} byte ciphertext",
                suffix_len, ciphertext_len
            ),
            PrngError::EmptyRange => write!(f, "cannot draw from an empty range"),
        }
    }
}

impl std::error::Error for PrngError {}
