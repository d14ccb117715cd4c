use abbr_core::CoreError;
use thiserror::Error;

/// Errors returned by odometer initialization and code rendering.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid digit {digit} at position {position}; expected 0..{radix}")]
    InvalidDigit {
        position: usize,
        digit: u8,
        radix: usize,
    },
    #[error(transparent)]
    Code(#[from] CoreError),
}
