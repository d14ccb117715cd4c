use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Number of symbols in every short code.
pub const CODE_LENGTH: usize = 10;

/// Number of distinct symbols a code position can hold.
pub const RADIX: usize = 63;

/// The symbol set in canonical order: `A-Z`, `a-z`, `0-9`, then `_`.
pub const CODE_SYMBOLS: [u8; RADIX] =
    *b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_";

/// Returns `true` if `symbol` may appear in a short code.
pub fn is_code_symbol(symbol: u8) -> bool {
    symbol.is_ascii_alphanumeric() || symbol == b'_'
}

/// A fixed-width short code identifying a shortened URL.
///
/// Codes are exactly [`CODE_LENGTH`] symbols drawn from [`CODE_SYMBOLS`],
/// case-sensitive and without separators. Two codes are equal when all of
/// their symbols are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortCode([u8; CODE_LENGTH]);

impl ShortCode {
    /// Parses a short code from its textual form.
    pub fn new(code: impl AsRef<str>) -> Result<Self> {
        let code = code.as_ref();
        let bytes = code.as_bytes();

        if bytes.len() != CODE_LENGTH {
            return Err(CoreError::InvalidShortCode(format!(
                "length must be {}, got {}",
                CODE_LENGTH,
                code.len()
            )));
        }

        let mut symbols = [0u8; CODE_LENGTH];
        symbols.copy_from_slice(bytes);
        Self::from_symbols(symbols)
    }

    /// Creates a `ShortCode` from raw symbols, rejecting anything outside
    /// [`CODE_SYMBOLS`].
    pub fn from_symbols(symbols: [u8; CODE_LENGTH]) -> Result<Self> {
        if !symbols.iter().copied().all(is_code_symbol) {
            return Err(CoreError::InvalidShortCode(format!(
                "must contain only alphanumeric characters or underscores: '{}'",
                String::from_utf8_lossy(&symbols)
            )));
        }

        Ok(Self(symbols))
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    /// Returns the short code as a string slice.
    ///
    /// Every constructor checks the symbols, so the bytes are always ascii.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).expect("short code symbols are always ascii")
    }

    /// Returns the raw symbols of the code.
    pub fn symbols(&self) -> &[u8; CODE_LENGTH] {
        &self.0
    }
}

impl FromStr for ShortCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for ShortCode {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl fmt::Debug for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ShortCode").field(&self.as_str()).finish()
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ShortCode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ShortCode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}
