use crate::error::Error;
use abbr_core::shortcode::{CODE_LENGTH, CODE_SYMBOLS, RADIX};
use abbr_core::ShortCode;
use jiff::Timestamp;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// The ordered digit set used to render counter values as code symbols.
///
/// Digit `d` is rendered as `symbols[d]`. Shuffling only changes which
/// symbol stands for which digit; the set itself is always [`CODE_SYMBOLS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: [u8; RADIX],
}

impl Alphabet {
    /// The alphabet in canonical order: `A-Z`, `a-z`, `0-9`, `_`.
    pub fn canonical() -> Self {
        Self {
            symbols: CODE_SYMBOLS,
        }
    }

    /// A uniformly random permutation of the canonical alphabet.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut symbols = CODE_SYMBOLS;
        symbols.shuffle(rng);
        Self { symbols }
    }

    /// A permutation that is reproducible for a given seed.
    pub fn from_seed(seed: u64) -> Self {
        Self::shuffled(&mut StdRng::seed_from_u64(seed))
    }

    /// A permutation seeded from the current time, different on every run.
    pub fn from_clock() -> Self {
        Self::from_seed(clock_seed())
    }

    /// Returns the symbol standing for `digit`, or `None` if `digit` is not
    /// below [`RADIX`].
    pub fn symbol(&self, digit: u8) -> Option<u8> {
        self.symbols.get(usize::from(digit)).copied()
    }

    /// Renders a full set of counter digits as a short code.
    pub fn encode(&self, digits: &[u8; CODE_LENGTH]) -> Result<ShortCode, Error> {
        let mut symbols = [0u8; CODE_LENGTH];
        for (position, (&digit, symbol)) in digits.iter().zip(symbols.iter_mut()).enumerate() {
            *symbol = self.symbol(digit).ok_or(Error::InvalidDigit {
                position,
                digit,
                radix: RADIX,
            })?;
        }

        Ok(ShortCode::from_symbols(symbols)?)
    }

    pub fn symbols(&self) -> &[u8; RADIX] {
        &self.symbols
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::canonical()
    }
}

/// Seed derived from the wall clock at microsecond precision.
pub(crate) fn clock_seed() -> u64 {
    Timestamp::now().as_microsecond() as u64
}
