use crate::alphabet::{clock_seed, Alphabet};
use crate::error::Error;
use abbr_core::shortcode::{CODE_LENGTH, RADIX};
use abbr_core::ShortCode;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;
use typed_builder::TypedBuilder;

/// Configures an [`Odometer`] instance.
#[derive(Debug, Clone, TypedBuilder)]
pub struct OdometerSettings {
    /// Digit-to-symbol mapping used to render codes.
    #[builder(default = Alphabet::from_clock())]
    pub alphabet: Alphabet,
    /// Initial digit slots, most significant first.
    ///
    /// When unset, every slot is drawn at random so that separate runs
    /// start the sequence from different points.
    #[builder(default, setter(strip_option))]
    pub start: Option<[u8; CODE_LENGTH]>,
}

/// A base-63 odometer producing fixed-width short codes.
///
/// The last slot is least significant. Each call increments it and carries
/// to the left on overflow, so `63^10` consecutive calls never repeat a code.
pub struct Odometer {
    alphabet: Alphabet,
    digits: Mutex<[u8; CODE_LENGTH]>,
}

impl Odometer {
    pub fn new(settings: OdometerSettings) -> Result<Self, Error> {
        let digits = match settings.start {
            Some(start) => {
                if let Some((position, &digit)) = start
                    .iter()
                    .enumerate()
                    .find(|(_, &digit)| usize::from(digit) >= RADIX)
                {
                    return Err(Error::InvalidDigit {
                        position,
                        digit,
                        radix: RADIX,
                    });
                }
                start
            }
            None => random_digits(&mut rand::rng()),
        };

        Ok(Self {
            alphabet: settings.alphabet,
            digits: Mutex::new(digits),
        })
    }

    /// Creates an odometer whose alphabet and start point are both derived
    /// from the current time.
    pub fn from_clock() -> Self {
        let mut rng = StdRng::seed_from_u64(clock_seed());
        let alphabet = Alphabet::shuffled(&mut rng);
        let digits = random_digits(&mut rng);

        Self {
            alphabet,
            digits: Mutex::new(digits),
        }
    }

    /// Advances the odometer by one and returns the resulting code.
    pub fn next_code(&self) -> ShortCode {
        let mut digits = self.digits.lock();

        let mut rolled_over = true;
        for slot in digits.iter_mut().rev() {
            *slot += 1;
            if usize::from(*slot) < RADIX {
                rolled_over = false;
                break;
            }
            *slot = 0;
        }

        if rolled_over {
            warn!("short code space exhausted, odometer rolled over to zero");
        }

        // slots only ever hold values below the radix
        self.alphabet
            .encode(&digits)
            .expect("odometer digits stay below the radix")
    }

    /// Returns the current digit slots, most significant first.
    pub fn digits(&self) -> [u8; CODE_LENGTH] {
        *self.digits.lock()
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }
}

impl std::fmt::Debug for Odometer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // the position in the sequence is not printed on purpose
        f.debug_struct("Odometer").finish_non_exhaustive()
    }
}

fn random_digits<R: Rng + ?Sized>(rng: &mut R) -> [u8; CODE_LENGTH] {
    std::array::from_fn(|_| rng.random_range(0..RADIX as u8))
}
