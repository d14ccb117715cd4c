pub mod alphabet;
pub mod error;
pub mod odometer;

pub use alphabet::Alphabet;
pub use error::Error;
pub use odometer::{Odometer, OdometerSettings};

use abbr_core::ShortCode;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;
    /// Generates a value that converts into a short code never produced
    /// before by this generator.
    fn generate(&self) -> Self::Output;
}

impl Generator for Odometer {
    type Output = ShortCode;

    fn generate(&self) -> Self::Output {
        self.next_code()
    }
}
