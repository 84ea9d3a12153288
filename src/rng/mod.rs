//! Random byte sources
//!
//! The experiments compare two generators behind one interface:
//!
//! - **Secure**: the operating system CSPRNG (`OsRng`), which can fail
//! - **Pseudo**: xoshiro256++, seeded or entropy-seeded, which cannot
//!
//! Either can be wrapped in a [`BufferedSource`] to amortize the cost of
//! each generator call over many small reads.
//!
//! # Example
//!
//! ```
//! use randbucket::rng::{ByteSource, PseudoSource, BufferedSource};
//!
//! let mut source = BufferedSource::amortized(PseudoSource::with_seed(42));
//! let mut token = [0u8; 16];
//! source.fill(&mut token).unwrap();
//! ```

pub mod buffered;
pub mod letters;
pub mod speed;

pub use buffered::BufferedSource;

use crate::config::SourceKind;
use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Bytes taken from each 63-bit pseudo draw
const BYTES_PER_DRAW: usize = 7;

/// Error raised by a byte source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The operating system generator failed
    #[error("OS random generator failed: {0}")]
    Os(#[from] rand::Error),
}

/// A generator of random bytes
///
/// Sources must be `Send` so each producer or consumer thread can own one.
pub trait ByteSource: Send {
    /// Fill `buf` completely with random bytes
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), SourceError>;

    /// Short name used in reports
    fn name(&self) -> &'static str;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    #[inline]
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), SourceError> {
        (**self).fill(buf)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Operating system CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct SecureSource;

impl SecureSource {
    pub fn new() -> Self {
        Self
    }
}

impl ByteSource for SecureSource {
    #[inline]
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), SourceError> {
        OsRng.try_fill_bytes(buf)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "secure"
    }
}

/// xoshiro256++ byte source
///
/// Each draw contributes its low 63 bits, seven bytes at a time, low byte
/// first. The eighth byte of every draw is discarded, as is the unused tail
/// of the last draw in a fill.
pub struct PseudoSource {
    rng: Xoshiro256PlusPlus,
}

impl PseudoSource {
    /// Create a new pseudo source with random seed
    pub fn new() -> Self {
        Self {
            rng: Xoshiro256PlusPlus::from_entropy(),
        }
    }

    /// Create a new pseudo source with specific seed
    ///
    /// Useful for reproducible tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }
}

impl Default for PseudoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteSource for PseudoSource {
    #[inline]
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), SourceError> {
        for chunk in buf.chunks_mut(BYTES_PER_DRAW) {
            let draw = self.rng.next_u64() >> 1;
            chunk.copy_from_slice(&draw.to_le_bytes()[..chunk.len()]);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "pseudo"
    }
}

impl SourceKind {
    /// Build an unbuffered source of this kind
    ///
    /// `seed` only applies to the pseudo source; `None` seeds from entropy.
    pub fn build(self, seed: Option<u64>) -> Box<dyn ByteSource> {
        match self {
            SourceKind::Secure => Box::new(SecureSource::new()),
            SourceKind::Pseudo => match seed {
                Some(seed) => Box::new(PseudoSource::with_seed(seed)),
                None => Box::new(PseudoSource::new()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_fill() {
        let mut source = SecureSource::new();
        let mut a = [0u8; 64];
        let mut b = [0u8; 64];
        source.fill(&mut a).unwrap();
        source.fill(&mut b).unwrap();

        // 2^-512 chance of a false failure
        assert_ne!(a, b);
        assert_eq!(source.name(), "secure");
    }

    #[test]
    fn test_pseudo_seeded_deterministic() {
        let mut source1 = PseudoSource::with_seed(12345);
        let mut source2 = PseudoSource::with_seed(12345);

        for _ in 0..10 {
            let mut a = [0u8; 32];
            let mut b = [0u8; 32];
            source1.fill(&mut a).unwrap();
            source2.fill(&mut b).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_pseudo_seven_bytes_per_draw() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let first = rng.next_u64() >> 1;
        let second = rng.next_u64() >> 1;

        let mut source = PseudoSource::with_seed(7);
        let mut buf = [0u8; 10];
        source.fill(&mut buf).unwrap();

        assert_eq!(&buf[..7], &first.to_le_bytes()[..7]);
        assert_eq!(&buf[7..], &second.to_le_bytes()[..3]);
    }

    #[test]
    fn test_pseudo_empty_fill() {
        let mut source = PseudoSource::with_seed(1);
        let mut buf = [0u8; 0];
        assert!(source.fill(&mut buf).is_ok());
    }

    #[test]
    fn test_source_kind_build() {
        let mut secure = SourceKind::Secure.build(None);
        assert_eq!(secure.name(), "secure");

        let mut a = SourceKind::Pseudo.build(Some(9));
        let mut b: Box<dyn ByteSource> = Box::new(PseudoSource::with_seed(9));
        let mut x = [0u8; 21];
        let mut y = [0u8; 21];
        a.fill(&mut x).unwrap();
        b.fill(&mut y).unwrap();
        assert_eq!(x, y);

        let mut buf = [0u8; 8];
        secure.fill(&mut buf).unwrap();
    }
}
