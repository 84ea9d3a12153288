//! Uppercase letter payloads
//!
//! Two ways of turning randomness into `A`-`Z` text: reduce each random
//! byte modulo 26, or draw every letter index from a PRNG.

use super::{ByteSource, SourceError};
use rand::Rng;

/// Payload alphabet
pub const LETTERS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Map every byte in place to `'A' + byte % 26`
#[inline]
pub fn letters_from_bytes(buf: &mut [u8]) {
    for byte in buf.iter_mut() {
        *byte = b'A' + (*byte % 26);
    }
}

/// `len` letters built from the bytes of `source`
pub fn source_letters<S: ByteSource + ?Sized>(
    source: &mut S,
    len: usize,
) -> Result<Vec<u8>, SourceError> {
    let mut payload = vec![0u8; len];
    source.fill(&mut payload)?;
    letters_from_bytes(&mut payload);
    Ok(payload)
}

/// `len` letters, each drawn uniformly with `gen_range`
pub fn random_letters<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Vec<u8> {
    (0..len)
        .map(|_| LETTERS[rng.gen_range(0..LETTERS.len())])
        .collect()
}
