//! Buffered byte source
//!
//! Pulls bytes from the wrapped source in large blocks and serves small
//! reads out of the block. With [`BufferedSource::amortized`] the block is
//! 256 bytes, so sixteen 16-byte tokens cost one generator call.

use super::{ByteSource, SourceError};

/// Default buffer size for general reads
pub const DEFAULT_CAPACITY: usize = 4096;

/// Block size for amortized 16-byte tokens
pub const AMORTIZED_CAPACITY: usize = 256;

/// Reader-style buffer over any [`ByteSource`]
pub struct BufferedSource<S> {
    inner: S,
    buf: Box<[u8]>,
    pos: usize,
    filled: usize,
}

impl<S: ByteSource> BufferedSource<S> {
    /// Wrap `inner` with a 4 KiB buffer
    pub fn new(inner: S) -> Self {
        Self::with_capacity(inner, DEFAULT_CAPACITY)
    }

    /// Wrap `inner` with a 256-byte block
    pub fn amortized(inner: S) -> Self {
        Self::with_capacity(inner, AMORTIZED_CAPACITY)
    }

    /// Wrap `inner` with a buffer of `capacity` bytes
    ///
    /// # Panics
    /// Panics if capacity is 0
    pub fn with_capacity(inner: S, capacity: usize) -> Self {
        assert!(capacity > 0, "Buffer capacity must be greater than 0");

        Self {
            inner,
            buf: vec![0u8; capacity].into_boxed_slice(),
            pos: 0,
            filled: 0,
        }
    }

    /// Buffer size in bytes
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes left in the current block
    pub fn buffered(&self) -> usize {
        self.filled - self.pos
    }

    /// Unwrap the inner source, dropping any buffered bytes
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn refill(&mut self) -> Result<(), SourceError> {
        self.inner.fill(&mut self.buf)?;
        self.pos = 0;
        self.filled = self.buf.len();
        Ok(())
    }
}

impl<S: ByteSource> ByteSource for BufferedSource<S> {
    fn fill(&mut self, out: &mut [u8]) -> Result<(), SourceError> {
        // Large reads on an empty buffer skip the copy
        if self.buffered() == 0 && out.len() >= self.buf.len() {
            return self.inner.fill(out);
        }

        let mut written = 0;
        while written < out.len() {
            if self.buffered() == 0 {
                self.refill()?;
            }
            let n = self.buffered().min(out.len() - written);
            out[written..written + n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
            self.pos += n;
            written += n;
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{PseudoSource, SecureSource};

    /// Counts how often the wrapped source is asked for bytes
    struct Counting {
        inner: PseudoSource,
        calls: usize,
    }

    impl ByteSource for Counting {
        fn fill(&mut self, buf: &mut [u8]) -> Result<(), SourceError> {
            self.calls += 1;
            self.inner.fill(buf)
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[test]
    fn test_amortized_refills_every_16_tokens() {
        let mut source = BufferedSource::amortized(Counting {
            inner: PseudoSource::with_seed(1),
            calls: 0,
        });
        let mut token = [0u8; 16];

        for _ in 0..16 {
            source.fill(&mut token).unwrap();
        }
        assert_eq!(source.buffered(), 0);
        source.fill(&mut token).unwrap();

        assert_eq!(source.into_inner().calls, 2);
    }

    #[test]
    fn test_amortized_stream_matches_block_read() {
        let mut block = [0u8; AMORTIZED_CAPACITY];
        PseudoSource::with_seed(99).fill(&mut block).unwrap();

        let mut source = BufferedSource::amortized(PseudoSource::with_seed(99));
        for i in 0..16 {
            let mut token = [0u8; 16];
            source.fill(&mut token).unwrap();
            assert_eq!(&token[..], &block[i * 16..(i + 1) * 16]);
        }
    }

    #[test]
    fn test_read_spanning_refill() {
        let mut blocks = [0u8; 16];
        let mut reference = PseudoSource::with_seed(5);
        reference.fill(&mut blocks[..8]).unwrap();
        reference.fill(&mut blocks[8..]).unwrap();

        let mut source = BufferedSource::with_capacity(PseudoSource::with_seed(5), 8);
        let mut head = [0u8; 5];
        let mut tail = [0u8; 6];
        source.fill(&mut head).unwrap();
        source.fill(&mut tail).unwrap();

        assert_eq!(&head[..], &blocks[..5]);
        assert_eq!(&tail[..], &blocks[5..11]);
        assert_eq!(source.buffered(), 5);
    }

    #[test]
    fn test_large_read_bypasses_buffer() {
        let mut source = BufferedSource::with_capacity(
            Counting {
                inner: PseudoSource::with_seed(3),
                calls: 0,
            },
            64,
        );
        let mut big = [0u8; 1024];
        source.fill(&mut big).unwrap();

        assert_eq!(source.buffered(), 0);
        assert_eq!(source.into_inner().calls, 1);
    }

    #[test]
    fn test_secure_buffered() {
        let mut source = BufferedSource::new(SecureSource::new());
        let mut buf = [0u8; 32];
        source.fill(&mut buf).unwrap();
        assert_eq!(source.capacity(), DEFAULT_CAPACITY);
        assert_eq!(source.buffered(), DEFAULT_CAPACITY - 32);
        assert_eq!(source.name(), "secure");
    }

    #[test]
    #[should_panic(expected = "Buffer capacity must be greater than 0")]
    fn test_zero_capacity() {
        let _ = BufferedSource::with_capacity(SecureSource::new(), 0);
    }
}
