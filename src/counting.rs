use std::io::{self, Read};

//===========================================================================//

/// A forward-only reader that keeps track of how many bytes have been
/// consumed from the underlying stream.
pub(crate) struct CountingReader<R> {
    inner: R,
    position: u64,
}

impl<R: Read> CountingReader<R> {
    pub(crate) fn new(inner: R) -> CountingReader<R> {
        CountingReader { inner, position: 0 }
    }

    /// Returns the number of bytes read so far.
    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    /// Discards up to `count` bytes and returns how many were actually
    /// skipped, which is less than `count` only at end of stream.
    pub(crate) fn skip(&mut self, count: u64) -> io::Result<u64> {
        io::copy(&mut self.by_ref().take(count), &mut io::sink())
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let num_read = self.inner.read(buf)?;
        self.position += num_read as u64;
        Ok(num_read)
    }
}

//===========================================================================//


//===========================================================================//
