//! Byte sources feeding a synchronizer.

use core::convert::Infallible;

/// A live, best-effort stream of bytes, such as a serial port.
///
/// Implementations must bound every read by a timeout of their own; the
/// synchronizer never waits or sleeps on its behalf.
pub trait ByteSource {
    /// Error type for unrecoverable failures, such as a closed device.
    type Error;

    /// Number of bytes buffered and readable without blocking.
    fn bytes_available(&self) -> Result<usize, Self::Error>;

    /// Read up to `buf.len()` bytes, returning how many were read.
    ///
    /// Returns zero once the timeout elapses without data.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Drop up to `n` buffered bytes without returning them.
    fn discard(&mut self, n: usize) -> Result<(), Self::Error> {
        let mut scratch = [0; 64];
        let mut remaining = n;

        while remaining != 0 {
            let len = remaining.min(scratch.len());
            match self.read(&mut scratch[..len])? {
                0 => break,
                read => remaining -= read,
            }
        }

        Ok(())
    }

    /// Whether the source has ended for good, such as a replayed capture
    /// that ran out. Live transports never end this way.
    fn is_exhausted(&self) -> bool {
        false
    }

    /// Release the underlying transport. Calling this more than once has no
    /// further effect.
    fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Read a single byte, if one arrives before the timeout.
    fn read_one(&mut self) -> Result<Option<u8>, Self::Error> {
        let mut buf = [0; 1];
        Ok(match self.read(&mut buf)? {
            0 => None,
            _ => Some(buf[0]),
        })
    }

    /// Read repeatedly until `buf` is full or a read returns nothing.
    ///
    /// Returns the number of bytes read, which is short of `buf.len()` only if
    /// the source ran dry.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut n = 0;

        while n < buf.len() {
            match self.read(&mut buf[n..])? {
                0 => break,
                read => n += read,
            }
        }

        Ok(n)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    type Error = S::Error;

    fn bytes_available(&self) -> Result<usize, Self::Error> {
        (**self).bytes_available()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buf)
    }

    fn discard(&mut self, n: usize) -> Result<(), Self::Error> {
        (**self).discard(n)
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        (**self).close()
    }
}

/// A finished capture held in memory. Reads past the end return nothing, and
/// the slice is exhausted once empty.
impl ByteSource for &[u8] {
    type Error = Infallible;

    fn bytes_available(&self) -> Result<usize, Self::Error> {
        Ok(self.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.len());
        let (head, tail) = self.split_at(n);
        buf[..n].copy_from_slice(head);
        *self = tail;

        Ok(n)
    }

    fn discard(&mut self, n: usize) -> Result<(), Self::Error> {
        *self = &self[n.min(self.len())..];
        Ok(())
    }

    fn is_exhausted(&self) -> bool {
        self.is_empty()
    }
}
