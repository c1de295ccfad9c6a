//! Reader-based byte source and deadline polling.
//!
//! _Requires Cargo feature `std`._

use std::{
    io::{self, ErrorKind, Read},
    time::Instant,
};

use super::{
    source::ByteSource,
    synchronizer::{Error, Next, Synchronizer},
};

extern crate std;

/// Adapt any [`Read`] implementation, such as a file, pipe, or serial port
/// opened through another crate, into a [`ByteSource`].
///
/// A reader cannot report how many bytes are buffered, so no backlog is ever
/// shed; every frame in a recorded capture is decoded. Timeouts and
/// interrupted reads count as "no data yet" rather than errors, while a read
/// returning zero bytes marks the end of the stream.
#[derive(Debug)]
pub struct IoSource<R> {
    inner: Option<R>,
    eof: bool,
}

impl<R: Read> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: Some(inner),
            eof: false,
        }
    }

    /// Recover the reader, unless the source was closed.
    pub fn into_inner(self) -> Option<R> {
        self.inner
    }
}

impl<R: Read> ByteSource for IoSource<R> {
    type Error = io::Error;

    fn bytes_available(&self) -> Result<usize, Self::Error> {
        Ok(0)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some(inner) = &mut self.inner else {
            return Err(ErrorKind::NotConnected.into());
        };

        match inner.read(buf) {
            Ok(0) if !buf.is_empty() => {
                self.eof = true;
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(err) if is_timeout(&err) => Ok(0),
            Err(err) => Err(err),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.eof
    }

    /// Drop the reader, closing the underlying handle.
    fn close(&mut self) -> Result<(), Self::Error> {
        self.inner = None;
        Ok(())
    }
}

pub(crate) fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}

impl<S: ByteSource> Synchronizer<S> {
    /// Keep polling until a frame decodes, the source is exhausted, or
    /// `deadline` passes.
    ///
    /// The deadline is checked between attempts. Each attempt scans a bounded
    /// number of bytes, each read bounded by the source's own timeout, so the
    /// call may overrun the deadline by up to one attempt.
    ///
    /// _Requires Cargo feature `std`._
    pub fn next_reading_until(&mut self, deadline: Instant) -> Result<Next, Error<S::Error>> {
        loop {
            match self.next_reading()? {
                Next::NoFrameYet if !self.is_exhausted() && Instant::now() < deadline => continue,
                next => return Ok(next),
            }
        }
    }
}
