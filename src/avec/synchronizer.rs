//! Frame synchronizer over a byte source.

use core::mem;

use either::Either::{Left, Right};
use thiserror::Error;

use crate::sans::{
    Decoder,
    format::{FrameFormat, MAX_FRAME_SIZE},
    reading::Reading,
    sync::Scanning,
};

use super::source::ByteSource;

/// Frames' worth of bytes one [`Synchronizer::next_reading`] call scans before
/// giving up, so that a stream that never forms a valid frame still returns
/// control to the caller.
pub const SCAN_LIMIT: usize = 4;

/// Errors occurring while synchronizing with a byte source.
#[derive(Debug, Error)]
pub enum Error<E> {
    /// An unrecoverable error from the supplied source, passed through as is.
    #[error(transparent)]
    Source(E),
}

impl<E> Error<E> {
    /// Recover the error reported by the source.
    pub fn into_source(self) -> E {
        match self {
            Self::Source(err) => err,
        }
    }
}

/// Outcome of one synchronization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// A frame passed validation.
    Decoded(Reading),
    /// The source ran dry before a valid frame was found.
    NoFrameYet,
}

impl Next {
    pub fn decoded(self) -> Option<Reading> {
        match self {
            Self::Decoded(reading) => Some(reading),
            Self::NoFrameYet => None,
        }
    }
}

/// Counters of everything the synchronizer has decoded or thrown away.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    /// Frames that passed validation.
    pub frames: u64,
    /// Bytes skipped while looking for a header.
    pub noise_bytes: u64,
    /// Candidate frames rejected by their checksum.
    pub checksum_failures: u64,
    /// Candidate frames abandoned because the source ran dry.
    pub short_reads: u64,
    /// Stale bytes dropped to keep up with the producer.
    pub shed_bytes: u64,
}

/// Bytes already taken from the source that must be scanned again.
#[derive(Debug)]
struct Pending {
    bytes: [u8; MAX_FRAME_SIZE],
    start: usize,
    end: usize,
}

impl Pending {
    fn new() -> Self {
        Self {
            bytes: [0; MAX_FRAME_SIZE],
            start: 0,
            end: 0,
        }
    }

    fn len(&self) -> usize {
        self.end - self.start
    }

    fn clear(&mut self) {
        self.start = 0;
        self.end = 0;
    }

    fn pop(&mut self) -> Option<u8> {
        (self.start < self.end).then(|| {
            self.start += 1;
            self.bytes[self.start - 1]
        })
    }

    /// Move as many pending bytes as fit into `buf`.
    fn take(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.len());
        buf[..n].copy_from_slice(&self.bytes[self.start..self.start + n]);
        self.start += n;
        n
    }

    /// Queue bytes ahead of those still pending.
    ///
    /// A rejected frame always drains what was pending before it, so the
    /// combined length stays within one frame.
    fn prepend(&mut self, r: &[u8]) {
        let mut bytes = [0; MAX_FRAME_SIZE];
        let rest = self.len().min(MAX_FRAME_SIZE - r.len());

        bytes[..r.len()].copy_from_slice(r);
        bytes[r.len()..r.len() + rest].copy_from_slice(&self.bytes[self.start..self.start + rest]);

        self.bytes = bytes;
        self.start = 0;
        self.end = r.len() + rest;
    }
}

/// Locates, validates, and decodes frames from a live byte source.
///
/// A synchronizer owns its source exclusively; there is exactly one reader.
/// Header and checksum mismatches are recovered from silently and only show
/// up in [`SyncStats`].
#[derive(Debug)]
pub struct Synchronizer<S> {
    source: S,
    format: FrameFormat,
    scanning: Scanning,
    pending: Pending,
    stats: SyncStats,
}

impl<S: ByteSource> Synchronizer<S> {
    pub fn new(source: S, format: FrameFormat) -> Self {
        Self {
            source,
            format,
            scanning: Decoder::new(),
            pending: Pending::new(),
            stats: SyncStats::default(),
        }
    }

    pub fn format(&self) -> &FrameFormat {
        &self.format
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SyncStats::default();
    }

    pub fn get_ref(&self) -> &S {
        &self.source
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Give up the source without closing it.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Close the source, ending the synchronizer's lifecycle.
    pub fn close(mut self) -> Result<(), Error<S::Error>> {
        self.source.close().map_err(Error::Source)
    }

    /// Attempt to decode the freshest frame available.
    ///
    /// Returns [`Next::NoFrameYet`] once the source times out without
    /// completing a valid frame, or after [`SCAN_LIMIT`] frames' worth of
    /// bytes were scanned without one. Callers polling in a loop should simply
    /// call again; scanning picks up where it stopped. Only failures of the
    /// source itself are errors.
    pub fn next_reading(&mut self) -> Result<Next, Error<S::Error>> {
        self.shed_backlog()?;

        let format = self.format;
        let header = format.header().len();
        let mut budget = SCAN_LIMIT * format.frame_size();

        loop {
            if budget == 0 {
                trace!("scan limit reached without a frame");
                return Ok(Next::NoFrameYet);
            }
            budget -= 1;

            let Some(byte) = self.take_byte()? else {
                return Ok(Next::NoFrameYet);
            };

            let scanning = mem::take(&mut self.scanning);
            let matched = scanning.matched();

            self.scanning = match scanning.advance(&format, byte) {
                Left(scanning) => {
                    let skipped = matched + 1 - scanning.matched();
                    if skipped != 0 {
                        self.stats.noise_bytes += skipped as u64;
                        trace!(skipped, "skipped bytes while scanning for header");
                    }
                    scanning
                }
                Right(state) => {
                    let mut buf = [0; MAX_FRAME_SIZE];
                    let remainder = &mut buf[..format.frame_size() - header];
                    let n = self.fill(remainder)?;

                    match state.advance(&format, &remainder[..n]) {
                        Left(state) => match state.advance(&format) {
                            Left(reading) => {
                                self.stats.frames += 1;
                                return Ok(Next::Decoded(reading));
                            }
                            Right((mismatch, scanning)) => {
                                self.stats.checksum_failures += 1;
                                self.stats.noise_bytes += (header - scanning.matched()) as u64;
                                trace!(
                                    found = mismatch.found,
                                    calculated = mismatch.calculated,
                                    "rejected frame with bad checksum"
                                );
                                self.pending.prepend(mismatch.rescan());
                                scanning
                            }
                        },
                        Right(scanning) => {
                            self.stats.short_reads += 1;
                            self.stats.noise_bytes += (header + n) as u64;
                            trace!(read = n, "dropped incomplete frame");
                            scanning
                        }
                    }
                }
            };
        }
    }

    /// Whether every byte has been consumed from a source that will produce
    /// no more.
    pub fn is_exhausted(&self) -> bool {
        self.pending.len() == 0 && self.source.is_exhausted()
    }

    /// Pull readings until the source fails, the source is exhausted, or the
    /// caller stops iterating.
    ///
    /// The sequence cannot be restarted: bytes it consumed are gone.
    pub fn into_readings(self) -> Readings<S> {
        Readings {
            sync: self,
            cancel: never,
            done: false,
        }
    }

    /// Drop all but the newest frame's worth of bytes once more than two
    /// frames are waiting. Older bytes hold readings that are already stale.
    fn shed_backlog(&mut self) -> Result<(), Error<S::Error>> {
        let available = self.source.bytes_available().map_err(Error::Source)?;
        let frame_size = self.format.frame_size();

        if available > 2 * frame_size {
            let excess = available - frame_size;
            self.source.discard(excess).map_err(Error::Source)?;

            let shed = excess + self.pending.len() + self.scanning.matched();
            self.stats.shed_bytes += shed as u64;
            trace!(shed, "discarded stale backlog");

            self.pending.clear();
            self.scanning = Decoder::new();
        }

        Ok(())
    }

    fn take_byte(&mut self) -> Result<Option<u8>, Error<S::Error>> {
        match self.pending.pop() {
            Some(byte) => Ok(Some(byte)),
            None => self.source.read_one().map_err(Error::Source),
        }
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, Error<S::Error>> {
        let n = self.pending.take(buf);
        let read = self.source.read_exact(&mut buf[n..]).map_err(Error::Source)?;
        Ok(n + read)
    }
}

fn never() -> bool {
    false
}

/// An endless, non-restartable sequence of decoded readings.
///
/// Each pull keeps polling the synchronizer until a frame decodes, the source
/// fails, the source is exhausted, or the cancellation check returns `true`.
/// After any of these but a decoded frame the sequence ends.
#[derive(Debug)]
pub struct Readings<S, C = fn() -> bool> {
    sync: Synchronizer<S>,
    cancel: C,
    done: bool,
}

impl<S: ByteSource, C: FnMut() -> bool> Readings<S, C> {
    /// Stop the sequence once `cancel` returns `true`. It is checked before
    /// every synchronization attempt.
    pub fn cancel_when<D: FnMut() -> bool>(self, cancel: D) -> Readings<S, D> {
        Readings {
            sync: self.sync,
            cancel,
            done: self.done,
        }
    }

    pub fn stats(&self) -> SyncStats {
        self.sync.stats()
    }

    /// Recover the synchronizer, for example to close it.
    pub fn into_inner(self) -> Synchronizer<S> {
        self.sync
    }
}

impl<S: ByteSource, C: FnMut() -> bool> Iterator for Readings<S, C> {
    type Item = Result<Reading, Error<S::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if (self.cancel)() {
                self.done = true;
                break;
            }

            match self.sync.next_reading() {
                Ok(Next::Decoded(reading)) => return Some(Ok(reading)),
                Ok(Next::NoFrameYet) if self.sync.is_exhausted() => self.done = true,
                Ok(Next::NoFrameYet) => {}
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }

        None
    }
}

impl<S: ByteSource, C: FnMut() -> bool> core::iter::FusedIterator for Readings<S, C> {}
