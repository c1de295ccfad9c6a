//! States locating, validating, and decoding frames.

use either::Either::{self, Left, Right};

use super::{
    check::compute_checksum,
    format::{FrameFormat, MAX_FRAME_SIZE},
    reading::Reading,
};

/// Raw bytes of one candidate frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; MAX_FRAME_SIZE],
    len: usize,
}

impl Frame {
    /// A zeroed frame sized for a format.
    pub(super) fn empty(format: &FrameFormat) -> Self {
        Self {
            bytes: [0; MAX_FRAME_SIZE],
            len: format.frame_size(),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub(super) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes[..self.len]
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// State token to scan for a header, one byte at a time.
///
/// Holds the length of the header prefix matched so far.
#[derive(Debug, Default)]
pub struct Scanning {
    matched: usize,
}

impl Scanning {
    /// Begin scanning with nothing matched.
    pub fn new() -> Self {
        Self { matched: 0 }
    }

    /// Resume scanning just past a rejected header, keeping the longest part
    /// of it that could begin another header.
    fn after_header(format: &FrameFormat) -> Self {
        let header = format.header();
        let len = header.len();
        let matched = (1..len)
            .rev()
            .find(|&j| header[..j] == header[len - j..])
            .unwrap_or(0);

        Self { matched }
    }

    /// Number of header bytes matched so far.
    pub fn matched(&self) -> usize {
        self.matched
    }

    /// Transition to another state by testing the next stream byte against
    /// the header.
    ///
    /// On a mismatch, the byte is retested as the start of a new header, so
    /// overlapping candidates are never skipped.
    pub fn advance(self, format: &FrameFormat, r: u8) -> Either<Scanning, HeaderMatched> {
        let header = format.header();

        if header[self.matched] == r {
            let matched = self.matched + 1;

            return if matched == header.len() {
                Right(HeaderMatched(()))
            } else {
                Left(Scanning { matched })
            };
        }

        // Longest header prefix that ends the bytes seen so far.
        let k = self.matched;
        let matched = (1..=k)
            .rev()
            .find(|&j| header[j - 1] == r && header[..j - 1] == header[k + 1 - j..k])
            .unwrap_or(0);

        Left(Scanning { matched })
    }
}

/// State token to collect the bytes following a matched header.
#[derive(Debug)]
pub struct HeaderMatched(pub(super) ());

impl HeaderMatched {
    /// Transition to another state by completing the frame with the bytes
    /// that follow the header.
    ///
    /// Returns a scanning state if too few bytes were supplied; the partial
    /// frame is dropped.
    pub fn advance(self, format: &FrameFormat, r: &[u8]) -> Either<Validating, Scanning> {
        let header = format.header();

        if r.len() != format.frame_size() - header.len() {
            return Right(Scanning::new());
        }

        let mut frame = Frame::empty(format);
        let bytes = frame.as_mut_slice();
        bytes[..header.len()].copy_from_slice(header);
        bytes[header.len()..].copy_from_slice(r);

        Left(Validating { frame })
    }
}

/// State token to check and decode a complete frame.
#[derive(Debug)]
pub struct Validating {
    frame: Frame,
}

impl Validating {
    /// The candidate frame awaiting validation.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Transition to another state by validating the checksum and decoding
    /// each field.
    ///
    /// Returns the decoded reading, or the rejected frame and a scanning state
    /// positioned after its header.
    pub fn advance(self, format: &FrameFormat) -> Either<Reading, (ChecksumMismatch, Scanning)> {
        let bytes = self.frame.as_slice();

        let calculated = compute_checksum(format.checksum_kind(), &bytes[format.checksum_range()]);
        let found = bytes[format.checksum_offset()];

        if found != calculated {
            let mismatch = ChecksumMismatch {
                found,
                calculated,
                frame: self.frame,
                header: format.header().len(),
            };

            return Right((mismatch, Scanning::after_header(format)));
        }

        let mut reading = Reading::new();
        for field in format.fields() {
            reading.push(field.name(), field.extract(bytes));
        }

        Left(reading)
    }
}

/// A candidate frame whose checksum did not match.
#[derive(Debug)]
pub struct ChecksumMismatch {
    pub found: u8,
    pub calculated: u8,
    frame: Frame,
    header: usize,
}

impl ChecksumMismatch {
    /// Bytes after the coincidental header, which may hold the start of a
    /// real frame and must be scanned again.
    pub fn rescan(&self) -> &[u8] {
        &self.frame.as_slice()[self.header..]
    }
}
