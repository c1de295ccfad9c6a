//! Immutable frame format descriptors.

use thiserror::Error;

use super::{check::compute_checksum, sync::Frame};

/// Largest frame, in bytes, any format may describe.
pub const MAX_FRAME_SIZE: usize = 32;

/// Largest number of fields any format may describe.
pub const MAX_FIELDS: usize = 8;

/// Byte order of a multi-byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Least-significant byte first.
    Little,
    /// Most-significant byte first.
    Big,
}

/// Algorithm producing the single checksum byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    /// Sum of the span, truncated to the low 8 bits.
    SumMod256,
    /// Bitwise complement of [`ChecksumKind::SumMod256`].
    InvertedSumMod256,
}

/// Bytes covered by the checksum. Both spans end just before the checksum
/// byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumSpan {
    /// Starting at the first header byte.
    Frame,
    /// Starting at the first byte after the header.
    Payload,
}

/// Location and shape of a payload field.
///
/// Bounds are only checked once the field is part of a [`FrameFormat`], which
/// is also the only way its bytes are ever read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    name: &'static str,
    offset: usize,
    width: usize,
    endianness: Endianness,
}

impl FieldSpec {
    pub const fn new(
        name: &'static str,
        offset: usize,
        width: usize,
        endianness: Endianness,
    ) -> Self {
        Self {
            name,
            offset,
            width,
            endianness,
        }
    }

    /// A little-endian field, the layout of every known sensor.
    pub const fn le(name: &'static str, offset: usize, width: usize) -> Self {
        Self::new(name, offset, width, Endianness::Little)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Offset of the first byte, counted from the start of the frame.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Interpret the bytes of this field within a frame.
    pub(super) fn extract(&self, frame: &[u8]) -> u32 {
        let bytes = &frame[self.offset..self.offset + self.width];

        match self.endianness {
            Endianness::Little => bytes.iter().rev().fold(0, |acc, b| acc << 8 | *b as u32),
            Endianness::Big => bytes.iter().fold(0, |acc, b| acc << 8 | *b as u32),
        }
    }

    /// Write a value into the bytes of this field, discarding any high bits
    /// that do not fit.
    pub(super) fn insert(&self, frame: &mut [u8], value: u32) {
        let bytes = &mut frame[self.offset..self.offset + self.width];
        let width = bytes.len();

        for (i, b) in bytes.iter_mut().enumerate() {
            let shift = match self.endianness {
                Endianness::Little => i,
                Endianness::Big => width - 1 - i,
            };
            *b = (value >> (shift * 8)) as u8;
        }
    }
}

/// An inconsistent frame format description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    /// No header bytes were given.
    #[error("Header pattern is empty.")]
    EmptyHeader,
    /// The frame cannot hold its header and a checksum byte.
    #[error("Frame size ({frame_size}) leaves no room for a checksum after a {header} byte header.")]
    FrameTooShort { frame_size: usize, header: usize },
    /// The frame exceeds [`MAX_FRAME_SIZE`].
    #[error("Frame size ({0}) exceeds the supported maximum.")]
    FrameTooLong(usize),
    /// More fields than [`MAX_FIELDS`].
    #[error("Too many fields ({0}).")]
    TooManyFields(usize),
    /// A field is wider than a `u32` or has no bytes.
    #[error("Field `{name}` has unsupported width ({width}).")]
    FieldWidth { name: &'static str, width: usize },
    /// A field overlaps the header or the checksum, or runs past the frame.
    #[error("Field `{0}` lies outside the payload.")]
    FieldOutOfBounds(&'static str),
    /// Header, fields, and checksum do not add up to the frame size.
    #[error("Frame size ({frame_size}) does not match its layout ({computed}).")]
    SizeMismatch { frame_size: usize, computed: usize },
}

/// Description of one sensor's fixed-size binary frame.
///
/// Fields are private so a format can only exist once [`FrameFormat::new`]
/// has accepted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFormat {
    header: &'static [u8],
    frame_size: usize,
    checksum_kind: ChecksumKind,
    checksum_span: ChecksumSpan,
    fields: &'static [FieldSpec],
}

impl FrameFormat {
    /// Checksum width in bytes; always one for known formats.
    pub const CHECKSUM_WIDTH: usize = 1;

    /// Validate and build a frame format.
    ///
    /// Usable in `const` context, so preset formats are checked at compile
    /// time.
    pub const fn new(
        header: &'static [u8],
        frame_size: usize,
        checksum_kind: ChecksumKind,
        checksum_span: ChecksumSpan,
        fields: &'static [FieldSpec],
    ) -> Result<Self, FormatError> {
        if header.is_empty() {
            return Err(FormatError::EmptyHeader);
        }

        if frame_size < header.len() + Self::CHECKSUM_WIDTH {
            return Err(FormatError::FrameTooShort {
                frame_size,
                header: header.len(),
            });
        }

        if frame_size > MAX_FRAME_SIZE {
            return Err(FormatError::FrameTooLong(frame_size));
        }

        if fields.len() > MAX_FIELDS {
            return Err(FormatError::TooManyFields(fields.len()));
        }

        let payload_end = frame_size - Self::CHECKSUM_WIDTH;
        let mut computed = header.len() + Self::CHECKSUM_WIDTH;

        let mut i = 0;
        while i < fields.len() {
            let FieldSpec {
                name,
                offset,
                width,
                ..
            } = fields[i];

            if width == 0 || width > 4 {
                return Err(FormatError::FieldWidth { name, width });
            }

            if offset < header.len() || offset + width > payload_end {
                return Err(FormatError::FieldOutOfBounds(name));
            }

            computed += width;
            i += 1;
        }

        if computed != frame_size {
            return Err(FormatError::SizeMismatch {
                frame_size,
                computed,
            });
        }

        Ok(Self {
            header,
            frame_size,
            checksum_kind,
            checksum_span,
            fields,
        })
    }

    pub fn header(&self) -> &'static [u8] {
        self.header
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn checksum_kind(&self) -> ChecksumKind {
        self.checksum_kind
    }

    pub fn checksum_span(&self) -> ChecksumSpan {
        self.checksum_span
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Offset of the checksum byte.
    pub fn checksum_offset(&self) -> usize {
        self.frame_size - Self::CHECKSUM_WIDTH
    }

    /// Bytes of a frame covered by the checksum.
    pub fn checksum_range(&self) -> core::ops::Range<usize> {
        let start = match self.checksum_span {
            ChecksumSpan::Frame => 0,
            ChecksumSpan::Payload => self.header.len(),
        };

        start..self.checksum_offset()
    }

    /// Build a valid frame from field values given in layout order.
    ///
    /// Missing values are written as zero; extra values are ignored.
    pub fn encode(&self, values: &[u32]) -> Frame {
        let mut frame = Frame::empty(self);
        let bytes = frame.as_mut_slice();

        bytes[..self.header.len()].copy_from_slice(self.header);

        for (i, field) in self.fields.iter().enumerate() {
            field.insert(bytes, values.get(i).copied().unwrap_or(0));
        }

        let checksum = compute_checksum(self.checksum_kind, &bytes[self.checksum_range()]);
        bytes[self.checksum_offset()] = checksum;

        frame
    }
}
