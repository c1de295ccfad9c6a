#![allow(dead_code)]

use std::{collections::VecDeque, io};

use rangeframe::avec::ByteSource;

/// A stream that is already fully buffered but only ever admits a few bytes
/// as available, like a sensor read at the pace it sends.
pub struct Trickle<'a> {
    data: &'a [u8],
}

impl<'a> Trickle<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl ByteSource for Trickle<'_> {
    type Error = io::Error;

    fn bytes_available(&self) -> Result<usize, Self::Error> {
        Ok(self.data.len().min(4))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }

    fn is_exhausted(&self) -> bool {
        self.data.is_empty()
    }
}

/// A line that never stops sending the same byte, like a sensor read at the
/// wrong baud rate.
pub struct Endless(pub u8);

impl ByteSource for Endless {
    type Error = io::Error;

    fn bytes_available(&self) -> Result<usize, Self::Error> {
        Ok(0)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        buf.fill(self.0);
        Ok(buf.len())
    }
}

/// A stream fed by the test between polls.
#[derive(Default)]
pub struct Live {
    buffered: VecDeque<u8>,
    pub unplugged: bool,
    pub closes: usize,
}

impl Live {
    pub fn push(&mut self, r: &[u8]) {
        self.buffered.extend(r);
    }

    pub fn buffered(&self) -> usize {
        self.buffered.len()
    }
}

impl ByteSource for Live {
    type Error = io::Error;

    fn bytes_available(&self) -> Result<usize, Self::Error> {
        if self.unplugged {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        Ok(self.buffered.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.unplugged {
            return Err(io::ErrorKind::BrokenPipe.into());
        }

        let n = buf.len().min(self.buffered.len());
        for (b, x) in buf.iter_mut().zip(self.buffered.drain(..n)) {
            *b = x;
        }
        Ok(n)
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.closes += 1;
        Ok(())
    }
}

/// Deterministic bytes that never include any of `avoid`.
pub fn noise(n: usize, seed: u32, avoid: &[u8]) -> Vec<u8> {
    let mut state = seed;
    let mut out = Vec::with_capacity(n);

    while out.len() < n {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let b = (state >> 16) as u8;
        if !avoid.contains(&b) {
            out.push(b);
        }
    }

    out
}
