//! Serial-port byte source.
//!
//! _Requires Cargo feature `serialport`._

use std::{
    boxed::Box,
    io::{self, Read},
    time::Duration,
};

use serialport::{ClearBuffer, DataBits, Parity, SerialPort, StopBits};

use crate::sensor::Sensor;

use super::{reader::is_timeout, source::ByteSource};

extern crate std;

/// A serial port, read with the port's own timeout.
pub struct SerialSource {
    port: Option<Box<dyn SerialPort>>,
}

impl SerialSource {
    /// Wrap a port that was opened and configured elsewhere.
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port: Some(port) }
    }

    /// Open a port with a sensor's factory settings (8N1 at its default baud
    /// rate), discarding anything already buffered.
    pub fn open(path: &str, sensor: Sensor) -> Result<Self, io::Error> {
        Self::open_with(path, sensor.baud_rate(), Sensor::TIMEOUT)
    }

    pub fn open_with(path: &str, baud_rate: u32, timeout: Duration) -> Result<Self, io::Error> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(timeout)
            .open()?;

        port.clear(ClearBuffer::All)?;

        Ok(Self::new(port))
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, io::Error> {
        self.port
            .as_mut()
            .ok_or_else(|| io::ErrorKind::NotConnected.into())
    }
}

impl core::fmt::Debug for SerialSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = self.port.as_ref().and_then(|p| p.name());
        f.debug_struct("SerialSource").field("port", &name).finish()
    }
}

impl ByteSource for SerialSource {
    type Error = io::Error;

    fn bytes_available(&self) -> Result<usize, Self::Error> {
        match &self.port {
            Some(port) => Ok(port.bytes_to_read()? as usize),
            None => Err(io::ErrorKind::NotConnected.into()),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match self.port()?.read(buf) {
            Ok(n) => Ok(n),
            Err(err) if is_timeout(&err) => Ok(0),
            Err(err) => Err(err),
        }
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.port = None;
        Ok(())
    }
}
