use anyhow::Result;
use log::debug;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{self, Read, Write};
use std::time::Duration;
use thiserror::Error;

use crate::cli::SerialOpts;
use crate::config;
use crate::frame::TERMINATOR;

#[derive(Debug, Error)]
pub enum LinkError {
    /// No writability / readability within the bounded wait.
    #[error("timed out")]
    Timeout,
    /// The descriptor is no longer usable; the link must be dropped.
    #[error("device gone: {0}")]
    Gone(#[source] io::Error),
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

impl LinkError {
    fn from_io(e: io::Error) -> Self {
        if is_timeout(&e) {
            LinkError::Timeout
        } else {
            LinkError::Gone(e)
        }
    }

    fn from_serial(e: serialport::Error) -> Self {
        Self::from_io(e.into())
    }
}

/// An open, configured connection to the analyzer. Dropping it closes the device.
pub trait Link {
    /// Send one request, waiting a bounded time for the line to accept it.
    fn send(&mut self, request: &[u8]) -> Result<(), LinkError>;
    /// Receive one response into `buf`, returning how many bytes arrived.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, LinkError>;
}

/// Acquires links. Either returns a fully configured link or nothing.
pub trait Connector {
    type Link: Link;
    fn connect(&mut self) -> Result<Self::Link>;
}

pub fn open_port(opts: &SerialOpts, timeout: Duration) -> Result<Box<dyn SerialPort>> {
    let builder = serialport::new(&opts.dev, opts.baud)
        .timeout(timeout)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None);

    let port = builder
        .open()
        .map_err(|e| anyhow::anyhow!("open {}: {}", opts.dev, e))?;
    // on error the port is dropped here, closing the descriptor
    port.clear(ClearBuffer::All)
        .map_err(|e| anyhow::anyhow!("flush {}: {}", opts.dev, e))?;
    Ok(port)
}

#[derive(Debug, Clone)]
pub struct SerialConnector {
    opts: SerialOpts,
    io_timeout: Duration,
    byte_gap: Duration,
}

impl SerialConnector {
    pub fn new(opts: SerialOpts) -> Self {
        Self {
            opts,
            io_timeout: config::IO_TIMEOUT,
            byte_gap: config::BYTE_GAP,
        }
    }
}

impl Connector for SerialConnector {
    type Link = SerialLink;

    fn connect(&mut self) -> Result<SerialLink> {
        let port = open_port(&self.opts, self.io_timeout)?;
        debug!("opened {} at {} baud", self.opts.dev, self.opts.baud);
        Ok(SerialLink {
            port,
            io_timeout: self.io_timeout,
            byte_gap: self.byte_gap,
        })
    }
}

pub struct SerialLink {
    port: Box<dyn SerialPort>,
    io_timeout: Duration,
    byte_gap: Duration,
}

impl SerialLink {
    fn set_timeout(&mut self, t: Duration) -> Result<(), LinkError> {
        self.port.set_timeout(t).map_err(LinkError::from_serial)
    }
}

impl Link for SerialLink {
    fn send(&mut self, request: &[u8]) -> Result<(), LinkError> {
        // a late reply to an earlier request must not be read as this one's
        self.port
            .clear(ClearBuffer::Input)
            .map_err(LinkError::from_serial)?;
        self.set_timeout(self.io_timeout)?;
        self.port.write_all(request).map_err(LinkError::from_io)?;
        self.port.flush().map_err(LinkError::from_io)
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.set_timeout(self.io_timeout)?;
        let mut n = match self.port.read(buf) {
            Ok(0) => {
                return Err(LinkError::Gone(io::Error::from(
                    io::ErrorKind::UnexpectedEof,
                )));
            }
            Ok(n) => n,
            Err(e) => return Err(LinkError::from_io(e)),
        };

        self.set_timeout(self.byte_gap)?;
        while n < buf.len() && buf[n - 1] != TERMINATOR {
            match self.port.read(&mut buf[n..]) {
                Ok(0) => break,
                Ok(k) => n += k,
                Err(e) if is_timeout(&e) => break,
                Err(e) => return Err(LinkError::Gone(e)),
            }
        }
        Ok(n)
    }
}
