//! [`SerialLink`] – scoped ownership of the serial device with line framing.
//!
//! The link is the sole writer to the device for the lifetime of a server
//! loop.  Reads are non-blocking-ish: a read that sees no byte within the
//! read budget returns `None` instead of failing, and partial input
//! accumulates in an internal buffer across calls until a terminator
//! arrives.
//!
//! # Overflow discipline
//!
//! If the buffer reaches the frame-length bound without a terminator, the
//! buffered bytes are discarded, [`LinkError::FrameOverflow`] is returned
//! once, and the link then drops everything up to the next terminator so one
//! runaway frame costs the peer exactly one error response.

use std::io::{self, Read, Write};
use std::time::Duration;

use tracing::debug;

use crate::stream::{PortStream, SerialStream};

/// Chunk size for a single OS read.
const READ_CHUNK: usize = 256;

/// Faults surfaced by the link.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// The device could not be opened at loop start.
    #[error("failed to open serial port '{port}': {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// Buffered input reached the frame-length bound without a terminator.
    /// The buffer has been discarded; input resynchronises on the next
    /// terminator.
    #[error("inbound frame exceeded the configured maximum length")]
    FrameOverflow,

    /// The write budget elapsed before the full payload was accepted.
    #[error("serial write timed out")]
    WriteTimeout,

    /// The device is gone (unplugged, closed, fatal I/O).  Not recoverable
    /// within this loop.
    #[error("serial device lost: {0}")]
    DeviceLost(#[source] io::Error),
}

/// Owns the serial device and frames its byte stream into lines.
///
/// Frames are terminated by `\r\n`; a lone `\n` is also accepted.  The
/// terminator is stripped from returned lines.
pub struct SerialLink<S: SerialStream> {
    stream: S,
    read_timeout: Duration,
    write_timeout: Duration,
    buf: Vec<u8>,
    /// Set after an overflow: drop bytes until the next `\n`.
    discarding: bool,
    closed: bool,
}

impl SerialLink<PortStream> {
    /// Open the configured device.  The link owns the descriptor until it is
    /// dropped or [`close`][Self::close]d.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Open`] when the device cannot be opened.
    pub fn open(
        port: &str,
        baud: u32,
        read_timeout: Duration,
        write_timeout: Duration,
    ) -> Result<Self, LinkError> {
        let stream =
            PortStream::open(port, baud, read_timeout).map_err(|source| LinkError::Open {
                port: port.to_string(),
                source,
            })?;
        Ok(Self::over(stream, read_timeout, write_timeout))
    }
}

impl<S: SerialStream> SerialLink<S> {
    /// Wrap an already-open stream.  Used by the loop's tests and by the
    /// client, which share the framing rules.
    pub fn over(stream: S, read_timeout: Duration, write_timeout: Duration) -> Self {
        Self {
            stream,
            read_timeout,
            write_timeout,
            buf: Vec::new(),
            discarding: false,
            closed: false,
        }
    }

    /// Return one complete frame, or `None` if no frame completed within the
    /// read budget.  At most one OS read is issued per call; frames already
    /// buffered are returned without touching the device.
    ///
    /// # Errors
    ///
    /// - [`LinkError::FrameOverflow`] once per over-length frame.
    /// - [`LinkError::DeviceLost`] on EOF or fatal I/O.
    pub fn read_line(&mut self, max_len: usize) -> Result<Option<Vec<u8>>, LinkError> {
        if let Some(line) = self.take_line() {
            return Ok(Some(line));
        }
        self.check_overflow(max_len)?;

        self.stream
            .set_timeout(self.read_timeout)
            .map_err(LinkError::DeviceLost)?;
        let mut chunk = [0u8; READ_CHUNK];
        let n = match self.stream.read(&mut chunk) {
            Ok(0) => {
                return Err(LinkError::DeviceLost(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "serial device closed",
                )));
            }
            Ok(n) => n,
            Err(e) if is_timeout(&e) => return Ok(None),
            Err(e) => return Err(LinkError::DeviceLost(e)),
        };

        self.absorb(&chunk[..n]);
        if let Some(line) = self.take_line() {
            return Ok(Some(line));
        }
        self.check_overflow(max_len)?;
        Ok(None)
    }

    /// Write the full payload, retrying partial writes until the write
    /// budget is exhausted, then flush.
    ///
    /// # Errors
    ///
    /// - [`LinkError::WriteTimeout`] when the budget elapses first.
    /// - [`LinkError::DeviceLost`] on fatal I/O.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.stream
            .set_timeout(self.write_timeout)
            .map_err(LinkError::DeviceLost)?;
        self.stream.write_all(bytes).map_err(classify_write)?;
        self.stream.flush().map_err(classify_write)
    }

    /// Flush and release the device.  Idempotent; also invoked on drop so
    /// the device is released on every exit path.
    pub fn close(&mut self) {
        self.close_within(self.write_timeout);
    }

    /// Like [`close`][Self::close], but caps the final flush at `budget`.
    /// Used by the drain phase so shutdown cannot stall on a wedged peer.
    pub fn close_within(&mut self, budget: Duration) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = self.stream.set_timeout(budget);
        if let Err(e) = self.stream.flush() {
            debug!(error = %e, "flush during close failed");
        }
    }

    // ── Buffer management ───────────────────────────────────────────────────

    /// Append raw bytes, honouring post-overflow discard mode.
    fn absorb(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if self.discarding {
                if b == b'\n' {
                    self.discarding = false;
                }
                continue;
            }
            self.buf.push(b);
        }
    }

    /// Split off the first complete line, stripping `\n` and an optional
    /// preceding `\r`.
    fn take_line(&mut self) -> Option<Vec<u8>> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }

    fn check_overflow(&mut self, max_len: usize) -> Result<(), LinkError> {
        if self.buf.len() > max_len && !self.buf.contains(&b'\n') {
            debug!(buffered = self.buf.len(), max_len, "discarding oversize frame");
            self.buf.clear();
            self.discarding = true;
            return Err(LinkError::FrameOverflow);
        }
        Ok(())
    }
}

impl<S: SerialStream> Drop for SerialLink<S> {
    fn drop(&mut self) {
        self.close();
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

fn classify_write(e: io::Error) -> LinkError {
    if e.kind() == io::ErrorKind::TimedOut {
        LinkError::WriteTimeout
    } else {
        LinkError::DeviceLost(e)
    }
}
