//! [`SerialStream`] – the seam between the link and the OS device.
//!
//! [`SerialLink`][crate::link::SerialLink] is generic over this trait so the
//! whole server stack can run against an in-memory stream in tests.  The one
//! real implementation, [`PortStream`], wraps a `serialport` device opened at
//! the configured baud rate with 8N1 framing and no flow control.

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

/// A blocking duplex byte stream with a settable per-operation timeout.
///
/// The timeout applies to the next read or write; the link sets it before
/// each operation so the read and write budgets stay independent.  A read
/// that sees no byte within the budget fails with
/// [`io::ErrorKind::TimedOut`].
pub trait SerialStream: Read + Write + Send {
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

/// A real serial device.
///
/// Owns the file descriptor exclusively; dropping the stream closes it.
pub struct PortStream(Box<dyn SerialPort>);

impl PortStream {
    /// Open `path` at `baud` with 8N1 framing, no flow control, and `timeout`
    /// as the initial read/write budget.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serialport::Error`] when the device cannot be
    /// opened or configured.
    pub fn open(path: &str, baud: u32, timeout: Duration) -> Result<Self, serialport::Error> {
        let port = serialport::new(path, baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()?;
        Ok(Self(port))
    }
}

impl Read for PortStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl Write for PortStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl SerialStream for PortStream {
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.0
            .set_timeout(timeout)
            .map_err(|e| io::Error::other(e.to_string()))
    }
}
