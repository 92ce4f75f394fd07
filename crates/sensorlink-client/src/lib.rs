//! `sensorlink-client` – peer-side client for the serial sensor server.
//!
//! Lets another machine use a board running the server as an external
//! sensor: open the port, issue a command, get a typed response back.
//!
//! # Example
//!
//! ```rust,no_run
//! use sensorlink_client::SensorClient;
//!
//! let mut client = SensorClient::connect("/dev/ttyUSB0", 9600)?;
//! let pong = client.ping()?;
//! let snapshot = client.sensor_data()?;
//! println!("{} / {:?}", pong.status, snapshot.environment.temperature);
//! # Ok::<(), sensorlink_client::ClientError>(())
//! ```

use std::time::{Duration, Instant};

use sensorlink_link::{LinkError, PortStream, SerialLink, SerialStream};
use sensorlink_types::{SensorSnapshot, ServerStatus};
use serde::Deserialize;
use serde_json::Value;

/// Default budget for one request/response exchange.
const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Responses can be larger than commands; bound them generously.
const MAX_RESPONSE_LEN: usize = 4096;

/// A request that did not produce a usable response.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Link(#[from] LinkError),

    /// No complete response line arrived within the response budget.
    #[error("no response before the timeout")]
    Timeout,

    /// The response line was not the expected JSON shape.
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The server answered with its error envelope.
    #[error("server error: {0}")]
    Server(String),
}

/// Reply to the `ping` command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PingReply {
    pub status: String,
}

/// Blocking client over one serial link.
pub struct SensorClient<S: SerialStream> {
    link: SerialLink<S>,
    response_timeout: Duration,
}

impl SensorClient<PortStream> {
    /// Open `port` at `baud` and wrap it in a client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Link`] when the device cannot be opened.
    pub fn connect(port: &str, baud: u32) -> Result<Self, ClientError> {
        let link = SerialLink::open(
            port,
            baud,
            DEFAULT_RESPONSE_TIMEOUT,
            DEFAULT_RESPONSE_TIMEOUT,
        )?;
        Ok(Self::over(link))
    }
}

impl<S: SerialStream> SensorClient<S> {
    /// Wrap an already-open link.
    pub fn over(link: SerialLink<S>) -> Self {
        Self {
            link,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
        }
    }

    /// Override the per-exchange response budget.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Send one raw command and return the decoded JSON response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Server`] when the response is the server's
    /// `{"error": ...}` envelope, [`ClientError::Timeout`] when no response
    /// line completes in time.
    pub fn send_command(&mut self, command: &str) -> Result<Value, ClientError> {
        let mut frame = command.as_bytes().to_vec();
        frame.extend_from_slice(b"\r\n");
        self.link.write_all(&frame)?;

        let deadline = Instant::now() + self.response_timeout;
        let line = loop {
            match self.link.read_line(MAX_RESPONSE_LEN)? {
                Some(line) => break line,
                None if Instant::now() >= deadline => return Err(ClientError::Timeout),
                None => {}
            }
        };

        let value: Value = serde_json::from_slice(&line)?;
        if let Some(message) = value.get("error").and_then(Value::as_str) {
            return Err(ClientError::Server(message.to_string()));
        }
        Ok(value)
    }

    /// Round-trip check against the server.
    pub fn ping(&mut self) -> Result<PingReply, ClientError> {
        Ok(serde_json::from_value(self.send_command("ping")?)?)
    }

    /// The server's internal state.
    pub fn status(&mut self) -> Result<ServerStatus, ClientError> {
        Ok(serde_json::from_value(self.send_command("status")?)?)
    }

    /// One aggregated sensor snapshot.  Fields the board could not read are
    /// `None`.
    pub fn sensor_data(&mut self) -> Result<SensorSnapshot, ClientError> {
        Ok(serde_json::from_value(self.send_command("get_sensor_data")?)?)
    }

    /// Flush and release the port.  Also happens on drop.
    pub fn close(&mut self) {
        self.link.close();
    }
}
