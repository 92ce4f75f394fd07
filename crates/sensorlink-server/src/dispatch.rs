//! Command whitelist and dispatch.
//!
//! The whitelist and the dispatch table are the same structure: the closed
//! [`Command`] enum.  [`dispatch`] is pure – it consumes a validated command
//! string plus views of the hub and server state and returns a JSON value,
//! performing no I/O.  Every error path folds into one of two fixed
//! envelopes so the peer never sees internal detail.

use sensorlink_hal::SensorHub;
use sensorlink_types::{SensorSnapshot, ServerStatus};
use serde_json::{Value, json};
use tracing::{error, warn};

/// Fixed message for rejected commands.
pub const INVALID_COMMAND: &str = "invalid command";

/// The closed set of accepted command names.  Case-sensitive; any other
/// input – including a known name carrying arguments – is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    GetSensorData,
    Ping,
    Status,
}

impl Command {
    /// Exact match against the whitelist.  The codec has already stripped
    /// surrounding whitespace.
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "get_sensor_data" => Some(Self::GetSensorData),
            "ping" => Some(Self::Ping),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

/// Route one command string to its handler and return the response value.
///
/// `hub` is `None` when no sensor hub initialised at startup; in that case
/// `get_sensor_data` reports a snapshot whose fields are all `null` rather
/// than an error.
pub fn dispatch(
    input: &str,
    hub: Option<&mut (dyn SensorHub + '_)>,
    status: &ServerStatus,
) -> Value {
    let Some(command) = Command::parse(input) else {
        warn!(command = input, "rejected command not in whitelist");
        return json!({"error": INVALID_COMMAND});
    };

    match command {
        Command::Ping => json!({"status": "pong"}),
        Command::Status => status_response(status),
        Command::GetSensorData => sensor_data_response(hub),
    }
}

fn status_response(status: &ServerStatus) -> Value {
    match serde_json::to_value(status) {
        Ok(value) => value,
        Err(e) => {
            error!(error = %e, "status serialisation failed");
            processing_error("status unavailable")
        }
    }
}

fn sensor_data_response(hub: Option<&mut (dyn SensorHub + '_)>) -> Value {
    let snapshot = match hub {
        Some(hub) => match hub.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "sensor hub read failed");
                return processing_error("sensor read failed");
            }
        },
        None => SensorSnapshot::empty(),
    };
    match serde_json::to_value(&snapshot) {
        Ok(value) => value,
        Err(e) => {
            error!(error = %e, "snapshot serialisation failed");
            processing_error("snapshot unavailable")
        }
    }
}

/// Build the handler-failure envelope.  Phrases are fixed, single-line, and
/// carry no internal detail.
fn processing_error(phrase: &str) -> Value {
    json!({"error": format!("processing error: {phrase}")})
}
