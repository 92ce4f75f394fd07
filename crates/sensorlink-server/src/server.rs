//! [`ServerLoop`] – lifecycle controller for the serial command server.
//!
//! Drives read → decode → dispatch → respond at the configured cadence.
//! One iteration handles at most one inbound frame and emits at most one
//! response, so responses leave in exactly the order commands arrived.
//!
//! # Error containment
//!
//! A failure inside one iteration never terminates the loop: malformed
//! frames and handler faults become error envelopes, and a timed-out write
//! is logged and dropped.  Only a lost device (or the shutdown signal) ends
//! service, after which the drain phase flushes and closes the link within
//! `system.shutdown_timeout`.

use std::thread;
use std::time::Instant;

use sensorlink_hal::SensorHub;
use sensorlink_link::{CommandCodec, LinkError, SerialLink, SerialStream};
use sensorlink_types::ServerStatus;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::dispatch::{INVALID_COMMAND, dispatch};
use crate::shutdown::ShutdownSignal;

/// The server could not reach the serving state.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error(transparent)]
    Link(#[from] LinkError),
}

/// Owns the hub and the loop cadence; at most one instance should be live
/// per process, since the link it opens is the sole writer to the device.
pub struct ServerLoop {
    config: Config,
    hub: Option<Box<dyn SensorHub>>,
    shutdown: ShutdownSignal,
}

impl ServerLoop {
    /// Build a loop over an already-initialised hub.  Pass `None` when the
    /// board failed to initialise: the server still serves, reporting
    /// `sensor_initialized: false` and all-null snapshots.
    pub fn new(config: Config, hub: Option<Box<dyn SensorHub>>, shutdown: ShutdownSignal) -> Self {
        Self {
            config,
            hub,
            shutdown,
        }
    }

    /// Open the configured device and serve until shutdown.
    ///
    /// The link is released on every exit path: the drain phase runs whether
    /// service ended by signal or by device loss.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError`] only for init failures (the device could not
    /// be opened).  Faults during service are contained or end in a clean
    /// drain.
    pub fn run(&mut self) -> Result<(), ServeError> {
        let serial = self.config.serial.clone();
        let mut link = SerialLink::open(
            &serial.port,
            serial.baudrate,
            serial.read_timeout(),
            serial.write_timeout(),
        )?;
        info!(port = %serial.port, baud = serial.baudrate, "serial port opened");

        self.serve(&mut link);
        self.drain(&mut link);
        Ok(())
    }

    /// The serving state: poll, frame, dispatch, respond.
    fn serve<S: SerialStream>(&mut self, link: &mut SerialLink<S>) {
        let codec = CommandCodec::new(self.config.system.max_command_length);
        let status = ServerStatus {
            sensor_initialized: self.hub.is_some(),
            running: true,
            port: self.config.serial.port.clone(),
        };
        let max_len = self.config.system.max_command_length;
        let idle = self.config.system.idle_sleep();

        info!(sensor_initialized = status.sensor_initialized, "serving");

        while !self.shutdown.is_set() {
            match link.read_line(max_len) {
                Ok(Some(frame)) => {
                    let response = self.respond_to(&codec, &frame, &status);
                    self.write_response(link, &codec, &response);
                }
                Ok(None) => thread::sleep(idle),
                Err(LinkError::FrameOverflow) => {
                    warn!(max_len, "discarded over-length command");
                    self.write_response(link, &codec, &json!({"error": INVALID_COMMAND}));
                }
                Err(e) => {
                    error!(error = %e, "serial device lost; shutting down");
                    self.shutdown.set();
                }
            }
        }

        info!("service ended");
    }

    /// Decode one frame and produce its response value.  Every failure maps
    /// to an envelope – a response is owed for every complete frame.
    fn respond_to(&mut self, codec: &CommandCodec, frame: &[u8], status: &ServerStatus) -> Value {
        match codec.decode(frame) {
            Ok(command) => {
                debug!(command = %command, "command received");
                dispatch(&command, self.hub.as_deref_mut(), status)
            }
            Err(e) => {
                warn!(error = %e, "rejected malformed frame");
                json!({"error": INVALID_COMMAND})
            }
        }
    }

    /// Emit one response.  A timed-out write is recoverable (the response is
    /// lost, service continues); a lost device requests shutdown.
    fn write_response<S: SerialStream>(
        &self,
        link: &mut SerialLink<S>,
        codec: &CommandCodec,
        response: &Value,
    ) {
        match link.write_all(&codec.encode(response)) {
            Ok(()) => {}
            Err(LinkError::WriteTimeout) => {
                error!("response write timed out; response dropped");
            }
            Err(e) => {
                error!(error = %e, "serial device lost during write; shutting down");
                self.shutdown.set();
            }
        }
    }

    /// The draining state: flush and release the device within the
    /// configured budget.
    fn drain<S: SerialStream>(&mut self, link: &mut SerialLink<S>) {
        let budget = self.config.system.drain_budget();
        let started = Instant::now();
        link.close_within(budget);
        let elapsed = started.elapsed();
        if elapsed > budget {
            warn!(?elapsed, ?budget, "drain exceeded its budget");
        } else {
            info!("serial port closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorlink_hal::{SensorError, SimBoard};
    use sensorlink_types::SensorSnapshot;
    use std::collections::VecDeque;
    use std::io::{self, Read, Write};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// In-memory peer: reads pop scripted chunks; once the script runs dry
    /// the peer requests shutdown so `serve` returns.  Writes land in a
    /// shared buffer the test inspects afterwards.
    struct PeerStream {
        inbound: VecDeque<Vec<u8>>,
        outbound: Arc<Mutex<Vec<u8>>>,
        shutdown: ShutdownSignal,
        read_fault: Option<io::ErrorKind>,
    }

    impl Read for PeerStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.inbound.pop_front() {
                Some(mut chunk) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    if n < chunk.len() {
                        self.inbound.push_front(chunk.split_off(n));
                    }
                    Ok(n)
                }
                None => {
                    if let Some(kind) = self.read_fault.take() {
                        return Err(io::Error::new(kind, "scripted device fault"));
                    }
                    self.shutdown.set();
                    Err(io::Error::new(io::ErrorKind::TimedOut, "script exhausted"))
                }
            }
        }
    }

    impl Write for PeerStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.outbound.lock().expect("outbound lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SerialStream for PeerStream {
        fn set_timeout(&mut self, _timeout: Duration) -> io::Result<()> {
            Ok(())
        }
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.system.loop_interval = 0.001;
        config
    }

    /// Run a full serve/drain cycle against scripted peer input and return
    /// everything the server wrote.
    fn exchange(hub: Option<Box<dyn SensorHub>>, chunks: &[&[u8]]) -> Vec<u8> {
        exchange_with(test_config(), hub, chunks).0
    }

    fn exchange_with(
        config: Config,
        hub: Option<Box<dyn SensorHub>>,
        chunks: &[&[u8]],
    ) -> (Vec<u8>, ShutdownSignal) {
        let shutdown = ShutdownSignal::new();
        let outbound = Arc::new(Mutex::new(Vec::new()));
        let stream = PeerStream {
            inbound: chunks.iter().map(|c| c.to_vec()).collect(),
            outbound: Arc::clone(&outbound),
            shutdown: shutdown.clone(),
            read_fault: None,
        };
        let mut link = SerialLink::over(
            stream,
            Duration::from_millis(5),
            Duration::from_millis(5),
        );
        let mut server = ServerLoop::new(config, hub, shutdown.clone());
        server.serve(&mut link);
        server.drain(&mut link);
        let written = outbound.lock().expect("outbound lock").clone();
        (written, shutdown)
    }

    fn lines(raw: &[u8]) -> Vec<String> {
        String::from_utf8(raw.to_vec())
            .expect("responses are UTF-8")
            .split("\r\n")
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn ping_yields_pong() {
        let written = exchange(None, &[b"ping\r\n"]);
        assert_eq!(written, b"{\"status\":\"pong\"}\r\n");
    }

    #[test]
    fn unknown_command_yields_error_envelope() {
        let written = exchange(None, &[b"reboot\r\n"]);
        assert_eq!(written, b"{\"error\":\"invalid command\"}\r\n");
    }

    #[test]
    fn empty_line_yields_error_envelope() {
        let written = exchange(None, &[b"\r\n"]);
        assert_eq!(written, b"{\"error\":\"invalid command\"}\r\n");
    }

    #[test]
    fn bad_utf8_yields_error_envelope() {
        let script: [&[u8]; 1] = [&[0xff, 0xfe, b'\r', b'\n']];
        let written = exchange(None, &script);
        assert_eq!(written, b"{\"error\":\"invalid command\"}\r\n");
    }

    #[test]
    fn overlength_input_yields_exactly_one_error_then_recovers() {
        // 300 bytes against the default 256-byte bound, then a well-formed
        // ping.  Exactly one error envelope, then a normal pong.
        let flood = vec![b'A'; 300];
        let script: [&[u8]; 3] = [&flood, b"\r\n", b"ping\r\n"];
        let written = exchange(None, &script);
        let responses = lines(&written);
        assert_eq!(
            responses,
            vec![
                "{\"error\":\"invalid command\"}".to_string(),
                "{\"status\":\"pong\"}".to_string(),
            ]
        );
    }

    #[test]
    fn status_before_sensors_reports_uninitialised_hub() {
        let mut config = test_config();
        config.serial.port = "/dev/ttyTEST0".to_string();
        let (written, _) = exchange_with(config, None, &[b"status\r\n"]);
        let response: serde_json::Value =
            serde_json::from_slice(written.strip_suffix(b"\r\n").expect("terminator")).unwrap();
        assert_eq!(response["sensor_initialized"], false);
        assert_eq!(response["running"], true);
        assert_eq!(response["port"], "/dev/ttyTEST0");
    }

    #[test]
    fn sensor_data_without_hub_is_all_null_snapshot() {
        let written = exchange(None, &[b"get_sensor_data\r\n"]);
        let response: serde_json::Value =
            serde_json::from_slice(written.strip_suffix(b"\r\n").expect("terminator")).unwrap();
        assert!(response.get("error").is_none());
        assert!(response["environment"]["temperature"].is_null());
        assert!(response["motion"]["magnetic"].is_null());
    }

    #[test]
    fn sensor_data_with_sim_board_reports_values() {
        let hub = Box::new(SimBoard::new().build());
        let written = exchange(Some(hub), &[b"get_sensor_data\r\n"]);
        let response: serde_json::Value =
            serde_json::from_slice(written.strip_suffix(b"\r\n").expect("terminator")).unwrap();
        assert!(response["environment"]["temperature"].is_number());
        assert!(response["motion"]["orientation"]["yaw"].is_number());
    }

    #[test]
    fn pipelined_commands_are_answered_in_order() {
        let written = exchange(None, &[b"ping\r\nreboot\r\nstatus\r\n"]);
        let responses = lines(&written);
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0], "{\"status\":\"pong\"}");
        assert_eq!(responses[1], "{\"error\":\"invalid command\"}");
        assert!(responses[2].contains("\"running\":true"));
    }

    #[test]
    fn one_response_per_complete_line() {
        let written = exchange(None, &[b"ping\r\n", b"ping\r\n", b"ping\r\n"]);
        let responses = lines(&written);
        assert_eq!(responses.len(), 3);
        assert!(responses.iter().all(|r| r == "{\"status\":\"pong\"}"));
    }

    #[test]
    fn responses_contain_no_interior_newline() {
        let hub = Box::new(SimBoard::new().build());
        let written = exchange(Some(hub), &[b"get_sensor_data\r\n", b"status\r\n"]);
        let text = String::from_utf8(written).unwrap();
        for response in text.split_inclusive("\r\n") {
            assert!(response.ends_with("\r\n"));
            let body = &response[..response.len() - 2];
            assert!(!body.contains('\n'), "interior newline in {body:?}");
            assert!(!body.contains('\r'), "interior carriage return in {body:?}");
        }
    }

    #[test]
    fn device_loss_on_read_requests_shutdown() {
        let shutdown = ShutdownSignal::new();
        let outbound = Arc::new(Mutex::new(Vec::new()));
        let stream = PeerStream {
            inbound: VecDeque::new(),
            outbound: Arc::clone(&outbound),
            shutdown: shutdown.clone(),
            read_fault: Some(io::ErrorKind::BrokenPipe),
        };
        let mut link = SerialLink::over(stream, Duration::ZERO, Duration::ZERO);
        let mut server = ServerLoop::new(test_config(), None, shutdown.clone());
        server.serve(&mut link);
        assert!(shutdown.is_set());
        assert!(outbound.lock().unwrap().is_empty());
    }

    /// A hub whose read requests shutdown mid-handler, modelling a signal
    /// arriving while a command is in flight.
    struct SignallingHub(ShutdownSignal);
    impl SensorHub for SignallingHub {
        fn snapshot(&mut self) -> Result<SensorSnapshot, SensorError> {
            self.0.set();
            Ok(SensorSnapshot::empty())
        }
    }

    #[test]
    fn shutdown_during_inflight_command_completes_that_response_only() {
        let shutdown = ShutdownSignal::new();
        let outbound = Arc::new(Mutex::new(Vec::new()));
        let stream = PeerStream {
            inbound: [b"get_sensor_data\r\nping\r\n".to_vec()].into(),
            outbound: Arc::clone(&outbound),
            shutdown: shutdown.clone(),
            read_fault: None,
        };
        let mut link = SerialLink::over(
            stream,
            Duration::from_millis(5),
            Duration::from_millis(5),
        );
        let hub = Box::new(SignallingHub(shutdown.clone()));
        let mut server = ServerLoop::new(test_config(), Some(hub), shutdown.clone());
        server.serve(&mut link);
        server.drain(&mut link);

        let written = outbound.lock().unwrap().clone();
        let responses = lines(&written);
        // The in-flight snapshot response completed; the queued ping was
        // never read.
        assert_eq!(responses.len(), 1);
        assert!(responses[0].contains("\"environment\""));
        assert!(!responses[0].contains("pong"));
    }

    #[test]
    fn serve_exits_promptly_when_shutdown_preset() {
        let shutdown = ShutdownSignal::new();
        shutdown.set();
        let outbound = Arc::new(Mutex::new(Vec::new()));
        let stream = PeerStream {
            inbound: [b"ping\r\n".to_vec()].into(),
            outbound: Arc::clone(&outbound),
            shutdown: shutdown.clone(),
            read_fault: None,
        };
        let mut link = SerialLink::over(stream, Duration::ZERO, Duration::ZERO);
        let mut server = ServerLoop::new(test_config(), None, shutdown);
        server.serve(&mut link);
        // No reads once shutdown is set.
        assert!(outbound.lock().unwrap().is_empty());
    }
}
