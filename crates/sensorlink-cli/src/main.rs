//! `sensorlinkd` – the serial sensor server daemon.
//!
//! One optional positional argument: the config file path (default
//! `config.json`).  Exit code 0 on clean shutdown, non-zero when
//! initialisation fails.
//!
//! SIGINT and SIGTERM both request a graceful shutdown: the in-flight
//! response (if any) completes, the port is drained and closed, and the
//! process exits.

use std::path::Path;
use std::process::ExitCode;

use sensorlink_hal::{SensorHub, SimBoard};
use sensorlink_server::{Config, ServerLoop, ShutdownSignal, init_logging};
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());

    // Logging comes from the config, so config errors can only go to stderr.
    let config = match Config::load(Path::new(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("sensorlinkd: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = init_logging(&config.logging);
    info!(
        config = %config_path,
        port = %config.serial.port,
        baud = config.serial.baudrate,
        "sensorlink daemon starting"
    );

    // ── Shutdown wiring ───────────────────────────────────────────────────
    // The handler runs in the signal context and only flips the shared flag;
    // the loop notices it at its next iteration boundary.
    let shutdown = ShutdownSignal::new();
    let handler_signal = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_signal.set()) {
        warn!(error = %e, "failed to install termination handler; signals will not shut down cleanly");
    }

    // ── Sensor board ──────────────────────────────────────────────────────
    let hub = build_hub();
    if hub.is_none() {
        warn!("no sensors initialised; serving all-null snapshots");
    }

    let mut server = ServerLoop::new(config, hub, shutdown);
    match server.run() {
        Ok(()) => {
            info!("shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "server failed to start");
            ExitCode::FAILURE
        }
    }
}

/// Bring up the sensor board.
///
/// Real chip drivers implement the `sensorlink-hal` traits and get attached
/// here; the simulated board stands in so the daemon also runs on machines
/// with no bus wired up.  Returns `None` when not a single capability came
/// up – the server still serves, reporting `sensor_initialized: false`.
fn build_hub() -> Option<Box<dyn SensorHub>> {
    let board = SimBoard::new().build();
    if board.has_any_sensor() {
        Some(Box::new(board))
    } else {
        None
    }
}
