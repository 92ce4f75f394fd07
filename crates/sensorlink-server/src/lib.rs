//! `sensorlink-server` – the serial command server core.
//!
//! Ties the transport ([`sensorlink-link`][sensorlink_link]) and the sensor
//! board ([`sensorlink-hal`][sensorlink_hal]) together into a long-running
//! single-peer request/response service.
//!
//! # Modules
//!
//! - [`config`] – [`Config`][config::Config]: typed view over the persisted
//!   JSON settings with per-field defaults and range validation.
//! - [`dispatch`] – the closed command whitelist and the pure
//!   [`dispatch`][dispatch::dispatch] function mapping a validated command
//!   string to a JSON response value.
//! - [`server`] – [`ServerLoop`][server::ServerLoop]: lifecycle controller
//!   driving read → decode → dispatch → respond at the configured cadence,
//!   with per-iteration error containment and a bounded drain phase.
//! - [`shutdown`] – [`ShutdownSignal`][shutdown::ShutdownSignal]: the
//!   process-wide set-once stop flag shared with the signal-handler context.
//! - [`telemetry`] – one-shot logging initialisation (console plus optional
//!   rolling file sink).
//!
//! # Concurrency contract
//!
//! The loop is single-threaded and cooperative: it suspends only inside the
//! serial read (bounded by `serial.timeout`) and in the idle sleep
//! (`system.loop_interval`).  The only cross-context mutable state is the
//! shutdown flag, written by the signal context and polled at iteration
//! boundaries.

pub mod config;
pub mod dispatch;
pub mod server;
pub mod shutdown;
pub mod telemetry;

pub use config::{Config, ConfigError};
pub use dispatch::{Command, dispatch};
pub use server::{ServeError, ServerLoop};
pub use shutdown::ShutdownSignal;
pub use telemetry::{LogGuard, init_logging};
