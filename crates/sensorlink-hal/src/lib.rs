//! `sensorlink-hal` – sensor capability traits and the board hub.
//!
//! The serial server never talks to a chip directly; it sees the board only
//! through the [`SensorHub`] trait, which produces one aggregated
//! [`SensorSnapshot`][sensorlink_types::SensorSnapshot] on demand.
//!
//! # Modules
//!
//! - [`environment`] – one trait per environment capability
//!   ([`Barometer`][environment::Barometer],
//!   [`LightSensor`][environment::LightSensor],
//!   [`UvSensor`][environment::UvSensor],
//!   [`VocSensor`][environment::VocSensor]).  Driver crates implement these
//!   for the physical chips; the hub only holds trait objects.
//! - [`motion`] – the [`Imu`][motion::Imu] trait for the 9-axis chip
//!   (orientation, acceleration, gyroscope, magnetometer in one read).
//! - [`hub`] – [`BoardHub`][hub::BoardHub]: owns one optional driver per
//!   capability and degrades per-field, so a dead chip nulls only its own
//!   part of the snapshot.
//! - [`sim`] – always-succeeding simulated chips for headless runs and CI.

pub mod environment;
pub mod hub;
pub mod motion;
pub mod sim;

pub use environment::{Barometer, BaroSample, LightSensor, UvSensor, VocSensor};
pub use hub::{BoardHub, SensorHub};
pub use motion::{Imu, ImuSample};
pub use sim::SimBoard;

use thiserror::Error;

/// Faults surfaced by sensor drivers.
///
/// A `Read` fault against one chip is contained by the hub (the affected
/// fields become `null`); `Bus` invalidates a whole read.
#[derive(Debug, Error)]
pub enum SensorError {
    /// The chip did not come up during board initialisation.
    #[error("sensor '{sensor}' failed to initialise: {details}")]
    Init {
        sensor: &'static str,
        details: String,
    },

    /// A single read against one chip failed.
    #[error("sensor '{sensor}' read failed: {details}")]
    Read {
        sensor: &'static str,
        details: String,
    },

    /// The shared bus dropped out; no chip on it can be trusted this cycle.
    #[error("sensor bus fault: {0}")]
    Bus(String),
}
