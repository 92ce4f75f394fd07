//! Environment-chip capability traits.
//!
//! The board carries four environment chips: a combined
//! pressure/temperature/humidity sensor, an ambient-light sensor, a UV
//! sensor, and a VOC sensor.  Each gets its own one-method trait so the
//! [`BoardHub`][crate::hub::BoardHub] can degrade per capability.

use crate::SensorError;

/// Combined pressure / temperature / humidity sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaroSample {
    /// Air temperature in °C.
    pub temperature: f64,
    /// Relative humidity in %RH.
    pub humidity: f64,
    /// Barometric pressure in hPa.
    pub pressure: f64,
}

/// A combined pressure/temperature/humidity chip.
pub trait Barometer: Send {
    /// Take one compensated sample.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::Read`] if the chip cannot be read this cycle.
    fn read(&mut self) -> Result<BaroSample, SensorError>;
}

/// An ambient-light chip reporting illuminance in lux.
pub trait LightSensor: Send {
    fn read_lux(&mut self) -> Result<f64, SensorError>;
}

/// A UV chip reporting the sensor-native UV count.
pub trait UvSensor: Send {
    fn read_uv(&mut self) -> Result<u32, SensorError>;
}

/// A VOC chip reporting the raw gas index.
pub trait VocSensor: Send {
    fn read_voc(&mut self) -> Result<f64, SensorError>;
}
