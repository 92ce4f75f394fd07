use serde::{Deserialize, Serialize};

/// Attitude angles in degrees, as reported by the 9-axis chip's fusion output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// One 3-axis sample (accelerometer, gyroscope, or magnetometer).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Environment-chip readings.
///
/// A field that could not be read is `None` and serialises as JSON `null`;
/// sibling fields stay valid.  The snapshot as a whole always serialises –
/// partial failure never collapses a response into an error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnvironmentReadings {
    /// Air temperature in °C.
    pub temperature: Option<f64>,
    /// Relative humidity in %RH.
    pub humidity: Option<f64>,
    /// Barometric pressure in hPa.
    pub pressure: Option<f64>,
    /// Ambient light in lux.
    pub light: Option<f64>,
    /// UV index count (sensor-native integer).
    pub uv: Option<u32>,
    /// Volatile organic compound raw index.
    pub voc: Option<f64>,
}

/// Motion-chip readings.  All four groups come from the single 9-axis IMU,
/// so they are typically all present or all absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionReadings {
    pub orientation: Option<Orientation>,
    pub acceleration: Option<Vector3>,
    pub gyroscope: Option<Vector3>,
    pub magnetic: Option<Vector3>,
}

/// One aggregated reading of the whole board, produced per `get_sensor_data`
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub environment: EnvironmentReadings,
    pub motion: MotionReadings,
}

impl SensorSnapshot {
    /// A snapshot with every field `null` – what the server reports when no
    /// sensor hub initialised at all.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Internal server state reported by the `status` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    /// Whether a sensor hub came up at startup.
    pub sensor_initialized: bool,
    /// Whether the serving loop is active.  A response implies it is, so this
    /// is `true` in practice; the field is kept for wire compatibility with
    /// existing clients.
    pub running: bool,
    /// The configured serial device path.
    pub port: String,
}
