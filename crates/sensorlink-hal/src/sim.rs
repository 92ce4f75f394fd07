//! Simulated chips for headless runs and CI.
//!
//! [`SimBoard`] builds a [`BoardHub`] pre-populated with stub drivers that
//! return fixed, plausible readings.  This lets the full server stack run on
//! a development machine with no I²C bus attached.
//!
//! # Example
//!
//! ```rust
//! use sensorlink_hal::{SensorHub, SimBoard};
//!
//! let mut hub = SimBoard::new().build();
//! let snap = hub.snapshot().expect("sim reads cannot fail");
//! assert!(snap.environment.temperature.is_some());
//! ```

use sensorlink_types::{Orientation, Vector3};

use crate::environment::{Barometer, BaroSample, LightSensor, UvSensor, VocSensor};
use crate::hub::BoardHub;
use crate::motion::{Imu, ImuSample};
use crate::SensorError;

// ────────────────────────────────────────────────────────────────────────────
// Stub chips
// ────────────────────────────────────────────────────────────────────────────

/// Simulated barometer reporting a calm indoor climate.  Always succeeds.
pub struct SimBarometer;

impl Barometer for SimBarometer {
    fn read(&mut self) -> Result<BaroSample, SensorError> {
        Ok(BaroSample {
            temperature: 23.4,
            humidity: 44.8,
            pressure: 1012.7,
        })
    }
}

/// Simulated light chip reporting typical office illuminance.
pub struct SimLight;

impl LightSensor for SimLight {
    fn read_lux(&mut self) -> Result<f64, SensorError> {
        Ok(318.2)
    }
}

/// Simulated UV chip reporting an indoor (near-zero) count.
pub struct SimUv;

impl UvSensor for SimUv {
    fn read_uv(&mut self) -> Result<u32, SensorError> {
        Ok(1)
    }
}

/// Simulated VOC chip reporting a clean-air raw index.
pub struct SimVoc;

impl VocSensor for SimVoc {
    fn read_voc(&mut self) -> Result<f64, SensorError> {
        Ok(30431.0)
    }
}

/// Simulated IMU reporting a board lying flat and still.
pub struct SimImu;

impl Imu for SimImu {
    fn read(&mut self) -> Result<ImuSample, SensorError> {
        Ok(ImuSample {
            orientation: Orientation {
                roll: 0.2,
                pitch: -0.1,
                yaw: 143.7,
            },
            acceleration: Vector3 {
                x: 0.01,
                y: -0.01,
                z: 1.0,
            },
            gyroscope: Vector3 {
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
            magnetic: Vector3 {
                x: 21.5,
                y: -3.8,
                z: 41.0,
            },
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimBoard builder
// ────────────────────────────────────────────────────────────────────────────

/// Builds a fully-populated simulated [`BoardHub`].
///
/// By default every chip is present; call the `without_*` methods to model a
/// board with a missing or broken chip.
pub struct SimBoard {
    baro: bool,
    light: bool,
    uv: bool,
    voc: bool,
    imu: bool,
}

impl Default for SimBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBoard {
    pub fn new() -> Self {
        Self {
            baro: true,
            light: true,
            uv: true,
            voc: true,
            imu: true,
        }
    }

    /// Model a board whose barometer never came up.
    pub fn without_barometer(mut self) -> Self {
        self.baro = false;
        self
    }

    /// Model a board whose 9-axis chip never came up.
    pub fn without_imu(mut self) -> Self {
        self.imu = false;
        self
    }

    pub fn build(self) -> BoardHub {
        let mut builder = BoardHub::builder();
        if self.baro {
            builder = builder.barometer(Box::new(SimBarometer));
        }
        if self.light {
            builder = builder.light(Box::new(SimLight));
        }
        if self.uv {
            builder = builder.uv(Box::new(SimUv));
        }
        if self.voc {
            builder = builder.voc(Box::new(SimVoc));
        }
        if self.imu {
            builder = builder.imu(Box::new(SimImu));
        }
        builder.build()
    }
}
