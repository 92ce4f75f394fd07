//! [`BoardHub`] – aggregates the board's chips into one snapshot.
//!
//! The hub owns at most one driver per capability.  Reading degrades per
//! field: a chip that fails (or was never fitted) nulls only the fields it
//! feeds, and the failure is logged at `WARN` with the chip's name.  The
//! snapshot itself always comes back – partial hardware failure is data, not
//! an error.

use sensorlink_types::{EnvironmentReadings, MotionReadings, SensorSnapshot};
use tracing::warn;

use crate::environment::{Barometer, LightSensor, UvSensor, VocSensor};
use crate::motion::Imu;
use crate::SensorError;

// ────────────────────────────────────────────────────────────────────────────
// SensorHub trait
// ────────────────────────────────────────────────────────────────────────────

/// The server's only view of the sensor board.
pub trait SensorHub: Send {
    /// Produce one aggregated snapshot.
    ///
    /// Per-chip failures are contained inside the snapshot as `None` fields.
    ///
    /// # Errors
    ///
    /// `Err` is reserved for faults that invalidate the whole read, such as
    /// the shared bus dropping out.
    fn snapshot(&mut self) -> Result<SensorSnapshot, SensorError>;
}

// ────────────────────────────────────────────────────────────────────────────
// BoardHub
// ────────────────────────────────────────────────────────────────────────────

/// Owns one optional driver per board capability.
///
/// Build with [`BoardHub::builder`], attaching whichever drivers came up
/// during board initialisation.  Capabilities that are absent simply report
/// `null` fields forever.
#[derive(Default)]
pub struct BoardHub {
    baro: Option<Box<dyn Barometer>>,
    light: Option<Box<dyn LightSensor>>,
    uv: Option<Box<dyn UvSensor>>,
    voc: Option<Box<dyn VocSensor>>,
    imu: Option<Box<dyn Imu>>,
}

impl BoardHub {
    /// Start a hub with no drivers attached.
    pub fn builder() -> BoardHubBuilder {
        BoardHubBuilder(Self::default())
    }

    /// `true` if at least one driver is attached.
    pub fn has_any_sensor(&self) -> bool {
        self.baro.is_some()
            || self.light.is_some()
            || self.uv.is_some()
            || self.voc.is_some()
            || self.imu.is_some()
    }

    fn read_environment(&mut self) -> EnvironmentReadings {
        let mut env = EnvironmentReadings::default();

        if let Some(baro) = self.baro.as_mut() {
            match baro.read() {
                Ok(sample) => {
                    env.temperature = Some(sample.temperature);
                    env.humidity = Some(sample.humidity);
                    env.pressure = Some(sample.pressure);
                }
                Err(e) => warn!(sensor = "barometer", error = %e, "sensor read failed"),
            }
        }
        if let Some(light) = self.light.as_mut() {
            match light.read_lux() {
                Ok(lux) => env.light = Some(lux),
                Err(e) => warn!(sensor = "light", error = %e, "sensor read failed"),
            }
        }
        if let Some(uv) = self.uv.as_mut() {
            match uv.read_uv() {
                Ok(count) => env.uv = Some(count),
                Err(e) => warn!(sensor = "uv", error = %e, "sensor read failed"),
            }
        }
        if let Some(voc) = self.voc.as_mut() {
            match voc.read_voc() {
                Ok(index) => env.voc = Some(index),
                Err(e) => warn!(sensor = "voc", error = %e, "sensor read failed"),
            }
        }

        env
    }

    fn read_motion(&mut self) -> MotionReadings {
        let mut motion = MotionReadings::default();

        if let Some(imu) = self.imu.as_mut() {
            match imu.read() {
                Ok(sample) => {
                    motion.orientation = Some(sample.orientation);
                    motion.acceleration = Some(sample.acceleration);
                    motion.gyroscope = Some(sample.gyroscope);
                    motion.magnetic = Some(sample.magnetic);
                }
                Err(e) => warn!(sensor = "imu", error = %e, "sensor read failed"),
            }
        }

        motion
    }
}

impl SensorHub for BoardHub {
    fn snapshot(&mut self) -> Result<SensorSnapshot, SensorError> {
        Ok(SensorSnapshot {
            environment: self.read_environment(),
            motion: self.read_motion(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Builder
// ────────────────────────────────────────────────────────────────────────────

/// Builder returned by [`BoardHub::builder`].  Attach whichever drivers the
/// board probe found, then call [`build`][Self::build].
pub struct BoardHubBuilder(BoardHub);

impl BoardHubBuilder {
    pub fn barometer(mut self, driver: Box<dyn Barometer>) -> Self {
        self.0.baro = Some(driver);
        self
    }

    pub fn light(mut self, driver: Box<dyn LightSensor>) -> Self {
        self.0.light = Some(driver);
        self
    }

    pub fn uv(mut self, driver: Box<dyn UvSensor>) -> Self {
        self.0.uv = Some(driver);
        self
    }

    pub fn voc(mut self, driver: Box<dyn VocSensor>) -> Self {
        self.0.voc = Some(driver);
        self
    }

    pub fn imu(mut self, driver: Box<dyn Imu>) -> Self {
        self.0.imu = Some(driver);
        self
    }

    pub fn build(self) -> BoardHub {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::BaroSample;

    struct GoodBaro;
    impl Barometer for GoodBaro {
        fn read(&mut self) -> Result<BaroSample, SensorError> {
            Ok(BaroSample {
                temperature: 22.5,
                humidity: 45.0,
                pressure: 1008.0,
            })
        }
    }

    struct DeadLight;
    impl LightSensor for DeadLight {
        fn read_lux(&mut self) -> Result<f64, SensorError> {
            Err(SensorError::Read {
                sensor: "tsl2591",
                details: "bus nack".to_string(),
            })
        }
    }

    #[test]
    fn empty_hub_reports_all_null() {
        let mut hub = BoardHub::builder().build();
        assert!(!hub.has_any_sensor());
        let snap = hub.snapshot().unwrap();
        assert_eq!(snap, SensorSnapshot::empty());
    }

    #[test]
    fn dead_chip_nulls_only_its_own_fields() {
        let mut hub = BoardHub::builder()
            .barometer(Box::new(GoodBaro))
            .light(Box::new(DeadLight))
            .build();
        let snap = hub.snapshot().unwrap();
        assert_eq!(snap.environment.temperature, Some(22.5));
        assert_eq!(snap.environment.pressure, Some(1008.0));
        assert_eq!(snap.environment.light, None);
        // Chips that were never attached stay null too.
        assert_eq!(snap.environment.uv, None);
        assert_eq!(snap.motion.orientation, None);
    }

    #[test]
    fn has_any_sensor_sees_single_driver() {
        let hub = BoardHub::builder().barometer(Box::new(GoodBaro)).build();
        assert!(hub.has_any_sensor());
    }
}
