//! 9-axis motion-chip capability trait.

use sensorlink_types::{Orientation, Vector3};

use crate::SensorError;

/// One full 9-axis read: fused attitude plus the three raw axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSample {
    /// Roll/pitch/yaw in degrees.
    pub orientation: Orientation,
    pub acceleration: Vector3,
    pub gyroscope: Vector3,
    pub magnetic: Vector3,
}

/// A 9-axis inertial measurement unit.
///
/// The board autodetects which of its supported chips is fitted at
/// initialisation time; from here on the server only sees this trait.
pub trait Imu: Send {
    /// Take one full sample.  All four groups come from a single chip read,
    /// so they succeed or fail together.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::Read`] if the chip cannot be read this cycle.
    fn read(&mut self) -> Result<ImuSample, SensorError>;
}
