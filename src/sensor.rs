// MotionWatch: Sensor Source
//
// Wraps a six-axis reading capability. Every `read` is exactly one bus
// transaction; there is no buffering and no fallback value.

use crate::error::Error;
use crate::sample::{Axes, Sample};

/// A device that yields one six-axis reading per transaction.
pub trait MotionBus {
    /// One-time configuration (sampling mode / rate selector).
    fn configure(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn read_axes(&mut self) -> anyhow::Result<Axes>;
}

impl<B: MotionBus + ?Sized> MotionBus for &mut B {
    fn configure(&mut self) -> anyhow::Result<()> {
        (**self).configure()
    }

    fn read_axes(&mut self) -> anyhow::Result<Axes> {
        (**self).read_axes()
    }
}

pub struct SensorSource<B> {
    bus: B,
}

impl<B: MotionBus> SensorSource<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn init(&mut self) -> Result<(), Error> {
        self.bus.configure().map_err(Error::sensor)
    }

    /// Read one sample and stamp it with `timestamp`.
    pub fn read(&mut self, timestamp: u64) -> Result<Sample, Error> {
        let axes = self.bus.read_axes().map_err(Error::sensor)?;
        Ok(Sample::new(timestamp, axes))
    }

    pub fn into_inner(self) -> B {
        self.bus
    }
}
