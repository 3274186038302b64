// MotionWatch: Simulated Hardware
//
// Deterministic stand-ins for the IMU and the buzzer so the pipeline runs on
// a development host.

use std::f32::consts::TAU;

use crate::config::STANDARD_GRAVITY;
use crate::drivers::buzzer::SignalPin;
use crate::sample::Axes;
use crate::sensor::MotionBus;

/// Reads per motion phase (about 2 s at 104 Hz).
const PHASE_LEN: u32 = 208;

/// Synthetic wearer that cycles standing -> walking -> running -> falling.
#[derive(Debug, Default)]
pub struct SimulatedImu {
    tick: u32,
}

impl SimulatedImu {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MotionBus for SimulatedImu {
    fn configure(&mut self) -> anyhow::Result<()> {
        log::info!("Simulated IMU ready");
        Ok(())
    }

    fn read_axes(&mut self) -> anyhow::Result<Axes> {
        let phase = (self.tick / PHASE_LEN) % 4;
        let t = (self.tick % PHASE_LEN) as f32 / PHASE_LEN as f32;
        self.tick = self.tick.wrapping_add(1);

        let wave = (t * TAU * 4.0).sin();
        let g = STANDARD_GRAVITY;
        let axes = match phase {
            0 => Axes::new(0.2 * wave, 0.1, g, 0.5 * wave, 0.0, 0.0),
            1 => Axes::new(6.0 + 1.5 * wave, 0.8 * wave, g, 20.0 * wave, 5.0, -3.0),
            2 => Axes::new(12.0 + 3.0 * wave, 2.0 * wave, g + 2.0 * wave, 80.0 * wave, 25.0, -12.0),
            _ => Axes::new(1.0 * wave, 0.5, 0.5 * wave, 150.0, -90.0 * wave, 40.0),
        };
        Ok(axes)
    }
}

/// Buzzer line that only logs its level.
#[derive(Debug, Default)]
pub struct LoggedPin;

impl SignalPin for LoggedPin {
    fn set_level(&mut self, high: bool) -> anyhow::Result<()> {
        log::debug!("buzzer {}", if high { "on" } else { "off" });
        Ok(())
    }
}
