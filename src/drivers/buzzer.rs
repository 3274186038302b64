// MotionWatch: Buzzer Driver
//
// GPIO-driven active buzzer used as a start/end indicator around a recording.

use std::thread;

use crate::config::SignalPattern;

/// A digital output line.
pub trait SignalPin {
    fn set_level(&mut self, high: bool) -> anyhow::Result<()>;
}

#[cfg(target_os = "espidf")]
impl<'d> SignalPin for esp_idf_hal::gpio::PinDriver<'d, esp_idf_hal::gpio::AnyOutputPin, esp_idf_hal::gpio::Output> {
    fn set_level(&mut self, high: bool) -> anyhow::Result<()> {
        if high {
            self.set_high()?;
        } else {
            self.set_low()?;
        }
        Ok(())
    }
}

pub struct Buzzer<P> {
    pin: P,
    level: bool,
}

impl<P: SignalPin> Buzzer<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, level: false }
    }

    /// Toggle the line `pattern.toggles` times, holding each level for
    /// `pattern.interval`, then leave it low. Blocks the calling thread.
    pub fn pulse(&mut self, pattern: SignalPattern) {
        for _ in 0..pattern.toggles {
            self.set(!self.level);
            thread::sleep(pattern.interval);
        }
        self.set(false);
    }

    fn set(&mut self, high: bool) {
        match self.pin.set_level(high) {
            Ok(()) => self.level = high,
            Err(e) => log::warn!("Buzzer pin write failed: {}", e),
        }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[derive(Default)]
    struct Trace(Vec<bool>);

    impl SignalPin for Trace {
        fn set_level(&mut self, high: bool) -> anyhow::Result<()> {
            self.0.push(high);
            Ok(())
        }
    }

    struct Stuck;

    impl SignalPin for Stuck {
        fn set_level(&mut self, _: bool) -> anyhow::Result<()> {
            anyhow::bail!("gpio busy")
        }
    }

    fn fast(toggles: u32) -> SignalPattern {
        SignalPattern {
            toggles,
            interval: Duration::ZERO,
        }
    }

    #[test]
    fn five_toggles_then_low() {
        let mut buzzer = Buzzer::new(Trace::default());
        buzzer.pulse(fast(5));
        assert_eq!(
            buzzer.into_inner().0,
            vec![true, false, true, false, true, false]
        );
    }

    #[test]
    fn zero_toggles_only_forces_low() {
        let mut buzzer = Buzzer::new(Trace::default());
        buzzer.pulse(fast(0));
        assert_eq!(buzzer.into_inner().0, vec![false]);
    }

    #[test]
    fn pin_failure_is_not_fatal() {
        let mut buzzer = Buzzer::new(Stuck);
        buzzer.pulse(fast(3));
    }
}
