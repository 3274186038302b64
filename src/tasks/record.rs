// MotionWatch: Bounded Recording Run
//
// Reads one sample per tick, appends it to the sink and advances the virtual
// timestamp by a fixed step until the configured bound is reached. Optional
// buzzer pulses mark the start and the end of the run.

use std::io::Write;
use std::thread;

use crate::config::RecordConfig;
use crate::drivers::buzzer::{Buzzer, SignalPin};
use crate::error::Error;
use crate::recorder::Recorder;
use crate::sensor::{MotionBus, SensorSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub samples: u64,
    /// Timestamp the run stopped at: the first one not recorded, or the
    /// last recorded one when the next step would overflow.
    pub final_timestamp: u64,
}

/// Run one bounded recording. A sensor or sink failure ends the run and is
/// returned as-is; the end pulse is only sounded after a clean close.
pub fn record_task<B, W, P>(
    source: &mut SensorSource<B>,
    mut recorder: Recorder<W>,
    buzzer: &mut Buzzer<P>,
    cfg: &RecordConfig,
) -> Result<(RunReport, W), Error>
where
    B: MotionBus,
    W: Write,
    P: SignalPin,
{
    log::info!(
        "Recording {} samples ({}..{} step {})",
        cfg.expected_samples(),
        cfg.start,
        cfg.bound,
        cfg.step
    );

    if let Some(pattern) = cfg.signal {
        thread::sleep(cfg.settle);
        buzzer.pulse(pattern);
    }

    let mut timestamp = cfg.start;
    if cfg.step > 0 {
        while timestamp < cfg.bound {
            let s = source.read(timestamp)?;
            recorder.append(&s)?;
            log::debug!(
                "{}, {}, {}, {}, {}, {}, {}",
                s.timestamp, s.ax, s.ay, s.az, s.gx, s.gy, s.gz
            );

            match timestamp.checked_add(cfg.step) {
                Some(next) => timestamp = next,
                None => break,
            }
            thread::sleep(cfg.sample_interval);
        }
    }

    let report = RunReport {
        samples: recorder.rows(),
        final_timestamp: timestamp,
    };
    let sink = recorder.close()?;
    log::info!("Recording finished: {} samples", report.samples);

    if let Some(pattern) = cfg.signal {
        buzzer.pulse(pattern);
    }

    Ok((report, sink))
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::time::Duration;

    use super::*;
    use crate::config::SignalPattern;
    use crate::sample::Axes;

    struct Counter {
        reads: u64,
        fail_at: Option<u64>,
    }

    impl MotionBus for Counter {
        fn read_axes(&mut self) -> anyhow::Result<Axes> {
            if self.fail_at == Some(self.reads) {
                anyhow::bail!("bus lost");
            }
            self.reads += 1;
            Ok(Axes::new(self.reads as f32, 0.0, 9.8, 0.0, 0.0, 0.0))
        }
    }

    #[derive(Default)]
    struct Trace(Vec<bool>);

    impl SignalPin for Trace {
        fn set_level(&mut self, high: bool) -> anyhow::Result<()> {
            self.0.push(high);
            Ok(())
        }
    }

    fn instant(mut cfg: RecordConfig) -> RecordConfig {
        cfg.sample_interval = Duration::ZERO;
        cfg.settle = Duration::ZERO;
        if let Some(signal) = cfg.signal.as_mut() {
            signal.interval = Duration::ZERO;
        }
        cfg
    }

    fn run(cfg: &RecordConfig, fail_at: Option<u64>) -> (Result<(RunReport, Vec<u8>), Error>, u64, Vec<bool>) {
        let mut source = SensorSource::new(Counter { reads: 0, fail_at });
        let mut buzzer = Buzzer::new(Trace::default());
        let recorder = Recorder::open(Vec::new()).unwrap();
        let result = record_task(&mut source, recorder, &mut buzzer, cfg);
        (result, source.into_inner().reads, buzzer.into_inner().0)
    }

    #[test]
    fn long_run_writes_bound_over_step_samples() {
        let cfg = instant(RecordConfig::long_run());
        let (result, reads, _) = run(&cfg, None);
        let (report, sink) = result.unwrap();

        assert_eq!(report.samples, 6000);
        assert_eq!(reads, 6000);
        assert_eq!(report.final_timestamp, 60_000);

        let text = String::from_utf8(sink).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 6001);
        assert!(rows[1].starts_with("0, 1, "));
        assert!(rows[6000].starts_with("59990, 6000, "));
    }

    #[test]
    fn timestamps_step_without_gaps() {
        let cfg = instant(RecordConfig::short_run());
        let (result, _, _) = run(&cfg, None);
        let (report, sink) = result.unwrap();
        assert_eq!(report.samples, 500);

        let text = String::from_utf8(sink).unwrap();
        let stamps: Vec<u64> = text
            .lines()
            .skip(1)
            .map(|l| l.split(", ").next().unwrap().parse().unwrap())
            .collect();
        assert!(stamps.windows(2).all(|w| w[1] == w[0] + 10));
        assert_eq!(stamps.first(), Some(&0));
        assert_eq!(stamps.last(), Some(&4990));
    }

    #[test]
    fn pulses_before_and_after() {
        let cfg = instant(RecordConfig {
            bound: 30,
            ..RecordConfig::long_run()
        });
        let (result, _, levels) = run(&cfg, None);
        assert_eq!(result.unwrap().0.samples, 3);

        let one = [true, false, true, false, true, false];
        assert_eq!(levels, [one, one].concat());
    }

    #[test]
    fn silent_run_leaves_buzzer_alone() {
        let cfg = instant(RecordConfig {
            bound: 20,
            ..RecordConfig::short_run()
        });
        let (_, _, levels) = run(&cfg, None);
        assert!(levels.is_empty());
    }

    #[test]
    fn sensor_failure_stops_the_run() {
        let cfg = instant(RecordConfig {
            signal: Some(SignalPattern {
                toggles: 1,
                interval: Duration::ZERO,
            }),
            ..RecordConfig::short_run()
        });
        let (result, reads, levels) = run(&cfg, Some(7));

        assert!(matches!(result, Err(Error::SensorUnavailable(_))));
        assert_eq!(reads, 7);
        // Start pulse only.
        assert_eq!(levels, vec![true, false]);
    }

    /// Accepts the header and `rows` data rows, then fails every write.
    struct FullAfter {
        rows: usize,
        buf: Vec<u8>,
    }

    impl Write for FullAfter {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            let lines = self.buf.iter().filter(|&&b| b == b'\n').count();
            if lines > self.rows {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left"));
            }
            self.buf.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_failure_stops_the_run() {
        let cfg = instant(RecordConfig {
            signal: Some(SignalPattern {
                toggles: 1,
                interval: Duration::ZERO,
            }),
            ..RecordConfig::short_run()
        });
        let mut source = SensorSource::new(Counter { reads: 0, fail_at: None });
        let mut buzzer = Buzzer::new(Trace::default());
        let recorder = Recorder::open(FullAfter { rows: 4, buf: Vec::new() }).unwrap();

        let result = record_task(&mut source, recorder, &mut buzzer, &cfg);

        assert!(matches!(result, Err(Error::SinkWriteFailure(_))));
        // Four rows land, the fifth read is the one whose append fails.
        assert_eq!(source.into_inner().reads, 5);
        assert_eq!(buzzer.into_inner().0, vec![true, false]);
    }

    #[test]
    fn step_past_u64_max_ends_the_run() {
        let cfg = instant(RecordConfig {
            start: u64::MAX - 15,
            bound: u64::MAX,
            ..RecordConfig::short_run()
        });
        let (result, reads, _) = run(&cfg, None);
        let (report, sink) = result.unwrap();

        assert_eq!(report.samples, 2);
        assert_eq!(reads, 2);
        assert_eq!(report.samples, cfg.expected_samples());
        assert_eq!(report.final_timestamp, u64::MAX - 5);

        let text = String::from_utf8(sink).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn bound_at_start_records_nothing() {
        let cfg = instant(RecordConfig {
            start: 100,
            bound: 100,
            ..RecordConfig::short_run()
        });
        let (result, reads, _) = run(&cfg, None);
        let (report, sink) = result.unwrap();
        assert_eq!(report.samples, 0);
        assert_eq!(reads, 0);
        assert_eq!(String::from_utf8(sink).unwrap().lines().count(), 1);
    }
}
