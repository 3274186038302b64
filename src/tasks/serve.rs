// MotionWatch: Export Serving Task
//
// Initialises the sensor and hands it to the export server until the
// shutdown token is raised or a fatal error occurs. The classifier decides
// the activity label attached to every `/data` response.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::classifier::Classifier;
use crate::config::ServeConfig;
use crate::error::Error;
use crate::sensor::{MotionBus, SensorSource};
use crate::server::{ExportServer, Listener};

pub fn serve_task<B, L>(
    mut source: SensorSource<B>,
    listener: L,
    classifier: Classifier,
    config: ServeConfig,
    shutdown: Arc<AtomicBool>,
) -> Result<u64, Error>
where
    B: MotionBus,
    L: Listener,
{
    source.init()?;
    log::info!("Classifying with {} rules", classifier.rules().len());
    let mut server = ExportServer::new(source, listener, config).with_classifier(classifier);
    server.run(&shutdown)?;
    Ok(server.served())
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::sync::atomic::Ordering;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::classifier::Rule;
    use crate::sample::{ActivityLabel, Axes};

    struct Unplugged;

    impl MotionBus for Unplugged {
        fn configure(&mut self) -> anyhow::Result<()> {
            anyhow::bail!("no ack from device")
        }

        fn read_axes(&mut self) -> anyhow::Result<Axes> {
            anyhow::bail!("no ack from device")
        }
    }

    struct Still;

    impl MotionBus for Still {
        fn read_axes(&mut self) -> anyhow::Result<Axes> {
            Ok(Axes::new(0.0, 0.0, 9.8, 0.0, 0.0, 0.0))
        }
    }

    #[test]
    fn init_failure_aborts_before_listening() {
        let listener = crate::server::bind("127.0.0.1:0").unwrap();
        let shutdown = Arc::new(AtomicBool::new(false));
        let err = serve_task(
            SensorSource::new(Unplugged),
            listener,
            Classifier::default(),
            ServeConfig::default(),
            shutdown,
        )
        .unwrap_err();
        assert!(matches!(err, Error::SensorUnavailable(_)));
    }

    #[test]
    fn stops_when_token_raised() {
        let listener = crate::server::bind("127.0.0.1:0").unwrap();
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            flag.store(true, Ordering::Relaxed);
        });

        let served = serve_task(
            SensorSource::new(Still),
            listener,
            Classifier::default(),
            ServeConfig::default(),
            shutdown,
        )
        .unwrap();
        stopper.join().unwrap();
        assert_eq!(served, 0);
    }

    #[test]
    fn supplied_classifier_labels_the_export() {
        let listener = crate::server::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);

        // Lying still would be "standing" under the default table.
        let classifier = Classifier::new(
            vec![Rule {
                name: "resting",
                label: ActivityLabel::Unknown,
                matches: |m| m.z > 9.0,
            }],
            ActivityLabel::Running,
        );

        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.write_all(b"GET /data HTTP/1.1\r\n\r\n").unwrap();
            let mut reply = String::new();
            stream.read_to_string(&mut reply).unwrap();
            flag.store(true, Ordering::Relaxed);
            reply
        });

        let served = serve_task(
            SensorSource::new(Still),
            listener,
            classifier,
            ServeConfig::default(),
            shutdown,
        )
        .unwrap();
        let reply = client.join().unwrap();

        assert_eq!(served, 1);
        assert!(reply.ends_with("\"activity\":\"unknown\"}"), "{reply}");
    }
}
