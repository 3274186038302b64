// MotionWatch: Firmware Entry Point
//
// Default build: one bounded recording run to on-board storage, announced on
// the buzzer before and after.
// `http-export` build: join Wi-Fi and serve live readings over HTTP.
//
// On a development host the same flow runs against a simulated IMU, writing
// `data.csv` to the working directory or serving on 127.0.0.1:8080.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use motionwatch::classifier::Classifier;
use motionwatch::config::*;
use motionwatch::sensor::{MotionBus, SensorSource};
use motionwatch::tasks::serve::serve_task;

// ---------------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;
    use motionwatch::drivers::imu::Lsm6ds3;

    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("MotionWatch firmware starting…");

    let peripherals = Peripherals::take()?;

    // ---- I2C bus (LSM6DS3) ------------------------------------------------
    // HAL peripherals are typed per pin, so the wiring below must match the
    // constants in config.rs.
    log::info!(
        "IMU on I2C{} (SDA GPIO{}, SCL GPIO{}) at {} kHz",
        I2C_BUS_INDEX,
        PIN_I2C_SDA,
        PIN_I2C_SCL,
        I2C_BAUDRATE_KHZ
    );
    let i2c_config = I2cConfig::new().baudrate(I2C_BAUDRATE_KHZ.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0, // I2C_BUS_INDEX
        peripherals.pins.gpio16, // PIN_I2C_SDA
        peripherals.pins.gpio17, // PIN_I2C_SCL
        &i2c_config,
    )?;
    let source = SensorSource::new(Lsm6ds3::new(i2c));

    #[cfg(not(feature = "http-export"))]
    let result = device::record(source, peripherals.pins.gpio18); // PIN_BUZZER
    #[cfg(feature = "http-export")]
    let result = device::export(source, peripherals.modem);

    fatal_on_error(result)
}

#[cfg(target_os = "espidf")]
mod device {
    use std::time::Duration;

    use esp_idf_hal::gpio::{OutputPin, PinDriver};
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use motionwatch::drivers::buzzer::Buzzer;
    use motionwatch::drivers::{storage, wifi::WifiStation};
    use motionwatch::network;
    use motionwatch::recorder;
    use motionwatch::server;
    use motionwatch::tasks::record::record_task;

    use super::*;

    #[allow(dead_code)]
    pub fn record<B: MotionBus>(
        mut source: SensorSource<B>,
        buzzer_pin: impl OutputPin,
    ) -> anyhow::Result<()> {
        storage::mount_spiffs()?;
        source.init()?;

        log::info!("Buzzer on GPIO{}", PIN_BUZZER);
        let mut buzzer = Buzzer::new(PinDriver::output(buzzer_pin.downgrade_output())?);
        let recorder = recorder::open_file(storage::record_path())?;
        let (report, _) = record_task(&mut source, recorder, &mut buzzer, &RecordConfig::long_run())?;
        log::info!(
            "Run complete: {} samples, stopped at t={}",
            report.samples,
            report.final_timestamp
        );
        Ok(())
    }

    #[allow(dead_code)]
    pub fn export<B: MotionBus>(
        source: SensorSource<B>,
        modem: esp_idf_hal::modem::Modem,
    ) -> anyhow::Result<()> {
        let sys_loop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;

        // Kept alive for as long as the server runs.
        let mut wifi = WifiStation::new(modem, sys_loop, Some(nvs), WIFI_SSID, WIFI_PASSWORD)?;
        network::associate(
            &mut wifi,
            WIFI_CONNECT_ATTEMPTS,
            Duration::from_millis(WIFI_CONNECT_SPACING_MS),
        )?;

        let listener = server::bind(("0.0.0.0", HTTP_PORT))?;
        log::info!("Listening on port {}", HTTP_PORT);
        let shutdown = Arc::new(AtomicBool::new(false));
        serve_task(source, listener, Classifier::default(), ServeConfig::default(), shutdown)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Host (simulated IMU)
// ---------------------------------------------------------------------------
#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    use motionwatch::drivers::sim::SimulatedImu;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("MotionWatch simulator starting…");

    let source = SensorSource::new(SimulatedImu::new());

    #[cfg(not(feature = "http-export"))]
    let result = host::record(source);
    #[cfg(feature = "http-export")]
    let result = host::export(source);

    fatal_on_error(result)
}

#[cfg(not(target_os = "espidf"))]
mod host {
    use motionwatch::drivers::buzzer::Buzzer;
    use motionwatch::drivers::sim::LoggedPin;
    use motionwatch::recorder;
    use motionwatch::server;
    use motionwatch::tasks::record::record_task;

    use super::*;

    #[allow(dead_code)]
    pub fn record<B: MotionBus>(mut source: SensorSource<B>) -> anyhow::Result<()> {
        source.init()?;
        let mut buzzer = Buzzer::new(LoggedPin);
        let recorder = recorder::open_file(RECORD_FILE_NAME)?;
        let (report, _) = record_task(&mut source, recorder, &mut buzzer, &RecordConfig::short_run())?;
        log::info!("Wrote {} samples to {}", report.samples, RECORD_FILE_NAME);
        Ok(())
    }

    #[allow(dead_code)]
    pub fn export<B: MotionBus>(source: SensorSource<B>) -> anyhow::Result<()> {
        let listener = server::bind(HOST_HTTP_ADDR)?;
        log::info!("Listening on http://{}", HOST_HTTP_ADDR);
        let shutdown = Arc::new(AtomicBool::new(false));
        serve_task(source, listener, Classifier::default(), ServeConfig::default(), shutdown)?;
        Ok(())
    }
}

/// Log a fatal error before handing it back to the runtime.
fn fatal_on_error(result: anyhow::Result<()>) -> anyhow::Result<()> {
    if let Err(e) = &result {
        log::error!("Fatal: {:#}", e);
    }
    result
}
