// MotionWatch: Hardware & System Configuration
// Target: ESP32-class board running ESP-IDF, LSM6DS3 six-axis IMU on I2C.

use std::time::Duration;

// ---------------------------------------------------------------------------
// GPIO Pin Definitions
// ---------------------------------------------------------------------------
pub const PIN_I2C_SDA: i32 = 16; // I2C data line
pub const PIN_I2C_SCL: i32 = 17; // I2C clock line
pub const PIN_BUZZER: i32 = 18; // Active buzzer, driven HIGH to sound

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_BUS_INDEX: u8 = 0;
pub const I2C_BAUDRATE_KHZ: u32 = 400;
pub const I2C_ADDR_LSM6DS3: u8 = 0x6A; // SA0 pulled low
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// LSM6DS3 Sampling Mode (104 Hz "normal" mode)
// ---------------------------------------------------------------------------
pub const LSM6DS3_CTRL1_XL_104HZ_4G: u8 = 0x48; // ODR 104 Hz, +-4 g
pub const LSM6DS3_CTRL2_G_104HZ_500DPS: u8 = 0x44; // ODR 104 Hz, +-500 dps
pub const ACCEL_SCALE_4G: f32 = 0.122e-3 * STANDARD_GRAVITY; // m/s^2 per LSB
pub const GYRO_SCALE_500: f32 = 17.5e-3; // deg/s per LSB
pub const STANDARD_GRAVITY: f32 = 9.806_65;

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------
pub const STORAGE_MOUNT_POINT: &str = "/spiffs";
pub const STORAGE_MAX_FILES: usize = 4;
pub const RECORD_FILE_NAME: &str = "data.csv";
pub const RECORD_HEADER: &str = "timestamp, ax, ay, az, gx, gy, gz";

// ---------------------------------------------------------------------------
// Bounded Run (timestamps are virtual milliseconds)
// ---------------------------------------------------------------------------
pub const RECORD_START_TIMESTAMP: u64 = 0;
pub const RECORD_TIMESTAMP_STEP: u64 = 10;
pub const RECORD_LONG_BOUND: u64 = 60_000; // one minute of samples
pub const RECORD_SHORT_BOUND: u64 = 5_000;
pub const RECORD_SAMPLE_INTERVAL_MS: u64 = 10;
pub const RECORD_SETTLE_MS: u64 = 3000; // time to strap the device on

// ---------------------------------------------------------------------------
// Buzzer start/end indicator
// ---------------------------------------------------------------------------
pub const SIGNAL_TOGGLES: u32 = 5;
pub const SIGNAL_TOGGLE_INTERVAL_MS: u64 = 100;

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------
pub const WIFI_SSID: &str = match option_env!("MOTIONWATCH_WIFI_SSID") {
    Some(ssid) => ssid,
    None => "",
};
pub const WIFI_PASSWORD: &str = match option_env!("MOTIONWATCH_WIFI_PASSWORD") {
    Some(password) => password,
    None => "",
};
pub const WIFI_CONNECT_ATTEMPTS: u32 = 10;
pub const WIFI_CONNECT_SPACING_MS: u64 = 1000;

// ---------------------------------------------------------------------------
// Export Server
// ---------------------------------------------------------------------------
pub const HTTP_PORT: u16 = 80;
pub const HOST_HTTP_ADDR: &str = "127.0.0.1:8080";
pub const REQUEST_BUFFER_SIZE: usize = 1024;
pub const ACCEPT_POLL_INTERVAL_MS: u64 = 20;
pub const REQUEST_TIMEOUT_MS: u64 = 2000; // per-connection read/write limit
pub const DATA_REQUEST_MARKER: &str = "GET /data";

/// On/off pulse emitted on the buzzer around a bounded run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalPattern {
    pub toggles: u32,
    pub interval: Duration,
}

impl Default for SignalPattern {
    fn default() -> Self {
        Self {
            toggles: SIGNAL_TOGGLES,
            interval: Duration::from_millis(SIGNAL_TOGGLE_INTERVAL_MS),
        }
    }
}

/// Parameters of one bounded recording run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordConfig {
    pub start: u64,
    pub step: u64,
    pub bound: u64,
    pub sample_interval: Duration,
    /// Delay before the opening pulse. Ignored when `signal` is `None`.
    pub settle: Duration,
    pub signal: Option<SignalPattern>,
}

impl RecordConfig {
    /// One minute of samples, announced on the buzzer.
    pub fn long_run() -> Self {
        Self {
            start: RECORD_START_TIMESTAMP,
            step: RECORD_TIMESTAMP_STEP,
            bound: RECORD_LONG_BOUND,
            sample_interval: Duration::from_millis(RECORD_SAMPLE_INTERVAL_MS),
            settle: Duration::from_millis(RECORD_SETTLE_MS),
            signal: Some(SignalPattern::default()),
        }
    }

    /// Five seconds of samples, silent.
    pub fn short_run() -> Self {
        Self {
            bound: RECORD_SHORT_BOUND,
            settle: Duration::ZERO,
            signal: None,
            ..Self::long_run()
        }
    }

    /// Number of samples the run will produce.
    pub fn expected_samples(&self) -> u64 {
        if self.step == 0 || self.bound <= self.start {
            return 0;
        }
        (self.bound - self.start).div_ceil(self.step)
    }
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self::long_run()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub request_buffer_size: usize,
    pub accept_poll_interval: Duration,
    /// Longest a client may stall a read or write before it is dropped.
    pub request_timeout: Duration,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            request_buffer_size: REQUEST_BUFFER_SIZE,
            accept_poll_interval: Duration::from_millis(ACCEPT_POLL_INTERVAL_MS),
            request_timeout: Duration::from_millis(REQUEST_TIMEOUT_MS),
        }
    }
}
