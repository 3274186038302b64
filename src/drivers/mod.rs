pub mod buzzer;
pub mod sim;

#[cfg(target_os = "espidf")]
pub mod imu;
#[cfg(target_os = "espidf")]
pub mod storage;
#[cfg(target_os = "espidf")]
pub mod wifi;
