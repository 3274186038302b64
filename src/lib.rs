//! MotionWatch: six-axis motion sampling, recording and export.
//!
//! The pipeline reads samples from a [`sensor::MotionBus`], records bounded
//! runs to a text sink, classifies each sample into a coarse activity and
//! serves the latest reading over a single-connection HTTP responder. Device
//! drivers are only compiled for ESP-IDF targets; everything else runs on a
//! host against the simulated IMU.

pub mod classifier;
pub mod config;
pub mod drivers;
pub mod error;
pub mod network;
pub mod recorder;
pub mod sample;
pub mod sensor;
pub mod server;
pub mod tasks;

pub use classifier::classify;
pub use error::Error;
pub use sample::{ActivityLabel, Axes, ExportPayload, Sample};
