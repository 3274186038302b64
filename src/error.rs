// MotionWatch: Error Taxonomy
//
// Every variant is fatal to the loop that raised it. Nothing in the pipeline
// retries except the bounded Wi-Fi association wait.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("sensor unavailable: {0}")]
    SensorUnavailable(#[source] BoxError),
    /// `cause` is set when the station refused to start associating.
    #[error("network unavailable after {attempts} association attempts")]
    NetworkUnavailable {
        attempts: u32,
        #[source]
        cause: Option<BoxError>,
    },
    #[error("failed to write to sample sink")]
    SinkWriteFailure(#[source] std::io::Error),
    #[error("listener failure")]
    Transport(#[source] std::io::Error),
}

impl Error {
    pub(crate) fn sensor(err: anyhow::Error) -> Self {
        Self::SensorUnavailable(err.into())
    }
}
