// MotionWatch: Sample & Activity Types

use serde::Serialize;

// ---------------------------------------------------------------------------
// Raw six-axis reading, as produced by a `MotionBus`
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Axes {
    pub ax: f32,
    pub ay: f32,
    pub az: f32,
    pub gx: f32,
    pub gy: f32,
    pub gz: f32,
}

impl Axes {
    pub const fn new(ax: f32, ay: f32, az: f32, gx: f32, gy: f32, gz: f32) -> Self {
        Self { ax, ay, az, gx, gy, gz }
    }
}

// ---------------------------------------------------------------------------
// Timestamped sample (acceleration in m/s^2, angular rate in deg/s)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    /// Milliseconds, application-defined origin.
    pub timestamp: u64,
    pub ax: f32,
    pub ay: f32,
    pub az: f32,
    pub gx: f32,
    pub gy: f32,
    pub gz: f32,
}

impl Sample {
    pub fn new(timestamp: u64, axes: Axes) -> Self {
        Self {
            timestamp,
            ax: axes.ax,
            ay: axes.ay,
            az: axes.az,
            gx: axes.gx,
            gy: axes.gy,
            gz: axes.gz,
        }
    }

    pub fn axes(&self) -> Axes {
        Axes::new(self.ax, self.ay, self.az, self.gx, self.gy, self.gz)
    }
}

// ---------------------------------------------------------------------------
// Activity Classification
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLabel {
    Standing,
    Walking,
    Running,
    Falling,
    /// Nothing classified yet.
    #[default]
    Unknown,
}

impl ActivityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standing => "standing",
            Self::Walking => "walking",
            Self::Running => "running",
            Self::Falling => "falling",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ActivityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Export payload, built per `/data` request
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExportPayload {
    pub ax: f32,
    pub ay: f32,
    pub az: f32,
    pub gx: f32,
    pub gy: f32,
    pub gz: f32,
    pub activity: ActivityLabel,
}

impl ExportPayload {
    pub fn new(sample: &Sample, activity: ActivityLabel) -> Self {
        Self {
            ax: sample.ax,
            ay: sample.ay,
            az: sample.az,
            gx: sample.gx,
            gy: sample.gy,
            gz: sample.gz,
            activity,
        }
    }
}
