// MotionWatch: Sample Recorder
//
// Comma-space separated text records behind a fixed header row. A write
// failure ends the run; the sink is not crash consistent.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::RECORD_HEADER;
use crate::error::Error;
use crate::sample::Sample;

pub struct Recorder<W: Write> {
    sink: W,
    rows: u64,
}

impl<W: Write> Recorder<W> {
    /// Start a fresh sink: writes the header row.
    pub fn open(mut sink: W) -> Result<Self, Error> {
        writeln!(sink, "{RECORD_HEADER}").map_err(Error::SinkWriteFailure)?;
        Ok(Self { sink, rows: 0 })
    }

    /// Continue a sink that already carries the header.
    pub fn resume(sink: W) -> Self {
        Self { sink, rows: 0 }
    }

    pub fn append(&mut self, sample: &Sample) -> Result<(), Error> {
        writeln!(
            self.sink,
            "{}, {}, {}, {}, {}, {}, {}",
            sample.timestamp, sample.ax, sample.ay, sample.az, sample.gx, sample.gy, sample.gz
        )
        .map_err(Error::SinkWriteFailure)?;
        self.rows += 1;
        Ok(())
    }

    /// Data rows written through this recorder (header excluded).
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush and hand the sink back.
    pub fn close(mut self) -> Result<W, Error> {
        self.sink.flush().map_err(Error::SinkWriteFailure)?;
        Ok(self.sink)
    }
}

/// Open `path` for appending. A new or empty file gets the header; an
/// existing recording is continued under the header it already has.
pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Recorder<BufWriter<File>>, Error> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(Error::SinkWriteFailure)?;
    let existing = file.metadata().map_err(Error::SinkWriteFailure)?.len();
    let sink = BufWriter::new(file);

    if existing == 0 {
        log::info!("Recording to new file {}", path.display());
        Recorder::open(sink)
    } else {
        log::info!("Appending to {} ({} bytes)", path.display(), existing);
        Ok(Recorder::resume(sink))
    }
}
