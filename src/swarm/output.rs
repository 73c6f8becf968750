//! Row-oriented text output: one `x y phase` record per entity.
//!
//! Phases are written wrapped into `[0, 2π)`.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use log::debug;

use crate::models::SwarmState;
use crate::utils::{wrap_phase, SwarmError};

/// Writes numbered frames `fr.0`, `fr.1`, ... into a directory.
///
/// Each frame starts with a `# Time: <t>` line followed by one
/// space-separated `x y phase` row per entity.
#[derive(Debug)]
pub struct FrameWriter {
    dir: PathBuf,
    next_frame: usize,
}

impl FrameWriter {
    /// Creates the output directory if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, SwarmError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, next_frame: 0 })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> usize {
        self.next_frame
    }

    /// Writes the next frame and returns its path.
    pub fn write_frame(&mut self, t: f64, state: &[f64]) -> Result<PathBuf, SwarmError> {
        let path = self.dir.join(format!("fr.{}", self.next_frame));
        let mut file = File::create(&path)?;
        writeln!(file, "# Time: {}", t)?;
        write_rows(file, state, b' ')?;
        self.next_frame += 1;
        debug!("wrote frame {} at t = {}", path.display(), t);
        Ok(path)
    }
}

/// Writes one comma-separated `x,y,phase` row per entity to `path`.
pub fn write_points<P: AsRef<Path>>(path: P, state: &[f64]) -> Result<(), SwarmError> {
    let file = File::create(path.as_ref())?;
    write_rows(file, state, b',')
}

fn write_rows<W: Write>(sink: W, state: &[f64], delimiter: u8) -> Result<(), SwarmError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(sink);
    for p in SwarmState::new(state).points() {
        writer.write_record(&[p.x.to_string(), p.y.to_string(), wrap_phase(p.phase).to_string()])?;
    }
    writer.flush()?;
    Ok(())
}
