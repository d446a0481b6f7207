use std::io::Write;
use std::path::{Path, PathBuf};

use gobees_vision::{Blob, FrameReport};
use itertools::Itertools;
use serde::Serialize;
use serde_json::json;

use super::OutputFormat;

#[derive(Debug, Clone, Serialize)]
pub struct FrameCount {
    pub frame: PathBuf,
    pub frame_index: u64,
    pub num_bees: usize,
    pub blobs: Vec<Blob>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CountSummary {
    pub frames: usize,
    pub max_bees: usize,
    pub mean_bees: f64,
}

/// The per-frame counts of a whole sequence.
#[derive(Debug, Clone, Default)]
pub struct CountOutput {
    counts: Vec<FrameCount>,
    skipped: Vec<PathBuf>,
}

impl CountOutput {
    pub fn push(&mut self, frame: &Path, report: FrameReport) {
        self.counts.push(FrameCount {
            frame: frame.to_path_buf(),
            frame_index: report.frame_index,
            num_bees: report.num_bees,
            blobs: report.blobs,
        });
    }

    pub fn push_skipped(&mut self, frame: &Path) {
        self.skipped.push(frame.to_path_buf());
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn summary(&self) -> CountSummary {
        let frames = self.counts.len();
        let max_bees = self.counts.iter().map(|c| c.num_bees).max().unwrap_or(0);
        let total_bees: usize = self.counts.iter().map(|c| c.num_bees).sum();

        let mean_bees = if frames == 0 {
            0.0
        } else {
            total_bees as f64 / frames as f64
        };

        CountSummary {
            frames,
            max_bees,
            mean_bees,
        }
    }

    pub fn write(&self, format: OutputFormat, w: &mut impl Write) -> std::io::Result<()> {
        match format {
            OutputFormat::Normal => self.write_normal(w),
            OutputFormat::Json => self.write_json(w),
        }
    }

    fn write_normal(&self, w: &mut impl Write) -> std::io::Result<()> {
        for count in &self.counts {
            let name = count
                .frame
                .file_name()
                .map_or_else(|| count.frame.to_string_lossy(), |name| name.to_string_lossy());
            writeln!(w, "{name}: {} bees", count.num_bees)?;
        }

        let CountSummary {
            frames,
            max_bees,
            mean_bees,
        } = self.summary();
        writeln!(w, "{frames} frames, max {max_bees} bees, mean {mean_bees:.2} bees")?;

        if !self.skipped.is_empty() {
            writeln!(
                w,
                "skipped {} unreadable frames: {}",
                self.skipped.len(),
                self.skipped.iter().map(|p| p.display()).join(", ")
            )?;
        }

        Ok(())
    }

    fn write_json(&self, w: &mut impl Write) -> std::io::Result<()> {
        let doc = json!({
            "frames": self.counts,
            "skipped": self.skipped,
            "summary": self.summary(),
        });

        serde_json::to_writer_pretty(&mut *w, &doc)?;
        writeln!(w)
    }
}
