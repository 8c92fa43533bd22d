use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::prelude::*;
use crate::segment::{segments, Debouncer, Segment};

/// Extract signing segments from per-frame classifier scores.
#[derive(Debug, Parser)]
pub(crate) struct Segments {
    /// Run verbosely. Print additional progress information to the
    /// standard error stream. This option conflicts with the
    /// `--quiet` option.
    #[arg(short, long, conflicts_with = "quiet")]
    pub(crate) verbose: bool,

    /// Operate quietly; do not show progress. This option conflicts
    /// with the `--verbose` option.
    #[arg(short, long, conflicts_with = "verbose")]
    pub(crate) quiet: bool,

    /// The frame rate of the video.
    #[arg(long)]
    fps: f64,

    /// Time (in seconds) a changed prediction has to persist before
    /// it's accepted. By default the value of `segments.tolerance` is
    /// used.
    #[arg(long, value_name = "seconds")]
    tolerance: Option<f64>,

    /// Scores above the threshold are positive predictions. By
    /// default the value of `segments.threshold` is used.
    #[arg(long)]
    threshold: Option<f64>,

    /// Treat the stream as signing before the first frame.
    #[arg(long)]
    start_value: bool,

    /// The name of the video written into the annotation. By default
    /// the file stem of the input is used.
    #[arg(long, value_name = "name")]
    video: Option<String>,

    /// Write the annotation into `filename`. By default output will be
    /// written in JSON format to the standard output (`stdout`).
    #[arg(short, long, value_name = "filename")]
    output: Option<PathBuf>,

    /// The per-frame scores (CSV with the columns `frame` and
    /// `score`).
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct Score {
    frame: u64,
    score: f64,
}

#[derive(Debug, Serialize)]
struct Span {
    start_frame: u64,
    end_frame: u64,
    start: u64,
    end: u64,
}

#[derive(Debug, Serialize)]
struct Annotation {
    filename: String,
    fps: f64,
    tolerance: f64,
    segments: Vec<Span>,
}

/// Reads the scores and converts them into binary predictions. Frames
/// must be strictly ascending.
fn read_predictions<R: Read>(
    rdr: R,
    threshold: f64,
) -> SignprepResult<Vec<(u64, bool)>> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut predictions: Vec<(u64, bool)> = vec![];

    for result in reader.deserialize() {
        let row: Score = result?;
        if let Some((last, _)) = predictions.last() {
            if row.frame <= *last {
                bail!(
                    "frames must be in ascending order (frame {} after {})",
                    row.frame,
                    last
                );
            }
        }

        predictions.push((row.frame, row.score > threshold));
    }

    Ok(predictions)
}

fn spans(segments: &[Segment], fps: f64) -> Vec<Span> {
    segments
        .iter()
        .map(|segment| {
            let (start, end) = segment.seconds(fps);
            Span {
                start_frame: segment.start_frame,
                end_frame: segment.end_frame,
                start,
                end,
            }
        })
        .collect()
}

impl Segments {
    pub(crate) fn execute(self, config: &Config) -> SignprepResult<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            bail!("fps must be positive (got {})", self.fps);
        }

        let tolerance = self.tolerance.unwrap_or(config.segments.tolerance);
        let threshold = self.threshold.unwrap_or(config.segments.threshold);
        let start_value = self.start_value || config.segments.start_value;

        if !tolerance.is_finite() || tolerance < 0.0 {
            bail!("tolerance must not be negative (got {tolerance})");
        }

        let predictions =
            read_predictions(File::open(&self.path)?, threshold)?;
        let debouncer =
            Debouncer::with_seconds(tolerance, self.fps, start_value);
        let segments = segments(predictions.iter().copied(), debouncer);

        log::info!(
            "found {} segment(s) in {} frame(s)",
            segments.len(),
            predictions.len()
        );

        let filename = match self.video {
            Some(name) => name,
            None => self
                .path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_default(),
        };

        let annotation = Annotation {
            filename,
            fps: self.fps,
            tolerance,
            segments: spans(&segments, self.fps),
        };

        let mut wtr: Box<dyn Write> = match self.output {
            Some(path) => Box::new(File::create(path)?),
            None => Box::new(io::stdout().lock()),
        };

        serde_json::to_writer_pretty(&mut wtr, &annotation)?;
        writeln!(wtr)?;
        wtr.flush()?;
        Ok(())
    }
}
