use std::fmt;
use std::time::Duration;

use ffmpeg_sync::{FrameMuxer, MuxedFrame, MuxerStats, ScanMode};

/**
    Consumes muxed frames and tallies what came out.
*/
#[derive(Debug, Default)]
pub struct Report {
    pub frames: u64,
    pub placeholders: u64,
    pub interlaced: u64,
    pub shifted: u64,
    pub samples: u64,
    /// Frames whose audio block did not match the format's samples per frame.
    pub misaligned: u64,
    /// Source presentation time of the latest picture shown.
    pub last_presentation: Option<Duration>,
}

impl Report {
    /**
        Pop every finished frame from the muxer.
    */
    pub fn drain(&mut self, muxer: &mut FrameMuxer) {
        let expected = muxer.format().audio_samples_per_frame;
        while let Some(frame) = muxer.pop() {
            self.record(&frame, expected);
        }
    }

    fn record(&mut self, frame: &MuxedFrame, expected_samples: usize) {
        self.frames += 1;
        self.samples += frame.audio.len() as u64;

        if frame.audio.len() != expected_samples {
            self.misaligned += 1;
            tracing::error!(
                frame = self.frames,
                samples = frame.audio.len(),
                expected = expected_samples,
                "audio block does not match frame"
            );
        }
        if frame.video.is_placeholder() {
            self.placeholders += 1;
        } else if let Some(time) = frame.video.presentation_time() {
            self.last_presentation = Some(time);
        }
        if frame.video.scan_mode != ScanMode::Progressive {
            self.interlaced += 1;
        }
        if frame.video.transform.fill_translation != (0.0, 0.0) {
            self.shifted += 1;
        }
    }
}

/**
    Final summary printed once the run is over.
*/
pub struct Summary<'a> {
    pub muxer: &'a FrameMuxer,
    pub report: &'a Report,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = self.muxer.format();
        let stats: &MuxerStats = self.muxer.stats();
        let policy = self
            .muxer
            .policy()
            .map_or_else(|| "undecided".to_string(), |p| p.to_string());
        let seconds = self.report.frames as f64 / format.fps();

        writeln!(f, "Target:     {format}")?;
        writeln!(f, "Source:     {} fps", self.muxer.source_rate())?;
        writeln!(f, "Cadence:    {policy}")?;
        writeln!(
            f,
            "Output:     {} frames ({seconds:.2}s), {} placeholders, {} interlaced, {} field-shifted",
            self.report.frames, self.report.placeholders, self.report.interlaced, self.report.shifted
        )?;
        writeln!(
            f,
            "Admitted:   {} pictures, {} placeholders, {} samples",
            stats.pictures_queued, stats.placeholders_queued, stats.samples_admitted
        )?;
        writeln!(f, "Discarded:  {} pictures", stats.pictures_discarded)?;
        if let Some(time) = self.report.last_presentation {
            writeln!(f, "Last shown: {:.3}s of source", time.as_secs_f64())?;
        }
        writeln!(
            f,
            "Truncated:  {} times, {} pictures, {} samples",
            stats.truncations, stats.truncated_pictures, stats.truncated_samples
        )?;
        write!(f, "Misaligned: {}", self.report.misaligned)
    }
}
