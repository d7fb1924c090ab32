use std::f64::consts::TAU;

use ffmpeg_types::{AudioFrame, ChannelLayout, PixelFormat, Pts, Rational, ScanMode, VideoFrame};

/// Sample rate of the generated tone.
pub const SAMPLE_RATE: u32 = 48000;

const TONE_HZ: f64 = 1000.0;
const TONE_AMPLITUDE: f64 = 8192.0;
const BAR_WIDTH: u32 = 16;

/**
    Settings for one pass of the synthetic source.
*/
#[derive(Clone, Debug)]
pub struct SourceConfig {
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub scan_mode: ScanMode,
    /// Pictures per pass.
    pub frames: usize,
    /// Every Nth picture is reported as a decode gap, 0 for none.
    pub gap_interval: usize,
    /// Samples per channel missing from the end of the audio track.
    pub audio_shortfall: usize,
}

/**
    A moving-bar test pattern with a matching 1 kHz stereo tone.

    Produces one picture and one audio chunk per source frame, each
    available independently so the caller can interleave them as it likes.
    Interlaced patterns draw their second field half a frame later, so a
    deinterlacer has real motion to work with.
*/
pub struct SyntheticSource {
    config: SourceConfig,
    time_base: Rational,
    next_picture: usize,
    next_chunk: usize,
    samples_emitted: usize,
    samples_total: usize,
}

impl SyntheticSource {
    pub fn new(config: SourceConfig) -> Self {
        let rate = Rational::from_fps(config.fps).unwrap_or(Rational::new(1, 1));
        let samples_total = sample_position(config.frames, config.fps)
            .saturating_sub(config.audio_shortfall);

        Self {
            time_base: rate.invert(),
            next_picture: 0,
            next_chunk: 0,
            samples_emitted: 0,
            samples_total,
            config,
        }
    }

    /**
        Returns the next picture, `None` for a decode gap, or nothing once
        the pass is over.
    */
    pub fn next_video(&mut self) -> Option<Option<VideoFrame>> {
        if self.next_picture >= self.config.frames {
            return None;
        }
        let index = self.next_picture;
        self.next_picture += 1;

        let interval = self.config.gap_interval;
        if interval > 0 && index % interval == interval - 1 {
            return Some(None);
        }
        Some(Some(self.picture(index)))
    }

    /**
        Returns the audio chunk for the next source frame.
    */
    pub fn next_audio(&mut self) -> Option<AudioFrame> {
        if self.next_chunk >= self.config.frames || self.samples_emitted >= self.samples_total {
            return None;
        }
        let index = self.next_chunk;
        self.next_chunk += 1;

        let end = sample_position(index + 1, self.config.fps).min(self.samples_total);
        let start = self.samples_emitted;
        self.samples_emitted = end;

        let mut data = Vec::with_capacity((end - start) * 2);
        for n in start..end {
            let value = (TAU * TONE_HZ * n as f64 / SAMPLE_RATE as f64).sin() * TONE_AMPLITUDE;
            let sample = value.round() as i16;
            data.extend([sample, sample]);
        }

        Some(AudioFrame::new(
            data,
            SAMPLE_RATE,
            ChannelLayout::Stereo,
            Some(Pts(index as i64)),
            self.time_base,
        ))
    }

    pub fn is_exhausted(&self) -> bool {
        self.next_picture >= self.config.frames
            && (self.next_chunk >= self.config.frames || self.samples_emitted >= self.samples_total)
    }

    fn picture(&self, index: usize) -> VideoFrame {
        let SourceConfig {
            width,
            height,
            scan_mode,
            ..
        } = self.config;
        let format = PixelFormat::Yuv420p;
        let mut data = vec![128u8; format.buffer_size(width, height)];

        // Luma only; chroma stays neutral grey
        let width_px = width as usize;
        let luma = &mut data[..width_px * height as usize];
        let first_parity = scan_mode.first_field_parity();

        for (r, row) in luma.chunks_exact_mut(width_px).enumerate() {
            let time = match first_parity {
                Some(parity) if r % 2 != parity => index as f64 + 0.5,
                _ => index as f64,
            };
            let bar = bar_position(time, width);
            for (x, px) in row.iter_mut().enumerate() {
                let x = x as u32;
                *px = if x >= bar && x < bar + BAR_WIDTH { 235 } else { 16 };
            }
        }

        VideoFrame::new(
            data,
            width,
            height,
            format,
            scan_mode,
            Some(Pts(index as i64)),
            self.time_base,
        )
    }
}

/// Samples per channel from the start of the pass to the start of `frame`.
fn sample_position(frame: usize, fps: f64) -> usize {
    (frame as f64 * SAMPLE_RATE as f64 / fps).round() as usize
}

fn bar_position(time: f64, width: u32) -> u32 {
    let travel = width.saturating_sub(BAR_WIDTH).max(1);
    ((time * 8.0) as u32) % travel
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(frames: usize) -> SourceConfig {
        SourceConfig {
            fps: 25.0,
            width: 64,
            height: 8,
            scan_mode: ScanMode::Progressive,
            frames,
            gap_interval: 0,
            audio_shortfall: 0,
        }
    }

    #[test]
    fn audio_matches_frame_duration() {
        let mut source = SyntheticSource::new(config(3));
        let mut total = 0;
        while let Some(chunk) = source.next_audio() {
            assert_eq!(chunk.samples_per_channel(), 1920);
            total += chunk.total_samples();
        }
        assert_eq!(total, 3 * 1920 * 2);
    }

    #[test]
    fn fractional_rates_spread_samples() {
        let mut source = SyntheticSource::new(SourceConfig {
            fps: 30000.0 / 1001.0,
            ..config(5)
        });
        let mut per_channel = 0;
        while let Some(chunk) = source.next_audio() {
            let count = chunk.samples_per_channel();
            assert!(count == 1601 || count == 1602, "{count}");
            per_channel += count;
        }
        assert_eq!(per_channel, 8008);
    }

    #[test]
    fn gaps_replace_every_nth_picture() {
        let mut source = SyntheticSource::new(SourceConfig {
            gap_interval: 3,
            ..config(6)
        });
        let gaps: Vec<bool> = std::iter::from_fn(|| source.next_video())
            .map(|picture| picture.is_none())
            .collect();
        assert_eq!(gaps, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn shortfall_trims_the_last_chunks() {
        let mut source = SyntheticSource::new(SourceConfig {
            audio_shortfall: 2000,
            ..config(2)
        });
        let first = source.next_audio().unwrap();
        assert_eq!(first.samples_per_channel(), 1840);
        assert!(source.next_audio().is_none());
    }

    #[test]
    fn interlaced_fields_are_drawn_half_a_frame_apart() {
        let mut source = SyntheticSource::new(SourceConfig {
            scan_mode: ScanMode::UpperFieldFirst,
            ..config(1)
        });
        let picture = source.next_video().unwrap().unwrap();
        let even = &picture.data[..64];
        let odd = &picture.data[64..128];
        assert_ne!(even, odd);
        assert!(picture.has_valid_size());
    }

    #[test]
    fn exhausted_after_both_sides() {
        let mut source = SyntheticSource::new(config(1));
        assert!(source.next_video().is_some());
        assert!(!source.is_exhausted());
        assert!(source.next_audio().is_some());
        assert!(source.is_exhausted());
    }
}
