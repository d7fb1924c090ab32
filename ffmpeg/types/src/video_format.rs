/*!
    Target display format descriptors.
*/

use std::fmt;
use std::str::FromStr;

use crate::{ChannelLayout, Error, Rational, ScanMode};

/// Sample rate shared by all preset formats.
const PRESET_SAMPLE_RATE: u32 = 48000;

/**
    Describes the display format frames are converted to.

    `frame_rate` counts whole frames, so an interlaced format such as
    1080i50 has a frame rate of 25 with two fields per frame.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct VideoFormatDesc {
    /// Preset name, e.g. "1080i5000".
    pub name: String,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Progressive or interlaced, and in which field order.
    pub scan_mode: ScanMode,
    /// Frames per second.
    pub frame_rate: Rational,
    /// Audio sample rate in Hz.
    pub audio_sample_rate: u32,
    /// Audio channel layout.
    pub audio_channels: ChannelLayout,
    /**
        Interleaved samples attached to every output frame.

        This is a fixed constant of the format: every frame leaving the
        muxer carries exactly this many samples.
    */
    pub audio_samples_per_frame: usize,
}

impl VideoFormatDesc {
    /**
        Create a format descriptor with 48 kHz stereo audio.

        Samples per frame are derived from the frame rate, rounded to the
        nearest whole sample per channel.
    */
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        scan_mode: ScanMode,
        frame_rate: Rational,
    ) -> Self {
        let channels = ChannelLayout::Stereo;
        let per_channel = (PRESET_SAMPLE_RATE as f64 / frame_rate.to_f64()).round() as usize;

        Self {
            name: name.into(),
            width,
            height,
            scan_mode,
            frame_rate,
            audio_sample_rate: PRESET_SAMPLE_RATE,
            audio_channels: channels,
            audio_samples_per_frame: per_channel * channels.channels() as usize,
        }
    }

    /**
        Override the number of interleaved samples per output frame.
    */
    pub fn with_samples_per_frame(mut self, samples: usize) -> Self {
        self.audio_samples_per_frame = samples;
        self
    }

    /**
        Look up a preset by name (case-insensitive).
    */
    pub fn preset(name: &str) -> Option<Self> {
        use ScanMode::{LowerFieldFirst as Lower, Progressive as P, UpperFieldFirst as Upper};

        let (canonical, width, height, scan, num, den) = match name.to_ascii_lowercase().as_str()
        {
            "pal" => ("PAL", 720, 576, Upper, 25, 1),
            "ntsc" => ("NTSC", 720, 486, Lower, 30000, 1001),
            "576p2500" => ("576p2500", 720, 576, P, 25, 1),
            "720p2500" => ("720p2500", 1280, 720, P, 25, 1),
            "720p5000" => ("720p5000", 1280, 720, P, 50, 1),
            "720p5994" => ("720p5994", 1280, 720, P, 60000, 1001),
            "720p6000" => ("720p6000", 1280, 720, P, 60, 1),
            "1080i5000" => ("1080i5000", 1920, 1080, Upper, 25, 1),
            "1080i5994" => ("1080i5994", 1920, 1080, Upper, 30000, 1001),
            "1080i6000" => ("1080i6000", 1920, 1080, Upper, 30, 1),
            "1080p2398" => ("1080p2398", 1920, 1080, P, 24000, 1001),
            "1080p2400" => ("1080p2400", 1920, 1080, P, 24, 1),
            "1080p2500" => ("1080p2500", 1920, 1080, P, 25, 1),
            "1080p2997" => ("1080p2997", 1920, 1080, P, 30000, 1001),
            "1080p3000" => ("1080p3000", 1920, 1080, P, 30, 1),
            "1080p5000" => ("1080p5000", 1920, 1080, P, 50, 1),
            "1080p5994" => ("1080p5994", 1920, 1080, P, 60000, 1001),
            "1080p6000" => ("1080p6000", 1920, 1080, P, 60, 1),
            _ => return None,
        };

        Some(Self::new(
            canonical,
            width,
            height,
            scan,
            Rational::new(num, den),
        ))
    }

    /**
        Returns the frame rate as frames per second.
    */
    pub fn fps(&self) -> f64 {
        self.frame_rate.to_f64()
    }

    /**
        Returns the time base matching one frame of this format.
    */
    pub fn time_base(&self) -> Rational {
        self.frame_rate.invert()
    }
}

impl fmt::Display for VideoFormatDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}x{} {} @ {})",
            self.name, self.width, self.height, self.scan_mode, self.frame_rate
        )
    }
}

impl FromStr for VideoFormatDesc {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::preset(s)
            .ok_or_else(|| Error::unsupported_format(format!("unknown video format: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pal_preset() {
        let pal = VideoFormatDesc::preset("pal").unwrap();
        assert_eq!(pal.name, "PAL");
        assert_eq!((pal.width, pal.height), (720, 576));
        assert_eq!(pal.scan_mode, ScanMode::UpperFieldFirst);
        assert_eq!(pal.fps(), 25.0);
        assert_eq!(pal.audio_samples_per_frame, 1920 * 2);
    }

    #[test]
    fn ntsc_is_lower_field_first() {
        let ntsc: VideoFormatDesc = "NTSC".parse().unwrap();
        assert_eq!(ntsc.scan_mode, ScanMode::LowerFieldFirst);
        // 48000 / 29.97 = 1601.6, rounded per channel
        assert_eq!(ntsc.audio_samples_per_frame, 1602 * 2);
    }

    #[test]
    fn progressive_rates() {
        let f = VideoFormatDesc::preset("720p5000").unwrap();
        assert_eq!(f.scan_mode, ScanMode::Progressive);
        assert_eq!(f.audio_samples_per_frame, 960 * 2);
        assert_eq!(f.time_base(), Rational::new(1, 50));
    }

    #[test]
    fn interlaced_rate_counts_frames() {
        let f = VideoFormatDesc::preset("1080i5000").unwrap();
        assert_eq!(f.fps(), 25.0);
        assert!(f.scan_mode.is_interlaced());
    }

    #[test]
    fn unknown_preset() {
        assert!(VideoFormatDesc::preset("4k120").is_none());
        assert!("4k120".parse::<VideoFormatDesc>().is_err());
    }

    #[test]
    fn samples_per_frame_override() {
        let f = VideoFormatDesc::preset("PAL")
            .unwrap()
            .with_samples_per_frame(8);
        assert_eq!(f.audio_samples_per_frame, 8);
    }

    #[test]
    fn display() {
        let f = VideoFormatDesc::preset("1080i5000").unwrap();
        assert_eq!(
            format!("{f}"),
            "1080i5000 (1920x1080 upper-field-first @ 25/1)"
        );
    }
}
