/*!
    Decoded frame types.
*/

use std::time::Duration;

use crate::{ChannelLayout, PixelFormat, Rational, ScanMode};

/**
    Presentation timestamp in time base units.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pts(pub i64);

impl Pts {
    /**
        Convert this PTS to a Duration using the given time base.

        Negative PTS values are clamped to zero.
    */
    #[inline]
    pub fn to_duration(self, time_base: Rational) -> Duration {
        if self.0 <= 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.0 as f64 * time_base.to_f64())
    }
}

/**
    Placement adjustment applied when a picture is composited.

    The translation is expressed in normalized picture units, so a value
    of `0.5 / height` on the y axis moves the picture down by half a
    scanline.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTransform {
    /// Fill translation as (x, y).
    pub fill_translation: (f64, f64),
}

/**
    A decoded video picture.

    Pixel data is tightly packed, planes back to back, as described by
    [`PixelFormat::planes`]. A picture with no data is a placeholder
    standing in for a picture the decoder could not produce.
*/
#[derive(Clone, Debug)]
pub struct VideoFrame {
    /// Raw pixel data.
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format of the data.
    pub format: PixelFormat,
    /// Progressive or interlaced, and in which field order.
    pub scan_mode: ScanMode,
    /// Presentation timestamp (None for frames without timing).
    pub pts: Option<Pts>,
    /// Time base for interpreting the PTS.
    pub time_base: Rational,
    /// Compositing adjustment, e.g. field order correction.
    pub transform: FrameTransform,
}

impl VideoFrame {
    /**
        Create a new video frame.
    */
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        scan_mode: ScanMode,
        pts: Option<Pts>,
        time_base: Rational,
    ) -> Self {
        Self {
            data,
            width,
            height,
            format,
            scan_mode,
            pts,
            time_base,
            transform: FrameTransform::default(),
        }
    }

    /**
        Create an empty placeholder picture.
    */
    pub fn placeholder() -> Self {
        Self::new(
            Vec::new(),
            0,
            0,
            PixelFormat::Bgra,
            ScanMode::Progressive,
            None,
            Rational::new(1, 1),
        )
    }

    /**
        Returns true if this picture carries no pixel data.
    */
    pub fn is_placeholder(&self) -> bool {
        self.data.is_empty()
    }

    /**
        Returns the presentation time as a Duration, if PTS is set.
    */
    pub fn presentation_time(&self) -> Option<Duration> {
        self.pts.map(|pts| pts.to_duration(self.time_base))
    }

    /**
        Returns true if the data buffer matches the size implied by
        the format and dimensions.
    */
    pub fn has_valid_size(&self) -> bool {
        self.data.len() == self.format.buffer_size(self.width, self.height)
    }
}

/**
    A chunk of decoded audio.

    Samples are signed 16-bit and interleaved for multi-channel audio:
    for stereo, `[L0, R0, L1, R1, ...]`.
*/
#[derive(Clone, Debug)]
pub struct AudioFrame {
    /// Interleaved sample data.
    pub data: Vec<i16>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel layout.
    pub channels: ChannelLayout,
    /// Presentation timestamp (None for frames without timing).
    pub pts: Option<Pts>,
    /// Time base for interpreting the PTS.
    pub time_base: Rational,
}

impl AudioFrame {
    /**
        Create a new audio frame.
    */
    pub fn new(
        data: Vec<i16>,
        sample_rate: u32,
        channels: ChannelLayout,
        pts: Option<Pts>,
        time_base: Rational,
    ) -> Self {
        Self {
            data,
            sample_rate,
            channels,
            pts,
            time_base,
        }
    }

    /**
        Returns the total number of samples (samples per channel * channels).
    */
    pub fn total_samples(&self) -> usize {
        self.data.len()
    }

    /**
        Returns the number of samples per channel.
    */
    pub fn samples_per_channel(&self) -> usize {
        self.data.len() / self.channels.channels() as usize
    }
}

// Frames are handed between decoder and muxer threads
static_assertions::assert_impl_all!(VideoFrame: Send, Sync);
static_assertions::assert_impl_all!(AudioFrame: Send, Sync);
