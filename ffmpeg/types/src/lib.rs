/*!
    Shared types for the ffmpeg sync crates.

    This crate defines the vocabulary that crosses crate boundaries: decoded
    pictures and sample chunks going into the frame muxer, the target display
    format they are converted to, and the common error type. It has no
    dependency on FFmpeg itself.

    # Frames

    - [`VideoFrame`] - A decoded picture with its [`ScanMode`] and geometry
    - [`AudioFrame`] - A chunk of interleaved signed 16-bit samples
    - [`FrameTransform`] - Fill translation applied when the picture is composited

    # Formats

    - [`PixelFormat`] and [`PlaneLayout`] - Pixel layouts and their planes
    - [`ScanMode`] - Progressive or interlaced (upper/lower field first)
    - [`ChannelLayout`] - Audio channel layouts
    - [`VideoFormatDesc`] - Target display format, with a table of presets

    # Timing

    - [`Rational`] - Frame rates and time bases
    - [`Pts`] - Presentation timestamps in time base units

    # Error Handling

    - [`Error`] and [`Result`] - Common error types
*/

mod error;
mod format;
mod frame;
mod rational;
mod video_format;

pub use error::{Error, Result};
pub use format::{ChannelLayout, PixelFormat, PlaneLayout, ScanMode};
pub use frame::{AudioFrame, FrameTransform, Pts, VideoFrame};
pub use rational::Rational;
pub use video_format::VideoFormatDesc;
