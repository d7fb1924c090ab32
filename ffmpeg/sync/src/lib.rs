/*!
    Audio/video frame muxing for playout.

    Decoders produce pictures and audio independently, at the source's own
    rate and scan mode. This crate pairs them back up into frames of a
    target display format, each carrying exactly one frame's worth of
    samples, and converts the picture cadence on the way:

    - Same rate: one picture per frame, deinterlacing if the target is
      progressive
    - Source at twice the target rate: drop every second picture, or weave
      pairs of pictures into interlaced frames
    - Target at twice the source rate: show every picture twice, or bob
      every field of an interlaced source into its own frame

    Interlaced content going to an interlaced format of another size is
    bobbed and woven back so the fields survive scaling.

    # Segments

    Input is split into segments at every flush, typically where the
    source loops. Pictures and samples only ever pair up within the same
    segment; whatever is left over once both sides have moved on is
    dropped, so a short audio track never shifts sync for the next pass.

    # Usage

    ```ignore
    use ffmpeg_sync::{FrameMuxer, MuxerConfig, VideoFormatDesc, VideoInput};

    let format = VideoFormatDesc::preset("720p5000").unwrap();
    let mut muxer = FrameMuxer::new(25.0, format, MuxerConfig::auto())?;

    muxer.push_video(picture)?;
    muxer.push_audio(samples)?;

    // A decode gap keeps its slot
    muxer.push_video(VideoInput::Gap)?;

    while let Some(frame) = muxer.pop() {
        assert_eq!(frame.audio.len(), muxer.format().audio_samples_per_frame);
    }
    ```

    # Cadence Detection

    [`resolve`] and [`resolve_for_picture`] expose the decision table on
    its own, for callers that want to check a source against a format
    before decoding anything.
*/

pub use ffmpeg_transform::{DeinterlaceMode, Deinterlacer, Passthrough, VideoFilter};
#[cfg(feature = "yadif")]
pub use ffmpeg_transform::Yadif;
pub use ffmpeg_types::{
    AudioFrame, ChannelLayout, Error, Result, ScanMode, VideoFormatDesc, VideoFrame,
};

mod cadence;
mod combine;
mod config;
mod frame;
mod muxer;
mod segment;

pub use cadence::{CadencePolicy, FPS_TOLERANCE, resolve, resolve_for_picture};
pub use config::MuxerConfig;
pub use frame::MuxedFrame;
pub use muxer::{AudioInput, FilterFactory, FrameMuxer, MuxerStats, VideoInput};
