/*!
    Output frame type.
*/

use ffmpeg_types::VideoFrame;

/**
    One output frame: a picture and the audio played during it.

    `audio` always holds exactly the target format's samples-per-frame
    count of interleaved samples.
*/
#[derive(Clone, Debug)]
pub struct MuxedFrame {
    /// The picture to display.
    pub video: VideoFrame,
    /// Interleaved samples for the duration of the frame.
    pub audio: Vec<i16>,
}

impl MuxedFrame {
    /**
        Pair a picture with its block of samples.
    */
    pub fn new(video: VideoFrame, audio: Vec<i16>) -> Self {
        Self { video, audio }
    }
}

static_assertions::assert_impl_all!(MuxedFrame: Send, Sync);
