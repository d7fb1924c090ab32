/*!
    The per-picture filter contract.
*/

use ffmpeg_types::{Result, VideoFrame};

/**
    A per-picture video transform.

    Filters may keep internal state between calls (a temporal deinterlacer
    looks at neighbouring pictures) and may run work on other threads, but
    `execute` must not return until every output picture for the given
    input is complete.
*/
pub trait VideoFilter: Send {
    /**
        Transform one picture.

        Returns the resulting pictures in presentation order. The result
        may be empty (the filter is still priming) or hold several
        pictures (one per field when bobbing).
    */
    fn execute(&mut self, frame: VideoFrame) -> Result<Vec<VideoFrame>>;

    /**
        Short name used in logs.
    */
    fn name(&self) -> &str;
}

/**
    Identity filter, returns every picture unchanged.
*/
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough;

impl VideoFilter for Passthrough {
    fn execute(&mut self, frame: VideoFrame) -> Result<Vec<VideoFrame>> {
        Ok(vec![frame])
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}
