/*!
    Plane walking helpers shared by the transforms.
*/

use ffmpeg_types::{Error, PlaneLayout, Result, VideoFrame};

/**
    Returns each plane of the frame with its byte offset into `data`.
*/
pub(crate) fn planes_with_offsets(frame: &VideoFrame) -> Vec<(usize, PlaneLayout)> {
    let mut offset = 0;
    frame
        .format
        .planes(frame.width, frame.height)
        .into_iter()
        .map(|plane| {
            let start = offset;
            offset += plane.size();
            (start, plane)
        })
        .collect()
}

/**
    Fails unless the data buffer matches the frame's format and size.
*/
pub(crate) fn ensure_valid_size(frame: &VideoFrame) -> Result<()> {
    if frame.has_valid_size() {
        return Ok(());
    }
    Err(Error::invalid_data(format!(
        "{}x{} {:?} frame has {} bytes, expected {}",
        frame.width,
        frame.height,
        frame.format,
        frame.data.len(),
        frame.format.buffer_size(frame.width, frame.height)
    )))
}
