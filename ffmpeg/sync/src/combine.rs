/*!
    Combiners.

    Each combiner takes pictures and samples from the oldest segment pair
    and appends finished frames to the output queue. A combiner that finds
    less data than it needs leaves the buffers untouched and reports no
    progress.
*/

use std::collections::VecDeque;

use ffmpeg_transform::{can_interlace, interlace};
use ffmpeg_types::{Result, ScanMode};

use crate::frame::MuxedFrame;
use crate::segment::SyncBuffers;

/**
    Outcome of one combining step.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Combined {
    /// Frames appended to the output queue.
    pub(crate) emitted: usize,
    /// Pictures consumed without being shown.
    pub(crate) discarded: usize,
}

impl SyncBuffers {
    /**
        One picture, one frame of audio.
    */
    pub(crate) fn simple(&mut self, output: &mut VecDeque<MuxedFrame>) -> Option<Combined> {
        let (picture, samples) = self.pop_pair()?;
        output.push_back(MuxedFrame::new(picture, samples));

        Some(Combined {
            emitted: 1,
            discarded: 0,
        })
    }

    /**
        One picture shown twice, with two consecutive frames of audio.

        The copy goes out first, carrying the earlier audio.
    */
    pub(crate) fn duplicate(&mut self, output: &mut VecDeque<MuxedFrame>) -> Option<Combined> {
        if self.audio.oldest().available() < self.samples_per_frame * 2 {
            return None;
        }

        let (picture, first_samples) = self.pop_pair()?;
        let copy = picture.clone();
        let second_samples = self.audio.oldest_mut().take(self.samples_per_frame)?;

        output.push_back(MuxedFrame::new(copy, first_samples));
        output.push_back(MuxedFrame::new(picture, second_samples));

        Some(Combined {
            emitted: 2,
            discarded: 0,
        })
    }

    /**
        Two pictures, the second one is dropped.
    */
    pub(crate) fn half(&mut self, output: &mut VecDeque<MuxedFrame>) -> Option<Combined> {
        if self.video.oldest().len() < 2 {
            return None;
        }

        let (picture, samples) = self.pop_pair()?;
        self.video.oldest_mut().pop();
        output.push_back(MuxedFrame::new(picture, samples));

        Some(Combined {
            emitted: 1,
            discarded: 1,
        })
    }

    /**
        Two pictures woven into the fields of one frame.

        Pictures that cannot be woven, such as a source changing size
        between the two, fall back to the half rule: the first picture is
        shown and the second dropped.
    */
    pub(crate) fn interlace(
        &mut self,
        field_order: ScanMode,
        output: &mut VecDeque<MuxedFrame>,
    ) -> Result<Option<Combined>> {
        let Some((first, second)) = self.video.oldest().front_pair() else {
            return Ok(None);
        };

        if !can_interlace(first, second) {
            tracing::warn!(
                first_width = first.width,
                first_height = first.height,
                second_width = second.width,
                second_height = second.height,
                "frame muxer: cannot weave pictures, dropping second field"
            );
            return Ok(self.half(output));
        }

        let Some((first, samples)) = self.pop_pair() else {
            return Ok(None);
        };
        let Some(second) = self.video.oldest_mut().pop() else {
            return Ok(None);
        };

        let woven = interlace(first, second, field_order)?;
        output.push_back(MuxedFrame::new(woven, samples));

        Ok(Some(Combined {
            emitted: 1,
            discarded: 0,
        }))
    }
}
