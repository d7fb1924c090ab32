/*!
    Segment buffers.

    Each medium is buffered as a queue of segments, one segment per
    uninterrupted run of input between reset markers. The oldest video
    segment and the oldest audio segment always describe the same span of
    source time, which is what lets the muxer drop a half-finished pair at
    a loop point without shifting sync for everything after it.
*/

use std::collections::VecDeque;
use std::mem;

use ffmpeg_types::VideoFrame;

/**
    Pictures of one video segment, oldest first.
*/
#[derive(Debug, Default)]
pub(crate) struct VideoSegment {
    pictures: VecDeque<VideoFrame>,
}

impl VideoSegment {
    pub(crate) fn push(&mut self, picture: VideoFrame) {
        self.pictures.push_back(picture);
    }

    pub(crate) fn pop(&mut self) -> Option<VideoFrame> {
        self.pictures.pop_front()
    }

    /// The two oldest pictures, if there are two.
    pub(crate) fn front_pair(&self) -> Option<(&VideoFrame, &VideoFrame)> {
        Some((self.pictures.front()?, self.pictures.get(1)?))
    }

    pub(crate) fn len(&self) -> usize {
        self.pictures.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pictures.is_empty()
    }
}

/**
    Samples of one audio segment.

    Samples are appended at the tail and consumed from a read cursor; the
    consumed prefix is compacted away once it makes up half the buffer.
*/
#[derive(Debug, Default)]
pub(crate) struct AudioSegment {
    samples: Vec<i16>,
    cursor: usize,
}

impl AudioSegment {
    pub(crate) fn append(&mut self, samples: &[i16]) {
        if self.cursor > 0 && self.cursor * 2 >= self.samples.len() {
            self.samples.drain(..self.cursor);
            self.cursor = 0;
        }
        self.samples.extend_from_slice(samples);
    }

    /**
        Remove and return the next `count` samples, or nothing if fewer
        are buffered.
    */
    pub(crate) fn take(&mut self, count: usize) -> Option<Vec<i16>> {
        let end = self.cursor + count;
        let block = self.samples.get(self.cursor..end)?.to_vec();
        self.cursor = end;
        Some(block)
    }

    /// Samples buffered and not yet consumed.
    pub(crate) fn available(&self) -> usize {
        self.samples.len() - self.cursor
    }
}

/**
    Ordered segments of one medium.

    The newest segment is the one being filled; every older segment has
    been closed by a reset marker and can only shrink.
*/
#[derive(Debug, Default)]
pub(crate) struct SegmentQueue<S> {
    closed: VecDeque<S>,
    current: S,
    admitted: usize,
}

impl<S: Default> SegmentQueue<S> {
    pub(crate) fn new() -> Self {
        Self {
            closed: VecDeque::new(),
            current: S::default(),
            admitted: 0,
        }
    }

    /// Number of segments, including the one being filled.
    pub(crate) fn depth(&self) -> usize {
        self.closed.len() + 1
    }

    pub(crate) fn oldest(&self) -> &S {
        self.closed.front().unwrap_or(&self.current)
    }

    pub(crate) fn oldest_mut(&mut self) -> &mut S {
        match self.closed.front_mut() {
            Some(segment) => segment,
            None => &mut self.current,
        }
    }

    pub(crate) fn current(&self) -> &S {
        &self.current
    }

    pub(crate) fn current_mut(&mut self) -> &mut S {
        &mut self.current
    }

    /**
        Count input admitted into the current segment.
    */
    pub(crate) fn record_admitted(&mut self, amount: usize) {
        self.admitted += amount;
    }

    /**
        Close the current segment and open an empty one.

        Returns how much input the closed segment received.
    */
    pub(crate) fn close_current(&mut self) -> usize {
        let segment = mem::take(&mut self.current);
        self.closed.push_back(segment);
        mem::take(&mut self.admitted)
    }

    /**
        Discard the oldest segment.
    */
    pub(crate) fn drop_oldest(&mut self) -> S {
        match self.closed.pop_front() {
            Some(segment) => segment,
            None => {
                self.admitted = 0;
                mem::take(&mut self.current)
            }
        }
    }
}

/**
    Data discarded when a segment pair was dropped.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Truncation {
    pub(crate) pictures: usize,
    pub(crate) samples: usize,
}

impl Truncation {
    /// True when the dropped pair still held data on either side.
    pub(crate) fn lost_data(&self) -> bool {
        self.pictures > 0 || self.samples > 0
    }
}

/**
    Paired video and audio segment queues.
*/
#[derive(Debug)]
pub(crate) struct SyncBuffers {
    pub(crate) video: SegmentQueue<VideoSegment>,
    pub(crate) audio: SegmentQueue<AudioSegment>,
    pub(crate) samples_per_frame: usize,
}

impl SyncBuffers {
    pub(crate) fn new(samples_per_frame: usize) -> Self {
        Self {
            video: SegmentQueue::new(),
            audio: SegmentQueue::new(),
            samples_per_frame,
        }
    }

    /**
        Drop the oldest segment pair if it can never produce another frame.

        Only applies once both sides have moved on to a newer segment, so
        neither oldest segment can still grow. A segment is exhausted when
        it holds fewer than `pictures` pictures or fewer than `frames`
        frames' worth of samples; an empty segment always is.
    */
    pub(crate) fn truncate_exhausted(&mut self, pictures: usize, frames: usize) -> Option<Truncation> {
        if self.video.depth() < 2 || self.audio.depth() < 2 {
            return None;
        }

        let video_left = self.video.oldest().len();
        let audio_left = self.audio.oldest().available();
        let video_exhausted = video_left == 0 || video_left < pictures;
        let audio_exhausted = audio_left == 0 || audio_left < frames * self.samples_per_frame;

        if !video_exhausted && !audio_exhausted {
            return None;
        }

        self.video.drop_oldest();
        self.audio.drop_oldest();

        Some(Truncation {
            pictures: video_left,
            samples: audio_left,
        })
    }

    /**
        True when the oldest pair holds at least one picture and one
        frame's worth of samples.
    */
    pub(crate) fn has_frame_worth(&self) -> bool {
        !self.video.oldest().is_empty()
            && self.audio.oldest().available() >= self.samples_per_frame
    }

    /**
        Pop one picture and one frame's worth of samples from the oldest
        pair, or nothing unless both are available.
    */
    pub(crate) fn pop_pair(&mut self) -> Option<(VideoFrame, Vec<i16>)> {
        if !self.has_frame_worth() {
            return None;
        }
        let picture = self.video.oldest_mut().pop()?;
        let samples = self.audio.oldest_mut().take(self.samples_per_frame)?;
        Some((picture, samples))
    }

    pub(crate) fn video_ready(&self) -> bool {
        self.video.current().len() > 1 && self.video.depth() >= self.audio.depth()
    }

    pub(crate) fn audio_ready(&self) -> bool {
        self.audio.current().available() / self.samples_per_frame > 1
            && self.audio.depth() >= self.video.depth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picture() -> VideoFrame {
        VideoFrame::placeholder()
    }

    #[test]
    fn audio_segment_cursor() {
        let mut segment = AudioSegment::default();
        segment.append(&[1, 2, 3, 4, 5]);

        assert_eq!(segment.take(2), Some(vec![1, 2]));
        assert_eq!(segment.available(), 3);
        assert_eq!(segment.take(4), None);
        assert_eq!(segment.take(3), Some(vec![3, 4, 5]));
        assert_eq!(segment.available(), 0);
    }

    #[test]
    fn audio_segment_compacts_consumed_prefix() {
        let mut segment = AudioSegment::default();
        segment.append(&[1, 2, 3, 4]);
        segment.take(3);
        segment.append(&[5, 6]);

        assert_eq!(segment.cursor, 0);
        assert_eq!(segment.samples, vec![4, 5, 6]);
        assert_eq!(segment.take(3), Some(vec![4, 5, 6]));
    }

    #[test]
    fn queue_starts_with_one_open_segment() {
        let queue = SegmentQueue::<VideoSegment>::new();
        assert_eq!(queue.depth(), 1);
        assert!(queue.oldest().is_empty());
    }

    #[test]
    fn close_current_resets_admitted_count() {
        let mut queue = SegmentQueue::<VideoSegment>::new();
        queue.current_mut().push(picture());
        queue.record_admitted(1);
        queue.current_mut().push(picture());
        queue.record_admitted(1);

        assert_eq!(queue.close_current(), 2);
        assert_eq!(queue.depth(), 2);
        assert_eq!(queue.oldest().len(), 2);
        assert!(queue.current().is_empty());
        assert_eq!(queue.close_current(), 0);
    }

    #[test]
    fn drop_oldest_keeps_order() {
        let mut queue = SegmentQueue::<AudioSegment>::new();
        queue.current_mut().append(&[1]);
        queue.close_current();
        queue.current_mut().append(&[2, 2]);

        assert_eq!(queue.drop_oldest().available(), 1);
        assert_eq!(queue.depth(), 1);
        assert_eq!(queue.oldest().available(), 2);
    }

    #[test]
    fn no_truncation_while_either_side_is_open() {
        let mut buffers = SyncBuffers::new(4);
        buffers.video.close_current();
        assert_eq!(buffers.truncate_exhausted(1, 1), None);
        assert_eq!(buffers.video.depth(), 2);
    }

    #[test]
    fn truncates_empty_pair_silently() {
        let mut buffers = SyncBuffers::new(4);
        buffers.video.close_current();
        buffers.audio.close_current();

        let truncation = buffers.truncate_exhausted(1, 1).unwrap();
        assert!(!truncation.lost_data());
        assert_eq!(buffers.video.depth(), 1);
        assert_eq!(buffers.audio.depth(), 1);
    }

    #[test]
    fn truncates_partial_audio_with_leftover_picture() {
        let mut buffers = SyncBuffers::new(4);
        buffers.video.current_mut().push(picture());
        buffers.video.close_current();
        buffers.audio.current_mut().append(&[1, 2]);
        buffers.audio.close_current();

        let truncation = buffers.truncate_exhausted(1, 1).unwrap();
        assert_eq!(
            truncation,
            Truncation {
                pictures: 1,
                samples: 2
            }
        );
        assert!(truncation.lost_data());
    }

    #[test]
    fn keeps_pair_that_can_still_produce() {
        let mut buffers = SyncBuffers::new(4);
        buffers.video.current_mut().push(picture());
        buffers.video.close_current();
        buffers.audio.current_mut().append(&[0; 4]);
        buffers.audio.close_current();

        assert_eq!(buffers.truncate_exhausted(1, 1), None);
        // The same pair cannot feed a combiner needing two pictures
        assert!(buffers.truncate_exhausted(2, 1).is_some());
    }

    #[test]
    fn pop_pair_requires_both_sides() {
        let mut buffers = SyncBuffers::new(2);
        buffers.video.current_mut().push(picture());
        buffers.audio.current_mut().append(&[7]);
        assert!(buffers.pop_pair().is_none());
        assert_eq!(buffers.video.oldest().len(), 1);

        buffers.audio.current_mut().append(&[8]);
        let (_, samples) = buffers.pop_pair().unwrap();
        assert_eq!(samples, vec![7, 8]);
    }

    #[test]
    fn readiness_compares_depths() {
        let mut buffers = SyncBuffers::new(2);
        buffers.video.current_mut().push(picture());
        buffers.video.current_mut().push(picture());
        assert!(buffers.video_ready());

        buffers.audio.close_current();
        assert!(!buffers.video_ready());

        // One and a half frames is not yet more than one whole frame
        buffers.audio.current_mut().append(&[0; 3]);
        assert!(!buffers.audio_ready());
        buffers.audio.current_mut().append(&[0; 1]);
        assert!(buffers.audio_ready());
    }
}
