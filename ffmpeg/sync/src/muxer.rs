/*!
    The frame muxer.
*/

use std::collections::VecDeque;
use std::fmt;

use ffmpeg_transform::{DeinterlaceMode, Deinterlacer, Passthrough, VideoFilter};
use ffmpeg_types::{AudioFrame, Error, Rational, Result, ScanMode, VideoFormatDesc, VideoFrame};

use crate::cadence::{CadencePolicy, resolve_for_picture};
use crate::combine::Combined;
use crate::config::MuxerConfig;
use crate::frame::MuxedFrame;
use crate::segment::SyncBuffers;

/**
    Builds the deinterlacer once the cadence policy asks for one.

    Receives the mode and the first real picture of the stream.
*/
pub type FilterFactory =
    Box<dyn FnMut(DeinterlaceMode, &VideoFrame) -> Result<Box<dyn VideoFilter>> + Send>;

/**
    Video input to the muxer.
*/
#[derive(Clone, Debug)]
pub enum VideoInput {
    /// A decoded picture.
    Frame(VideoFrame),
    /// A picture the decoder could not produce; a placeholder keeps its slot.
    Gap,
    /// Discontinuity, e.g. the source looped. Starts a new segment.
    Flush,
}

impl From<VideoFrame> for VideoInput {
    fn from(frame: VideoFrame) -> Self {
        Self::Frame(frame)
    }
}

/**
    Audio input to the muxer.
*/
#[derive(Clone, Debug)]
pub enum AudioInput {
    /// A chunk of decoded samples.
    Samples(AudioFrame),
    /// Discontinuity, e.g. the source looped. Starts a new segment.
    Flush,
}

impl From<AudioFrame> for AudioInput {
    fn from(frame: AudioFrame) -> Self {
        Self::Samples(frame)
    }
}

/**
    Running counters for a muxer.
*/
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MuxerStats {
    /// Pictures queued for combining, after deinterlacing.
    pub pictures_queued: u64,
    /// Placeholder pictures queued for decode gaps.
    pub placeholders_queued: u64,
    /// Interleaved samples admitted.
    pub samples_admitted: u64,
    /// Frames appended to the output queue.
    pub frames_emitted: u64,
    /// Pictures consumed but never shown (half rate).
    pub pictures_discarded: u64,
    /// Segment pairs dropped while still holding data.
    pub truncations: u64,
    /// Pictures lost to truncation.
    pub truncated_pictures: u64,
    /// Samples lost to truncation.
    pub truncated_samples: u64,
}

/**
    Pairs decoded pictures with audio and converts them to the cadence of a
    target display format.

    Pictures and samples are pushed independently and buffered per segment;
    a segment ends at every flush. Whenever enough of both is buffered the
    muxer combines them into [`MuxedFrame`]s according to its
    [`CadencePolicy`], which is decided once, from the first real picture.

    Everything happens synchronously inside the push calls. The producer
    uses [`video_ready`](Self::video_ready) and
    [`audio_ready`](Self::audio_ready) to decide which medium to decode
    next, and the consumer drains the output with [`pop`](Self::pop).

    ```ignore
    use ffmpeg_sync::{FrameMuxer, MuxerConfig, VideoFormatDesc};

    let format = VideoFormatDesc::preset("1080i5000").unwrap();
    let mut muxer = FrameMuxer::new(50.0, format, MuxerConfig::auto())?;

    loop {
        if !muxer.video_ready() {
            muxer.push_video(decode_video()?)?;
        }
        if !muxer.audio_ready() {
            muxer.push_audio(decode_audio()?)?;
        }
        while let Some(frame) = muxer.pop() {
            output(frame);
        }
    }
    ```
*/
pub struct FrameMuxer {
    source_fps: f64,
    source_rate: Rational,
    format: VideoFormatDesc,
    config: MuxerConfig,
    policy: Option<CadencePolicy>,
    source_scan: ScanMode,
    filter: Box<dyn VideoFilter>,
    filter_factory: FilterFactory,
    buffers: SyncBuffers,
    output: VecDeque<MuxedFrame>,
    stats: MuxerStats,
}

impl FrameMuxer {
    /**
        Create a muxer for a source running at `source_fps`.

        # Arguments

        * `source_fps` - Picture rate of the source
        * `format` - Target display format
        * `config` - Muxer configuration
    */
    pub fn new(source_fps: f64, format: VideoFormatDesc, config: MuxerConfig) -> Result<Self> {
        let Some(source_rate) = Rational::from_fps(source_fps) else {
            return Err(Error::invalid_data(format!(
                "unusable source frame rate {source_fps}"
            )));
        };
        if format.audio_samples_per_frame == 0 {
            return Err(Error::invalid_data(format!(
                "format {} has no audio samples per frame",
                format.name
            )));
        }

        Ok(Self {
            source_fps,
            source_rate,
            buffers: SyncBuffers::new(format.audio_samples_per_frame),
            format,
            config,
            policy: None,
            source_scan: ScanMode::Progressive,
            filter: Box::new(Passthrough),
            filter_factory: Box::new(default_filter),
            output: VecDeque::new(),
            stats: MuxerStats::default(),
        })
    }

    /**
        Replace the deinterlacer used when the cadence policy needs one.

        Must be set before the first picture is pushed.
    */
    pub fn with_filter_factory(
        mut self,
        factory: impl FnMut(DeinterlaceMode, &VideoFrame) -> Result<Box<dyn VideoFilter>>
        + Send
        + 'static,
    ) -> Self {
        self.filter_factory = Box::new(factory);
        self
    }

    /**
        Push video input.

        A real picture goes through the deinterlacer (if the policy uses
        one) and every resulting picture is queued. The first real picture
        decides the cadence policy.

        # Errors

        Fails if the cadence policy is [`CadencePolicy::Invalid`] once
        there is enough data to combine, or if a picture transform fails.
    */
    pub fn push_video(&mut self, input: impl Into<VideoInput>) -> Result<()> {
        match input.into() {
            VideoInput::Flush => {
                let pictures = self.buffers.video.close_current();
                tracing::debug!(pictures, "frame muxer: video segment closed");
                self.pump()
            }
            VideoInput::Gap => {
                self.queue_picture(VideoFrame::placeholder());
                self.stats.placeholders_queued += 1;
                self.pump()
            }
            VideoInput::Frame(frame) => {
                if self.policy.is_none() {
                    self.select_policy(&frame)?;
                }
                // Every output is queued even if a dispatch fails, so bobbed
                // fields stay paired
                let mut result = Ok(());
                for picture in self.filter.execute(frame)? {
                    let picture = self.correct_field_order(picture);
                    self.queue_picture(picture);
                    if result.is_ok() {
                        result = self.pump();
                    }
                }
                result
            }
        }
    }

    /**
        Push audio input.

        # Errors

        Same as [`push_video`](Self::push_video): new samples can complete
        a frame, which runs the combiner.
    */
    pub fn push_audio(&mut self, input: impl Into<AudioInput>) -> Result<()> {
        match input.into() {
            AudioInput::Flush => {
                let samples = self.buffers.audio.close_current();
                tracing::debug!(
                    frames = samples / self.format.audio_samples_per_frame,
                    "frame muxer: audio segment closed"
                );
                self.pump()
            }
            AudioInput::Samples(chunk) => {
                let samples = chunk.total_samples();
                self.buffers.audio.current_mut().append(&chunk.data);
                self.buffers.audio.record_admitted(samples);
                self.stats.samples_admitted += samples as u64;
                self.pump()
            }
        }
    }

    /**
        Remove and return the oldest finished frame.
    */
    pub fn pop(&mut self) -> Option<MuxedFrame> {
        self.output.pop_front()
    }

    /**
        Number of finished frames waiting.
    */
    pub fn len(&self) -> usize {
        self.output.len()
    }

    /**
        Returns true if no finished frame is waiting.
    */
    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /**
        Returns true if enough video is buffered and the producer should
        decode audio instead.
    */
    pub fn video_ready(&self) -> bool {
        self.buffers.video_ready()
    }

    /**
        Returns true if enough audio is buffered and the producer should
        decode video instead.
    */
    pub fn audio_ready(&self) -> bool {
        self.buffers.audio_ready()
    }

    /**
        The cadence policy, once the first real picture has been pushed.
    */
    pub fn policy(&self) -> Option<CadencePolicy> {
        self.policy
    }

    /**
        The target display format.
    */
    pub fn format(&self) -> &VideoFormatDesc {
        &self.format
    }

    /**
        The source picture rate.
    */
    pub fn source_fps(&self) -> f64 {
        self.source_fps
    }

    /**
        The source picture rate as an exact fraction, e.g. 30000/1001
        for a source reported at 29.97.
    */
    pub fn source_rate(&self) -> Rational {
        self.source_rate
    }

    /**
        Counters accumulated since the muxer was created.
    */
    pub fn stats(&self) -> &MuxerStats {
        &self.stats
    }

    /// Number of video segments buffered, including the open one.
    pub fn video_segments(&self) -> usize {
        self.buffers.video.depth()
    }

    /// Number of audio segments buffered, including the open one.
    pub fn audio_segments(&self) -> usize {
        self.buffers.audio.depth()
    }

    fn select_policy(&mut self, frame: &VideoFrame) -> Result<()> {
        let policy = if self.config.auto_mode {
            resolve_for_picture(frame.scan_mode, self.source_fps, frame.height, &self.format)
        } else {
            CadencePolicy::Simple
        };

        if let Some(mode) = policy.deinterlace_mode() {
            self.filter = (self.filter_factory)(mode, frame)?;
            tracing::info!(
                filter = self.filter.name(),
                %mode,
                "frame muxer: deinterlacer active"
            );
        }

        tracing::info!(
            %policy,
            source_scan = %frame.scan_mode,
            source_rate = %self.source_rate,
            format = %self.format,
            "frame muxer: cadence selected"
        );

        self.source_scan = frame.scan_mode;
        self.policy = Some(policy);
        Ok(())
    }

    /**
        Shift pictures by half a scanline when their field order is the
        opposite of the target's, so the fields land on the right lines.
    */
    fn correct_field_order(&self, mut picture: VideoFrame) -> VideoFrame {
        if picture.height == 0 {
            return picture;
        }
        let half_line = 0.5 / picture.height as f64;

        match (picture.scan_mode, self.format.scan_mode) {
            (ScanMode::LowerFieldFirst, ScanMode::UpperFieldFirst) => {
                picture.transform.fill_translation = (0.0, half_line);
            }
            (ScanMode::UpperFieldFirst, ScanMode::LowerFieldFirst) => {
                picture.transform.fill_translation = (0.0, -half_line);
            }
            _ => {}
        }
        picture
    }

    fn queue_picture(&mut self, picture: VideoFrame) {
        self.buffers.video.current_mut().push(picture);
        self.buffers.video.record_admitted(1);
        self.stats.pictures_queued += 1;
    }

    /**
        Align the segment pairs, then combine for as long as there is data.
    */
    fn pump(&mut self) -> Result<()> {
        let step = self.policy.unwrap_or(CadencePolicy::Simple);

        loop {
            while let Some(truncation) = self
                .buffers
                .truncate_exhausted(step.pictures_per_step(), step.audio_frames_per_step())
            {
                if truncation.lost_data() {
                    tracing::warn!(
                        pictures = truncation.pictures,
                        samples = truncation.samples,
                        "frame muxer: truncating unmatched segment"
                    );
                    self.stats.truncations += 1;
                    self.stats.truncated_pictures += truncation.pictures as u64;
                    self.stats.truncated_samples += truncation.samples as u64;
                }
            }

            if !self.buffers.has_frame_worth() {
                return Ok(());
            }

            // Nothing is combined before the first real picture decides how
            let Some(policy) = self.policy else {
                return Ok(());
            };

            let Some(combined) = self.combine(policy)? else {
                return Ok(());
            };
            self.stats.frames_emitted += combined.emitted as u64;
            self.stats.pictures_discarded += combined.discarded as u64;
        }
    }

    fn combine(&mut self, policy: CadencePolicy) -> Result<Option<Combined>> {
        let output = &mut self.output;

        match policy {
            CadencePolicy::Simple
            | CadencePolicy::Deinterlace
            | CadencePolicy::DeinterlaceBob => Ok(self.buffers.simple(output)),
            CadencePolicy::Duplicate => Ok(self.buffers.duplicate(output)),
            CadencePolicy::Half => Ok(self.buffers.half(output)),
            CadencePolicy::Interlace | CadencePolicy::DeinterlaceBobReinterlace => {
                self.buffers.interlace(self.format.scan_mode, output)
            }
            CadencePolicy::Invalid => Err(Error::InvalidCadence {
                source_scan: self.source_scan,
                source_fps: self.source_fps,
                target_scan: self.format.scan_mode,
                target_fps: self.format.fps(),
            }),
        }
    }
}

fn default_filter(mode: DeinterlaceMode, _first: &VideoFrame) -> Result<Box<dyn VideoFilter>> {
    Ok(Box::new(Deinterlacer::new(mode)))
}

impl fmt::Debug for FrameMuxer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameMuxer")
            .field("source_fps", &self.source_fps)
            .field("format", &self.format.name)
            .field("policy", &self.policy)
            .field("filter", &self.filter.name())
            .field("buffers", &self.buffers)
            .field("queued", &self.output.len())
            .finish_non_exhaustive()
    }
}
