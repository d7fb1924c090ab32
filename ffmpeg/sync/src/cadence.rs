/*!
    Cadence detection.

    Decides how source pictures map onto output frames from the source and
    target frame rates and scan modes.
*/

use std::fmt;

use ffmpeg_transform::DeinterlaceMode;
use ffmpeg_types::{ScanMode, VideoFormatDesc};

/**
    Absolute tolerance, in frames per second, under which two rates
    count as equal.
*/
pub const FPS_TOLERANCE: f64 = 2.0;

/**
    How source pictures are turned into output frames.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CadencePolicy {
    /// One picture per output frame.
    Simple,
    /// Every picture is shown for two output frames.
    Duplicate,
    /// Every second picture is dropped.
    Half,
    /// Two progressive pictures are woven into one interlaced frame.
    Interlace,
    /// Interlaced pictures are deinterlaced one to one.
    Deinterlace,
    /// Every field of an interlaced picture becomes an output frame.
    DeinterlaceBob,
    /// Fields are bobbed into pictures and woven back into frames, so that
    /// scaling never happens on interlaced content.
    DeinterlaceBobReinterlace,
    /// No conversion exists.
    Invalid,
}

impl CadencePolicy {
    /**
        Returns the deinterlacer mode this policy needs, if any.
    */
    pub const fn deinterlace_mode(self) -> Option<DeinterlaceMode> {
        match self {
            Self::Deinterlace => Some(DeinterlaceMode::Frame),
            Self::DeinterlaceBob | Self::DeinterlaceBobReinterlace => Some(DeinterlaceMode::Bob),
            Self::Simple | Self::Duplicate | Self::Half | Self::Interlace | Self::Invalid => None,
        }
    }

    /**
        Returns how many buffered pictures one combining step consumes.
    */
    pub const fn pictures_per_step(self) -> usize {
        match self {
            Self::Half | Self::Interlace | Self::DeinterlaceBobReinterlace => 2,
            Self::Simple
            | Self::Duplicate
            | Self::Deinterlace
            | Self::DeinterlaceBob
            | Self::Invalid => 1,
        }
    }

    /**
        Returns how many frames' worth of samples one combining step consumes.
    */
    pub const fn audio_frames_per_step(self) -> usize {
        match self {
            Self::Duplicate => 2,
            _ => 1,
        }
    }

    /**
        Returns false for [`CadencePolicy::Invalid`].
    */
    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::Invalid)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Duplicate => "duplicate",
            Self::Half => "half",
            Self::Interlace => "interlace",
            Self::Deinterlace => "deinterlace",
            Self::DeinterlaceBob => "deinterlace-bob",
            Self::DeinterlaceBobReinterlace => "deinterlace-bob-reinterlace",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for CadencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn same_rate(a: f64, b: f64) -> bool {
    (a - b).abs() < FPS_TOLERANCE
}

/**
    Resolve the cadence policy for a source and target.

    Rates are compared in order: equal, source twice the target, target
    twice the source. Anything else has no conversion.
*/
pub fn resolve(
    source_scan: ScanMode,
    source_fps: f64,
    target_scan: ScanMode,
    target_fps: f64,
) -> CadencePolicy {
    let source_interlaced = source_scan.is_interlaced();
    let target_interlaced = target_scan.is_interlaced();

    if same_rate(source_fps, target_fps) {
        if source_interlaced && !target_interlaced {
            CadencePolicy::Deinterlace
        } else {
            CadencePolicy::Simple
        }
    } else if same_rate(source_fps / 2.0, target_fps) {
        match (source_interlaced, target_interlaced) {
            (true, _) => CadencePolicy::Invalid,
            (false, true) => CadencePolicy::Interlace,
            (false, false) => CadencePolicy::Half,
        }
    } else if same_rate(source_fps, target_fps / 2.0) {
        match (source_interlaced, target_interlaced) {
            (_, true) => CadencePolicy::Invalid,
            (true, false) => CadencePolicy::DeinterlaceBob,
            (false, false) => CadencePolicy::Duplicate,
        }
    } else {
        CadencePolicy::Invalid
    }
}

/**
    Resolve the cadence policy for the first picture of a stream.

    Same as [`resolve`], except that interlaced content going to an
    interlaced format of a different height is bobbed and re-woven
    instead of passed through, since it will be scaled and scaling
    interlaced pictures smears their fields together.
*/
pub fn resolve_for_picture(
    source_scan: ScanMode,
    source_fps: f64,
    source_height: u32,
    target: &VideoFormatDesc,
) -> CadencePolicy {
    let policy = resolve(source_scan, source_fps, target.scan_mode, target.fps());

    if policy == CadencePolicy::Simple
        && source_scan.is_interlaced()
        && target.scan_mode.is_interlaced()
        && source_height != target.height
    {
        return CadencePolicy::DeinterlaceBobReinterlace;
    }

    policy
}
