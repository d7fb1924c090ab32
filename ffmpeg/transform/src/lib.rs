/*!
    Picture transforms for the ffmpeg sync crates.

    This crate holds the picture-level operations the frame muxer needs
    when source and display scan modes differ:

    - **Deinterlacing**: turning interlaced pictures into progressive ones,
      either one picture per input ([`DeinterlaceMode::Frame`]) or one
      picture per field ([`DeinterlaceMode::Bob`])
    - **Interlacing**: weaving two progressive pictures into the two fields
      of one interlaced picture

    # Filters

    Per-picture transforms implement [`VideoFilter`]. A filter takes
    ownership of one picture and returns zero or more pictures; a bob
    deinterlacer returns two pictures for every interlaced input.

    ```ignore
    use ffmpeg_transform::{DeinterlaceMode, Deinterlacer, VideoFilter};

    let mut filter = Deinterlacer::new(DeinterlaceMode::Bob);

    for frame in decoded_frames {
        for progressive in filter.execute(frame)? {
            // One picture per field, in temporal order
        }
    }
    ```

    Any other implementation can be plugged into the muxer in place of
    the built-in [`Deinterlacer`] with `FrameMuxer::with_filter_factory`.
    The `yadif` cargo feature adds `Yadif`, which runs FFmpeg's yadif
    filter through `ffmpeg-next`.

    # Weaving

    ```ignore
    use ffmpeg_transform::interlace;
    use ffmpeg_types::ScanMode;

    // Upper field from `first`, lower field from `second`
    let woven = interlace(first, second, ScanMode::UpperFieldFirst)?;
    ```

    All transforms work on tightly packed planes as described by
    [`PixelFormat::planes`](ffmpeg_types::PixelFormat::planes).
*/

pub use ffmpeg_types::{Error, PixelFormat, Result, ScanMode, VideoFrame};

mod deinterlace;
mod filter;
mod interlace;
mod plane;
#[cfg(feature = "yadif")]
mod yadif;

pub use deinterlace::{DeinterlaceMode, Deinterlacer};
pub use filter::{Passthrough, VideoFilter};
pub use interlace::{can_interlace, interlace};
#[cfg(feature = "yadif")]
pub use yadif::Yadif;
