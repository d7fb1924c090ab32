/*!
    Field-interpolating deinterlacer.
*/

use std::fmt;

use ffmpeg_types::{FrameTransform, PlaneLayout, Result, ScanMode, VideoFrame};

use crate::VideoFilter;
use crate::plane::{ensure_valid_size, planes_with_offsets};

/**
    How interlaced pictures are turned into progressive ones.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeinterlaceMode {
    /// One progressive picture per input picture (field rate halves).
    Frame,
    /// One progressive picture per field (picture count doubles).
    Bob,
}

impl DeinterlaceMode {
    /**
        Returns how many pictures come out for every picture that goes in.
    */
    pub const fn pictures_per_input(self) -> usize {
        match self {
            Self::Frame => 1,
            Self::Bob => 2,
        }
    }
}

impl fmt::Display for DeinterlaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame => f.write_str("frame"),
            Self::Bob => f.write_str("bob"),
        }
    }
}

/**
    Spatial deinterlacer.

    Rebuilds a full picture from a single field by keeping the field's rows
    and interpolating the missing rows from their neighbours above and
    below. In [`DeinterlaceMode::Frame`] only the first field in time is
    kept; in [`DeinterlaceMode::Bob`] both fields are rebuilt, first field
    first.

    Progressive input is passed through, once per field slot, so the
    output picture rate stays constant across mixed content. Placeholders
    are passed through untouched.
*/
#[derive(Debug)]
pub struct Deinterlacer {
    mode: DeinterlaceMode,
}

impl Deinterlacer {
    /**
        Create a deinterlacer for the given mode.
    */
    pub fn new(mode: DeinterlaceMode) -> Self {
        tracing::debug!(%mode, "deinterlacer created");
        Self { mode }
    }
}

impl VideoFilter for Deinterlacer {
    fn execute(&mut self, frame: VideoFrame) -> Result<Vec<VideoFrame>> {
        if frame.is_placeholder() {
            return Ok(vec![frame]);
        }

        let Some(first_parity) = frame.scan_mode.first_field_parity() else {
            return Ok(match self.mode {
                DeinterlaceMode::Frame => vec![frame],
                DeinterlaceMode::Bob => vec![frame.clone(), frame],
            });
        };

        ensure_valid_size(&frame)?;

        Ok(match self.mode {
            DeinterlaceMode::Frame => vec![rebuild_from_field(&frame, first_parity)],
            DeinterlaceMode::Bob => vec![
                rebuild_from_field(&frame, first_parity),
                rebuild_from_field(&frame, 1 - first_parity),
            ],
        })
    }

    fn name(&self) -> &str {
        match self.mode {
            DeinterlaceMode::Frame => "deinterlace",
            DeinterlaceMode::Bob => "deinterlace-bob",
        }
    }
}

/**
    Build a progressive picture from the rows of one field.

    `parity` selects the field: 0 keeps even rows, 1 keeps odd rows.
*/
fn rebuild_from_field(frame: &VideoFrame, parity: usize) -> VideoFrame {
    let mut data = vec![0u8; frame.data.len()];

    for (offset, plane) in planes_with_offsets(frame) {
        let src = &frame.data[offset..offset + plane.size()];
        let dst = &mut data[offset..offset + plane.size()];
        rebuild_plane(src, dst, plane, parity);
    }

    VideoFrame {
        data,
        width: frame.width,
        height: frame.height,
        format: frame.format,
        scan_mode: ScanMode::Progressive,
        pts: frame.pts,
        time_base: frame.time_base,
        transform: FrameTransform::default(),
    }
}

fn rebuild_plane(src: &[u8], dst: &mut [u8], plane: PlaneLayout, parity: usize) {
    let row = |r: usize| &src[r * plane.row_bytes..(r + 1) * plane.row_bytes];

    for r in 0..plane.rows {
        let out = &mut dst[r * plane.row_bytes..(r + 1) * plane.row_bytes];

        if r % 2 == parity {
            out.copy_from_slice(row(r));
            continue;
        }

        let above = r.checked_sub(1);
        let below = Some(r + 1).filter(|&b| b < plane.rows);

        match (above, below) {
            (Some(a), Some(b)) => average_rows(row(a), row(b), out, plane.bytes_per_component),
            (Some(n), None) | (None, Some(n)) => out.copy_from_slice(row(n)),
            // Single-row plane without a row of the wanted field
            (None, None) => out.copy_from_slice(row(r)),
        }
    }
}

fn average_rows(a: &[u8], b: &[u8], out: &mut [u8], bytes_per_component: usize) {
    match bytes_per_component {
        2 => {
            for ((o, x), y) in out
                .chunks_exact_mut(2)
                .zip(a.chunks_exact(2))
                .zip(b.chunks_exact(2))
            {
                let x = u16::from_le_bytes([x[0], x[1]]) as u32;
                let y = u16::from_le_bytes([y[0], y[1]]) as u32;
                o.copy_from_slice(&(((x + y + 1) / 2) as u16).to_le_bytes());
            }
        }
        _ => {
            for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
                *o = ((x as u16 + y as u16 + 1) / 2) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_types::{PixelFormat, Pts, Rational};

    /// 1-pixel-wide RGB24 picture where every row is filled with its value.
    fn striped(rows: &[u8], scan_mode: ScanMode) -> VideoFrame {
        let data = rows.iter().flat_map(|&v| [v, v, v]).collect();
        VideoFrame::new(
            data,
            1,
            rows.len() as u32,
            PixelFormat::Rgb24,
            scan_mode,
            Some(Pts(3)),
            Rational::new(1, 25),
        )
    }

    fn row_values(frame: &VideoFrame) -> Vec<u8> {
        frame.data.chunks(3).map(|px| px[0]).collect()
    }

    #[test]
    fn frame_mode_keeps_first_field() {
        let mut filter = Deinterlacer::new(DeinterlaceMode::Frame);
        let input = striped(&[10, 100, 20, 100, 30, 100], ScanMode::UpperFieldFirst);

        let out = filter.execute(input).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(row_values(&out[0]), vec![10, 15, 20, 25, 30, 30]);
        assert_eq!(out[0].scan_mode, ScanMode::Progressive);
        assert_eq!(out[0].pts, Some(Pts(3)));
    }

    #[test]
    fn lower_field_first_keeps_odd_rows() {
        let mut filter = Deinterlacer::new(DeinterlaceMode::Frame);
        let input = striped(&[0, 10, 0, 20], ScanMode::LowerFieldFirst);

        let out = filter.execute(input).unwrap();
        assert_eq!(row_values(&out[0]), vec![10, 10, 15, 20]);
    }

    #[test]
    fn bob_mode_doubles_pictures_in_field_order() {
        let mut filter = Deinterlacer::new(DeinterlaceMode::Bob);
        let input = striped(&[10, 50, 10, 50], ScanMode::UpperFieldFirst);

        let out = filter.execute(input).unwrap();
        assert_eq!(out.len(), DeinterlaceMode::Bob.pictures_per_input());
        assert_eq!(row_values(&out[0]), vec![10, 10, 10, 10]);
        assert_eq!(row_values(&out[1]), vec![50, 50, 50, 50]);
    }

    #[test]
    fn bob_mode_repeats_progressive_input() {
        let mut filter = Deinterlacer::new(DeinterlaceMode::Bob);
        let input = striped(&[1, 2, 3, 4], ScanMode::Progressive);

        let out = filter.execute(input).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(row_values(&out[0]), vec![1, 2, 3, 4]);
        assert_eq!(out[0].data, out[1].data);
    }

    #[test]
    fn frame_mode_passes_progressive_input() {
        let mut filter = Deinterlacer::new(DeinterlaceMode::Frame);
        let out = filter
            .execute(striped(&[1, 2], ScanMode::Progressive))
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(row_values(&out[0]), vec![1, 2]);
    }

    #[test]
    fn placeholder_passes_through() {
        let mut filter = Deinterlacer::new(DeinterlaceMode::Bob);
        let out = filter.execute(VideoFrame::placeholder()).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].is_placeholder());
    }

    #[test]
    fn high_bit_depth_averages_whole_components() {
        let mut frame = VideoFrame::new(
            vec![0u8; PixelFormat::Yuv420p10.buffer_size(2, 4)],
            2,
            4,
            PixelFormat::Yuv420p10,
            ScanMode::UpperFieldFirst,
            None,
            Rational::new(1, 25),
        );
        // Luma rows 0 and 2, first component: 0x00FF and 0x0101
        frame.data[0..2].copy_from_slice(&0x00FFu16.to_le_bytes());
        frame.data[8..10].copy_from_slice(&0x0101u16.to_le_bytes());

        let out = Deinterlacer::new(DeinterlaceMode::Frame)
            .execute(frame)
            .unwrap();
        let interpolated = u16::from_le_bytes([out[0].data[4], out[0].data[5]]);
        assert_eq!(interpolated, 0x0100);
    }

    #[test]
    fn rejects_short_buffers() {
        let mut frame = striped(&[1, 2, 3, 4], ScanMode::UpperFieldFirst);
        frame.data.truncate(5);

        let err = Deinterlacer::new(DeinterlaceMode::Frame)
            .execute(frame)
            .unwrap_err();
        assert!(format!("{err}").starts_with("invalid data"));
    }

    #[test]
    fn filter_names() {
        assert_eq!(Deinterlacer::new(DeinterlaceMode::Frame).name(), "deinterlace");
        assert_eq!(Deinterlacer::new(DeinterlaceMode::Bob).name(), "deinterlace-bob");
    }
}
