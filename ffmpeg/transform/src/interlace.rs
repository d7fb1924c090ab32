/*!
    Field weaving.
*/

use ffmpeg_types::{Error, Result, ScanMode, VideoFrame};

use crate::plane::{ensure_valid_size, planes_with_offsets};

/**
    Returns true if [`interlace`] can weave the two pictures.

    Placeholders weave with anything. Real pictures need the same size and
    pixel format, and buffers that match them.
*/
pub fn can_interlace(first: &VideoFrame, second: &VideoFrame) -> bool {
    if first.is_placeholder() || second.is_placeholder() {
        return true;
    }
    (first.width, first.height, first.format) == (second.width, second.height, second.format)
        && first.has_valid_size()
        && second.has_valid_size()
}

/**
    Weave two pictures into the two fields of one interlaced picture.

    `first` is the earlier picture in time and supplies the field that is
    displayed first under `field_order`: the even rows for
    upper-field-first, the odd rows for lower-field-first. `second`
    supplies the other field. The result is tagged with `field_order` and
    keeps the timing of `first`.

    With a progressive `field_order` there are no fields to weave and
    `first` is returned as is. A placeholder on either side yields the
    other picture.
*/
pub fn interlace(first: VideoFrame, second: VideoFrame, field_order: ScanMode) -> Result<VideoFrame> {
    let Some(first_parity) = field_order.first_field_parity() else {
        return Ok(first);
    };

    if second.is_placeholder() {
        return Ok(first);
    }
    if first.is_placeholder() {
        return Ok(second);
    }

    if (first.width, first.height, first.format) != (second.width, second.height, second.format)
    {
        return Err(Error::invalid_data(format!(
            "cannot interlace {}x{} {:?} with {}x{} {:?}",
            first.width, first.height, first.format, second.width, second.height, second.format
        )));
    }
    ensure_valid_size(&first)?;
    ensure_valid_size(&second)?;

    let mut woven = first;
    for (offset, plane) in planes_with_offsets(&woven) {
        for r in (0..plane.rows).filter(|r| r % 2 != first_parity) {
            let start = offset + r * plane.row_bytes;
            let end = start + plane.row_bytes;
            woven.data[start..end].copy_from_slice(&second.data[start..end]);
        }
    }
    woven.scan_mode = field_order;

    Ok(woven)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_types::{PixelFormat, Pts, Rational};

    fn filled(value: u8, rows: u32, pts: i64) -> VideoFrame {
        VideoFrame::new(
            vec![value; PixelFormat::Bgra.buffer_size(2, rows)],
            2,
            rows,
            PixelFormat::Bgra,
            ScanMode::Progressive,
            Some(Pts(pts)),
            Rational::new(1, 50),
        )
    }

    fn row_values(frame: &VideoFrame) -> Vec<u8> {
        frame.data.chunks(8).map(|row| row[0]).collect()
    }

    #[test]
    fn upper_field_first_takes_even_rows_from_first() {
        let woven = interlace(filled(1, 4, 0), filled(2, 4, 1), ScanMode::UpperFieldFirst).unwrap();
        assert_eq!(row_values(&woven), vec![1, 2, 1, 2]);
        assert_eq!(woven.scan_mode, ScanMode::UpperFieldFirst);
        assert_eq!(woven.pts, Some(Pts(0)));
    }

    #[test]
    fn lower_field_first_takes_odd_rows_from_first() {
        let woven = interlace(filled(1, 4, 0), filled(2, 4, 1), ScanMode::LowerFieldFirst).unwrap();
        assert_eq!(row_values(&woven), vec![2, 1, 2, 1]);
        assert_eq!(woven.scan_mode, ScanMode::LowerFieldFirst);
    }

    #[test]
    fn planar_formats_weave_every_plane() {
        let make = |v: u8| {
            VideoFrame::new(
                vec![v; PixelFormat::Yuv420p.buffer_size(4, 4)],
                4,
                4,
                PixelFormat::Yuv420p,
                ScanMode::Progressive,
                None,
                Rational::new(1, 50),
            )
        };
        let woven = interlace(make(1), make(2), ScanMode::UpperFieldFirst).unwrap();

        // Luma: 4 rows of 4, chroma planes: 2 rows of 2 each
        assert_eq!(&woven.data[0..16], &[1, 1, 1, 1, 2, 2, 2, 2, 1, 1, 1, 1, 2, 2, 2, 2]);
        assert_eq!(&woven.data[16..20], &[1, 1, 2, 2]);
        assert_eq!(&woven.data[20..24], &[1, 1, 2, 2]);
    }

    #[test]
    fn progressive_order_returns_first() {
        let out = interlace(filled(1, 2, 0), filled(2, 2, 1), ScanMode::Progressive).unwrap();
        assert_eq!(row_values(&out), vec![1, 1]);
    }

    #[test]
    fn placeholder_yields_other_picture() {
        let out = interlace(VideoFrame::placeholder(), filled(2, 2, 1), ScanMode::UpperFieldFirst)
            .unwrap();
        assert_eq!(row_values(&out), vec![2, 2]);

        let out = interlace(filled(1, 2, 0), VideoFrame::placeholder(), ScanMode::UpperFieldFirst)
            .unwrap();
        assert_eq!(row_values(&out), vec![1, 1]);
    }

    #[test]
    fn compatibility_check() {
        assert!(can_interlace(&filled(1, 4, 0), &filled(2, 4, 1)));
        assert!(!can_interlace(&filled(1, 4, 0), &filled(2, 6, 1)));
        assert!(can_interlace(&VideoFrame::placeholder(), &filled(2, 6, 1)));

        let mut short = filled(2, 4, 1);
        short.data.pop();
        assert!(!can_interlace(&filled(1, 4, 0), &short));
    }

    #[test]
    fn mismatched_geometry_is_an_error() {
        let err = interlace(filled(1, 2, 0), filled(2, 4, 1), ScanMode::UpperFieldFirst).unwrap_err();
        assert!(format!("{err}").contains("cannot interlace"));
    }
}
