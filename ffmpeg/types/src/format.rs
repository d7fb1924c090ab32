/*!
    Pixel, scan and channel format types.
*/

use std::fmt;
use std::str::FromStr;

use crate::Error;

/**
    Video pixel formats.

    This is a subset of formats commonly encountered in broadcast pipelines.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 12bpp (most common video format)
    Yuv420p,
    /// Semi-planar YUV 4:2:0, 12bpp (common hardware decoder output)
    Nv12,
    /// Packed BGRA, 32bpp
    Bgra,
    /// Packed RGBA, 32bpp
    Rgba,
    /// Packed RGB, 24bpp
    Rgb24,
    /// Packed BGR, 24bpp
    Bgr24,
    /// Planar YUV 4:2:2, 16bpp (typical for SDI capture)
    Yuv422p,
    /// Planar YUV 4:4:4, 24bpp
    Yuv444p,
    /// Planar YUV 4:2:0, 10-bit little-endian in 16-bit containers
    Yuv420p10,
}

/**
    Memory layout of one plane of a picture.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneLayout {
    /// Bytes per row, without padding.
    pub row_bytes: usize,
    /// Number of rows in the plane.
    pub rows: usize,
    /// Bytes per component (1 for 8-bit formats, 2 for high bit depth).
    pub bytes_per_component: usize,
}

impl PlaneLayout {
    const fn new(row_bytes: usize, rows: usize, bytes_per_component: usize) -> Self {
        Self {
            row_bytes,
            rows,
            bytes_per_component,
        }
    }

    /**
        Returns the total size of the plane in bytes.
    */
    pub const fn size(&self) -> usize {
        self.row_bytes * self.rows
    }
}

impl PixelFormat {
    /**
        Returns the number of bits per pixel for this format.

        For planar formats, this is the average bits per pixel.
    */
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            Self::Yuv420p | Self::Nv12 => 12,
            Self::Yuv420p10 => 24, // 16-bit containers, 1.5 components per pixel
            Self::Yuv422p => 16,
            Self::Rgb24 | Self::Bgr24 | Self::Yuv444p => 24,
            Self::Bgra | Self::Rgba => 32,
        }
    }

    /**
        Returns true if this is a planar format.
    */
    pub const fn is_planar(self) -> bool {
        match self {
            Self::Yuv420p | Self::Yuv422p | Self::Yuv444p | Self::Yuv420p10 => true,
            Self::Nv12 => true, // semi-planar counts as planar
            Self::Bgra | Self::Rgba | Self::Rgb24 | Self::Bgr24 => false,
        }
    }

    /**
        Returns the plane layout of a tightly packed picture of the given size.

        Planes are stored back to back in a frame's data buffer, in the
        order returned here.
    */
    pub fn planes(self, width: u32, height: u32) -> Vec<PlaneLayout> {
        let w = width as usize;
        let h = height as usize;
        let half_w = w.div_ceil(2);
        let half_h = h.div_ceil(2);

        match self {
            Self::Yuv420p => vec![
                PlaneLayout::new(w, h, 1),
                PlaneLayout::new(half_w, half_h, 1),
                PlaneLayout::new(half_w, half_h, 1),
            ],
            Self::Yuv420p10 => vec![
                PlaneLayout::new(w * 2, h, 2),
                PlaneLayout::new(half_w * 2, half_h, 2),
                PlaneLayout::new(half_w * 2, half_h, 2),
            ],
            Self::Nv12 => vec![
                PlaneLayout::new(w, h, 1),
                PlaneLayout::new(half_w * 2, half_h, 1),
            ],
            Self::Yuv422p => vec![
                PlaneLayout::new(w, h, 1),
                PlaneLayout::new(half_w, h, 1),
                PlaneLayout::new(half_w, h, 1),
            ],
            Self::Yuv444p => vec![
                PlaneLayout::new(w, h, 1),
                PlaneLayout::new(w, h, 1),
                PlaneLayout::new(w, h, 1),
            ],
            Self::Bgra | Self::Rgba => vec![PlaneLayout::new(w * 4, h, 1)],
            Self::Rgb24 | Self::Bgr24 => vec![PlaneLayout::new(w * 3, h, 1)],
        }
    }

    /**
        Returns the size in bytes of a tightly packed picture of the given size.
    */
    pub fn buffer_size(self, width: u32, height: u32) -> usize {
        self.planes(width, height).iter().map(PlaneLayout::size).sum()
    }
}

/**
    Scan mode of a picture or display format.

    Interlaced pictures carry two fields captured at different instants.
    The field order says which field was captured first.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScanMode {
    /// Full frames.
    #[default]
    Progressive,
    /// Interlaced, upper (even rows) field first.
    UpperFieldFirst,
    /// Interlaced, lower (odd rows) field first.
    LowerFieldFirst,
}

impl ScanMode {
    /**
        Returns true for both interlaced field orders.
    */
    pub const fn is_interlaced(self) -> bool {
        !matches!(self, Self::Progressive)
    }

    /**
        Returns the row parity (0 = even rows, 1 = odd rows) of the field
        that comes first in time, or `None` for progressive content.
    */
    pub const fn first_field_parity(self) -> Option<usize> {
        match self {
            Self::Progressive => None,
            Self::UpperFieldFirst => Some(0),
            Self::LowerFieldFirst => Some(1),
        }
    }

    /**
        Returns the short name used in logs and on the command line.
    */
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Progressive => "progressive",
            Self::UpperFieldFirst => "upper-field-first",
            Self::LowerFieldFirst => "lower-field-first",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "progressive" | "p" => Ok(Self::Progressive),
            "upper-field-first" | "upper" | "tff" => Ok(Self::UpperFieldFirst),
            "lower-field-first" | "lower" | "bff" => Ok(Self::LowerFieldFirst),
            _ => Err(Error::unsupported_format(format!("unknown scan mode: {s}"))),
        }
    }
}

/**
    Audio channel layout.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ChannelLayout {
    /// Single channel
    Mono,
    /// Left and right channels
    Stereo,
}

impl ChannelLayout {
    /**
        Returns the number of channels.
    */
    pub const fn channels(self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_format_bits_per_pixel() {
        assert_eq!(PixelFormat::Yuv420p.bits_per_pixel(), 12);
        assert_eq!(PixelFormat::Bgra.bits_per_pixel(), 32);
        assert_eq!(PixelFormat::Rgb24.bits_per_pixel(), 24);
    }

    #[test]
    fn pixel_format_is_planar() {
        assert!(PixelFormat::Yuv420p.is_planar());
        assert!(PixelFormat::Nv12.is_planar());
        assert!(!PixelFormat::Bgra.is_planar());
    }

    #[test]
    fn yuv420p_planes() {
        let planes = PixelFormat::Yuv420p.planes(1920, 1080);
        assert_eq!(planes.len(), 3);
        assert_eq!(planes[0], PlaneLayout::new(1920, 1080, 1));
        assert_eq!(planes[1], PlaneLayout::new(960, 540, 1));
        assert_eq!(
            PixelFormat::Yuv420p.buffer_size(1920, 1080),
            1920 * 1080 * 3 / 2
        );
    }

    #[test]
    fn odd_sizes_round_chroma_up() {
        let planes = PixelFormat::Yuv420p.planes(5, 3);
        assert_eq!(planes[1], PlaneLayout::new(3, 2, 1));
    }

    #[test]
    fn packed_buffer_size() {
        assert_eq!(PixelFormat::Bgra.buffer_size(4, 2), 32);
        assert_eq!(PixelFormat::Rgb24.buffer_size(4, 2), 24);
        assert_eq!(
            PixelFormat::Yuv420p10.buffer_size(4, 4),
            PixelFormat::Yuv420p.buffer_size(4, 4) * 2
        );
    }

    #[test]
    fn scan_mode_interlacing() {
        assert!(!ScanMode::Progressive.is_interlaced());
        assert!(ScanMode::UpperFieldFirst.is_interlaced());
        assert!(ScanMode::LowerFieldFirst.is_interlaced());

        assert_eq!(ScanMode::Progressive.first_field_parity(), None);
        assert_eq!(ScanMode::UpperFieldFirst.first_field_parity(), Some(0));
        assert_eq!(ScanMode::LowerFieldFirst.first_field_parity(), Some(1));
    }

    #[test]
    fn scan_mode_parse() {
        assert_eq!("tff".parse::<ScanMode>().unwrap(), ScanMode::UpperFieldFirst);
        assert_eq!("Lower".parse::<ScanMode>().unwrap(), ScanMode::LowerFieldFirst);
        assert_eq!(
            "progressive".parse::<ScanMode>().unwrap(),
            ScanMode::Progressive
        );
        assert!("sideways".parse::<ScanMode>().is_err());
    }

    #[test]
    fn channel_layout_channels() {
        assert_eq!(ChannelLayout::Mono.channels(), 1);
        assert_eq!(ChannelLayout::Stereo.channels(), 2);
    }
}
