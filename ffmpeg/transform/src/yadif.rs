/*!
    FFmpeg yadif deinterlacer.
*/

use ffmpeg_next::{ffi, filter, format::Pixel, util::frame::video::Video as VideoFrameFFmpeg};

use ffmpeg_types::{Error, FrameTransform, PixelFormat, Pts, Rational, Result, ScanMode, VideoFrame};

use crate::plane::{ensure_valid_size, planes_with_offsets};
use crate::{DeinterlaceMode, VideoFilter};

/// Input properties a filter graph was configured for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct GraphKey {
    width: u32,
    height: u32,
    format: PixelFormat,
    scan_mode: ScanMode,
    time_base: Rational,
}

impl GraphKey {
    fn of(frame: &VideoFrame) -> Self {
        Self {
            width: frame.width,
            height: frame.height,
            format: frame.format,
            scan_mode: frame.scan_mode,
            time_base: frame.time_base,
        }
    }
}

/**
    Deinterlacer backed by FFmpeg's `yadif` filter.

    A drop-in alternative to [`Deinterlacer`](crate::Deinterlacer) with
    temporal interpolation. yadif looks one picture ahead, so the first
    call returns nothing and every later call returns the output for the
    previous input. The filter graph is rebuilt whenever the size, pixel
    format, field order or time base of the input changes.

    Only planar YUV formats are supported.

    ```ignore
    use ffmpeg_sync::{FrameMuxer, MuxerConfig};
    use ffmpeg_transform::Yadif;

    let muxer = FrameMuxer::new(25.0, format, MuxerConfig::auto())?
        .with_filter_factory(|mode, _| Ok(Box::new(Yadif::new(mode)?)));
    ```
*/
pub struct Yadif {
    mode: DeinterlaceMode,
    graph: Option<(filter::Graph, GraphKey)>,
}

impl Yadif {
    /**
        Create a yadif deinterlacer for the given mode.

        # Errors

        Fails if FFmpeg cannot be initialized.
    */
    pub fn new(mode: DeinterlaceMode) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::filter(e.to_string()))?;
        tracing::debug!(%mode, "yadif deinterlacer created");
        Ok(Self { mode, graph: None })
    }

    fn graph_for(&mut self, key: GraphKey) -> Result<&mut filter::Graph> {
        if self.graph.as_ref().is_none_or(|(_, current)| *current != key) {
            if self.graph.is_some() {
                tracing::debug!(?key, "yadif input changed, rebuilding filter graph");
            }
            self.graph = Some((build_graph(self.mode, key)?, key));
        }
        match &mut self.graph {
            Some((graph, _)) => Ok(graph),
            None => Err(Error::filter("yadif filter graph missing")),
        }
    }

    /// Time base of the pictures leaving the graph.
    fn output_time_base(&self, input: Rational) -> Rational {
        match self.mode {
            DeinterlaceMode::Frame => input,
            // One picture per field, at twice the input rate
            DeinterlaceMode::Bob => Rational::new(input.num, input.den * 2),
        }
    }
}

impl VideoFilter for Yadif {
    fn execute(&mut self, frame: VideoFrame) -> Result<Vec<VideoFrame>> {
        if frame.is_placeholder() {
            return Ok(vec![frame]);
        }
        if !frame.scan_mode.is_interlaced() {
            return Ok(match self.mode {
                DeinterlaceMode::Frame => vec![frame],
                DeinterlaceMode::Bob => vec![frame.clone(), frame],
            });
        }

        ensure_valid_size(&frame)?;
        let (pixel, _) = pixel_for(frame.format)?;

        let mut input = VideoFrameFFmpeg::new(pixel, frame.width, frame.height);
        copy_into(&frame, &mut input);
        input.set_pts(frame.pts.map(|pts| pts.0));

        let time_base = self.output_time_base(frame.time_base);
        let graph = self.graph_for(GraphKey::of(&frame))?;

        graph
            .get("in")
            .ok_or_else(|| Error::filter("yadif graph has no input"))?
            .source()
            .add(&input)
            .map_err(ffmpeg_error)?;

        let mut sink = graph
            .get("out")
            .ok_or_else(|| Error::filter("yadif graph has no output"))?;
        let mut filtered = VideoFrameFFmpeg::empty();
        let mut pictures = Vec::new();

        loop {
            match sink.sink().frame(&mut filtered) {
                Ok(()) => pictures.push(copy_out(&filtered, &frame, time_base)),
                Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::AVERROR(ffi::EAGAIN) => {
                    break;
                }
                Err(ffmpeg_next::Error::Eof) => break,
                Err(e) => return Err(ffmpeg_error(e)),
            }
        }

        Ok(pictures)
    }

    fn name(&self) -> &str {
        match self.mode {
            DeinterlaceMode::Frame => "yadif",
            DeinterlaceMode::Bob => "yadif-bob",
        }
    }
}

fn ffmpeg_error(e: ffmpeg_next::Error) -> Error {
    Error::filter(format!("yadif: {e}"))
}

fn pixel_for(format: PixelFormat) -> Result<(Pixel, &'static str)> {
    match format {
        PixelFormat::Yuv420p => Ok((Pixel::YUV420P, "yuv420p")),
        PixelFormat::Yuv422p => Ok((Pixel::YUV422P, "yuv422p")),
        PixelFormat::Yuv444p => Ok((Pixel::YUV444P, "yuv444p")),
        PixelFormat::Yuv420p10 => Ok((Pixel::YUV420P10LE, "yuv420p10le")),
        other => Err(Error::unsupported_format(format!(
            "yadif cannot process {other:?}"
        ))),
    }
}

fn build_graph(mode: DeinterlaceMode, key: GraphKey) -> Result<filter::Graph> {
    let (_, pix_fmt) = pixel_for(key.format)?;
    let buffer = filter::find("buffer").ok_or_else(|| Error::filter("ffmpeg has no buffer filter"))?;
    let buffersink =
        filter::find("buffersink").ok_or_else(|| Error::filter("ffmpeg has no buffersink filter"))?;

    let mut graph = filter::Graph::new();
    let args = format!(
        "video_size={}x{}:pix_fmt={pix_fmt}:time_base={}/{}:pixel_aspect=1/1",
        key.width, key.height, key.time_base.num, key.time_base.den
    );
    graph.add(&buffer, "in", &args).map_err(ffmpeg_error)?;
    graph.add(&buffersink, "out", "").map_err(ffmpeg_error)?;

    let send = match mode {
        DeinterlaceMode::Frame => "send_frame",
        DeinterlaceMode::Bob => "send_field",
    };
    let parity = match key.scan_mode {
        ScanMode::LowerFieldFirst => "bff",
        _ => "tff",
    };
    let chain = format!("yadif=mode={send}:parity={parity}:deint=all");

    graph
        .output("in", 0)
        .map_err(ffmpeg_error)?
        .input("out", 0)
        .map_err(ffmpeg_error)?
        .parse(&chain)
        .map_err(ffmpeg_error)?;
    graph.validate().map_err(ffmpeg_error)?;

    tracing::debug!(%chain, width = key.width, height = key.height, "yadif filter graph built");
    Ok(graph)
}

/// Copy tightly packed planes into FFmpeg's strided buffers.
fn copy_into(frame: &VideoFrame, target: &mut VideoFrameFFmpeg) {
    for (index, (offset, plane)) in planes_with_offsets(frame).into_iter().enumerate() {
        let stride = target.stride(index);
        let dst = target.data_mut(index);
        for r in 0..plane.rows {
            let src = &frame.data[offset + r * plane.row_bytes..][..plane.row_bytes];
            dst[r * stride..][..plane.row_bytes].copy_from_slice(src);
        }
    }
}

/// Copy FFmpeg's strided output back into a packed picture shaped like `template`.
fn copy_out(filtered: &VideoFrameFFmpeg, template: &VideoFrame, time_base: Rational) -> VideoFrame {
    let mut data = vec![0u8; template.data.len()];
    for (index, (offset, plane)) in planes_with_offsets(template).into_iter().enumerate() {
        let stride = filtered.stride(index);
        let src = filtered.data(index);
        for r in 0..plane.rows {
            data[offset + r * plane.row_bytes..][..plane.row_bytes]
                .copy_from_slice(&src[r * stride..][..plane.row_bytes]);
        }
    }

    VideoFrame {
        data,
        width: template.width,
        height: template.height,
        format: template.format,
        scan_mode: ScanMode::Progressive,
        pts: filtered.pts().map(Pts),
        time_base,
        transform: FrameTransform::default(),
    }
}
