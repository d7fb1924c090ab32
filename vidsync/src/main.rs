use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ffmpeg_sync::{
    AudioInput, FrameMuxer, MuxerConfig, ScanMode, VideoFormatDesc, VideoFrame, VideoInput,
};

mod report;
mod source;

use report::{Report, Summary};
use source::{SourceConfig, SyntheticSource};

#[derive(Parser, Debug)]
#[command(name = "vidsync")]
#[command(about = "Drive the frame muxer with a synthetic source and report A/V sync")]
struct Args {
    /// Target format preset (e.g. PAL, 720p5000, 1080i5000)
    #[arg(short, long, default_value = "1080i5000")]
    format: VideoFormatDesc,

    /// Source frame rate
    #[arg(long, default_value = "50")]
    source_fps: f64,

    /// Source scan mode (progressive, upper, lower)
    #[arg(long, default_value = "progressive")]
    source_scan: ScanMode,

    /// Source picture size, WIDTHxHEIGHT (defaults to the target size)
    #[arg(long, value_parser = parse_size)]
    source_size: Option<(u32, u32)>,

    /// Source frames per pass
    #[arg(short = 'n', long, default_value = "250")]
    frames: usize,

    /// Number of passes over the source
    #[arg(short, long, default_value = "1")]
    loops: usize,

    /// Report every Nth source picture as a decode gap (0 for none)
    #[arg(long, default_value = "0")]
    gap_interval: usize,

    /// Samples per channel missing from the end of each pass's audio
    #[arg(long, default_value = "0")]
    audio_shortfall: usize,

    /// Pair every picture with one frame, ignoring rates and scan modes
    #[arg(long)]
    no_auto: bool,

    /// Deinterlace with FFmpeg's yadif instead of the built-in filter
    #[cfg(feature = "yadif")]
    #[arg(long)]
    yadif: bool,
}

fn parse_size(s: &str) -> Result<(u32, u32)> {
    let (width, height) = s
        .split_once(['x', 'X'])
        .with_context(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let width = width.trim().parse().context("invalid width")?;
    let height = height.trim().parse().context("invalid height")?;
    if width == 0 || height == 0 {
        bail!("picture size cannot be zero");
    }
    Ok((width, height))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    if args.gap_interval == 1 {
        bail!("a gap interval of 1 leaves no real picture to decide the cadence");
    }

    let (width, height) = args
        .source_size
        .unwrap_or((args.format.width, args.format.height));
    let source_config = SourceConfig {
        fps: args.source_fps,
        width,
        height,
        scan_mode: args.source_scan,
        frames: args.frames,
        gap_interval: args.gap_interval,
        audio_shortfall: args.audio_shortfall,
    };

    let config = MuxerConfig::new().with_auto_mode(!args.no_auto);
    let mut muxer = FrameMuxer::new(args.source_fps, args.format.clone(), config)
        .context("failed to create frame muxer")?;
    #[cfg(feature = "yadif")]
    if args.yadif {
        muxer = muxer.with_filter_factory(|mode, _| Ok(Box::new(ffmpeg_sync::Yadif::new(mode)?)));
    }
    let mut report = Report::default();

    for pass in 0..args.loops {
        tracing::debug!(pass, "starting pass");
        let mut source = SyntheticSource::new(source_config.clone());

        run_pass(&mut muxer, &mut source, &mut report)
            .with_context(|| format!("pass {pass} failed"))?;

        // Loop point
        muxer.push_video(VideoInput::Flush)?;
        muxer.push_audio(AudioInput::Flush)?;
        report.drain(&mut muxer);
    }

    println!(
        "{}",
        Summary {
            muxer: &muxer,
            report: &report,
        }
    );

    if report.misaligned > 0 {
        bail!("{} frames carried a misaligned audio block", report.misaligned);
    }
    Ok(())
}

/**
    Feed one pass of the source, decoding whichever medium the muxer is
    short of, the way a playout producer would.
*/
fn run_pass(muxer: &mut FrameMuxer, source: &mut SyntheticSource, report: &mut Report) -> Result<()> {
    while !source.is_exhausted() {
        let mut pushed = false;

        if !muxer.video_ready() {
            if let Some(picture) = source.next_video() {
                push_picture(muxer, picture)?;
                pushed = true;
            }
        }
        if !muxer.audio_ready() {
            if let Some(chunk) = source.next_audio() {
                muxer.push_audio(chunk)?;
                pushed = true;
            }
        }

        // Both sides have surplus; keep whichever medium is left moving
        if !pushed {
            if let Some(picture) = source.next_video() {
                push_picture(muxer, picture)?;
            } else if let Some(chunk) = source.next_audio() {
                muxer.push_audio(chunk)?;
            }
        }

        report.drain(muxer);
    }
    Ok(())
}

fn push_picture(muxer: &mut FrameMuxer, picture: Option<VideoFrame>) -> Result<()> {
    match picture {
        Some(frame) => muxer.push_video(frame)?,
        None => muxer.push_video(VideoInput::Gap)?,
    }
    Ok(())
}
