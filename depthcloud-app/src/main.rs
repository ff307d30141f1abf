//! Live point cloud recorder.
//!
//! Streams colored point clouds from the depth camera into a window. Space
//! saves the current cloud as a PLY file, Escape quits.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use depthcloud_capture::{
    DepthCamera, FrameProcessor, InitParameters, RuntimeParameters, SyntheticCamera,
};
use depthcloud_core::Resolution;
use depthcloud_io::PlyExporter;
use depthcloud_visualization::{ViewerConfig, ViewerController, WgpuWindow, WindowOptions};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "depthcloud", version, about = "Record point clouds from a depth camera")]
struct Args {
    /// Width of the retrieved point cloud
    #[arg(long, default_value_t = 720)]
    width: usize,

    /// Height of the retrieved point cloud
    #[arg(long, default_value_t = 404)]
    height: usize,

    /// Directory snapshots are saved to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Write binary instead of ASCII PLY files
    #[arg(long)]
    binary: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Camera frame rate, 0 for unpaced
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Depth confidence threshold (1-100)
    #[arg(long, default_value_t = 95, value_parser = clap::value_parser!(u8).range(1..=100))]
    confidence: u8,

    /// Serial number of the synthetic camera, seeds its noise
    #[arg(long, default_value_t = 0)]
    serial: u32,
}

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let init = InitParameters {
        camera_fps: args.fps,
        ..Default::default()
    };
    let camera = SyntheticCamera::open_with_serial(init, args.serial)
        .context("Failed to open depth camera")?;
    let info = camera.camera_information();
    info!("Camera {} (serial {}) at {}", info.model, info.serial_number, info.resolution);

    let resolution = Resolution::new(args.width, args.height);
    let runtime = RuntimeParameters {
        confidence_threshold: args.confidence,
    };
    let processor = FrameProcessor::new(camera, resolution, runtime)
        .with_context(|| format!("Failed to allocate a {} frame buffer", resolution))?;

    let window =
        WgpuWindow::create(&WindowOptions::default()).context("Failed to open viewer window")?;
    let config = ViewerConfig {
        output_dir: args.output_dir,
        ascii: !args.binary,
        ..Default::default()
    };
    let mut viewer = ViewerController::new(processor, window, PlyExporter::new(), config)
        .context("Failed to set up viewer")?;

    let result = viewer.run();

    let stats = viewer.source().stats();
    info!(
        "Processed {} frames, dropped {}, last frame had {} points",
        stats.processed, stats.dropped, stats.last_point_count
    );

    result.context("Viewer stopped on a fatal error")?;
    Ok(())
}
