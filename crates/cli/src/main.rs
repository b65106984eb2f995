use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use gazepop_core::bubbles::infrastructure::hough_bubble_detector::HoughBubbleDetector;
use gazepop_core::bubbles::infrastructure::log_render_sink::LogRenderSink;
use gazepop_core::detection::infrastructure::cascade_resource::CascadeResource;
use gazepop_core::detection::infrastructure::replay_signal_source::{
    ReplaySignalSource, SignalTrace,
};
use gazepop_core::pipeline::analysis_logger::StdoutAnalysisLogger;
use gazepop_core::pipeline::gaze_session::GazeSession;
use gazepop_core::shared::constants::{
    EYE_CASCADE_NAME, EYE_CASCADE_URL, FACE_CASCADE_NAME, FACE_CASCADE_URL, IMAGE_EXTENSIONS,
};
use gazepop_core::shared::frame::Frame;
use gazepop_core::shared::session_config::{
    ClosureStrategy, PopTrigger, PopulationStrategy, SessionConfig,
};

/// Gaze-and-blink bubble popping engine.
#[derive(Parser)]
#[command(name = "gazepop")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a recorded face-signal trace through the engine.
    Replay(ReplayArgs),
    /// Find circular targets in an image.
    Scan {
        /// Input image file.
        image: PathBuf,
    },
    /// Download the cascade files into the cache directory.
    FetchCascades {
        /// Target directory (defaults to the user cache directory).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct ReplayArgs {
    /// JSON trace of per-frame face observations.
    trace: PathBuf,

    /// Session config file (JSON). Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Screen width in pixels.
    #[arg(long)]
    width: Option<i32>,

    /// Screen height in pixels.
    #[arg(long)]
    height: Option<i32>,

    /// Number of bubbles to spawn.
    #[arg(long)]
    bubbles: Option<usize>,

    /// Seed for bubble placement.
    #[arg(long)]
    seed: Option<u64>,

    /// What pops a bubble.
    #[arg(long, value_enum)]
    trigger: Option<TriggerArg>,

    /// Frames the gaze must hold for the dwell trigger.
    #[arg(long, default_value = "15")]
    dwell_frames: u32,

    /// Signal used to decide whether the eyes are closed.
    #[arg(long, value_enum)]
    closure: Option<ClosureArg>,

    /// Where the bubbles come from.
    #[arg(long, value_enum)]
    population: Option<PopulationArg>,

    /// Treat gaze as 0-1000 virtual coordinates.
    #[arg(long)]
    virtual_gaze: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum TriggerArg {
    Blink,
    Gaze,
    Dwell,
}

#[derive(Clone, Copy, ValueEnum)]
enum ClosureArg {
    Probability,
    Geometry,
}

#[derive(Clone, Copy, ValueEnum)]
enum PopulationArg {
    Random,
    Landmarks,
    Hough,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        Command::Replay(args) => run_replay(&args),
        Command::Scan { image } => run_scan(&image),
        Command::FetchCascades { dir } => run_fetch_cascades(dir.as_deref()),
    }
}

fn run_replay(args: &ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.trace.exists() {
        return Err(format!("Trace file not found: {}", args.trace.display()).into());
    }
    let trace = SignalTrace::load(&args.trace)?;
    let config = build_config(args)?;
    let session = GazeSession::new(config)?;

    let mut analyzer = session.build_analyzer(
        Box::new(ReplaySignalSource::new(&trace)),
        Box::new(LogRenderSink::new()),
        Box::new(StdoutAnalysisLogger::default()),
    )?;
    log::info!(
        "Replaying {} frames ({}x{}, rotation {})",
        trace.frames.len(),
        trace.width,
        trace.height,
        trace.rotation
    );

    let (mut blinks, mut pops, mut skipped) = (0usize, 0usize, 0usize);
    for frame in trace.frames() {
        let outcome = analyzer.on_frame(frame);
        if outcome.skipped.is_some() {
            skipped += 1;
        }
        if outcome.blink.is_some() {
            blinks += 1;
        }
        if let Some(bubble) = outcome.popped {
            pops += 1;
            let c = bubble.center();
            println!("frame {}: popped bubble at ({}, {})", outcome.index, c.x, c.y);
        }
    }

    println!(
        "{blinks} blinks, {pops} pops, {skipped} frames skipped, {} bubbles left",
        analyzer.field().len()
    );
    analyzer.logger().summary();
    Ok(())
}

fn build_config(args: &ReplayArgs) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };

    if let Some(w) = args.width {
        config.screen_width = w;
    }
    if let Some(h) = args.height {
        config.screen_height = h;
    }
    if let Some(n) = args.bubbles {
        config.bubble_count = n;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(trigger) = args.trigger {
        config.pop_trigger = match trigger {
            TriggerArg::Blink => PopTrigger::Blink,
            TriggerArg::Gaze => PopTrigger::Gaze,
            TriggerArg::Dwell => PopTrigger::Dwell {
                frames: args.dwell_frames,
            },
        };
    }
    if let Some(closure) = args.closure {
        config.closure = match closure {
            ClosureArg::Probability => ClosureStrategy::Probability,
            ClosureArg::Geometry => ClosureStrategy::Geometry,
        };
    }
    if let Some(population) = args.population {
        config.population = match population {
            PopulationArg::Random => PopulationStrategy::Random,
            PopulationArg::Landmarks => PopulationStrategy::Landmarks,
            PopulationArg::Hough => PopulationStrategy::Hough,
        };
    }
    if args.virtual_gaze {
        config.virtual_gaze_space = true;
    }
    Ok(config)
}

fn run_scan(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file not found: {}", input.display()).into());
    }
    if !is_image(input) {
        return Err(format!("Not a supported image: {}", input.display()).into());
    }

    let rgb = image::open(input)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    let frame = Frame::new(rgb.into_raw(), width, height, 3, 0);

    let bubbles = HoughBubbleDetector::default().detect_in_frame(&frame);
    for b in &bubbles {
        let c = b.center();
        println!("bubble at ({}, {}) r={}", c.x, c.y, b.radius());
    }
    log::info!("Found {} circles in {}", bubbles.len(), input.display());
    Ok(())
}

fn run_fetch_cascades(dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    for (name, url) in [
        (FACE_CASCADE_NAME, FACE_CASCADE_URL),
        (EYE_CASCADE_NAME, EYE_CASCADE_URL),
    ] {
        let resource = CascadeResource::resolve(name, url, dir, None, Some(Box::new(download_progress)))?;
        eprintln!();
        let (w, h) = resource.window();
        println!("{} ({w}x{h} window) at {}", resource.name(), resource.path().display());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading cascade... {pct}%");
    } else {
        eprint!("\rDownloading cascade... {downloaded} bytes");
    }
}
