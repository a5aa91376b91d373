//! pinch_draw — interactive entry point.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use hand_gesture::config::PINCH_FIXED_THRESHOLD;
use hand_gesture::{Color, GestureConfig, PalmStrategy, PinchThreshold, StrokeStyle};
use pinch_draw::app::{run, AppConfig};
use stroke_canvas::Brush;

#[derive(Parser, Debug)]
#[command(name = "pinch_draw", about = "Draw in the air with a thumb-index pinch")]
struct Cli {
    /// Gesture thresholds as JSON (missing fields keep their defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Play back a JSON-lines frame log; `-` reads a live tracker on stdin
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Record every processed frame to a JSON-lines log
    #[arg(long)]
    record: Option<PathBuf>,

    #[arg(long, default_value_t = 960)]
    width: usize,

    #[arg(long, default_value_t = 720)]
    height: usize,

    /// Show the camera view unmirrored
    #[arg(long)]
    no_mirror: bool,

    /// Pinch majority-vote window in frames (1-5)
    #[arg(long)]
    window: Option<usize>,

    /// Minimum time between drawing state changes
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Use a fixed pinch distance instead of one scaled to hand size
    #[arg(long)]
    fixed_pinch: bool,

    /// Judge palm orientation by knuckle spread instead of the palm normal
    #[arg(long)]
    width_heuristic: bool,

    /// Plain strokes without glow
    #[arg(long)]
    no_glow: bool,

    /// Directory for saved images
    #[arg(long, default_value = ".")]
    save_dir: PathBuf,

    /// Skip the colour / width prompts
    #[arg(long)]
    quick: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pinch_draw=info,hand_gesture=info".into()),
        )
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║             Pinch Draw — air drawing with hand gestures      ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    match &cli.replay {
        Some(p) if p.as_os_str() == "-" => println!("  Source: tracker frames on stdin"),
        Some(p) => println!("  Source: replay of {}", p.display()),
        None    => println!("  Source: mouse/keyboard simulation"),
    }
    println!();

    let mut cfg = build_config(&cli)?;
    // Prompts would compete with a tracker piping into stdin.
    let piped = matches!(&cli.replay, Some(p) if p.as_os_str() == "-");
    if !cli.quick && !piped {
        cfg.style = pick_style(cfg.style);
    }

    info!(
        width = cfg.width,
        height = cfg.height,
        mirror = cfg.mirror,
        color = %cfg.style.color,
        line_width = cfg.style.width,
        "starting"
    );
    println!();
    println!("  Opening window…");
    println!();

    run(cfg)
}

fn build_config(cli: &Cli) -> Result<AppConfig> {
    let mut gesture = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<GestureConfig>(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => GestureConfig::default(),
    };
    if let Some(n) = cli.window {
        gesture.stabilizer_window = n;
    }
    if let Some(ms) = cli.debounce_ms {
        gesture.debounce_ms = ms;
    }
    if cli.fixed_pinch {
        gesture.pinch_threshold = PinchThreshold::Fixed(PINCH_FIXED_THRESHOLD);
    }
    if cli.width_heuristic {
        gesture.palm_strategy = PalmStrategy::width_heuristic();
    }

    Ok(AppConfig {
        width:    cli.width.max(64),
        height:   cli.height.max(64),
        mirror:   !cli.no_mirror,
        brush:    if cli.no_glow { Brush::flat() } else { Brush::default() },
        gesture,
        replay:   cli.replay.clone(),
        record:   cli.record.clone(),
        save_dir: cli.save_dir.clone(),
        ..AppConfig::default()
    })
}

fn pick_style(current: StrokeStyle) -> StrokeStyle {
    println!("  Stroke colour:");
    println!("    1.red  2.orange  3.yellow  4.green  5.blue  6.purple  7.white");
    let color = read_line("    Choice (1–7, default 1): ")
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| Color::PALETTE.get(i).copied())
        .unwrap_or(current.color);

    let width = read_line(&format!("  Line width px (default {}): ", current.width))
        .trim()
        .parse::<f32>()
        .map(StrokeStyle::clamp_width)
        .unwrap_or(current.width);

    StrokeStyle { color, width }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
