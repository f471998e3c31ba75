//! Headless demo: run the detection loop and print its readings
//!
//! Stands in for the graphical control surface as a result-channel
//! consumer. Loads the flat JSON config when present, runs unpaused for a
//! fixed duration, and drains the channel at the presentation cadence.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use pixel_sentry::constants::timing;
use pixel_sentry::{
    command_queue, result_channel, AreaReading, DetectionConfig, DetectionLoop, EnigoDriver,
    LoopMessage, NoFocusProbe, PersistedConfig, ScreenSource, SharedConfig,
};

#[derive(Parser)]
#[command(about = "Run the detection loop headless and print readings")]
struct Args {
    /// Path to the flat JSON configuration
    #[arg(long, default_value = "color_checker_config.json")]
    config: PathBuf,

    /// How long to run, in seconds
    #[arg(long, default_value_t = 10)]
    seconds: u64,

    /// Keep clicking disabled regardless of configuration
    #[arg(long)]
    no_click: bool,
}

fn main() -> pixel_sentry::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let persisted = match PersistedConfig::from_json_file(&args.config) {
        Ok(persisted) => persisted,
        Err(e) => {
            tracing::warn!(error = %e, "using default configuration");
            PersistedConfig::default()
        }
    };
    let config = SharedConfig::new(DetectionConfig::from_persisted(&persisted));
    if args.no_click {
        config.set_clicking_enabled(false);
    }

    let (publisher, consumer) = result_channel();
    let (_commands, command_rx) = command_queue();

    let handle = DetectionLoop::new(
        config.clone(),
        ScreenSource::primary()?,
        EnigoDriver::new()?,
        NoFocusProbe,
        publisher,
        command_rx,
    )
    .start();
    config.set_paused(false);

    let deadline = Instant::now() + Duration::from_secs(args.seconds);
    while Instant::now() < deadline {
        for message in consumer.drain() {
            print_message(&message);
        }
        std::thread::sleep(timing::DRAIN_INTERVAL);
    }

    config.set_paused(true);
    handle.stop();
    Ok(())
}

fn print_message(message: &LoopMessage) {
    match message {
        LoopMessage::PointerPixel { rgb: Some(rgb) } => {
            println!("pointer: {},{},{}", rgb[0], rgb[1], rgb[2]);
        }
        LoopMessage::PointerPixel { rgb: None } => {}
        LoopMessage::Area(update) => {
            println!(
                "area: primary {} | secondary {}",
                describe(&update.stats.primary),
                describe(&update.stats.secondary)
            );
        }
        LoopMessage::Error { message } => eprintln!("loop error: {message}"),
    }
}

fn describe(reading: &AreaReading) -> String {
    match reading {
        AreaReading::Valid { percent, count } => format!("{percent:.2}% ({count} px)"),
        AreaReading::NoReference => "no reference".to_string(),
        AreaReading::ComputeError => "error".to_string(),
    }
}
