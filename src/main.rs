use clap::Parser;
use log::{debug, info, warn};
use mazecast::Host;
use mazecast::core::config::{self, CliOverrides, MazecastConfig};
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mazecast", about = "Terminal client for a remote first-person maze simulation")]
struct Args {
    /// Where to present frames
    #[arg(long, value_enum)]
    host: Option<Host>,

    /// Base URL of the simulation service
    #[arg(long)]
    service_url: Option<String>,

    /// Display refresh period in milliseconds
    #[arg(long)]
    refresh_ms: Option<u64>,

    /// Frames to capture in headless mode
    #[arg(long)]
    frames: Option<u32>,

    /// Output file for headless mode
    #[arg(long)]
    output: Option<PathBuf>,
}

impl From<Args> for CliOverrides {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            service_url: args.service_url,
            refresh_ms: args.refresh_ms,
            frames: args.frames,
            output: args.output,
        }
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // The log level comes from the config, so loading is reported once the
    // logger is up.
    let loaded = config::load_config();
    let defaults = MazecastConfig::default();
    let file_config = match &loaded {
        Ok(l) => &l.config,
        Err(_) => &defaults,
    };
    let resolved = config::resolve(file_config, &args.into());

    // Initialize file logger - writes to mazecast.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("mazecast.log") {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    match &loaded {
        Ok(l) => {
            info!("Config: {}", l.source);
            debug!("Config: {:?}", l.config);
        }
        Err(e) => warn!("Ignoring config file: {e}"),
    }
    info!(
        "Mazecast starting up: host={:?}, service={}, refresh={:?}",
        resolved.host, resolved.service_url, resolved.refresh
    );

    match resolved.host {
        Host::Terminal => mazecast::tui::run(resolved).await,
        Host::Headless => mazecast::headless::run(resolved).await,
    }
}
