// src/main.rs
//! GPS Uplink - streams serial NMEA fixes to a HERE XYZ feature store

use clap::Parser;
use gps_uplink::{
    config::{Credentials, UplinkConfig},
    pipeline, update,
    uplink::XyzClient,
};
use log::{error, info};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "gps-uplink", version, about = "Uploads GPS fixes from a serial NMEA receiver to a HERE XYZ space")]
struct Args {
    /// HERE XYZ access token
    #[arg(long)]
    token: String,

    /// HERE XYZ space ID
    #[arg(long = "spaceid")]
    space_id: String,

    /// Serial port the GPS receiver is attached to
    #[arg(long, default_value = "/dev/ttyS0")]
    port: String,

    /// Serial baud rate
    #[arg(long, default_value_t = 9600)]
    baudrate: u32,

    /// URL of a replacement binary to install before starting
    #[arg(long)]
    url: Option<String>,

    /// Filepath to save the downloaded binary
    #[arg(long, default_value = "/usr/local/bin/gps-uplink")]
    filepath: PathBuf,

    /// Trace every raw sentence and upload response
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = UplinkConfig {
        serial_port: args.port.clone(),
        baudrate: args.baudrate,
        verbose: args.verbose,
    };
    let filter = if config.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if let Err(e) = run(args, config).await {
        error!("{}", e);
        process::exit(1);
    }
}

async fn run(args: Args, config: UplinkConfig) -> gps_uplink::Result<()> {
    if let Some(url) = &args.url {
        info!("Downloading replacement binary from {}...", url);
        update::download_binary(url, &args.filepath).await?;
        info!("Saved to {}", args.filepath.display());
    }

    let credentials = Credentials::new(args.token, args.space_id);

    info!(
        "Connecting to GPS on {} at {} baud...",
        config.serial_port, config.baudrate
    );
    let serial = pipeline::open_serial(&config)?;
    info!("Connected, streaming fixes to space {}", credentials.space_id);

    let mut client = XyzClient::new(credentials)?;
    let stats = pipeline::run(serial, &mut client).await?;

    info!(
        "Receiver stream ended: {} uploaded, {} ignored, {} parse errors, {} upload failures, {} rejected",
        stats.uploaded, stats.ignored, stats.parse_errors, stats.upload_failures, stats.rejected
    );
    Ok(())
}
