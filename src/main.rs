use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::error;

use obd2_dtc::{
    config::SessionConfig,
    connection::{ThreadTimer, DEFAULT_CONNECT_TRIES},
    device::{SerialPort, DEFAULT_BAUD_RATE},
    lookup::CodeTables,
    workflow,
    Obd2,
};

/// Read the VIN and stored/pending trouble codes through an ELM327 adapter
#[derive(Parser, Debug)]
#[command(name = "obd2-dtc")]
struct Args {
    /// Serial device the adapter is attached to, e.g. /dev/serial/by-id/usb-...
    port: String,

    /// Baud rate of the serial line
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Serial read/write timeout in seconds
    #[arg(short, long, default_value_t = 60)]
    timeout: u64,

    /// Seconds to wait before each bus connection attempt
    #[arg(long, default_value_t = 5)]
    settle: u64,

    /// Bus connection attempts before giving up
    #[arg(long, default_value_t = DEFAULT_CONNECT_TRIES)]
    tries: u32,

    /// JSON file mapping trouble codes to descriptions
    #[arg(short, long)]
    descriptions: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl From<Args> for SessionConfig {
    fn from(args: Args) -> Self {
        Self {
            port: args.port,
            baud_rate: args.baud,
            timeout: Duration::from_secs(args.timeout),
            settle_period: Duration::from_secs(args.settle),
            connect_tries: args.tries,
            descriptions: args.descriptions,
        }
    }
}

fn main() -> Result<(), obd2_dtc::Error> {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = SessionConfig::from(args);

    let mut tables = CodeTables::standard();
    if let Some(path) = &config.descriptions {
        tables.load_descriptions(path)?;
    }

    let port = SerialPort::new(&config.port, config.baud_rate, config.timeout)?;
    println!(
        "Serial Port: {}",
        port.name().unwrap_or_else(|| config.port.clone())
    );

    let stdout = std::io::stdout();
    let result = workflow::run(
        Obd2::new(port),
        ThreadTimer::new(),
        &config,
        &tables,
        &mut stdout.lock(),
    );

    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("Session aborted: {}", e);
            Err(e)
        }
    }
}
