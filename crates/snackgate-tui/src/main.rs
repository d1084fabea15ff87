//! Snack gate console entry point.

use std::{
    fs::OpenOptions,
    io,
    num::NonZeroU32,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use clap::Parser;
use snackgate_app::{DEFAULT_LOCK_MINUTES, InsightService, RuleOfThumb, Runtime, SessionConfig, Unconfigured};
use snackgate_core::{ConfigError, DEFAULT_LIMIT};
use snackgate_serial::{DEFAULT_BAUD_RATE, DEFAULT_CONNECT_TIMEOUT, SerialConfig, SerialConnector, TcpConnector};
use snackgate_tui::{SystemEnv, TerminalDriver};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Snack gate terminal console
#[derive(Parser, Debug)]
#[command(name = "snackgate-tui")]
#[command(about = "Monitor and control a snack gate over a serial link")]
#[command(version)]
struct Args {
    /// Serial port to open
    ///
    /// If not provided, the first attached port is used, USB ports first.
    #[arg(short, long, conflicts_with = "tcp")]
    port: Option<String>,

    /// Serial-over-TCP bridge address (host:port) to use instead of a port
    #[arg(long)]
    tcp: Option<String>,

    /// Serial line speed
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Seconds to wait for a link to open
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT.as_secs())]
    connect_timeout: u64,

    /// Initial visit quota
    #[arg(short, long, default_value_t = DEFAULT_LIMIT.get())]
    limit: u32,

    /// Initial lockout length in minutes
    #[arg(long, default_value_t = DEFAULT_LOCK_MINUTES)]
    lock_minutes: u32,

    /// Answer insight requests with local rule-of-thumb tips
    #[arg(long)]
    offline_tips: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write logs to this file
    ///
    /// The terminal belongs to the UI, so nothing is logged without it.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    let initial_limit = NonZeroU32::new(args.limit).ok_or(ConfigError::InvalidLimit(args.limit))?;
    let config = SessionConfig { initial_limit, initial_lock_minutes: args.lock_minutes, ..SessionConfig::default() };

    let insight: Arc<dyn InsightService> =
        if args.offline_tips { Arc::new(RuleOfThumb) } else { Arc::new(Unconfigured) };

    tracing::info!("Starting console: limit={}, lock={} min", initial_limit, args.lock_minutes);
    let driver = TerminalDriver::new()?;

    let serial = SerialConfig {
        port: args.port,
        baud_rate: args.baud,
        connect_timeout: Duration::from_secs(args.connect_timeout),
        ..SerialConfig::default()
    };
    match args.tcp {
        Some(addr) => {
            tracing::info!("Using serial bridge at {addr}");
            let connector = TcpConnector::from_config(addr, &serial);
            Runtime::new(driver, connector, SystemEnv::new(), config, insight).run().await?;
        },
        None => {
            Runtime::new(driver, SerialConnector::new(serial), SystemEnv::new(), config, insight).run().await?;
        },
    }

    tracing::info!("Console stopped");
    Ok(())
}

fn init_logging(args: &Args) -> io::Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .init();
    Ok(())
}
