//! Binary entry point for `reaction-relay`.
//!
//! Parses the command line, installs logging, loads the configuration, and
//! either validates it (`--check`) or starts relaying reactions.

use clap::Parser;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use reaction_relay::base::{config::Config, types::Void};
use tracing::info;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Reaction-relay – logs Discord reaction changes to per-guild audit channels.
///
/// Configuration can come from `config.toml` or environment variables
/// (`BOT_TOKEN`, `GUILD_ID_1`, `LOG_CHANNEL_ID_1`, ...).
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Override the config file path (optional).
    ///
    /// Without it, `.hidden/config.toml` is used when present.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Increase log verbosity (-v: DEBUG, -vv: TRACE).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Validate the configuration, print the routes, and exit without connecting.
    #[arg(long)]
    check: bool,
    /// Export spans over OTLP/HTTP (endpoint from `OTEL_EXPORTER_OTLP_ENDPOINT`).
    #[arg(long)]
    otlp: bool,
}

impl Args {
    fn level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

/// Installs the stdout log layer, plus the OTLP layer when requested.
fn init_tracing(args: &Args) -> Void {
    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(args.level());

    let stdout = tracing_subscriber::fmt::layer().with_ansi(true).with_level(true).with_target(false);

    let otel = if args.otlp {
        let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
        let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_simple_exporter(exporter).build().tracer("reaction-relay");
        Some(tracing_opentelemetry::layer().with_tracer(tracer).boxed())
    } else {
        None
    };

    tracing_subscriber::registry().with(otel).with(level_filter).with(stdout).init();

    Ok(())
}

#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    init_tracing(&args)?;

    // Missing or malformed configuration is fatal.
    let config = Config::load(args.config.as_deref())?;

    if args.check {
        let routes = config.routing_table()?;
        for route in routes.routes() {
            info!("guild {} -> channel {}", route.guild_id, route.log_channel_id);
        }
        info!("Configuration OK: {} route(s), timestamp offset {:+} h.", routes.len(), config.timestamp_offset_hours);
        return Ok(());
    }

    reaction_relay::start(config).await
}
