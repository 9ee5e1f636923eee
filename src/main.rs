use clap::Parser;
use inverter_web::{
    api::{self, AppState},
    config::Config,
    hub::Hub,
    metrics::MetricsExporter,
    render::Formatter,
    source::Source,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "inverter-web", about = "Serve inverter telemetry over HTTP")]
struct Args {
    /// Path to the YAML config file
    #[arg(short, long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Use a TCP connection instead of a serial device
    #[arg(long, conflicts_with_all = ["device", "baud"])]
    tcp: bool,

    /// host:port to connect to when using --tcp
    #[arg(long, requires = "tcp")]
    addr: Option<String>,

    /// Serial device to use
    #[arg(long)]
    device: Option<String>,

    /// Serial baud rate
    #[arg(long)]
    baud: Option<u32>,

    /// Produce synthetic telemetry instead of opening a device
    #[arg(long)]
    sim: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inverter_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Configuration loaded from: {}", path.display());
            config
        }
        None => Config::default(),
    };

    // Command-line transport flags override the config file.
    if args.tcp {
        config.source.transport = "tcp".to_string();
    }
    if let Some(addr) = args.addr {
        config.source.addr = Some(addr);
    }
    if let Some(device) = args.device {
        config.source.transport = "serial".to_string();
        config.source.device = Some(device);
    }
    if let Some(baud) = args.baud {
        config.source.baud = Some(baud);
    }

    let source = if args.sim {
        info!("Using simulated telemetry source");
        Source::simulated(Duration::from_secs(1))
    } else {
        let transport = config.source.transport()?;
        info!("Connecting to inverter via {transport}");
        let reader = transport.open().await?;
        Source::device(reader)
    };
    let (incoming, source_handle) = source.split();

    let exporter = MetricsExporter::new()?;
    let (hub_handle, hub) = Hub::spawn(incoming, exporter.clone());

    let state = AppState {
        hub: hub_handle,
        formatter: Arc::new(Formatter::default()),
        exporter,
    };
    let app = api::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Serving inverter status on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    hub.stop().await;
    source_handle.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
