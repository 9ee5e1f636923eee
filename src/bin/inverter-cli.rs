use clap::Parser;
use inverter_web::{
    config::{DEFAULT_BAUD, DEFAULT_DEVICE},
    console::run_console,
    render::Formatter,
    source::{Source, Transport},
};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "inverter-cli", about = "Log inverter telemetry to the console")]
struct Args {
    /// Use a TCP connection instead of a serial device
    #[arg(long, conflicts_with_all = ["device", "baud"])]
    tcp: bool,

    /// host:port to connect to when using --tcp
    #[arg(long, default_value = "localhost:8139", requires = "tcp")]
    addr: String,

    /// Serial device to use
    #[arg(long, default_value = DEFAULT_DEVICE)]
    device: String,

    /// Serial baud rate
    #[arg(long, default_value_t = DEFAULT_BAUD)]
    baud: u32,

    /// Produce synthetic telemetry instead of opening a device
    #[arg(long)]
    sim: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();

    let source = if args.sim {
        info!("using simulated telemetry source");
        Source::simulated(Duration::from_secs(1))
    } else {
        let transport = if args.tcp {
            Transport::Tcp { addr: args.addr }
        } else {
            Transport::Serial {
                device: args.device,
                baud: args.baud,
            }
        };
        info!("connecting to inverter via {transport}");
        let reader = transport.open().await?;
        Source::device(reader)
    };
    let (rx, handle) = source.split();

    let formatter = Formatter::default();
    run_console(rx, &formatter, shutdown_signal()).await;

    handle.close().await;
    info!("closing connection");

    Ok(())
}

/// Resolves on SIGINT or SIGTERM, so a service-manager stop still closes
/// the source connection and logs the closing notice.
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tcp_and_device_flags_are_mutually_exclusive() {
        assert!(Args::try_parse_from(["inverter-cli", "--tcp", "--device", "/dev/ttyUSB1"]).is_err());
        assert!(Args::try_parse_from(["inverter-cli", "--tcp", "--baud", "9600"]).is_err());
    }

    #[test]
    fn test_each_transport_parses_on_its_own() {
        assert!(Args::try_parse_from(["inverter-cli", "--device", "/dev/ttyUSB1"]).is_ok());
        assert!(Args::try_parse_from(["inverter-cli", "--tcp", "--addr", "host:8139"]).is_ok());
    }
}
