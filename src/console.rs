use crate::render::Formatter;
use crate::snapshot::Snapshot;
use std::future::Future;
use tokio::sync::mpsc;
use tracing::info;

/// Console reporting loop: logs one multi-line report per valid snapshot
/// until the shutdown future resolves or the stream ends. Invalid snapshots
/// are dropped without a log line.
pub async fn run_console(
    mut rx: mpsc::Receiver<Snapshot>,
    formatter: &Formatter,
    shutdown: impl Future<Output = ()>,
) {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested");
                break;
            }
            arrival = rx.recv() => match arrival {
                Some(snapshot) if snapshot.valid => {
                    info!("System Info:\n{}", formatter.text_report(&snapshot));
                }
                Some(_) => continue,
                None => {
                    info!("telemetry stream ended");
                    break;
                }
            },
        }
    }
}
