use crate::energy::{EnergyReport, EnergyTotals};
use crate::error::{AppError, Result};
use crate::metrics::MetricsExporter;
use crate::snapshot::Snapshot;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

/// The distribution loop.
///
/// One spawned task owns the latest snapshot and the running energy totals
/// and multiplexes four readiness sources: a new snapshot arriving, a status
/// request, an energy-report request, and the stop signal. Requests are
/// served with whatever is current at that instant; nothing is queued for
/// consumers, so a burst of status requests between arrivals all see the
/// same snapshot.
pub struct Hub {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Clonable request side of the hub. Each call is a rendezvous: the reply
/// travels in a fresh oneshot channel, so a stale value can never sit
/// buffered between the loop and a consumer.
#[derive(Clone)]
pub struct HubHandle {
    snapshot_tx: mpsc::Sender<oneshot::Sender<Snapshot>>,
    report_tx: mpsc::Sender<oneshot::Sender<EnergyReport>>,
}

impl HubHandle {
    /// Fetch the most recent snapshot (valid or not).
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let (tx, rx) = oneshot::channel();
        self.snapshot_tx
            .send(tx)
            .await
            .map_err(|_| AppError::HubStopped)?;
        rx.await.map_err(|_| AppError::HubStopped)
    }

    /// Fetch the energy accumulated since the previous call, resetting the
    /// totals in the same loop iteration.
    pub async fn energy_report(&self) -> Result<EnergyReport> {
        let (tx, rx) = oneshot::channel();
        self.report_tx
            .send(tx)
            .await
            .map_err(|_| AppError::HubStopped)?;
        rx.await.map_err(|_| AppError::HubStopped)
    }
}

impl Hub {
    /// Spawn the distribution task on `incoming`.
    pub fn spawn(incoming: mpsc::Receiver<Snapshot>, exporter: MetricsExporter) -> (HubHandle, Hub) {
        let (snapshot_tx, snapshot_rx) = mpsc::channel(1);
        let (report_tx, report_rx) = mpsc::channel(1);
        let (stop_tx, stop_rx) = oneshot::channel();

        let task = tokio::spawn(run(incoming, snapshot_rx, report_rx, stop_rx, exporter));

        (
            HubHandle {
                snapshot_tx,
                report_tx,
            },
            Hub { stop_tx, task },
        )
    }

    /// Stop the loop and wait for the task to exit. After this returns no
    /// request is serviced and nothing is consumed from `incoming` anymore.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.task.await;
    }
}

async fn run(
    mut incoming: mpsc::Receiver<Snapshot>,
    mut snapshot_req: mpsc::Receiver<oneshot::Sender<Snapshot>>,
    mut report_req: mpsc::Receiver<oneshot::Sender<EnergyReport>>,
    mut stop: oneshot::Receiver<()>,
    exporter: MetricsExporter,
) {
    let mut latest = Snapshot::default();
    let mut totals = EnergyTotals::default();

    loop {
        tokio::select! {
            arrival = incoming.recv() => match arrival {
                Some(snapshot) => {
                    if snapshot.valid {
                        totals.update(&snapshot);
                        // Synchronous by design; a slow sink stalls only
                        // this branch until the call returns.
                        exporter.observe(&snapshot);
                    }
                    latest = snapshot;
                }
                None => {
                    debug!("telemetry stream ended, stopping hub");
                    break;
                }
            },
            Some(reply) = snapshot_req.recv() => {
                // The requester may have given up; that is not our problem.
                let _ = reply.send(latest.clone());
            },
            Some(reply) = report_req.recv() => {
                let _ = reply.send(totals.report());
                totals.reset();
            },
            _ = &mut stop => {
                debug!("hub stop requested");
                break;
            },
        }
    }
}
