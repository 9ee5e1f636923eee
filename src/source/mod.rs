pub mod frame;
pub mod sim;

use crate::error::Result;
use crate::snapshot::Snapshot;
use frame::FrameDecoder;
use std::fmt;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, warn};

/// The two mutually exclusive ways of reaching the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Serial { device: String, baud: u32 },
    Tcp { addr: String },
}

impl Transport {
    /// Open the underlying byte stream. Failure here is fatal at startup.
    pub async fn open(&self) -> Result<Box<dyn AsyncRead + Send + Unpin>> {
        match self {
            Transport::Serial { device, baud } => {
                let port = tokio_serial::new(device, *baud).open_native_async()?;
                Ok(Box::new(port))
            }
            Transport::Tcp { addr } => {
                let stream = TcpStream::connect(addr).await?;
                Ok(Box::new(stream))
            }
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Serial { device, baud } => write!(f, "serial {} @ {} baud", device, baud),
            Transport::Tcp { addr } => write!(f, "tcp {}", addr),
        }
    }
}

/// A running telemetry source: an infinite, non-restartable stream of
/// snapshots delivered one at a time through a capacity-one handoff channel.
pub struct Source {
    rx: mpsc::Receiver<Snapshot>,
    handle: SourceHandle,
}

/// Teardown handle for a source task.
pub struct SourceHandle {
    task: JoinHandle<()>,
}

impl SourceHandle {
    /// Best-effort close: abandon in-flight handling and wait for the task.
    pub async fn close(self) {
        self.task.abort();
        let _ = self.task.await;
    }
}

impl Source {
    /// Spawn a source decoding device frames from `reader`.
    pub fn device(reader: Box<dyn AsyncRead + Send + Unpin>) -> Source {
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(read_loop(reader, tx));
        Source {
            rx,
            handle: SourceHandle { task },
        }
    }

    /// Split into the snapshot stream and the teardown handle.
    pub fn split(self) -> (mpsc::Receiver<Snapshot>, SourceHandle) {
        (self.rx, self.handle)
    }
}

async fn read_loop(mut reader: Box<dyn AsyncRead + Send + Unpin>, tx: mpsc::Sender<Snapshot>) {
    let mut decoder = FrameDecoder::new();
    let mut buf = [0u8; 256];

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => {
                debug!("telemetry stream closed by peer");
                break;
            }
            Ok(n) => {
                for snapshot in decoder.feed(&buf[..n]) {
                    if tx.send(snapshot).await.is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                warn!("telemetry read failed: {e}");
                break;
            }
        }
    }
}
