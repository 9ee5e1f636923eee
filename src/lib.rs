pub mod api;
pub mod config;
pub mod console;
pub mod energy;
pub mod error;
pub mod hub;
pub mod metrics;
pub mod render;
pub mod snapshot;
pub mod source;

// Re-export commonly used items
pub use config::Config;
pub use energy::{EnergyReport, EnergyTotals};
pub use error::{AppError, Result};
pub use hub::{Hub, HubHandle};
pub use metrics::MetricsExporter;
pub use render::{Formatter, PageView};
pub use snapshot::{DeviceError, LedState, Snapshot};
pub use source::{Source, SourceHandle, Transport};
