use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Metrics text encoding error: {0}")]
    MetricsEncoding(#[from] std::string::FromUtf8Error),

    #[error("Telemetry hub is not running")]
    HubStopped,
}

pub type Result<T> = std::result::Result<T, AppError>;
