use thiserror::Error;

/// Reasons a status check against the gateway could not produce a verdict.
///
/// None of these ever count as a successful payment.
#[derive(Error, Debug)]
pub enum ReconciliationError {
    #[error("gateway request timed out: {0}")]
    Timeout(#[source] reqwest::Error),
    #[error("gateway transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed order state XML: {0}")]
    MalformedXml(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
}

/// Operations the host platform may ask for that the gateway cannot do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedOperation {
    Capture,
    Refund,
    Void,
    RecurringPayment,
    CancelRecurringPayment,
}

impl std::fmt::Display for UnsupportedOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::Capture => "Capture method not supported",
            Self::Refund => "Refund method not supported",
            Self::Void => "Void method not supported",
            Self::RecurringPayment | Self::CancelRecurringPayment => {
                "Recurring payment not supported"
            }
        };
        f.write_str(message)
    }
}

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("{0}")]
    Unsupported(UnsupportedOperation),
    #[error("order book error: {0}")]
    OrderBook(String),
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
