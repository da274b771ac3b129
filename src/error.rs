use crate::schema::Granularity;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfitabilityError {
    #[error("Ledger is missing required columns: {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    #[error("Not enough data to build the {} report", granularity.name())]
    InsufficientData { granularity: Granularity },

    #[error("Invalid report configuration: {0}")]
    InvalidConfig(String),

    #[error("Chart sink failed: {0}")]
    ChartSink(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProfitabilityError>;
