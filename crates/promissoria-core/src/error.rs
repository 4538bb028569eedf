use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid schedule request: {field} — {reason}")]
    InvalidScheduleRequest { field: String, reason: String },

    #[error("Inconsistent schedule state: {0}")]
    InconsistentSchedule(String),

    #[error("Unknown installment: {id}")]
    UnknownInstallment { id: String },

    #[error("Installment already paid: {id}")]
    InstallmentAlreadyPaid { id: String },

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Serialization(e.to_string())
    }
}
