use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Identifier of a debt instrument, assigned by the persistence collaborator.
pub type InstrumentId = String;

/// Identifier of an installment, assigned by the persistence collaborator.
pub type InstallmentId = String;

/// Lifecycle status of a debt instrument, derived from its installments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentStatus {
    Pending,
    Overdue,
    Paid,
}

/// Payment status of a single installment. The transition is one-way:
/// `Pending -> Paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    Pending,
    Paid,
}

/// One promissory obligation: a principal sold against a vehicle, repaid
/// through a schedule of installments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtInstrument {
    pub id: InstrumentId,
    pub client: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller: Option<String>,
    /// Fixed at creation, immutable afterwards.
    pub principal: Money,
    /// Derived: sum of paid installment amounts. Written only by
    /// reconciliation, never hand-patched.
    pub paid_amount: Money,
    /// Derived: principal minus paid amount.
    pub open_balance: Money,
    pub status: InstrumentStatus,
    /// Reference due date for top-level overdue computation.
    pub due_date: NaiveDate,
    /// Set once the instrument is fully paid; feeds the monthly receipts
    /// report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One unit of a debt instrument's repayment schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installment {
    /// None until the persistence collaborator assigns one on insert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<InstallmentId>,
    pub parent_id: InstrumentId,
    /// 1-based position in the schedule; contiguous 1..=N per parent.
    pub sequence_number: u32,
    pub amount: Money,
    pub due_date: NaiveDate,
    pub status: InstallmentStatus,
}

impl Installment {
    pub fn is_paid(&self) -> bool {
        self.status == InstallmentStatus::Paid
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
