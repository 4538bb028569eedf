use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

use crate::error::LedgerError;
use crate::money::normalize_cents;
use crate::types::*;
use crate::LedgerResult;

/// Input for reconciliation: the full sibling installment set of one parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileInput {
    pub principal: Money,
    pub installments: Vec<Installment>,
    /// The date "today" is evaluated against. Passed in, never read from a
    /// clock, so the computation stays pure.
    pub as_of: NaiveDate,
}

/// Derived parent fields, to be written back transactionally by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOutput {
    pub paid_amount: Money,
    pub open_balance: Money,
    pub status: InstrumentStatus,
    pub paid_count: u32,
    pub pending_count: u32,
    /// Earliest unpaid due date; what the parent's due date should track.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due_date: Option<NaiveDate>,
}

/// Recompute a parent's paid amount, open balance and lifecycle status from
/// its installments.
///
/// This is the sole authority for the parent's derived fields. Callers must
/// never write `paid_amount` or `status` independently of this computation,
/// and must apply its output together with any installment change as one
/// atomic write. Idempotent: identical input yields identical output.
pub fn reconcile(input: &ReconcileInput) -> LedgerResult<ComputationOutput<ReconcileOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_siblings(&input.installments)?;

    let paid_amount: Money = input
        .installments
        .iter()
        .filter(|p| p.is_paid())
        .map(|p| p.amount)
        .sum();

    let open_balance = input.principal - paid_amount;

    if open_balance < Decimal::ZERO {
        warnings.push(format!(
            "Paid amount {paid_amount} exceeds principal {}; open balance floored at zero for status",
            input.principal
        ));
    }

    let next_due_date = input
        .installments
        .iter()
        .filter(|p| !p.is_paid())
        .map(|p| p.due_date)
        .min();

    let status = if open_balance <= Decimal::ZERO {
        InstrumentStatus::Paid
    } else if next_due_date.is_some_and(|due| due < input.as_of) {
        InstrumentStatus::Overdue
    } else {
        InstrumentStatus::Pending
    };

    let paid_count = input.installments.iter().filter(|p| p.is_paid()).count() as u32;
    let pending_count = input.installments.len() as u32 - paid_count;

    let output = ReconcileOutput {
        paid_amount: normalize_cents(paid_amount),
        open_balance: normalize_cents(open_balance),
        status,
        paid_count,
        pending_count,
        next_due_date,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Installment Reconciliation",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "installments": input.installments.len(),
            "as_of": input.as_of.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Reject sibling sets that violate the schedule invariants: mixed parents,
/// or sequence numbers that are not a gap-free 1..=N.
fn validate_siblings(installments: &[Installment]) -> LedgerResult<()> {
    if installments.is_empty() {
        return Ok(());
    }

    let parent = &installments[0].parent_id;
    if let Some(stray) = installments.iter().find(|p| &p.parent_id != parent) {
        return Err(LedgerError::InconsistentSchedule(format!(
            "Sibling set mixes parents {parent} and {}",
            stray.parent_id
        )));
    }

    let n = installments.len() as u32;
    let seen: HashSet<u32> = installments.iter().map(|p| p.sequence_number).collect();
    if seen.len() != installments.len() || seen.iter().any(|&s| s == 0 || s > n) {
        return Err(LedgerError::InconsistentSchedule(format!(
            "Sequence numbers of parent {parent} are not a contiguous 1..={n}"
        )));
    }

    Ok(())
}
