use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LedgerError;
use crate::money::{add_months, normalize_cents, round_to_cent, truncate_to_cent};
use crate::types::*;
use crate::LedgerResult;

/// Input for schedule generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub parent_id: InstrumentId,
    pub principal: Money,
    pub installment_count: u32,
    pub first_due_date: NaiveDate,
}

/// Output of schedule generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub parent_id: InstrumentId,
    pub installments: Vec<Installment>,
    pub installment_count: u32,
    /// Amount assigned to installments 1..N-1.
    pub base_amount: Money,
    /// Final installment, carrying the rounding residual.
    pub final_amount: Money,
    pub total: Money,
}

/// Partition a principal into monthly installments with cent-exact rounding.
///
/// Installments 1..N-1 receive the principal divided by N truncated to the
/// lower cent; the final installment absorbs the residual so the schedule
/// sums to the principal exactly. Due dates advance by calendar months from
/// the first due date. All installments start `Pending`.
///
/// Pure and deterministic; the caller persists the result alongside the
/// parent in a single transaction.
pub fn generate_schedule(
    request: &ScheduleRequest,
) -> LedgerResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if request.principal <= Decimal::ZERO {
        return Err(LedgerError::InvalidScheduleRequest {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if request.installment_count == 0 {
        return Err(LedgerError::InvalidScheduleRequest {
            field: "installment_count".into(),
            reason: "Installment count must be at least 1".into(),
        });
    }

    let count = request.installment_count;
    let base = truncate_to_cent(request.principal / Decimal::from(count));

    if base.is_zero() {
        warnings.push(format!(
            "Base installment of {} truncates to zero; principal is below one cent per installment",
            request.principal
        ));
    }

    let mut installments = Vec::with_capacity(count as usize);
    let mut running = Decimal::ZERO;

    for i in 1..=count {
        let amount = if i == count {
            // Final installment absorbs the rounding residual
            round_to_cent(request.principal - running)
        } else {
            base
        };
        running += amount;

        installments.push(Installment {
            id: None,
            parent_id: request.parent_id.clone(),
            sequence_number: i,
            amount: normalize_cents(amount),
            due_date: add_months(request.first_due_date, i - 1)?,
            status: InstallmentStatus::Pending,
        });
    }

    let total: Money = installments.iter().map(|p| p.amount).sum();
    if total != request.principal {
        // Defensive invariant; must never be persisted
        return Err(LedgerError::InconsistentSchedule(format!(
            "Generated schedule sums to {total}, expected {}",
            request.principal
        )));
    }

    let final_amount = installments
        .last()
        .map(|p| p.amount)
        .unwrap_or(Decimal::ZERO);

    let output = ScheduleOutput {
        parent_id: request.parent_id.clone(),
        installments,
        installment_count: count,
        base_amount: normalize_cents(base),
        final_amount,
        total: normalize_cents(total),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Installment Schedule Generator",
        &serde_json::json!({
            "principal": request.principal.to_string(),
            "installment_count": count,
            "first_due_date": request.first_due_date.to_string(),
            "rounding": "truncate base to cent, residual on final installment",
        }),
        warnings,
        elapsed,
        output,
    ))
}
