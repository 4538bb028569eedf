use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LedgerError;
use crate::reconcile::{reconcile, ReconcileInput, ReconcileOutput};
use crate::types::*;
use crate::LedgerResult;

/// A payment posting against one installment of a parent's sibling set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPaymentRequest {
    pub principal: Money,
    pub installments: Vec<Installment>,
    pub installment_id: InstallmentId,
    /// When set, overwrites the scheduled amount with the amount actually
    /// collected. When None the scheduled amount stands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_amount: Option<Money>,
    pub as_of: NaiveDate,
}

/// The full post-payment state: updated siblings plus the parent's derived
/// fields, for the caller to write back as one atomic unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPaymentOutput {
    pub installments: Vec<Installment>,
    pub parent: ReconcileOutput,
    pub posted_installment_id: InstallmentId,
    pub posted_amount: Money,
}

/// Mark one installment paid and recompute the parent's derived fields in a
/// single operation.
///
/// The transition is one-way: posting against an already-paid installment is
/// rejected. The output bundles the updated installment set with the
/// reconciled parent fields so the persistence collaborator can apply both
/// in one transaction; a reader must never observe one without the other.
/// Postings against installments of the same parent must be serialised by
/// the collaborator (e.g. keyed on the parent id); different parents need no
/// coordination.
pub fn post_payment(
    request: &PostPaymentRequest,
) -> LedgerResult<ComputationOutput<PostPaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if let Some(amount) = request.posted_amount {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidScheduleRequest {
                field: "posted_amount".into(),
                reason: "Posted amount must be positive".into(),
            });
        }
    }

    let mut installments = request.installments.clone();

    let target = installments
        .iter_mut()
        .find(|p| p.id.as_deref() == Some(request.installment_id.as_str()))
        .ok_or_else(|| LedgerError::UnknownInstallment {
            id: request.installment_id.clone(),
        })?;

    if target.is_paid() {
        return Err(LedgerError::InstallmentAlreadyPaid {
            id: request.installment_id.clone(),
        });
    }

    let scheduled = target.amount;
    if let Some(amount) = request.posted_amount {
        if amount != scheduled {
            warnings.push(format!(
                "Posted amount {amount} overwrites scheduled amount {scheduled}; schedule no longer sums to the principal"
            ));
        }
        target.amount = amount;
    }
    target.status = InstallmentStatus::Paid;
    let posted_amount = target.amount;

    let reconciliation = reconcile(&ReconcileInput {
        principal: request.principal,
        installments: installments.clone(),
        as_of: request.as_of,
    })?;
    warnings.extend(reconciliation.warnings);

    let output = PostPaymentOutput {
        installments,
        parent: reconciliation.result,
        posted_installment_id: request.installment_id.clone(),
        posted_amount,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Payment Posting",
        &serde_json::json!({
            "installment_id": request.installment_id,
            "posted_amount": request.posted_amount.map(|a| a.to_string()),
            "as_of": request.as_of.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn siblings() -> Vec<Installment> {
        (1..=3)
            .map(|seq| Installment {
                id: Some(format!("parc-{seq}")),
                parent_id: "prom-1".into(),
                sequence_number: seq,
                amount: dec!(100.00),
                due_date: format!("2024-{:02}-15", 3 + seq).parse().unwrap(),
                status: InstallmentStatus::Pending,
            })
            .collect()
    }

    fn request(installment_id: &str) -> PostPaymentRequest {
        PostPaymentRequest {
            principal: dec!(300.00),
            installments: siblings(),
            installment_id: installment_id.into(),
            posted_amount: None,
            as_of: "2024-04-01".parse().unwrap(),
        }
    }

    #[test]
    fn test_post_marks_paid_and_reconciles() {
        let result = post_payment(&request("parc-1")).unwrap();
        let out = &result.result;

        assert_eq!(out.installments[0].status, InstallmentStatus::Paid);
        assert_eq!(out.parent.paid_amount, dec!(100.00));
        assert_eq!(out.parent.open_balance, dec!(200.00));
        assert_eq!(out.parent.status, InstrumentStatus::Pending);
        assert_eq!(out.posted_amount, dec!(100.00));
    }

    #[test]
    fn test_final_posting_settles_parent() {
        let mut req = request("parc-3");
        for p in &mut req.installments[..2] {
            p.status = InstallmentStatus::Paid;
        }

        let result = post_payment(&req).unwrap();
        assert_eq!(result.result.parent.status, InstrumentStatus::Paid);
        assert_eq!(result.result.parent.open_balance, dec!(0.00));
    }

    #[test]
    fn test_overwritten_amount_reconciles_and_warns() {
        let mut req = request("parc-2");
        req.posted_amount = Some(dec!(120.00));

        let result = post_payment(&req).unwrap();
        let out = &result.result;

        assert_eq!(out.installments[1].amount, dec!(120.00));
        assert_eq!(out.parent.paid_amount, dec!(120.00));
        assert_eq!(out.parent.open_balance, dec!(180.00));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("overwrites scheduled amount")));
    }

    #[test]
    fn test_matching_posted_amount_does_not_warn() {
        let mut req = request("parc-1");
        req.posted_amount = Some(dec!(100.00));

        let result = post_payment(&req).unwrap();
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unknown_installment() {
        let err = post_payment(&request("parc-99")).unwrap_err();
        assert!(matches!(err, LedgerError::UnknownInstallment { .. }));
    }

    #[test]
    fn test_double_posting_rejected() {
        let first = post_payment(&request("parc-1")).unwrap();

        let second = PostPaymentRequest {
            principal: dec!(300.00),
            installments: first.result.installments,
            installment_id: "parc-1".into(),
            posted_amount: None,
            as_of: "2024-04-02".parse().unwrap(),
        };
        let err = post_payment(&second).unwrap_err();
        assert!(matches!(err, LedgerError::InstallmentAlreadyPaid { .. }));
    }

    #[test]
    fn test_non_positive_posted_amount_rejected() {
        let mut req = request("parc-1");
        req.posted_amount = Some(dec!(0));
        assert!(post_payment(&req).is_err());

        req.posted_amount = Some(dec!(-5.00));
        assert!(post_payment(&req).is_err());
    }

    #[test]
    fn test_input_not_mutated() {
        let req = request("parc-1");
        let before = serde_json::to_value(&req.installments).unwrap();
        post_payment(&req).unwrap();
        assert_eq!(serde_json::to_value(&req.installments).unwrap(), before);
    }

    #[test]
    fn test_overdue_sibling_surfaces_in_parent_status() {
        let mut req = request("parc-2");
        req.as_of = "2024-05-01".parse().unwrap(); // parc-1 (due 2024-04-15) unpaid and late

        let result = post_payment(&req).unwrap();
        assert_eq!(result.result.parent.status, InstrumentStatus::Overdue);
    }
}
