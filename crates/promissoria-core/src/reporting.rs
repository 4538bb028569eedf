//! Dashboard and report aggregations: pure computations over an instrument
//! list, leaving chart rendering and CSV layout to the presentation layer.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use crate::money::normalize_cents;
use crate::types::*;
use crate::LedgerResult;

const DEFAULT_TOP_DEBTORS: usize = 10;

/// Optional pre-aggregation filter: a due-date window and a seller match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportFilter {
    /// Inclusive lower bound on the instrument due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the instrument due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<String>,
}

impl ReportFilter {
    pub fn matches(&self, instrument: &DebtInstrument) -> bool {
        if self.from.is_some_and(|from| instrument.due_date < from) {
            return false;
        }
        if self.to.is_some_and(|to| instrument.due_date > to) {
            return false;
        }
        if let Some(ref seller) = self.seller {
            if instrument.seller.as_deref() != Some(seller.as_str()) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, instruments: &[DebtInstrument]) -> Vec<DebtInstrument> {
        instruments
            .iter()
            .filter(|i| self.matches(i))
            .cloned()
            .collect()
    }
}

/// Instrument counts per lifecycle status (pie chart).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub pending: u32,
    pub overdue: u32,
    pub paid: u32,
}

pub fn status_breakdown(instruments: &[DebtInstrument]) -> StatusBreakdown {
    let mut breakdown = StatusBreakdown {
        pending: 0,
        overdue: 0,
        paid: 0,
    };
    for i in instruments {
        match i.status {
            InstrumentStatus::Pending => breakdown.pending += 1,
            InstrumentStatus::Overdue => breakdown.overdue += 1,
            InstrumentStatus::Paid => breakdown.paid += 1,
        }
    }
    breakdown
}

/// One point of the receipts-by-month series (line chart).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReceipt {
    /// Year-month key, `YYYY-MM`.
    pub month: String,
    pub total: Money,
}

/// Sum of principal of fully paid instruments, grouped by payment month in
/// chronological order. Instruments without a payment date are skipped.
pub fn monthly_receipts(instruments: &[DebtInstrument]) -> Vec<MonthlyReceipt> {
    let mut by_month: BTreeMap<String, Money> = BTreeMap::new();

    for i in instruments {
        if i.status != InstrumentStatus::Paid {
            continue;
        }
        let Some(paid_on) = i.payment_date else {
            continue;
        };
        *by_month
            .entry(paid_on.format("%Y-%m").to_string())
            .or_insert(Decimal::ZERO) += i.principal;
    }

    by_month
        .into_iter()
        .map(|(month, total)| MonthlyReceipt {
            month,
            total: normalize_cents(total),
        })
        .collect()
}

/// One client's aggregate open balance (debtor ranking).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtorBalance {
    pub client: String,
    pub open_balance: Money,
}

/// Open balance summed per client, largest first, limited to `top_n`.
/// Ties break on client name so the ranking is deterministic.
pub fn top_debtors(instruments: &[DebtInstrument], top_n: usize) -> Vec<DebtorBalance> {
    let mut by_client: HashMap<&str, Money> = HashMap::new();
    for i in instruments {
        *by_client.entry(i.client.as_str()).or_insert(Decimal::ZERO) += i.open_balance;
    }

    let mut ranking: Vec<DebtorBalance> = by_client
        .into_iter()
        .map(|(client, open_balance)| DebtorBalance {
            client: client.to_string(),
            open_balance: normalize_cents(open_balance),
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.open_balance
            .cmp(&a.open_balance)
            .then_with(|| a.client.cmp(&b.client))
    });
    ranking.truncate(top_n);
    ranking
}

/// Per-seller totals: principal sold and amount received (ranking table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerTotals {
    pub seller: String,
    pub total_sold: Money,
    pub total_received: Money,
}

/// Totals per seller, sorted by amount sold descending. Instruments with no
/// seller are left out of the ranking.
pub fn seller_ranking(instruments: &[DebtInstrument]) -> Vec<SellerTotals> {
    let mut by_seller: HashMap<&str, (Money, Money)> = HashMap::new();
    for i in instruments {
        let Some(ref seller) = i.seller else {
            continue;
        };
        let entry = by_seller
            .entry(seller.as_str())
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += i.principal;
        entry.1 += i.paid_amount;
    }

    let mut ranking: Vec<SellerTotals> = by_seller
        .into_iter()
        .map(|(seller, (sold, received))| SellerTotals {
            seller: seller.to_string(),
            total_sold: normalize_cents(sold),
            total_received: normalize_cents(received),
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.total_sold
            .cmp(&a.total_sold)
            .then_with(|| a.seller.cmp(&b.seller))
    });
    ranking
}

/// Portfolio header totals (report summary cards).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_sold: Money,
    pub total_received: Money,
    pub total_open: Money,
    pub instrument_count: u32,
}

pub fn portfolio_summary(instruments: &[DebtInstrument]) -> PortfolioSummary {
    let mut sold = Decimal::ZERO;
    let mut received = Decimal::ZERO;
    let mut open = Decimal::ZERO;

    for i in instruments {
        sold += i.principal;
        received += i.paid_amount;
        open += i.open_balance;
    }

    PortfolioSummary {
        total_sold: normalize_cents(sold),
        total_received: normalize_cents(received),
        total_open: normalize_cents(open),
        instrument_count: instruments.len() as u32,
    }
}

/// Among non-paid instruments, how many are current vs past due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelinquencySplit {
    pub current: u32,
    pub late: u32,
}

pub fn delinquency_split(instruments: &[DebtInstrument], as_of: NaiveDate) -> DelinquencySplit {
    let mut split = DelinquencySplit {
        current: 0,
        late: 0,
    };
    for i in instruments {
        if i.status == InstrumentStatus::Paid {
            continue;
        }
        if i.due_date < as_of {
            split.late += 1;
        } else {
            split.current += 1;
        }
    }
    split
}

/// Whole days an unpaid installment is past due; zero when not yet due.
pub fn days_late(due_date: NaiveDate, as_of: NaiveDate) -> i64 {
    (as_of - due_date).num_days().max(0)
}

/// Input for the composite report builders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInput {
    pub instruments: Vec<DebtInstrument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ReportFilter>,
    pub as_of: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
}

/// Everything the dashboard page renders, computed in one pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub status_breakdown: StatusBreakdown,
    pub monthly_receipts: Vec<MonthlyReceipt>,
    pub top_debtors: Vec<DebtorBalance>,
    pub delinquency: DelinquencySplit,
}

pub fn build_dashboard_report(
    input: &ReportInput,
) -> LedgerResult<ComputationOutput<DashboardReport>> {
    let start = Instant::now();

    let instruments = filtered(input);
    let top_n = input.top_n.unwrap_or(DEFAULT_TOP_DEBTORS);

    let report = DashboardReport {
        status_breakdown: status_breakdown(&instruments),
        monthly_receipts: monthly_receipts(&instruments),
        top_debtors: top_debtors(&instruments, top_n),
        delinquency: delinquency_split(&instruments, input.as_of),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Dashboard Aggregation",
        &assumptions(input, top_n),
        Vec::new(),
        elapsed,
        report,
    ))
}

/// The report page: summary cards, seller ranking and debtor list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub summary: PortfolioSummary,
    pub seller_ranking: Vec<SellerTotals>,
    pub top_debtors: Vec<DebtorBalance>,
}

pub fn build_portfolio_report(
    input: &ReportInput,
) -> LedgerResult<ComputationOutput<PortfolioReport>> {
    let start = Instant::now();

    let instruments = filtered(input);
    let top_n = input.top_n.unwrap_or(DEFAULT_TOP_DEBTORS);

    let report = PortfolioReport {
        summary: portfolio_summary(&instruments),
        seller_ranking: seller_ranking(&instruments),
        top_debtors: top_debtors(&instruments, top_n),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Portfolio Report",
        &assumptions(input, top_n),
        Vec::new(),
        elapsed,
        report,
    ))
}

fn filtered(input: &ReportInput) -> Vec<DebtInstrument> {
    match input.filter {
        Some(ref filter) => filter.apply(&input.instruments),
        None => input.instruments.clone(),
    }
}

fn assumptions(input: &ReportInput, top_n: usize) -> serde_json::Value {
    serde_json::json!({
        "instruments": input.instruments.len(),
        "as_of": input.as_of.to_string(),
        "top_n": top_n,
        "filtered": input.filter.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn instrument(
        id: &str,
        client: &str,
        seller: Option<&str>,
        principal: Money,
        paid: Money,
        status: InstrumentStatus,
        due: &str,
        paid_on: Option<&str>,
    ) -> DebtInstrument {
        DebtInstrument {
            id: id.into(),
            client: client.into(),
            vehicle: Some("Gol 1.0".into()),
            seller: seller.map(Into::into),
            principal,
            paid_amount: paid,
            open_balance: principal - paid,
            status,
            due_date: due.parse().unwrap(),
            payment_date: paid_on.map(|d| d.parse().unwrap()),
            notes: None,
        }
    }

    fn portfolio() -> Vec<DebtInstrument> {
        vec![
            instrument(
                "p1",
                "Ana",
                Some("Carlos"),
                dec!(1000.00),
                dec!(1000.00),
                InstrumentStatus::Paid,
                "2024-01-10",
                Some("2024-03-05"),
            ),
            instrument(
                "p2",
                "Bruno",
                Some("Carlos"),
                dec!(600.00),
                dec!(200.00),
                InstrumentStatus::Pending,
                "2024-07-10",
                None,
            ),
            instrument(
                "p3",
                "Ana",
                Some("Marta"),
                dec!(900.00),
                dec!(300.00),
                InstrumentStatus::Overdue,
                "2024-04-01",
                None,
            ),
            instrument(
                "p4",
                "Caio",
                None,
                dec!(400.00),
                dec!(400.00),
                InstrumentStatus::Paid,
                "2024-02-20",
                Some("2024-03-28"),
            ),
        ]
    }

    fn as_of(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_status_breakdown() {
        let breakdown = status_breakdown(&portfolio());
        assert_eq!(
            breakdown,
            StatusBreakdown {
                pending: 1,
                overdue: 1,
                paid: 2,
            }
        );
    }

    #[test]
    fn test_monthly_receipts_groups_and_orders() {
        let mut instruments = portfolio();
        instruments.push(instrument(
            "p5",
            "Duda",
            None,
            dec!(150.00),
            dec!(150.00),
            InstrumentStatus::Paid,
            "2024-01-05",
            Some("2024-02-11"),
        ));

        let receipts = monthly_receipts(&instruments);
        assert_eq!(
            receipts,
            vec![
                MonthlyReceipt {
                    month: "2024-02".into(),
                    total: dec!(150.00),
                },
                MonthlyReceipt {
                    month: "2024-03".into(),
                    total: dec!(1400.00),
                },
            ]
        );
    }

    #[test]
    fn test_monthly_receipts_skips_unpaid_and_undated() {
        let mut instruments = portfolio();
        instruments[0].payment_date = None; // paid but no date recorded
        let receipts = monthly_receipts(&instruments);
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].month, "2024-03");
    }

    #[test]
    fn test_top_debtors_aggregates_per_client() {
        // Ana holds p1 (settled) and p3 (600 open)
        let ranking = top_debtors(&portfolio(), 10);
        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking[0].client, "Ana");
        assert_eq!(ranking[0].open_balance, dec!(600.00));
        assert_eq!(ranking[1].client, "Bruno");
        assert_eq!(ranking[1].open_balance, dec!(400.00));
        assert_eq!(ranking[2].open_balance, dec!(0.00));
    }

    #[test]
    fn test_top_debtors_truncates_and_breaks_ties_by_name() {
        let instruments = vec![
            instrument(
                "a",
                "Zeca",
                None,
                dec!(100.00),
                dec!(0),
                InstrumentStatus::Pending,
                "2024-05-01",
                None,
            ),
            instrument(
                "b",
                "Alice",
                None,
                dec!(100.00),
                dec!(0),
                InstrumentStatus::Pending,
                "2024-05-01",
                None,
            ),
        ];
        let ranking = top_debtors(&instruments, 1);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].client, "Alice");
    }

    #[test]
    fn test_seller_ranking() {
        let ranking = seller_ranking(&portfolio());
        assert_eq!(ranking.len(), 2); // Caio's instrument has no seller
        assert_eq!(ranking[0].seller, "Carlos");
        assert_eq!(ranking[0].total_sold, dec!(1600.00));
        assert_eq!(ranking[0].total_received, dec!(1200.00));
        assert_eq!(ranking[1].seller, "Marta");
        assert_eq!(ranking[1].total_sold, dec!(900.00));
    }

    #[test]
    fn test_portfolio_summary() {
        let summary = portfolio_summary(&portfolio());
        assert_eq!(summary.total_sold, dec!(2900.00));
        assert_eq!(summary.total_received, dec!(1900.00));
        assert_eq!(summary.total_open, dec!(1000.00));
        assert_eq!(summary.instrument_count, 4);
    }

    #[test]
    fn test_delinquency_split() {
        let split = delinquency_split(&portfolio(), as_of("2024-05-01"));
        // p2 due 2024-07-10 is current, p3 due 2024-04-01 is late; paid ones skipped
        assert_eq!(split, DelinquencySplit { current: 1, late: 1 });
    }

    #[test]
    fn test_days_late() {
        assert_eq!(days_late(as_of("2024-04-01"), as_of("2024-04-11")), 10);
        assert_eq!(days_late(as_of("2024-04-11"), as_of("2024-04-11")), 0);
        assert_eq!(days_late(as_of("2024-04-20"), as_of("2024-04-11")), 0);
    }

    #[test]
    fn test_filter_window_and_seller() {
        let filter = ReportFilter {
            from: Some(as_of("2024-01-01")),
            to: Some(as_of("2024-04-30")),
            seller: Some("Carlos".into()),
        };
        let kept = filter.apply(&portfolio());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "p1");
    }

    #[test]
    fn test_filter_bounds_are_inclusive() {
        let filter = ReportFilter {
            from: Some(as_of("2024-04-01")),
            to: Some(as_of("2024-04-01")),
            seller: None,
        };
        let kept = filter.apply(&portfolio());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "p3");
    }

    #[test]
    fn test_dashboard_report() {
        let result = build_dashboard_report(&ReportInput {
            instruments: portfolio(),
            filter: None,
            as_of: as_of("2024-05-01"),
            top_n: Some(2),
        })
        .unwrap();

        let report = &result.result;
        assert_eq!(report.status_breakdown.paid, 2);
        assert_eq!(report.top_debtors.len(), 2);
        assert_eq!(report.delinquency.late, 1);
    }

    #[test]
    fn test_portfolio_report_with_filter() {
        let result = build_portfolio_report(&ReportInput {
            instruments: portfolio(),
            filter: Some(ReportFilter {
                from: None,
                to: None,
                seller: Some("Marta".into()),
            }),
            as_of: as_of("2024-05-01"),
            top_n: None,
        })
        .unwrap();

        let report = &result.result;
        assert_eq!(report.summary.total_sold, dec!(900.00));
        assert_eq!(report.seller_ranking.len(), 1);
        assert_eq!(report.top_debtors[0].client, "Ana");
    }
}
