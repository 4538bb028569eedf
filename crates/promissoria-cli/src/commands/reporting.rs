use chrono::{Local, NaiveDate};
use clap::Args;
use serde_json::Value;

use promissoria_core::reporting::{self, ReportFilter, ReportInput};
use promissoria_core::DebtInstrument;

use crate::input;

/// Shared arguments for the report commands. The instrument list comes from
/// `--input` or piped stdin as a JSON array.
#[derive(Args)]
pub struct ReportArgs {
    /// Path to a JSON file with the instrument list
    #[arg(long)]
    pub input: Option<String>,

    /// Keep instruments due on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Keep instruments due on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Keep instruments of this seller only
    #[arg(long)]
    pub seller: Option<String>,

    /// Date overdue checks are evaluated against (defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

/// Report arguments plus a ranking size
#[derive(Args)]
pub struct RankingArgs {
    #[command(flatten)]
    pub report: ReportArgs,

    /// Number of debtors to rank
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

impl ReportArgs {
    fn into_report_input(self, top_n: Option<usize>) -> Result<ReportInput, Box<dyn std::error::Error>> {
        let data = input::read_required(self.input.as_deref(), "report")?;
        let instruments: Vec<DebtInstrument> = serde_json::from_value(data)?;

        let filter = if self.from.is_some() || self.to.is_some() || self.seller.is_some() {
            Some(ReportFilter {
                from: self.from,
                to: self.to,
                seller: self.seller,
            })
        } else {
            None
        };

        Ok(ReportInput {
            instruments,
            filter,
            as_of: self.as_of.unwrap_or_else(|| Local::now().date_naive()),
            top_n,
        })
    }

    fn filtered_instruments(
        self,
    ) -> Result<(Vec<DebtInstrument>, NaiveDate), Box<dyn std::error::Error>> {
        let report_input = self.into_report_input(None)?;
        let as_of = report_input.as_of;
        let instruments = match report_input.filter {
            Some(ref filter) => filter.apply(&report_input.instruments),
            None => report_input.instruments,
        };
        Ok((instruments, as_of))
    }
}

pub fn run_dashboard(args: RankingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let report_input = args.report.into_report_input(Some(args.top))?;
    let result = reporting::build_dashboard_report(&report_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_summary(args: ReportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (instruments, _) = args.filtered_instruments()?;
    Ok(serde_json::to_value(reporting::portfolio_summary(
        &instruments,
    ))?)
}

pub fn run_status_breakdown(args: ReportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (instruments, _) = args.filtered_instruments()?;
    Ok(serde_json::to_value(reporting::status_breakdown(
        &instruments,
    ))?)
}

pub fn run_monthly_receipts(args: ReportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (instruments, _) = args.filtered_instruments()?;
    Ok(serde_json::to_value(reporting::monthly_receipts(
        &instruments,
    ))?)
}

pub fn run_top_debtors(args: RankingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let top = args.top;
    let (instruments, _) = args.report.filtered_instruments()?;
    Ok(serde_json::to_value(reporting::top_debtors(
        &instruments,
        top,
    ))?)
}

pub fn run_seller_ranking(args: ReportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (instruments, _) = args.filtered_instruments()?;
    Ok(serde_json::to_value(reporting::seller_ranking(
        &instruments,
    ))?)
}

pub fn run_delinquency(args: ReportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (instruments, as_of) = args.filtered_instruments()?;
    Ok(serde_json::to_value(reporting::delinquency_split(
        &instruments,
        as_of,
    ))?)
}
