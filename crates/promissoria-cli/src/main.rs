mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::ledger::{GenerateScheduleArgs, PostPaymentArgs, ReconcileArgs};
use commands::reporting::{RankingArgs, ReportArgs};

/// Installment-receivables ledger calculations
#[derive(Parser)]
#[command(
    name = "promi",
    version,
    about = "Installment-receivables ledger calculations",
    long_about = "Generate cent-exact installment schedules, post payments, reconcile \
                  debt instruments, and compute the dashboard and report aggregations \
                  of the promissoria system, all with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Partition a principal into monthly installments with cent-exact rounding
    GenerateSchedule(GenerateScheduleArgs),
    /// Recompute a parent's paid amount, open balance and status from its installments
    Reconcile(ReconcileArgs),
    /// Mark an installment paid and reconcile the parent in one operation
    PostPayment(PostPaymentArgs),
    /// All dashboard aggregations in one pass
    Dashboard(RankingArgs),
    /// Portfolio totals: sold, received, open
    Summary(ReportArgs),
    /// Instrument counts per lifecycle status
    StatusBreakdown(ReportArgs),
    /// Receipts grouped by payment month
    MonthlyReceipts(ReportArgs),
    /// Clients ranked by aggregate open balance
    TopDebtors(RankingArgs),
    /// Sellers ranked by principal sold
    SellerRanking(ReportArgs),
    /// Current vs late split of unpaid instruments
    Delinquency(ReportArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::GenerateSchedule(args) => commands::ledger::run_generate_schedule(args),
        Commands::Reconcile(args) => commands::ledger::run_reconcile(args),
        Commands::PostPayment(args) => commands::ledger::run_post_payment(args),
        Commands::Dashboard(args) => commands::reporting::run_dashboard(args),
        Commands::Summary(args) => commands::reporting::run_summary(args),
        Commands::StatusBreakdown(args) => commands::reporting::run_status_breakdown(args),
        Commands::MonthlyReceipts(args) => commands::reporting::run_monthly_receipts(args),
        Commands::TopDebtors(args) => commands::reporting::run_top_debtors(args),
        Commands::SellerRanking(args) => commands::reporting::run_seller_ranking(args),
        Commands::Delinquency(args) => commands::reporting::run_delinquency(args),
        Commands::Version => {
            println!("promi {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
