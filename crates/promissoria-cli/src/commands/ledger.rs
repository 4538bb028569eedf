use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use promissoria_core::posting::{self, PostPaymentRequest};
use promissoria_core::reconcile::{self, ReconcileInput};
use promissoria_core::schedule::{self, ScheduleRequest};

use crate::input;

/// Arguments for schedule generation
#[derive(Args)]
pub struct GenerateScheduleArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Identifier of the parent debt instrument
    #[arg(long)]
    pub parent_id: Option<String>,

    /// Principal to partition
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Number of monthly installments
    #[arg(long)]
    pub installments: Option<u32>,

    /// Due date of the first installment (YYYY-MM-DD)
    #[arg(long)]
    pub first_due: Option<NaiveDate>,
}

pub fn run_generate_schedule(
    args: GenerateScheduleArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: ScheduleRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ScheduleRequest {
            parent_id: args
                .parent_id
                .ok_or("--parent-id is required (or provide --input)")?,
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            installment_count: args
                .installments
                .ok_or("--installments is required (or provide --input)")?,
            first_due_date: args
                .first_due
                .ok_or("--first-due is required (or provide --input)")?,
        }
    };

    let result = schedule::generate_schedule(&request)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for reconciliation
#[derive(Args)]
pub struct ReconcileArgs {
    /// Path to JSON input file with principal and installment set
    #[arg(long)]
    pub input: Option<String>,

    /// Date overdue checks are evaluated against (defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

pub fn run_reconcile(args: ReconcileArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut data = input::read_required(args.input.as_deref(), "reconcile")?;
    inject_as_of(&mut data, args.as_of);

    let reconcile_input: ReconcileInput = serde_json::from_value(data)?;
    let result = reconcile::reconcile(&reconcile_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for payment posting
#[derive(Args)]
pub struct PostPaymentArgs {
    /// Path to JSON input file with principal and installment set
    #[arg(long)]
    pub input: Option<String>,

    /// Installment to mark as paid (overrides the JSON field)
    #[arg(long)]
    pub installment_id: Option<String>,

    /// Amount actually collected; omit to keep the scheduled amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Date overdue checks are evaluated against (defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

pub fn run_post_payment(args: PostPaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut data = input::read_required(args.input.as_deref(), "post-payment")?;
    inject_as_of(&mut data, args.as_of);

    if let Value::Object(ref mut map) = data {
        if let Some(id) = args.installment_id {
            map.insert("installment_id".into(), Value::String(id));
        }
        if let Some(amount) = args.amount {
            map.insert(
                "posted_amount".into(),
                serde_json::to_value(amount)?,
            );
        }
    }

    let request: PostPaymentRequest = serde_json::from_value(data)?;
    let result = posting::post_payment(&request)?;
    Ok(serde_json::to_value(result)?)
}

/// Fill in `as_of` from the flag, or today, when the JSON omits it.
fn inject_as_of(data: &mut Value, as_of: Option<NaiveDate>) {
    if let Value::Object(map) = data {
        if let Some(date) = as_of {
            map.insert("as_of".into(), Value::String(date.to_string()));
        } else if !map.contains_key("as_of") {
            map.insert(
                "as_of".into(),
                Value::String(Local::now().date_naive().to_string()),
            );
        }
    }
}
