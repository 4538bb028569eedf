use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let input: promissoria_core::schedule::ScheduleRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = promissoria_core::schedule::generate_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn reconcile_instrument(input_json: String) -> NapiResult<String> {
    let input: promissoria_core::reconcile::ReconcileInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = promissoria_core::reconcile::reconcile(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn post_payment(input_json: String) -> NapiResult<String> {
    let input: promissoria_core::posting::PostPaymentRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = promissoria_core::posting::post_payment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

#[napi]
pub fn dashboard_report(input_json: String) -> NapiResult<String> {
    let input: promissoria_core::reporting::ReportInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        promissoria_core::reporting::build_dashboard_report(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn report_summary(input_json: String) -> NapiResult<String> {
    let input: promissoria_core::reporting::ReportInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        promissoria_core::reporting::build_portfolio_report(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
