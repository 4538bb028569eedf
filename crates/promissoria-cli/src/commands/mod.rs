pub mod ledger;
pub mod reporting;
