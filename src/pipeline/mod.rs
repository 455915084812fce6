//! Work-order alert pipeline.
//!
//! Every sheet row flows through:
//! 1. `interpret` — status filter, date parsing, id cleanup
//! 2. `calendar::classify` — overdue / due soon / ignored
//! 3. `report::render` — HTML table, or `Empty` when nothing qualifies
//!
//! `runner::run_once` wires the stages between a `SheetSource` and a `Mailer`.

pub mod calendar;
pub mod interpret;
pub mod report;
pub mod runner;
pub mod types;

pub use calendar::{business_days_between, classify};
pub use interpret::{RowRules, interpret};
pub use report::{ReportPayload, render};
pub use runner::{RunOutcome, build_report, run_configured, run_once};
pub use types::{ClassifiedOrder, RawRecord, Report, ScanStats, Urgency, WorkOrder};
