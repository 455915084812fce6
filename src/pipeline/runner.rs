//! One alert run: fetch → interpret → classify → render → deliver.
//!
//! Rows are processed independently. A bad row is skipped; it never
//! aborts the batch. Nothing is retained between runs.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::{AlertSettings, AppConfig, MessageSettings};
use crate::delivery::{self, Mailer, OutboundEmail};
use crate::error::Result;
use crate::pipeline::calendar::classify;
use crate::pipeline::interpret::{Rejection, RowRules};
use crate::pipeline::report::{ReportPayload, render};
use crate::pipeline::types::{ClassifiedOrder, RawRecord, Report, ScanStats};
use crate::source::SheetSource;

/// How a run ended. Every variant is a normal termination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No overdue or due-soon orders; the mailer was not called.
    NothingPending { scanned: usize },
    /// Report rendered but not sent (no mailer configured).
    DryRun { rows: usize, html: String },
    /// Provider accepted the email.
    Sent { rows: usize, status: u16 },
    /// Provider answered with a non-success status.
    Rejected {
        rows: usize,
        status: u16,
        detail: String,
    },
}

/// Interpret and classify every raw row, keeping sheet order.
pub fn build_report(
    records: &[RawRecord],
    rules: &RowRules,
    horizon_business_days: u32,
    today: NaiveDate,
) -> Report {
    let mut stats = ScanStats {
        scanned: records.len(),
        ..Default::default()
    };
    let mut entries = Vec::new();

    for raw in records {
        let order = match rules.interpret(raw) {
            Ok(order) => order,
            Err(Rejection::Status) => {
                stats.rejected_status += 1;
                continue;
            }
            Err(Rejection::DueDate) => {
                stats.rejected_date += 1;
                continue;
            }
        };

        let urgency = classify(order.due_date, today, horizon_business_days);
        if !urgency.is_reportable() {
            stats.not_urgent += 1;
            continue;
        }

        debug!(
            order_id = %order.order_id,
            due_date = %order.due_date,
            urgency = urgency.label(),
            "Work order flagged"
        );
        entries.push(ClassifiedOrder { order, urgency });
    }

    Report { entries, stats }
}

/// Assemble the outbound email for a rendered report.
pub fn compose_email(message: &MessageSettings, html: String) -> OutboundEmail {
    OutboundEmail {
        sender: message.sender.clone(),
        to: message.recipients.clone(),
        subject: message.subject.clone(),
        html_content: html,
    }
}

/// Run one batch.
///
/// `mailer == None` renders without sending. The mailer is never called
/// when nothing is pending. Source failures abort the run before any
/// report exists.
pub async fn run_once(
    source: &dyn SheetSource,
    mailer: Option<&dyn Mailer>,
    settings: &AlertSettings,
    message: &MessageSettings,
    today: NaiveDate,
) -> Result<RunOutcome> {
    let rules = RowRules::from_settings(settings)?;

    info!(source = %source.describe(), "Reading work-order sheet");
    let records = source.fetch().await?;

    let report = build_report(&records, &rules, settings.horizon_business_days, today);
    let stats = report.stats;
    info!(
        scanned = stats.scanned,
        flagged = report.len(),
        overdue = report.overdue_count(),
        rejected_status = stats.rejected_status,
        rejected_date = stats.rejected_date,
        not_urgent = stats.not_urgent,
        %today,
        horizon = settings.horizon_business_days,
        "Work orders classified"
    );

    let (rows, html) = match render(&report) {
        ReportPayload::Empty => {
            info!("No pending work orders; email not sent");
            return Ok(RunOutcome::NothingPending {
                scanned: stats.scanned,
            });
        }
        ReportPayload::Html { row_count, html } => (row_count, html),
    };

    let Some(mailer) = mailer else {
        info!(rows, "Dry run; email not sent");
        return Ok(RunOutcome::DryRun { rows, html });
    };

    info!(
        rows,
        provider = mailer.name(),
        recipients = message.recipients.len(),
        "Sending work-order alert"
    );
    let email = compose_email(message, html);
    let outcome = mailer.send(&email).await?;

    if outcome.is_success() {
        Ok(RunOutcome::Sent {
            rows,
            status: outcome.status,
        })
    } else {
        warn!(status = outcome.status, "Alert email was not accepted");
        Ok(RunOutcome::Rejected {
            rows,
            status: outcome.status,
            detail: outcome.detail,
        })
    }
}

/// Run one batch as configured.
///
/// The mailer is built first, so a missing API key stops the run before
/// the sheet is read.
pub async fn run_configured(
    config: &AppConfig,
    source: &dyn SheetSource,
    today: NaiveDate,
) -> Result<RunOutcome> {
    let mailer = delivery::from_config(&config.mail, config.dry_run)?;
    run_once(
        source,
        mailer.as_ref().map(|m| m as &dyn Mailer),
        &config.alert,
        &config.mail.message,
        today,
    )
    .await
}
