//! Shared types for the work-order alert pipeline.

use chrono::NaiveDate;
use serde::Serialize;

// ── Raw record ──────────────────────────────────────────────────────

/// One row from the source sheet, before any interpretation.
///
/// Every field is the cell text as exported. Missing cells are empty
/// strings, never a placeholder like "nan".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// Due-date text, possibly a range ("10/12/2025 à 16/12/2025").
    pub due_date: String,
    /// Order ("OF") identifier, possibly a float artifact like "123.0".
    pub order_id: String,
    /// Free-text production status.
    pub status: String,
    /// Client name.
    pub client: String,
    /// Sector or secondary-client column.
    pub sector: String,
}

impl RawRecord {
    pub fn new(
        due_date: impl Into<String>,
        order_id: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            due_date: due_date.into(),
            order_id: order_id.into(),
            status: status.into(),
            ..Default::default()
        }
    }

    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = client.into();
        self
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = sector.into();
        self
    }
}

// ── Work order ──────────────────────────────────────────────────────

/// A row that passed interpretation: it has an eligible status and a
/// parseable due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkOrder {
    /// Due date (the end bound when the sheet held a range).
    pub due_date: NaiveDate,
    /// Identifier with spreadsheet float suffixes removed.
    pub order_id: String,
    /// Status exactly as written in the sheet, for display.
    pub status_raw: String,
    /// Lowercased, accent-stripped status used for matching.
    pub status_normalized: String,
    pub client: String,
    pub sector: String,
}

// ── Urgency ─────────────────────────────────────────────────────────

/// Classifier verdict for a single work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Due date is already in the past.
    Overdue,
    /// Due within the alert horizon (business days, inclusive).
    DueSoon,
    /// Too far out to report.
    Ignored,
}

impl Urgency {
    /// Label shown in the report table.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Overdue => "ATRASADO",
            Self::DueSoon => "PRÓXIMO DO VENCIMENTO",
            Self::Ignored => "IGNORADO",
        }
    }

    /// Whether a work order with this verdict belongs in the report.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// A work order paired with its (reportable) verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedOrder {
    pub order: WorkOrder,
    pub urgency: Urgency,
}

// ── Report ──────────────────────────────────────────────────────────

/// Counters collected while building a report. Only used for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Rows read from the source.
    pub scanned: usize,
    /// Rows whose status is not on the watch list.
    pub rejected_status: usize,
    /// Rows with an eligible status but no parseable due date.
    pub rejected_date: usize,
    /// Rows further out than the alert horizon.
    pub not_urgent: usize,
}

/// Ordered list of reportable work orders for one run.
///
/// Order matches the source sheet; nothing is sorted or merged.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub entries: Vec<ClassifiedOrder>,
    pub stats: ScanStats,
}

impl Report {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn overdue_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.urgency == Urgency::Overdue)
            .count()
    }
}
