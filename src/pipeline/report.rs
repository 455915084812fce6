//! Report formatter — renders classified work orders as an HTML table.
//!
//! Pure string building. Delivery is the caller's job, and the caller
//! must skip it when the payload is [`ReportPayload::Empty`].

use std::fmt::Write as _;

use crate::pipeline::types::{ClassifiedOrder, Report, Urgency};

const OVERDUE_BG: &str = "#ffcccc";
const DUE_SOON_BG: &str = "#fff2cc";
const HEADER_BG: &str = "#eaeaea";

const HEADING: &str = "Relatório de OFs – Pendências";
const COLUMNS: [&str; 6] = ["Data", "OF", "Status", "Tipo", "Cliente", "Setor"];

/// Rendered report body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportPayload {
    /// Nothing to report. Do not send anything.
    Empty,
    /// One table row per work order.
    Html { row_count: usize, html: String },
}

impl ReportPayload {
    pub fn row_count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Html { row_count, .. } => *row_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Render a report, keeping its row order.
pub fn render(report: &Report) -> ReportPayload {
    render_entries(&report.entries)
}

/// Render classified orders, keeping their order.
pub fn render_entries(entries: &[ClassifiedOrder]) -> ReportPayload {
    if entries.is_empty() {
        return ReportPayload::Empty;
    }

    let mut rows = String::new();
    for entry in entries {
        let order = &entry.order;
        let bg = match entry.urgency {
            Urgency::Overdue => OVERDUE_BG,
            _ => DUE_SOON_BG,
        };
        let due = order.due_date.format("%d/%m/%Y").to_string();
        let cells: [&str; 6] = [
            &due,
            &order.order_id,
            &order.status_raw,
            entry.urgency.label(),
            &order.client,
            &order.sector,
        ];
        let _ = write!(rows, "<tr style=\"background-color:{bg}\">");
        for cell in cells {
            let _ = write!(rows, "<td>{}</td>", escape_html(cell));
        }
        rows.push_str("</tr>\n");
    }

    let header: String = COLUMNS.iter().map(|c| format!("<th>{c}</th>")).collect();
    let html = format!(
        "<html>\n<body>\n<h3>{HEADING}</h3>\n\
         <table border=\"1\" cellpadding=\"5\" cellspacing=\"0\" width=\"100%\">\n\
         <tr style=\"background-color:{HEADER_BG}\">{header}</tr>\n\
         {rows}</table>\n</body>\n</html>\n"
    );

    ReportPayload::Html {
        row_count: entries.len(),
        html,
    }
}

/// Escape text for an HTML text node or quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
