//! Work-order sheet sources.
//!
//! A source only fetches and decodes rows; it knows nothing about
//! statuses, dates or urgency.

pub mod csv_sheet;
pub mod file;
pub mod http;

use async_trait::async_trait;

use crate::config::{ColumnMap, SourceConfig};
use crate::error::{ConfigError, SourceError};
use crate::pipeline::types::RawRecord;

pub use csv_sheet::parse_csv;
pub use file::FileCsvSource;
pub use http::HttpCsvSource;

/// Trait for sheet sources — pure I/O, no business logic.
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Human-readable origin for logs (URL or path).
    fn describe(&self) -> String;

    /// Fetch every row of the sheet, in sheet order.
    async fn fetch(&self) -> Result<Vec<RawRecord>, SourceError>;
}

/// Build the source named by the configuration.
pub fn from_config(source: &SourceConfig, columns: &ColumnMap) -> Box<dyn SheetSource> {
    match source {
        SourceConfig::Url(url) => Box::new(HttpCsvSource::new(url.clone(), columns.clone())),
        SourceConfig::File(path) => Box::new(FileCsvSource::new(path.clone(), columns.clone())),
    }
}

/// Google Sheets CSV export URL for one tab of a spreadsheet.
pub fn sheet_export_url(sheet_id: &str, sheet_name: &str) -> Result<String, ConfigError> {
    let base = format!("https://docs.google.com/spreadsheets/d/{}/gviz/tq", sheet_id.trim());
    reqwest::Url::parse_with_params(&base, &[("tqx", "out:csv"), ("sheet", sheet_name)])
        .map(String::from)
        .map_err(|e| ConfigError::invalid("OF_ALERT_SHEET_ID", e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn export_url_for_plain_name() {
        let url = sheet_export_url("1A0b", "Pedidos").unwrap();
        assert_eq!(
            url,
            "https://docs.google.com/spreadsheets/d/1A0b/gviz/tq?tqx=out%3Acsv&sheet=Pedidos"
        );
    }

    #[test]
    fn export_url_encodes_sheet_name() {
        let url = sheet_export_url("1A0b", "Ordens Produção").unwrap();
        assert!(url.ends_with("&sheet=Ordens+Produ%C3%A7%C3%A3o"), "{url}");
    }

    #[test]
    fn from_config_picks_implementation() {
        let columns = ColumnMap::default();
        let http = from_config(&SourceConfig::Url("https://example.com/a.csv".into()), &columns);
        assert_eq!(http.describe(), "https://example.com/a.csv");
        let file = from_config(&SourceConfig::File(PathBuf::from("pedidos.csv")), &columns);
        assert_eq!(file.describe(), "pedidos.csv");
    }
}
