//! HTTP CSV source — the spreadsheet's public CSV export.

use async_trait::async_trait;
use tracing::debug;

use crate::config::ColumnMap;
use crate::error::SourceError;
use crate::pipeline::types::RawRecord;
use crate::source::{SheetSource, parse_csv};

pub struct HttpCsvSource {
    url: String,
    columns: ColumnMap,
    client: reqwest::Client,
}

impl HttpCsvSource {
    pub fn new(url: impl Into<String>, columns: ColumnMap) -> Self {
        Self {
            url: url.into(),
            columns,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SheetSource for HttpCsvSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>, SourceError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SourceError::RequestFailed {
                url: self.url.clone(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(SourceError::BadStatus {
                url: self.url.clone(),
                status: resp.status().as_u16(),
            });
        }

        let text = resp.text().await.map_err(|e| SourceError::RequestFailed {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        debug!(url = %self.url, bytes = text.len(), "Downloaded sheet export");

        parse_csv(&text, &self.columns)
    }
}
