//! Local CSV file source, for offline runs and saved exports.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::config::ColumnMap;
use crate::error::SourceError;
use crate::pipeline::types::RawRecord;
use crate::source::{SheetSource, parse_csv};

pub struct FileCsvSource {
    path: PathBuf,
    columns: ColumnMap,
}

impl FileCsvSource {
    pub fn new(path: impl Into<PathBuf>, columns: ColumnMap) -> Self {
        Self {
            path: path.into(),
            columns,
        }
    }
}

#[async_trait]
impl SheetSource for FileCsvSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>, SourceError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.describe(),
                source,
            })?;
        debug!(path = %self.path.display(), bytes = text.len(), "Read sheet file");
        parse_csv(&text, &self.columns)
    }
}
