//! CSV decoding for sheet exports.

use csv::{ReaderBuilder, StringRecord};

use crate::config::{ColumnMap, ColumnRef};
use crate::error::SourceError;
use crate::pipeline::types::RawRecord;

/// Column positions resolved against a concrete header row.
#[derive(Debug, Clone, Copy)]
struct ResolvedColumns {
    due_date: usize,
    order_id: usize,
    status: usize,
    client: usize,
    sector: usize,
}

impl ResolvedColumns {
    fn resolve(columns: &ColumnMap, header: &StringRecord) -> Result<Self, SourceError> {
        let find = |col: &ColumnRef| match col {
            ColumnRef::Index(i) => Ok(*i),
            ColumnRef::Name(name) => header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
                .ok_or_else(|| SourceError::UnknownColumn(name.clone())),
        };
        Ok(Self {
            due_date: find(&columns.due_date)?,
            order_id: find(&columns.order_id)?,
            status: find(&columns.status)?,
            client: find(&columns.client)?,
            sector: find(&columns.sector)?,
        })
    }
}

/// Decode a CSV export into raw rows.
///
/// The first line is the header. Rows may be shorter or longer than the
/// header; cells past the end of a row read as empty.
pub fn parse_csv(text: &str, columns: &ColumnMap) -> Result<Vec<RawRecord>, SourceError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header = rdr.headers()?.clone();
    let cols = ResolvedColumns::resolve(columns, &header)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let cell = |i: usize| record.get(i).unwrap_or_default().to_string();
        rows.push(RawRecord {
            due_date: cell(cols.due_date),
            order_id: cell(cols.order_id),
            status: cell(cols.status),
            client: cell(cols.client),
            sector: cell(cols.sector),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\
Data,OF,Status,Cliente,Obs,,,,Cliente A
12/12/2025,123.0,Nova,ACME,,,,,Tintas
\"10/12/2025 à 16/12/2025\",OF-55A,Em Produção,\"Silva, Irmãos\",x,,,,Resinas
";

    #[test]
    fn decodes_positional_columns() {
        let rows = parse_csv(SHEET, &ColumnMap::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            RawRecord::new("12/12/2025", "123.0", "Nova")
                .with_client("ACME")
                .with_sector("Tintas")
        );
        assert_eq!(rows[1].due_date, "10/12/2025 à 16/12/2025");
        assert_eq!(rows[1].client, "Silva, Irmãos");
        assert_eq!(rows[1].sector, "Resinas");
    }

    #[test]
    fn decodes_named_columns_case_insensitively() {
        let columns = ColumnMap::parse("data,of,STATUS,Cliente,cliente a").unwrap();
        let rows = parse_csv(SHEET, &columns).unwrap();
        assert_eq!(rows[0].order_id, "123.0");
        assert_eq!(rows[0].sector, "Tintas");
    }

    #[test]
    fn short_rows_read_as_blank() {
        let text = "Data,OF,Status\n12/12/2025,7\n";
        let rows = parse_csv(text, &ColumnMap::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].order_id, "7");
        assert_eq!(rows[0].status, "");
        assert_eq!(rows[0].sector, "");
    }

    #[test]
    fn blank_rows_are_skipped() {
        let text = "Data,OF,Status\n,,\n12/12/2025,7,Nova\n , ,\n";
        let rows = parse_csv(text, &ColumnMap::default()).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn unknown_header_is_an_error() {
        let columns = ColumnMap::parse("Prazo,OF,Status,Cliente,Setor").unwrap();
        let err = parse_csv(SHEET, &columns).unwrap_err();
        assert!(matches!(err, SourceError::UnknownColumn(name) if name == "Prazo"));
    }

    #[test]
    fn header_only_sheet_has_no_rows() {
        let rows = parse_csv("Data,OF,Status\n", &ColumnMap::default()).unwrap();
        assert!(rows.is_empty());
    }
}
