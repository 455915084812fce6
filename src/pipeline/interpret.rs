//! Row interpreter — turns a raw sheet row into a [`WorkOrder`] or drops it.
//!
//! Runs before classification:
//! - status must contain one of the watched substrings (accent/case-insensitive)
//! - due-date text must resolve to a real `DD/MM/YYYY` date; for ranges the
//!   end bound wins
//! - order ids exported as floats ("123.0") are rendered as integers
//!
//! A rejected row is never an error. The caller just skips it.

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::config::AlertSettings;
use crate::error::ConfigError;
use crate::pipeline::types::{RawRecord, WorkOrder};

/// Why a row did not become a [`WorkOrder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Status is not on the watch list.
    Status,
    /// Due-date text did not resolve to a calendar date.
    DueDate,
}

/// Compiled interpretation rules.
#[derive(Debug, Clone)]
pub struct RowRules {
    status_matches: Vec<String>,
    range_splitter: Option<Regex>,
    date_shape: Regex,
}

impl RowRules {
    /// Build rules from status substrings and date-range separators.
    ///
    /// Status substrings are normalized the same way statuses are, so
    /// "Produç" and "produc" are equivalent entries.
    pub fn new(status_matches: &[String], range_separators: &[String]) -> Result<Self, ConfigError> {
        let status_matches: Vec<String> = status_matches
            .iter()
            .map(|s| normalize_status(s))
            .filter(|s| !s.is_empty())
            .collect();
        if status_matches.is_empty() {
            return Err(ConfigError::invalid(
                "OF_ALERT_STATUS_MATCH",
                "at least one status substring is required",
            ));
        }

        let mut separators: Vec<&str> = range_separators
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        // Longest first so "até" is tried before "a".
        separators.sort_unstable_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        separators.dedup();

        let range_splitter = if separators.is_empty() {
            None
        } else {
            let alternation = separators
                .iter()
                .map(|s| regex::escape(s))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = format!(r"(?i)\s*(?:{alternation})\s*");
            Some(
                Regex::new(&pattern)
                    .map_err(|e| ConfigError::invalid("OF_ALERT_RANGE_SEPARATORS", e.to_string()))?,
            )
        };

        let date_shape = Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$")
            .map_err(|e| ConfigError::invalid("date pattern", e.to_string()))?;

        Ok(Self {
            status_matches,
            range_splitter,
            date_shape,
        })
    }

    /// Build rules from the alert settings.
    pub fn from_settings(settings: &AlertSettings) -> Result<Self, ConfigError> {
        Self::new(&settings.status_matches, &settings.range_separators)
    }

    /// Whether a normalized status is on the watch list.
    pub fn accepts_status(&self, normalized: &str) -> bool {
        self.status_matches
            .iter()
            .any(|needle| normalized.contains(needle.as_str()))
    }

    /// Parse sheet date text; ranges resolve to their end bound.
    pub fn parse_due_date(&self, text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let candidate = match &self.range_splitter {
            Some(splitter) => splitter
                .split(text)
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .last()?,
            None => text,
        };

        if !self.date_shape.is_match(candidate) {
            return None;
        }
        NaiveDate::parse_from_str(candidate, "%d/%m/%Y").ok()
    }

    /// Interpret a raw row. Returns the reason when the row is dropped.
    pub fn interpret(&self, raw: &RawRecord) -> Result<WorkOrder, Rejection> {
        let status_normalized = normalize_status(&raw.status);
        if !self.accepts_status(&status_normalized) {
            return Err(Rejection::Status);
        }

        let Some(due_date) = self.parse_due_date(&raw.due_date) else {
            debug!(
                order_id = %raw.order_id,
                due_date = %raw.due_date,
                "Dropping row with unparseable due date"
            );
            return Err(Rejection::DueDate);
        };

        Ok(WorkOrder {
            due_date,
            order_id: clean_order_id(&raw.order_id),
            status_raw: clean_cell(&raw.status),
            status_normalized,
            client: clean_cell(&raw.client),
            sector: clean_cell(&raw.sector),
        })
    }
}

/// Interpret one raw row, dropping it (`None`) when it is not eligible.
pub fn interpret(raw: &RawRecord, rules: &RowRules) -> Option<WorkOrder> {
    rules.interpret(raw).ok()
}

/// Lowercase, trim and strip diacritics so matching ignores accents and case.
pub fn normalize_status(status: &str) -> String {
    status
        .trim()
        .to_lowercase()
        .chars()
        .map(fold_diacritic)
        .collect()
}

/// Render numeric ids as integers ("123.0" → "123"); pass anything else through.
///
/// Integer text is kept digit for digit, however long.
pub fn clean_order_id(value: &str) -> String {
    let value = clean_cell(value);
    if is_digits(&value) {
        return value;
    }
    if let Some((whole, fraction)) = value.split_once('.') {
        if is_digits(whole) && fraction.chars().all(|c| c == '0') {
            return whole.to_string();
        }
    }
    match value.parse::<f64>() {
        // "nan"/"inf" parse as floats in Rust but are text in a sheet.
        Ok(n) if n.is_finite() && value.chars().any(|c| c.is_ascii_digit()) => {
            format!("{}", n.trunc() as i64)
        }
        _ => value,
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Trim a cell and blank out null-ish placeholders left by exporters.
pub fn clean_cell(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("nan") || trimmed.eq_ignore_ascii_case("null") {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// Map an accented Latin letter to its base letter. Expects lowercase input.
fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RowRules {
        RowRules::from_settings(&AlertSettings::default()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── Date parsing ────────────────────────────────────────────

    #[test]
    fn parses_single_date() {
        assert_eq!(rules().parse_due_date("12/12/2025"), Some(date(2025, 12, 12)));
    }

    #[test]
    fn parses_single_digit_day_and_month() {
        assert_eq!(rules().parse_due_date(" 5/1/2026 "), Some(date(2026, 1, 5)));
    }

    #[test]
    fn range_with_a_grave_uses_end_date() {
        assert_eq!(
            rules().parse_due_date("10/12/2025 à 16/12/2025"),
            Some(date(2025, 12, 16))
        );
    }

    #[test]
    fn range_with_other_separators_uses_end_date() {
        let r = rules();
        for text in [
            "10/12/2025 a 16/12/2025",
            "10/12/2025 até 16/12/2025",
            "10/12/2025 ATÉ 16/12/2025",
            "10/12/2025 - 16/12/2025",
            "10/12/2025-16/12/2025",
            "10/12/2025 – 16/12/2025",
            "10/12/2025à16/12/2025",
        ] {
            assert_eq!(r.parse_due_date(text), Some(date(2025, 12, 16)), "{text}");
        }
    }

    #[test]
    fn trailing_separator_keeps_last_date() {
        assert_eq!(rules().parse_due_date("10/12/2025 à"), Some(date(2025, 12, 10)));
    }

    #[test]
    fn rejects_impossible_dates() {
        let r = rules();
        assert_eq!(r.parse_due_date("31/02/2025"), None);
        assert_eq!(r.parse_due_date("00/12/2025"), None);
        assert_eq!(r.parse_due_date("12/13/2025"), None);
    }

    #[test]
    fn rejects_non_dates_and_blanks() {
        let r = rules();
        assert_eq!(r.parse_due_date(""), None);
        assert_eq!(r.parse_due_date("   "), None);
        assert_eq!(r.parse_due_date("sem data"), None);
        assert_eq!(r.parse_due_date("2025-12-12"), None);
    }

    #[test]
    fn rejects_two_digit_years() {
        assert_eq!(rules().parse_due_date("12/12/25"), None);
    }

    #[test]
    fn duplicate_separators_collapse_longest_first() {
        let seps: Vec<String> = ["à", "a", "até", "à", "a"].map(String::from).to_vec();
        let r = RowRules::new(&["nova".into()], &seps).unwrap();
        let splitter = r.range_splitter.as_ref().unwrap();
        assert_eq!(splitter.as_str(), r"(?i)\s*(?:até|a|à)\s*");
        assert_eq!(r.parse_due_date("10/12/2025 até 12/12/2025"), Some(date(2025, 12, 12)));
    }

    #[test]
    fn no_separators_means_no_range_support() {
        let r = RowRules::new(&["nova".into()], &[]).unwrap();
        assert_eq!(r.parse_due_date("12/12/2025"), Some(date(2025, 12, 12)));
        assert_eq!(r.parse_due_date("10/12/2025 à 16/12/2025"), None);
    }

    // ── Status ──────────────────────────────────────────────────

    #[test]
    fn normalizes_case_accents_and_whitespace() {
        assert_eq!(normalize_status("  Em Produção "), "em producao");
        assert_eq!(normalize_status("EM PRODUÇÃO"), "em producao");
        assert_eq!(normalize_status("Expedição Ú"), "expedicao u");
    }

    #[test]
    fn production_variants_are_accepted() {
        let r = rules();
        for status in ["Em Produção", "EM PRODUCAO", "produção iniciada", "Nova"] {
            assert!(r.accepts_status(&normalize_status(status)), "{status}");
        }
    }

    #[test]
    fn other_statuses_are_rejected() {
        let r = rules();
        for status in ["Cancelada", "Finalizada", "Entregue", ""] {
            assert!(!r.accepts_status(&normalize_status(status)), "{status}");
        }
    }

    #[test]
    fn status_match_list_is_normalized() {
        let r = RowRules::new(&["Expedição".into()], &[]).unwrap();
        assert!(r.accepts_status(&normalize_status("AGUARDANDO EXPEDICAO")));
    }

    #[test]
    fn empty_status_match_list_is_a_config_error() {
        let err = RowRules::new(&["  ".into()], &[]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    // ── Identifiers & cells ─────────────────────────────────────

    #[test]
    fn float_ids_become_integers() {
        assert_eq!(clean_order_id("123.0"), "123");
        assert_eq!(clean_order_id(" 4512 "), "4512");
    }

    #[test]
    fn long_integer_ids_are_kept_verbatim() {
        assert_eq!(clean_order_id("12345678901234567"), "12345678901234567");
        assert_eq!(clean_order_id("12345678901234567.0"), "12345678901234567");
        assert_eq!(
            clean_order_id("123456789012345678901"),
            "123456789012345678901"
        );
    }

    #[test]
    fn text_ids_pass_through() {
        assert_eq!(clean_order_id("OF-55A"), "OF-55A");
        assert_eq!(clean_order_id(""), "");
    }

    #[test]
    fn nan_placeholders_become_blank() {
        assert_eq!(clean_order_id("nan"), "");
        assert_eq!(clean_cell("NaN"), "");
        assert_eq!(clean_cell("null"), "");
        assert_eq!(clean_cell(" ACME "), "ACME");
    }

    // ── Whole rows ──────────────────────────────────────────────

    #[test]
    fn interprets_eligible_row() {
        let raw = RawRecord::new("10/12/2025 à 16/12/2025", "123.0", " Em Produção ")
            .with_client("ACME")
            .with_sector("Tintas");
        let order = interpret(&raw, &rules()).unwrap();
        assert_eq!(order.due_date, date(2025, 12, 16));
        assert_eq!(order.order_id, "123");
        assert_eq!(order.status_raw, "Em Produção");
        assert_eq!(order.status_normalized, "em producao");
        assert_eq!(order.client, "ACME");
        assert_eq!(order.sector, "Tintas");
    }

    #[test]
    fn finished_row_is_rejected_regardless_of_date() {
        let raw = RawRecord::new("01/01/2020", "9", "Finalizada");
        assert_eq!(rules().interpret(&raw), Err(Rejection::Status));
    }

    #[test]
    fn eligible_row_without_date_is_dropped() {
        let raw = RawRecord::new("a definir", "9", "Nova");
        assert_eq!(rules().interpret(&raw), Err(Rejection::DueDate));
        assert!(interpret(&raw, &rules()).is_none());
    }
}
