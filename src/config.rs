//! Configuration types, built from environment variables.
//!
//! Every knob that drifted between the old script copies (alert horizon,
//! column positions, status keywords, range separators) lives here.

use std::path::PathBuf;

use chrono::NaiveDate;
use secrecy::SecretString;

use crate::delivery::{Contact, DEFAULT_BREVO_API_URL};
use crate::error::ConfigError;
use crate::source::sheet_export_url;

/// Default alert horizon in business days.
pub const DEFAULT_HORIZON_BUSINESS_DAYS: u32 = 3;

/// Default sheet tab when only a sheet id is configured.
pub const DEFAULT_SHEET_NAME: &str = "Pedidos";

// ── Columns ─────────────────────────────────────────────────────────

/// Reference to a sheet column, by zero-based position or header text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl ColumnRef {
    /// Digits are a position; anything else is a header name.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        Some(match token.parse::<usize>() {
            Ok(index) => Self::Index(index),
            Err(_) => Self::Name(token.to_string()),
        })
    }
}

/// Where each logical work-order field lives in the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub due_date: ColumnRef,
    pub order_id: ColumnRef,
    pub status: ColumnRef,
    pub client: ColumnRef,
    pub sector: ColumnRef,
}

impl ColumnMap {
    /// Parse `date,order,status,client,sector`.
    pub fn parse(list: &str) -> Result<Self, ConfigError> {
        let refs: Vec<ColumnRef> = list
            .split(',')
            .map(|t| {
                ColumnRef::parse(t).ok_or_else(|| {
                    ConfigError::invalid("OF_ALERT_COLUMNS", format!("empty column in {list:?}"))
                })
            })
            .collect::<Result<_, _>>()?;

        let [due_date, order_id, status, client, sector]: [ColumnRef; 5] =
            refs.try_into().map_err(|refs: Vec<ColumnRef>| {
                ConfigError::invalid(
                    "OF_ALERT_COLUMNS",
                    format!("expected 5 columns (date,order,status,client,sector), got {}", refs.len()),
                )
            })?;

        Ok(Self {
            due_date,
            order_id,
            status,
            client,
            sector,
        })
    }
}

impl Default for ColumnMap {
    /// Layout of the "Pedidos" sheet: A=date, B=OF, C=status, D=client, I=sector.
    fn default() -> Self {
        Self {
            due_date: ColumnRef::Index(0),
            order_id: ColumnRef::Index(1),
            status: ColumnRef::Index(2),
            client: ColumnRef::Index(3),
            sector: ColumnRef::Index(8),
        }
    }
}

// ── Alert rules ─────────────────────────────────────────────────────

/// Settings for interpreting and classifying rows.
#[derive(Debug, Clone)]
pub struct AlertSettings {
    /// Orders due within this many business days are reported (inclusive).
    pub horizon_business_days: u32,
    /// Sheet column layout.
    pub columns: ColumnMap,
    /// A row is watched when its normalized status contains any of these.
    pub status_matches: Vec<String>,
    /// Separators between the start and end of a date range.
    pub range_separators: Vec<String>,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            horizon_business_days: DEFAULT_HORIZON_BUSINESS_DAYS,
            columns: ColumnMap::default(),
            status_matches: vec!["produc".into(), "nova".into()],
            range_separators: ["até", "à", "a", "–", "-"].map(String::from).to_vec(),
        }
    }
}

// ── Source ──────────────────────────────────────────────────────────

/// Where the work-order sheet is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    /// CSV export URL.
    Url(String),
    /// Local CSV file.
    File(PathBuf),
}

// ── Mail ────────────────────────────────────────────────────────────

/// Envelope of the alert email.
#[derive(Debug, Clone)]
pub struct MessageSettings {
    pub sender: Contact,
    pub recipients: Vec<Contact>,
    pub subject: String,
}

/// Delivery configuration.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Brevo API key. `None` when `BREVO_API_KEY` is unset or blank.
    pub api_key: Option<SecretString>,
    pub api_url: String,
    pub message: MessageSettings,
}

impl MailConfig {
    /// The API key, or the configuration error that blocks delivery.
    pub fn credential(&self) -> Result<&SecretString, ConfigError> {
        self.api_key.as_ref().ok_or_else(|| {
            ConfigError::missing(
                "BREVO_API_KEY",
                "Set it to a Brevo API key, or set OF_ALERT_DRY_RUN=1 to only render the report.",
            )
        })
    }
}

// ── Application ─────────────────────────────────────────────────────

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub alert: AlertSettings,
    pub mail: MailConfig,
    /// Render the report without sending it.
    pub dry_run: bool,
    /// Fixed "today" for reproducible runs.
    pub today: Option<NaiveDate>,
    /// Directory for rolling log files, in addition to stderr.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Build config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from any key → value lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let dry_run = get("OF_ALERT_DRY_RUN").is_some_and(|v| parse_flag(&v));

        let source = if let Some(path) = get("OF_ALERT_SHEET_FILE") {
            SourceConfig::File(PathBuf::from(path))
        } else if let Some(url) = get("OF_ALERT_SHEET_URL") {
            SourceConfig::Url(url)
        } else if let Some(sheet_id) = get("OF_ALERT_SHEET_ID") {
            let sheet_name =
                get("OF_ALERT_SHEET_NAME").unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());
            SourceConfig::Url(sheet_export_url(&sheet_id, &sheet_name)?)
        } else {
            return Err(ConfigError::missing(
                "OF_ALERT_SHEET_ID",
                "Set OF_ALERT_SHEET_ID, OF_ALERT_SHEET_URL or OF_ALERT_SHEET_FILE.",
            ));
        };

        let defaults = AlertSettings::default();

        let horizon_business_days = match get("OF_ALERT_HORIZON_DAYS") {
            Some(v) => v.parse::<u32>().map_err(|e| {
                ConfigError::invalid("OF_ALERT_HORIZON_DAYS", format!("{v:?}: {e}"))
            })?,
            None => defaults.horizon_business_days,
        };

        let columns = match get("OF_ALERT_COLUMNS") {
            Some(v) => ColumnMap::parse(&v)?,
            None => defaults.columns,
        };

        let status_matches = get("OF_ALERT_STATUS_MATCH")
            .map(|v| split_list(&v, ','))
            .unwrap_or(defaults.status_matches);

        let range_separators = get("OF_ALERT_RANGE_SEPARATORS")
            .map(|v| split_list(&v, '|'))
            .unwrap_or(defaults.range_separators);

        let sender_name =
            get("OF_ALERT_SENDER_NAME").unwrap_or_else(|| "Sistema de Alertas de OFs".to_string());
        let sender = match get("OF_ALERT_SENDER_EMAIL") {
            Some(email) => {
                let contact = Contact::parse(&email).ok_or_else(|| {
                    ConfigError::invalid("OF_ALERT_SENDER_EMAIL", format!("{email:?} is not an email address"))
                })?;
                Contact {
                    name: contact.name.or(Some(sender_name)),
                    email: contact.email,
                }
            }
            None if dry_run => Contact::named(sender_name, "dry-run@localhost.invalid"),
            None => {
                return Err(ConfigError::missing(
                    "OF_ALERT_SENDER_EMAIL",
                    "Set it to a sender address verified in Brevo.",
                ));
            }
        };

        let recipients = match get("OF_ALERT_RECIPIENTS") {
            Some(list) => split_list(&list, ',')
                .iter()
                .map(|r| {
                    Contact::parse(r).ok_or_else(|| {
                        ConfigError::invalid("OF_ALERT_RECIPIENTS", format!("{r:?} is not an email address"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        if recipients.is_empty() && !dry_run {
            return Err(ConfigError::missing(
                "OF_ALERT_RECIPIENTS",
                "Set it to a comma-separated list of email addresses.",
            ));
        }

        let subject = get("OF_ALERT_SUBJECT")
            .unwrap_or_else(|| "Relatório de OFs – Atrasos e Alertas".to_string());

        let today = match get("OF_ALERT_TODAY") {
            Some(v) => Some(NaiveDate::parse_from_str(&v, "%Y-%m-%d").map_err(|e| {
                ConfigError::invalid("OF_ALERT_TODAY", format!("{v:?}: {e} (expected YYYY-MM-DD)"))
            })?),
            None => None,
        };

        Ok(Self {
            source,
            alert: AlertSettings {
                horizon_business_days,
                columns,
                status_matches,
                range_separators,
            },
            mail: MailConfig {
                api_key: get("BREVO_API_KEY").map(SecretString::from),
                api_url: get("BREVO_API_URL").unwrap_or_else(|| DEFAULT_BREVO_API_URL.to_string()),
                message: MessageSettings {
                    sender,
                    recipients,
                    subject,
                },
            },
            dry_run,
            today,
            log_dir: get("OF_ALERT_LOG_DIR").map(PathBuf::from),
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn split_list(value: &str, sep: char) -> Vec<String> {
    value
        .split(sep)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
