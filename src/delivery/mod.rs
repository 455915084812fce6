//! Outbound email delivery.

pub mod brevo;
pub mod types;

pub use brevo::{BrevoMailer, DEFAULT_BREVO_API_URL};
pub use types::{Contact, DeliveryOutcome, Mailer, OutboundEmail};

use crate::config::MailConfig;
use crate::error::ConfigError;

/// Build the configured mailer, or `None` for a dry run.
///
/// Fails when delivery is enabled but no API key is set.
pub fn from_config(mail: &MailConfig, dry_run: bool) -> Result<Option<BrevoMailer>, ConfigError> {
    if dry_run {
        return Ok(None);
    }
    let api_key = mail.credential()?.clone();
    Ok(Some(BrevoMailer::new(api_key, mail.api_url.clone())))
}
