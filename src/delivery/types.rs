//! Email payload types and the mailer seam.

use async_trait::async_trait;
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

use crate::error::DeliveryError;

/// A named mailbox: sender or recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
}

impl Contact {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
        }
    }

    pub fn named(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: email.into(),
        }
    }

    /// Parse `user@example.com` or `Display Name <user@example.com>`.
    ///
    /// Returns `None` when the address is not a valid RFC 5322 mailbox.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let (name, email) = match (input.find('<'), input.rfind('>')) {
            (Some(start), Some(end)) if start < end => {
                let name = input[..start].trim().trim_matches('"').trim();
                let email = input[start + 1..end].trim();
                let name = (!name.is_empty()).then(|| name.to_string());
                (name, email)
            }
            _ => (None, input),
        };

        if !EmailAddress::is_valid(email) {
            return None;
        }
        Some(Self {
            name,
            email: email.to_string(),
        })
    }
}

/// A ready-to-send HTML email, in Brevo's transactional JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundEmail {
    pub sender: Contact,
    pub to: Vec<Contact>,
    pub subject: String,
    pub html_content: String,
}

/// What the provider answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// HTTP status code returned by the provider.
    pub status: u16,
    /// Response body, kept verbatim for diagnostics.
    pub detail: String,
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for email delivery collaborators — pure I/O, no formatting.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Provider name for logs (e.g. "brevo").
    fn name(&self) -> &str;

    /// Hand one email to the provider.
    ///
    /// A non-2xx answer is returned as `Ok` with the provider's status and
    /// text. `Err` means the provider could not be reached at all.
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryOutcome, DeliveryError>;
}
