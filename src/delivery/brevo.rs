//! Brevo transactional email client (`POST /v3/smtp/email`).

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use crate::delivery::types::{DeliveryOutcome, Mailer, OutboundEmail};
use crate::error::DeliveryError;

/// Production endpoint for transactional sends.
pub const DEFAULT_BREVO_API_URL: &str = "https://api.brevo.com/v3/smtp/email";

/// Sends email through Brevo's HTTP API.
pub struct BrevoMailer {
    api_key: SecretString,
    api_url: String,
    client: reqwest::Client,
}

impl BrevoMailer {
    pub fn new(api_key: SecretString, api_url: impl Into<String>) -> Self {
        Self {
            api_key,
            api_url: api_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl Mailer for BrevoMailer {
    fn name(&self) -> &str {
        "brevo"
    }

    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryOutcome, DeliveryError> {
        let resp = self
            .client
            .post(&self.api_url)
            .header("api-key", self.api_key.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(email)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport {
                provider: "brevo".into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        let detail = match resp.text().await {
            Ok(text) => text,
            Err(e) => format!("<unreadable body: {e}>"),
        };
        let outcome = DeliveryOutcome {
            status: status.as_u16(),
            detail,
        };

        if outcome.is_success() {
            info!(
                status = outcome.status,
                recipients = email.to.len(),
                "Brevo accepted email"
            );
        } else {
            warn!(
                status = outcome.status,
                detail = %outcome.detail,
                "Brevo rejected email"
            );
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailer_name_and_url() {
        let mailer = BrevoMailer::new(SecretString::from("xkeysib-test"), DEFAULT_BREVO_API_URL);
        assert_eq!(mailer.name(), "brevo");
        assert_eq!(mailer.api_url(), "https://api.brevo.com/v3/smtp/email");
    }

    fn sample_email() -> OutboundEmail {
        OutboundEmail {
            sender: crate::delivery::Contact::new("a@example.com"),
            to: vec![crate::delivery::Contact::new("b@example.com")],
            subject: "s".into(),
            html_content: "<p></p>".into(),
        }
    }

    #[tokio::test]
    async fn truncated_error_body_is_reported_in_detail() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let _ = socket.read(&mut buf).await;
            // Promise more bytes than are sent, then hang up.
            let _ = socket
                .write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 100\r\n\r\nshort")
                .await;
            let _ = socket.shutdown().await;
        });

        let mailer = BrevoMailer::new(
            SecretString::from("k"),
            format!("http://127.0.0.1:{port}/v3/smtp/email"),
        );
        let outcome = mailer.send(&sample_email()).await.unwrap();
        assert_eq!(outcome.status, 400);
        assert!(!outcome.is_success());
        assert!(outcome.detail.starts_with("<unreadable body:"), "{}", outcome.detail);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        // Grab a free port, then close it so nothing is listening.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mailer = BrevoMailer::new(
            SecretString::from("k"),
            format!("http://127.0.0.1:{port}/v3/smtp/email"),
        );
        let err = mailer.send(&sample_email()).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Transport { .. }));
    }
}
