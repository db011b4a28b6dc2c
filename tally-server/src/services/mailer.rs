//! Outbound mail dispatch
//!
//! Mail is delivered through an HTTP relay (JSON POST) and is strictly
//! best-effort: every send happens off the request path via
//! `tokio::spawn`, retries up to [`MAX_RETRIES`] times, then drops the
//! message with an error log. A failed notification never fails the
//! request that triggered it.

use serde::Serialize;

/// Delivery attempts before the message is dropped
const MAX_RETRIES: u32 = 3;

/// Mail relay configuration
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// HTTP relay endpoint; `None` disables delivery (logs only)
    pub relay_url: Option<String>,
    pub from_address: String,
    pub from_name: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            relay_url: None,
            from_address: "no-reply@tally.local".to_string(),
            from_name: "Tally".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct OutboundMail<'a> {
    from: String,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Best-effort mail dispatcher
#[derive(Clone)]
pub struct MailerService {
    client: reqwest::Client,
    config: MailConfig,
}

impl MailerService {
    pub fn new(config: MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Fire-and-forget send: returns immediately, delivery happens in
    /// a background task
    pub fn send_async(&self, recipient: String, subject: String, body: String) {
        let mailer = self.clone();
        tokio::spawn(async move {
            mailer.send(&recipient, &subject, &body).await;
        });
    }

    /// Deliver with bounded retries, then drop with a log
    pub async fn send(&self, recipient: &str, subject: &str, body: &str) {
        for attempt in 1..=MAX_RETRIES {
            match self.deliver(recipient, subject, body).await {
                Ok(()) => {
                    tracing::debug!(recipient, subject, "Mail delivered");
                    return;
                }
                Err(e) => {
                    tracing::warn!(
                        recipient,
                        subject,
                        attempt,
                        error = %e,
                        "Mail delivery attempt failed"
                    );
                }
            }
        }
        tracing::error!(
            recipient,
            subject,
            retries = MAX_RETRIES,
            "Dropping mail after exhausting retries"
        );
    }

    async fn deliver(&self, recipient: &str, subject: &str, body: &str) -> Result<(), reqwest::Error> {
        let Some(relay_url) = &self.config.relay_url else {
            // No relay configured (development): log and treat as delivered
            tracing::debug!(recipient, subject, "Mail relay not configured, skipping delivery");
            return Ok(());
        };

        let payload = OutboundMail {
            from: format!("{} <{}>", self.config.from_name, self.config.from_address),
            to: recipient,
            subject,
            body,
        };

        self.client
            .post(relay_url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
