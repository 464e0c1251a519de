//! Delivery of cancellation emails.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use eyre::{Result, WrapErr};
use mentorunden_core::{notification::CancellationEmail, ports::Notifier};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ApiConfig;

/// Picks the HTTP notifier when an email API is configured, otherwise logs.
pub fn from_config(config: &ApiConfig) -> Result<Arc<dyn Notifier>> {
    match &config.email {
        Some(email) => {
            info!(api_url = %email.api_url, "Sending notifications through the email API");
            Ok(Arc::new(HttpEmailNotifier::new(
                email.api_url.clone(),
                email.api_key.clone(),
                config.email_from.clone(),
                config.web_url.clone(),
                Duration::from_secs(config.notification_timeout),
            )?))
        }
        None => {
            info!("No email API configured; notifications will only be logged");
            Ok(Arc::new(LogNotifier::new(config.web_url.clone())))
        }
    }
}

/// Writes emails to the log instead of sending them.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    web_url: String,
}

impl LogNotifier {
    pub fn new(web_url: impl Into<String>) -> Self {
        Self { web_url: web_url.into() }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_cancellation_email(&self, email: &CancellationEmail) -> Result<()> {
        info!(to = %email.student_email, subject = email.subject(), "Email not sent (no email API configured)");
        debug!(body = %email.text_body(&self.web_url));
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: String,
    text: String,
}

/// Posts emails as JSON to a transactional email API.
#[derive(Debug, Clone)]
pub struct HttpEmailNotifier {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
    web_url: String,
}

impl HttpEmailNotifier {
    pub fn new(
        api_url: String,
        api_key: String,
        from: String,
        web_url: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .wrap_err("Failed to build email HTTP client")?;

        Ok(Self {
            client,
            api_url,
            api_key,
            from,
            web_url,
        })
    }
}

#[async_trait]
impl Notifier for HttpEmailNotifier {
    async fn send_cancellation_email(&self, email: &CancellationEmail) -> Result<()> {
        let payload = OutgoingEmail {
            from: &self.from,
            to: &email.student_email,
            subject: email.subject(),
            html: email.html_body(&self.web_url),
            text: email.text_body(&self.web_url),
        };

        self.client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .wrap_err("Email API request failed")?
            .error_for_status()
            .wrap_err("Email API rejected the message")?;

        info!(to = %email.student_email, "Cancellation email sent");
        Ok(())
    }
}
