use crate::config::toml_config::MailConfig;
use crate::domain::model::OutgoingEmail;
use crate::domain::ports::Mailer;
use crate::utils::error::{DirectoryError, Result};
use crate::utils::validation::validate_required_field;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

/// Resend 交易郵件 API
#[derive(Debug, Clone)]
pub struct ResendMailer {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ResendMailer {
    pub fn new(config: &MailConfig, timeout_seconds: u64) -> Result<Self> {
        let api_key = validate_required_field("mail.api_key", &config.api_key)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint().trim_end_matches('/').to_string(),
            api_key: api_key.clone(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<String> {
        let url = format!("{}/emails", self.endpoint);
        tracing::debug!("Sending email '{}' via {}", email.subject, url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::MailError {
                message: format!("HTTP {}: {}", status.as_u16(), body),
            });
        }

        let sent: SendResponse = response.json().await?;
        Ok(sent.id)
    }
}
