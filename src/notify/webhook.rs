use super::{NotificationSink, NotifyError};
use crate::config::NotificationConfig;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct WebhookSink {
    webhook_url: String,
    agent: ureq::Agent,
}

#[derive(Debug, Clone, Deserialize)]
struct WebhookResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl WebhookSink {
    pub fn new(config: &NotificationConfig) -> Self {
        let webhook_url = std::env::var("OPSDESK_WEBHOOK_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| config.webhook_url.clone());
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self { webhook_url, agent }
    }
}

impl NotificationSink for WebhookSink {
    fn notify(&self, destination: &Value, text: &str) -> Result<(), NotifyError> {
        let body = json!({
            "destination": destination,
            "text": text,
        });
        let response = self
            .agent
            .post(&self.webhook_url)
            .send_json(body)
            .map_err(|e| NotifyError::Request(e.to_string()))?;
        let parsed: WebhookResponse = response
            .into_json()
            .map_err(|e| NotifyError::Request(e.to_string()))?;
        if !parsed.ok {
            return Err(NotifyError::Response(
                parsed.error.unwrap_or_else(|| "webhook rejected".to_string()),
            ));
        }
        Ok(())
    }
}
