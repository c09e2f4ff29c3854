//! SMS gateway client.
//!
//! Delivery goes through an external HTTP gateway. Without a configured
//! gateway URL the service runs in disabled mode and only logs, which is
//! what local development and the test suite use.

use reqwest::Client;
use tracing::{info, warn};

#[derive(Clone)]
pub struct SmsService {
    client: Client,
    gateway_url: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug)]
pub enum SmsError {
    Gateway(String),
}

impl std::fmt::Display for SmsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SmsError::Gateway(msg) => write!(f, "SMS gateway error: {}", msg),
        }
    }
}

impl std::error::Error for SmsError {}

impl SmsService {
    pub fn new(gateway_url: Option<String>, api_key: Option<String>) -> Self {
        if gateway_url.is_none() {
            warn!("SMS_GATEWAY_URL not set, SMS delivery disabled");
        }
        Self {
            client: Client::new(),
            gateway_url,
            api_key,
        }
    }

    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            gateway_url: None,
            api_key: None,
        }
    }

    /// Deliver a verification code. A no-op in disabled mode.
    pub async fn send_code(&self, phone: &str, code: &str) -> Result<(), SmsError> {
        let Some(url) = &self.gateway_url else {
            info!(phone = %phone, "SMS delivery disabled, code not sent");
            return Ok(());
        };

        let payload = serde_json::json!({
            "to": phone,
            "message": format!("Your verification code is {}", code),
        });

        let mut request = self.client.post(url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SmsError::Gateway(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SmsError::Gateway(format!(
                "gateway returned {}",
                response.status()
            )));
        }

        info!(phone = %phone, "verification SMS sent");
        Ok(())
    }
}
