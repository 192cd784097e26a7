use std::future::Future;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::HealthSettings;
use crate::utils::ClientError;

/// Something that can tell whether the broker side is ready for a connect.
///
/// Implementations must be total: every failure is reported as `false`.
pub trait HealthProbe: Send + Sync {
    fn check_health(&self) -> impl Future<Output = bool> + Send;
}

/// Probes `GET <url>` and reports healthy iff the JSON body has `"status": "UP"`.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpHealthProbe {
    pub fn new(settings: &HealthSettings) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;
        Ok(Self {
            client,
            url: settings.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Runs one probe and returns why it failed, if it did.
    pub async fn probe(&self) -> Result<(), ClientError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        info!("{}", body);

        let json: Value = serde_json::from_str(&body)?;
        match json.get("status").and_then(Value::as_str) {
            Some("UP") => Ok(()),
            _ => Err(ClientError::HealthDown),
        }
    }
}

impl HealthProbe for HttpHealthProbe {
    async fn check_health(&self) -> bool {
        match self.probe().await {
            Ok(()) => true,
            Err(e) => {
                debug!(url = %self.url, reason = e.as_label(), "health probe failed: {e}");
                false
            }
        }
    }
}
