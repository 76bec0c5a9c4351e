use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use sedp_core::Notifier;
use sedp_core::notify::decision_message;
use sedp_types::{Registration, Status};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayload {
    registration_id: String,
    whatsapp_number: String,
    status: Status,
    unique_id: Option<String>,
    message: String,
}

/// Posts each decision to an external WhatsApp gateway.
///
/// Delivery runs as a detached task on the runtime captured at construction,
/// so the caller never waits on the gateway and never sees its failures.
pub struct WebhookNotifier {
    client: Client,
    url: String,
    runtime: Handle,
}

impl WebhookNotifier {
    /// Must be called from inside the tokio runtime.
    pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
            runtime: Handle::try_current()?,
        })
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, registration: &Registration, category_label: &str) {
        let payload = WebhookPayload {
            registration_id: registration.id.clone(),
            whatsapp_number: registration.whatsapp_number.clone(),
            status: registration.status,
            unique_id: registration.unique_id.clone(),
            message: decision_message(registration, category_label),
        };
        let client = self.client.clone();
        let url = self.url.clone();

        self.runtime.spawn(async move {
            match client.post(&url).json(&payload).send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!("Notified {} of registration {}", payload.whatsapp_number, payload.registration_id);
                }
                Ok(resp) => {
                    warn!("Notification webhook returned {} for {}", resp.status(), payload.registration_id);
                }
                Err(e) => {
                    warn!("Notification webhook failed for {}: {}", payload.registration_id, e);
                }
            }
        });
    }
}
