use once_cell::sync::Lazy;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::config;
use crate::database::models::ContactMessage;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail relay request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("mail relay responded with status {0}")]
    RelayStatus(reqwest::StatusCode),
}

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Forward a stored contact message to the configured HTTP mail relay.
///
/// With no relay configured the message is kept in the store only; a
/// warning is logged and the submission still succeeds. This mirrors the
/// no-database degradation elsewhere in the service.
pub async fn relay_contact_message(message: &ContactMessage) -> Result<(), MailError> {
    let mail = &config::config().mail;

    let Some(relay_url) = mail.relay_url.as_deref() else {
        warn!("mail relay not configured; contact message {} stored without delivery", message.id);
        return Ok(());
    };

    let body = json!({
        "from": mail.from_address,
        "to": mail.contact_address,
        "reply_to": message.email,
        "subject": message.subject,
        "text": format!("From: {} <{}>\n\n{}", message.name, message.email, message.message),
    });

    let mut request = HTTP_CLIENT.post(relay_url).json(&body);
    if let Some(token) = mail.relay_token.as_deref() {
        request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(MailError::RelayStatus(response.status()));
    }

    info!("contact message {} relayed", message.id);
    Ok(())
}
