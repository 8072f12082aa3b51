use std::time::Duration;

use reqwest::{
    StatusCode,
    blocking::Client,
    header::{ACCEPT, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::domain::Notification;

pub const DEFAULT_ENDPOINT: &str = "https://www.pushplus.plus/send";
pub const DEFAULT_TOPIC: &str = "macro_reminder_group";
pub const DEFAULT_CHANNEL: &str = "wechat";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
const USER_AGENT_HEADER: &str = "macro-reminder/0.1";
const SUCCESS_CODE: i64 = 200;
const HTML_TEMPLATE: &str = "html";
// 1 = group broadcast, 2 = single recipient.
const SEND_TYPE_GROUP: u8 = 1;

/// Routing and transport settings for the PushPlus endpoint.
#[derive(Clone, Debug)]
pub struct PushSettings {
    pub endpoint: String,
    pub topic: String,
    pub channel: String,
    pub timeout: Duration,
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            topic: DEFAULT_TOPIC.to_owned(),
            channel: DEFAULT_CHANNEL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

pub struct PushPlusClient {
    client: Client,
    settings: PushSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub message_id: Option<String>,
}

impl PushPlusClient {
    pub fn new(settings: PushSettings) -> Result<Self, SendError> {
        let client = Client::builder()
            .user_agent(USER_AGENT_HEADER)
            .timeout(settings.timeout)
            .build()
            .map_err(SendError::Http)?;
        Ok(Self { client, settings })
    }

    /// Sends one group notification. Exactly one request is made; failures are
    /// returned, never retried.
    pub fn send(
        &self,
        token: Option<&str>,
        notification: &Notification,
    ) -> Result<SendReceipt, SendError> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(SendError::MissingToken)?;

        let payload = SendPayload {
            token,
            title: &notification.title,
            content: &notification.content,
            template: HTML_TEMPLATE,
            topic: &self.settings.topic,
            channel: &self.settings.channel,
            send_type: SEND_TYPE_GROUP,
        };

        info!(
            endpoint = %self.settings.endpoint,
            topic = %self.settings.topic,
            title = %notification.title,
            "sending group notification"
        );
        let response = self
            .client
            .post(&self.settings.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&payload)
            .send()?;
        let status = response.status();
        let body = response.text()?;
        info!(status = status.as_u16(), body = %body, "push service responded");

        let outcome = evaluate_response(status, &body);
        match &outcome {
            Ok(receipt) => info!(message_id = ?receipt.message_id, "group notification sent"),
            Err(err) => error!(error = %err, "group notification failed"),
        }
        outcome
    }
}

/// Success requires HTTP 200 *and* a `code` of 200 in the body.
pub fn evaluate_response(status: StatusCode, body: &str) -> Result<SendReceipt, SendError> {
    if status != StatusCode::OK {
        return Err(SendError::Status {
            status: status.as_u16(),
            body: body.to_owned(),
        });
    }

    let response: SendResponse = serde_json::from_str(body)?;
    if response.code != SUCCESS_CODE {
        return Err(SendError::Rejected {
            code: response.code,
            msg: response.msg.unwrap_or_default(),
        });
    }

    let message_id = match response.data {
        Some(Value::String(id)) => Some(id),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    };
    Ok(SendReceipt { message_id })
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("PUSHPLUS_TOKEN is not configured")]
    MissingToken,
    #[error("Push request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Push service returned an unreadable response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Push service answered HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Push service rejected the notification with code {code}: {msg}")]
    Rejected { code: i64, msg: String },
}

// Wire payloads --------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SendPayload<'a> {
    token: &'a str,
    title: &'a str,
    content: &'a str,
    template: &'a str,
    topic: &'a str,
    channel: &'a str,
    #[serde(rename = "sendType")]
    send_type: u8,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

// -------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------
