// models/paystack.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct InitializeRequest {
    pub email: String,
    pub amount: i64,
    pub reference: String,
    pub callback_url: String,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct InitializeEnvelope {
    pub status: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<InitializeData>,
}

#[derive(Debug, Deserialize)]
pub struct InitializeData {
    pub authorization_url: String,
    #[serde(default)]
    pub reference: Option<String>,
}

/// Result of a successful initialize call.
#[derive(Debug, Clone, PartialEq)]
pub struct Initialized {
    pub authorization_url: String,
    pub gateway_reference: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEnvelope {
    pub status: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<VerifyData>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VerifyData {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

/// A verify response whose shape has been checked at the client boundary.
/// `raw` is the untouched body, kept for the audit trail.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub status: bool,
    pub message: Option<String>,
    pub data: VerifyData,
    pub raw: Value,
}

impl Verification {
    pub fn from_raw(raw: Value) -> Result<Self, serde_json::Error> {
        let envelope: VerifyEnvelope = serde_json::from_value(raw.clone())?;
        Ok(Verification {
            status: envelope.status,
            message: envelope.message,
            data: envelope.data.unwrap_or_default(),
            raw,
        })
    }
}

/// `{event, data}` as pushed to the webhook endpoint. Any JSON object
/// deserializes; a missing or non-string `event` is simply not a charge event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default)]
    pub event: Option<Value>,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeEvent {
    Success,
    Failed,
}

impl ChargeEvent {
    pub fn parse(event: &str) -> Option<Self> {
        match event {
            "charge.success" => Some(ChargeEvent::Success),
            "charge.failed" => Some(ChargeEvent::Failed),
            _ => None,
        }
    }
}

impl WebhookEnvelope {
    pub fn event_name(&self) -> Option<&str> {
        self.event.as_ref().and_then(Value::as_str)
    }

    pub fn charge_event(&self) -> Option<ChargeEvent> {
        self.event_name().and_then(ChargeEvent::parse)
    }

    pub fn reference(&self) -> Option<&str> {
        self.data
            .get("reference")
            .and_then(Value::as_str)
            .filter(|r| !r.is_empty())
    }

    pub fn gateway_reference(&self) -> Option<String> {
        self.data
            .get("paystack_reference")
            .and_then(Value::as_str)
            .map(String::from)
    }
}
