use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(DeliveryStatus::Pending),
            "sent" => Ok(DeliveryStatus::Sent),
            "failed" => Ok(DeliveryStatus::Failed),
            other => Err(anyhow!("Estado de entrega desconocido: {}", other)),
        }
    }
}

/// Fila de join campaña↔destinatario. Se crea con status=pending al crear la
/// campaña y el motor la muta durante la ejecución; nunca se borra.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRecipient {
    pub id: String,
    pub campaign_id: String,
    pub recipient_id: String,
    pub status: DeliveryStatus,
    pub sent_datetime: Option<DateTime<Utc>>,
    pub attempts: u32,
    pub error_message: Option<String>,
}
