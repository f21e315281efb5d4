use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canales de entrega soportados por la plataforma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Sms,
    Whatsapp,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::Sms => "sms",
            DeliveryMethod::Whatsapp => "whatsapp",
        }
    }

    /// Etiqueta en mayúsculas para mensajes de error ("SMS: ...").
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryMethod::Sms => "SMS",
            DeliveryMethod::Whatsapp => "WHATSAPP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Sending,
    Completed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Sending => "sending",
            CampaignStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(CampaignStatus::Draft),
            "sending" => Ok(CampaignStatus::Sending),
            "completed" => Ok(CampaignStatus::Completed),
            other => Err(anyhow!("Estado de campaña desconocido: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    /// Subconjunto no vacío de canales; inmutable una vez iniciada la ejecución.
    pub methods: Vec<DeliveryMethod>,
    /// Puede contener el token `<recipient_name>` para personalización.
    pub message_text: String,
    pub created_datetime: DateTime<Utc>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub created_by: String,
    pub status: CampaignStatus,
}

/// Request para crear una campaña junto con sus destinatarios.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaignRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub methods: Vec<DeliveryMethod>,
    pub message_text: String,
    pub created_by: String,
    #[serde(default)]
    pub recipient_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateCampaignResponse {
    pub id: String,
    pub message: String,
}

/// Para listar campañas con paginación
#[derive(Debug, Clone, Serialize)]
pub struct ListCampaignsResponse {
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub items: Vec<Campaign>,
}
