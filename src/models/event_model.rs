use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Evento del log de actividad. El append es fire-and-forget: un fallo al
/// registrar nunca bloquea ni hace fallar al motor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEventLog {
    pub id: Option<String>,
    pub user_id: String,
    pub action: String,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub campaign_id: Option<String>,
}

impl UserEventLog {
    pub fn new(
        user_id: &str,
        action: &str,
        details: serde_json::Value,
        campaign_id: Option<&str>,
    ) -> Self {
        UserEventLog {
            id: None,
            user_id: user_id.to_string(),
            action: action.to_string(),
            details,
            timestamp: Utc::now(),
            campaign_id: campaign_id.map(|s| s.to_string()),
        }
    }
}

/// Para listar eventos con paginación
#[derive(Debug, Clone, Serialize)]
pub struct ListEventsResponse {
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub items: Vec<UserEventLog>,
}
