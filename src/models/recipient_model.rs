use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
    pub name: String,
    /// Teléfono normalizado; clave única para deduplicación.
    pub telephone: String,
    pub email: String,
    pub interests: Vec<String>,
    pub created_datetime: DateTime<Utc>,
    pub updated_datetime: DateTime<Utc>,
}

/// Fila ya parseada de un archivo de carga (el parseo CSV/Excel queda fuera
/// de este servicio; el front envía las filas listas).
#[derive(Debug, Clone, Deserialize)]
pub struct UploadRecipient {
    pub name: String,
    pub telephone: String,
    pub email: String,
    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadRecipientsRequest {
    pub user_id: String,
    pub recipients: Vec<UploadRecipient>,
}

/// Resumen de una carga de destinatarios.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    pub success: bool,
    pub processed: u64,
    pub created: u64,
    pub updated: u64,
    pub duplicates: u64,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListRecipientsResponse {
    pub total: u64,
    pub items: Vec<Recipient>,
}
