use serde::Serialize;

/// Clasificación de fallos del proveedor: los transitorios se reintentan,
/// los permanentes (4xx) cortan los reintentos restantes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryErrorKind {
    Transient,
    Permanent,
}

/// Resultado de un envío por un canal (gateway + política de reintentos).
/// No se persiste directamente; el motor lo consume para actualizar la fila
/// de entrega y agregar conteos.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResult {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
    pub error_kind: Option<DeliveryErrorKind>,
    pub attempts: u32,
}

impl MessageResult {
    pub fn failure(error: String, kind: DeliveryErrorKind) -> Self {
        MessageResult {
            success: false,
            message_id: None,
            error: Some(error),
            error_kind: Some(kind),
            attempts: 1,
        }
    }
}

/// Agregado devuelto al invocador del motor.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CampaignExecutionResult {
    pub total_recipients: usize,
    pub success_count: usize,
    pub failure_count: usize,
    /// Un string legible por destinatario fallido, concatenando los fallos
    /// por canal.
    pub errors: Vec<String>,
}

/// Progreso incremental reportado antes de intentar cada destinatario.
/// `sent` es el índice pre-incremento (cuántas filas ya se procesaron).
#[derive(Debug, Clone, Serialize)]
pub struct CampaignProgress {
    pub sent: usize,
    pub total: usize,
    pub current_recipient: String,
}
