use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::config::provider_config::ProviderConfig;
use crate::models::campaign_model::DeliveryMethod;
use crate::models::message_model::{DeliveryErrorKind, MessageResult};

pub const MAX_SEND_ATTEMPTS: u32 = 3;

/// Contrato uniforme de envío por canal. Nunca propaga errores: fallos de
/// transporte o de parseo se capturan y regresan como MessageResult fallido,
/// de modo que la política de reintentos los trate igual que un rechazo del
/// proveedor.
#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn send(&self, method: DeliveryMethod, to: &str, message: &str) -> MessageResult;
}

/// Gateway real: una llamada HTTP saliente por envío al endpoint del canal.
/// El endpoint acepta {"to", "message"} y responde
/// {"success", "messageId"?, "error"?} con status HTTP espejo del proveedor.
#[derive(Clone)]
pub struct ProviderGateway {
    http_client: Client,
    config: ProviderConfig,
}

impl ProviderGateway {
    pub fn new(config: ProviderConfig) -> Self {
        ProviderGateway {
            http_client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl MessageGateway for ProviderGateway {
    async fn send(&self, method: DeliveryMethod, to: &str, message: &str) -> MessageResult {
        let url = self.config.endpoint_for(method);
        let payload = serde_json::json!({
            "to": to,
            "message": message,
        });

        let response = match self.http_client.post(url).json(&payload).send().await {
            Ok(r) => r,
            Err(e) => {
                log::error!(
                    "(send) Error de transporte enviando {} a '{}': {}",
                    method.as_str(),
                    to,
                    e
                );
                return MessageResult::failure(e.to_string(), DeliveryErrorKind::Transient);
            }
        };

        let status = response.status();
        let body = match response.json::<serde_json::Value>().await {
            Ok(v) => v,
            Err(e) => {
                log::error!(
                    "(send) Respuesta ilegible del gateway {} (status={}): {}",
                    method.as_str(),
                    status,
                    e
                );
                return MessageResult::failure(
                    format!("Respuesta ilegible del proveedor: {}", e),
                    DeliveryErrorKind::Transient,
                );
            }
        };

        if status.is_success() {
            let message_id = body
                .get("messageId")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());

            return MessageResult {
                success: true,
                message_id,
                error: None,
                error_kind: None,
                attempts: 1,
            };
        }

        let fallback = match method {
            DeliveryMethod::Sms => "Failed to send SMS",
            DeliveryMethod::Whatsapp => "Failed to send WhatsApp message",
        };
        let error = body
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or(fallback)
            .to_string();

        MessageResult::failure(error, classify_status(status))
    }
}

/// 4xx: rechazo permanente del proveedor, reintentar no ayuda.
/// 5xx y errores de transporte: transitorios.
pub fn classify_status(status: StatusCode) -> DeliveryErrorKind {
    if status.is_client_error() {
        DeliveryErrorKind::Permanent
    } else {
        DeliveryErrorKind::Transient
    }
}

/// Política de reintentos: intentos 1..=max_attempts secuenciales con backoff
/// exponencial de 2^i segundos tras el intento fallido i (2s, 4s, ...), sin
/// jitter. Un fallo permanente corta los intentos restantes. Si todos fallan
/// se devuelve el último resultado con attempts = max_attempts.
pub async fn send_with_retry(
    gateway: &dyn MessageGateway,
    method: DeliveryMethod,
    to: &str,
    message: &str,
    max_attempts: u32,
) -> MessageResult {
    let mut last = MessageResult {
        success: false,
        message_id: None,
        error: Some("No attempts made".to_string()),
        error_kind: None,
        attempts: 0,
    };

    for attempt in 1..=max_attempts {
        last = gateway.send(method, to, message).await;
        last.attempts = attempt;

        if last.success {
            return last;
        }

        if matches!(last.error_kind, Some(DeliveryErrorKind::Permanent)) {
            log::warn!(
                "(send_with_retry) Fallo permanente en {} hacia '{}' (intento {}), no se reintenta: {:?}",
                method.as_str(),
                to,
                attempt,
                last.error
            );
            return last;
        }

        if attempt < max_attempts {
            let backoff = Duration::from_secs(2u64.pow(attempt));
            log::info!(
                "(send_with_retry) Intento {} de {} falló para '{}', esperando {:?}...",
                attempt,
                method.as_str(),
                to,
                backoff
            );
            tokio::time::sleep(backoff).await;
        }
    }

    last
}
