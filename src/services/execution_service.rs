use anyhow::{anyhow, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::campaign_model::Campaign;
use crate::models::campaign_recipient_model::DeliveryStatus;
use crate::models::event_model::UserEventLog;
use crate::models::message_model::{CampaignExecutionResult, CampaignProgress};
use crate::services::campaign_recipient_service::CampaignRecipientService;
use crate::services::campaign_service::CampaignService;
use crate::services::event_log_service::EventLogService;
use crate::services::gateway_service::{send_with_retry, MessageGateway, MAX_SEND_ATTEMPTS};
use crate::services::recipient_service::RecipientService;

/// Token que se sustituye por el nombre del destinatario.
pub const RECIPIENT_NAME_PLACEHOLDER: &str = "<recipient_name>";

/// Tope de filas al cargar el directorio de destinatarios (límite de escala,
/// no "sin límite").
pub const RECIPIENT_DIRECTORY_LIMIT: i64 = 1000;

/// Pausa de cortesía entre destinatarios para no saturar al proveedor.
const INTER_RECIPIENT_DELAY: Duration = Duration::from_millis(100);

/// Callback opcional de progreso; se invoca antes de intentar cada
/// destinatario.
pub type ProgressCallback<'a> = &'a (dyn Fn(CampaignProgress) + Send + Sync);

/// Falla fatal de ejecución. Carga el resultado parcial acumulado hasta el
/// momento del error para que el invocador conozca lo que sí pasó.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct CampaignExecutionError {
    #[source]
    pub source: anyhow::Error,
    pub partial: CampaignExecutionResult,
}

impl CampaignExecutionError {
    fn new(source: anyhow::Error, partial: CampaignExecutionResult) -> Self {
        CampaignExecutionError { source, partial }
    }
}

/// Motor de ejecución de campañas: transiciones de estado, personalización,
/// entrega multi-canal por destinatario, reporte de progreso, agregación y
/// recuperación ante fallas.
#[derive(Clone)]
pub struct CampaignExecutionService {
    campaign_service: CampaignService,
    recipient_service: RecipientService,
    campaign_recipient_service: CampaignRecipientService,
    event_log_service: EventLogService,
    gateway: Arc<dyn MessageGateway>,
}

impl CampaignExecutionService {
    pub fn new(
        campaign_service: CampaignService,
        recipient_service: RecipientService,
        campaign_recipient_service: CampaignRecipientService,
        event_log_service: EventLogService,
        gateway: Arc<dyn MessageGateway>,
    ) -> Self {
        CampaignExecutionService {
            campaign_service,
            recipient_service,
            campaign_recipient_service,
            event_log_service,
            gateway,
        }
    }

    /// Ejecuta la campaña de punta a punta.
    ///
    /// Máquina de estados: draft --(execute)--> sending --> completed;
    /// cualquier error fatal durante el procesamiento regresa la campaña a
    /// draft (rollback best-effort) y devuelve el error con el resultado
    /// parcial adjunto. Los destinatarios se procesan estrictamente uno a la
    /// vez, y dentro de cada uno los canales en secuencia.
    pub async fn execute_campaign(
        &self,
        campaign: &Campaign,
        on_progress: Option<ProgressCallback<'_>>,
    ) -> Result<CampaignExecutionResult, CampaignExecutionError> {
        let campaign_id = match campaign.id.as_deref() {
            Some(id) => id,
            None => {
                return Err(CampaignExecutionError::new(
                    anyhow!("Campaign ID is required"),
                    CampaignExecutionResult::default(),
                ))
            }
        };

        log::info!(
            "(execute_campaign) Iniciando ejecución de campaña id={} '{}'...",
            campaign_id,
            campaign.name
        );

        // Lease de ejecución: transición condicional draft -> sending. Si la
        // campaña no estaba en draft, otra ejecución la tiene (o ya terminó)
        // y aquí no se hace rollback.
        let acquired = self
            .campaign_service
            .try_begin_sending(campaign_id)
            .await
            .map_err(|e| CampaignExecutionError::new(e, CampaignExecutionResult::default()))?;

        if !acquired {
            return Err(CampaignExecutionError::new(
                anyhow!("Campaign {} is not in draft status", campaign_id),
                CampaignExecutionResult::default(),
            ));
        }

        let mut result = CampaignExecutionResult::default();

        match self
            .run_delivery_loop(campaign, campaign_id, &mut result, on_progress)
            .await
        {
            Ok(()) => {
                log::info!(
                    "(execute_campaign) Campaña {} completada: total={}, ok={}, fallos={}",
                    campaign_id,
                    result.total_recipients,
                    result.success_count,
                    result.failure_count
                );
                Ok(result)
            }
            Err(e) => {
                log::error!(
                    "(execute_campaign) Ejecución de campaña {} falló: {:?}. Parcial: ok={}, fallos={}",
                    campaign_id,
                    e,
                    result.success_count,
                    result.failure_count
                );

                // Rollback best-effort a draft; un fallo aquí se traga.
                if let Err(rollback_err) =
                    self.campaign_service.reset_to_draft(campaign_id).await
                {
                    log::error!(
                        "(execute_campaign) Rollback a 'draft' falló para {}: {:?}",
                        campaign_id,
                        rollback_err
                    );
                }

                result
                    .errors
                    .push(format!("Campaign execution failed: {}", e));

                self.event_log_service
                    .append(UserEventLog::new(
                        &campaign.created_by,
                        "campaign_failed",
                        serde_json::json!({
                            "campaign_id": campaign_id,
                            "error": e.to_string(),
                        }),
                        Some(campaign_id),
                    ))
                    .await;

                Err(CampaignExecutionError::new(e, result))
            }
        }
    }

    /// Pasos 2-5 del flujo: carga, loop por destinatario, cierre y auditoría.
    async fn run_delivery_loop(
        &self,
        campaign: &Campaign,
        campaign_id: &str,
        result: &mut CampaignExecutionResult,
        on_progress: Option<ProgressCallback<'_>>,
    ) -> Result<()> {
        let campaign_recipients = self
            .campaign_recipient_service
            .list_for_campaign(campaign_id)
            .await?;
        let directory = self
            .recipient_service
            .list_recipients(RECIPIENT_DIRECTORY_LIMIT)
            .await?;

        result.total_recipients = campaign_recipients.len();

        if campaign_recipients.is_empty() {
            return Err(anyhow!("No recipients found for this campaign"));
        }

        for (index, campaign_recipient) in campaign_recipients.iter().enumerate() {
            let recipient = match directory
                .iter()
                .find(|r| r.id == campaign_recipient.recipient_id)
            {
                Some(r) => r,
                None => {
                    // Falla distinta a un envío fallido: no cuenta en ningún
                    // bucket, solo se registra el error.
                    result.errors.push(format!(
                        "Recipient not found: {}",
                        campaign_recipient.recipient_id
                    ));
                    continue;
                }
            };

            let personalized =
                personalize_message(&campaign.message_text, &recipient.name);

            // El progreso refleja lo ya procesado; current_recipient es el
            // que está por intentarse.
            if let Some(callback) = on_progress {
                callback(CampaignProgress {
                    sent: index,
                    total: result.total_recipients,
                    current_recipient: recipient.name.clone(),
                });
            }

            let mut recipient_success = false;
            let mut recipient_errors: Vec<String> = Vec::new();

            for method in &campaign.methods {
                let message_result = send_with_retry(
                    self.gateway.as_ref(),
                    *method,
                    &recipient.telephone,
                    &personalized,
                    MAX_SEND_ATTEMPTS,
                )
                .await;

                if message_result.success {
                    recipient_success = true;

                    self.event_log_service
                        .append(UserEventLog::new(
                            &campaign.created_by,
                            "message_sent",
                            serde_json::json!({
                                "campaign_id": campaign_id,
                                "recipient_id": recipient.id,
                                "method": method.as_str(),
                                "message_id": message_result.message_id,
                            }),
                            Some(campaign_id),
                        ))
                        .await;
                } else {
                    let error = message_result
                        .error
                        .clone()
                        .unwrap_or_else(|| "Unknown error".to_string());

                    log::error!(
                        "(run_delivery_loop) Envío fallido: campaña={}, destinatario={} ({}), canal={}, intentos={}, error={}",
                        campaign_id,
                        recipient.name,
                        recipient.telephone,
                        method.as_str(),
                        message_result.attempts,
                        error
                    );

                    recipient_errors.push(format!("{}: {}", method.label(), error));
                }

                // Si la campaña tiene varios canales, cada canal sobreescribe
                // esta misma fila: queda el resultado del último procesado.
                let status = if message_result.success {
                    DeliveryStatus::Sent
                } else {
                    DeliveryStatus::Failed
                };
                let sent_datetime = if message_result.success {
                    Some(Utc::now())
                } else {
                    None
                };

                self.campaign_recipient_service
                    .update_delivery(
                        &campaign_recipient.id,
                        status,
                        sent_datetime,
                        message_result.attempts,
                        message_result.error.as_deref(),
                    )
                    .await?;
            }

            if recipient_success {
                result.success_count += 1;
            } else {
                result.failure_count += 1;
                result.errors.push(format!(
                    "{} ({}): {}",
                    recipient.name,
                    recipient.telephone,
                    recipient_errors.join(", ")
                ));
            }

            tokio::time::sleep(INTER_RECIPIENT_DELAY).await;
        }

        self.campaign_service.mark_completed(campaign_id).await?;

        self.event_log_service
            .append(UserEventLog::new(
                &campaign.created_by,
                "campaign_completed",
                serde_json::json!({
                    "campaign_id": campaign_id,
                    "total_recipients": result.total_recipients,
                    "success_count": result.success_count,
                    "failure_count": result.failure_count,
                }),
                Some(campaign_id),
            ))
            .await;

        Ok(())
    }
}

/// Sustituye todas las ocurrencias del token por el nombre del destinatario.
pub fn personalize_message(template: &str, recipient_name: &str) -> String {
    template.replace(RECIPIENT_NAME_PLACEHOLDER, recipient_name)
}
