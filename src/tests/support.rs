//! tests/support.rs
//! Helpers compartidos: gateway guionado, pool SQLite en memoria y seeds.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

use crate::models::campaign_model::{Campaign, CreateCampaignRequest, DeliveryMethod};
use crate::models::message_model::{DeliveryErrorKind, MessageResult};
use crate::models::recipient_model::UploadRecipient;
use crate::services::campaign_recipient_service::CampaignRecipientService;
use crate::services::campaign_service::CampaignService;
use crate::services::event_log_service::EventLogService;
use crate::services::execution_service::CampaignExecutionService;
use crate::services::gateway_service::MessageGateway;
use crate::services::recipient_service::RecipientService;

/// Gateway de prueba: devuelve resultados de un guion en orden; agotado el
/// guion, responde éxito. Registra cada llamada recibida.
pub struct StubGateway {
    script: Mutex<VecDeque<MessageResult>>,
    calls: Mutex<Vec<(DeliveryMethod, String, String)>>,
}

impl StubGateway {
    pub fn always_ok() -> Self {
        Self::with_script(vec![])
    }

    pub fn with_script(results: Vec<MessageResult>) -> Self {
        StubGateway {
            script: Mutex::new(results.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn ok() -> MessageResult {
        MessageResult {
            success: true,
            message_id: Some("msg-123".to_string()),
            error: None,
            error_kind: None,
            attempts: 1,
        }
    }

    pub fn transient(error: &str) -> MessageResult {
        MessageResult::failure(error.to_string(), DeliveryErrorKind::Transient)
    }

    pub fn permanent(error: &str) -> MessageResult {
        MessageResult::failure(error.to_string(), DeliveryErrorKind::Permanent)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Cuerpos de mensaje enviados, en orden.
    pub fn sent_messages(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, message)| message.clone())
            .collect()
    }
}

#[async_trait]
impl MessageGateway for StubGateway {
    async fn send(&self, method: DeliveryMethod, to: &str, message: &str) -> MessageResult {
        self.calls
            .lock()
            .unwrap()
            .push((method, to.to_string(), message.to_string()));

        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Self::ok)
    }
}

/// Pool SQLite en memoria con el esquema migrado. Una sola conexión para que
/// todas las queries vean la misma base.
pub async fn make_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("No se pudo abrir SQLite en memoria");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Fallo en migraciones de test");

    pool
}

pub struct TestServices {
    pub campaign_service: CampaignService,
    pub recipient_service: RecipientService,
    pub campaign_recipient_service: CampaignRecipientService,
    pub event_log_service: EventLogService,
}

pub fn make_services(pool: &Pool<Sqlite>) -> TestServices {
    let event_log_service = EventLogService::new(pool.clone());
    TestServices {
        campaign_service: CampaignService::new(pool.clone()),
        recipient_service: RecipientService::new(pool.clone(), event_log_service.clone()),
        campaign_recipient_service: CampaignRecipientService::new(pool.clone()),
        event_log_service,
    }
}

pub fn make_engine(
    services: &TestServices,
    gateway: Arc<StubGateway>,
) -> CampaignExecutionService {
    CampaignExecutionService::new(
        services.campaign_service.clone(),
        services.recipient_service.clone(),
        services.campaign_recipient_service.clone(),
        services.event_log_service.clone(),
        gateway,
    )
}

pub async fn seed_recipient(services: &TestServices, name: &str, telephone: &str) -> String {
    let rec = UploadRecipient {
        name: name.to_string(),
        telephone: telephone.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        interests: vec![],
    };

    services
        .recipient_service
        .create_recipient(&rec, telephone)
        .await
        .expect("No se pudo crear recipient de prueba")
}

/// Crea una campaña en draft con sus filas de entrega y la devuelve.
pub async fn seed_campaign(
    services: &TestServices,
    message_text: &str,
    methods: Vec<DeliveryMethod>,
    recipient_ids: Vec<String>,
) -> Campaign {
    let req = CreateCampaignRequest {
        name: "Promo de prueba".to_string(),
        description: String::new(),
        methods,
        message_text: message_text.to_string(),
        created_by: "user-1".to_string(),
        recipient_ids: recipient_ids.clone(),
    };

    let campaign_id = services
        .campaign_service
        .create_campaign(&req)
        .await
        .expect("No se pudo crear campaña de prueba");

    services
        .campaign_recipient_service
        .add_recipients(&campaign_id, &recipient_ids)
        .await
        .expect("No se pudieron crear campaign_recipients");

    services
        .campaign_service
        .get_campaign(&campaign_id)
        .await
        .expect("No se pudo recargar la campaña")
}
