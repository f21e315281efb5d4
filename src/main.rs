use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;

use crate::config::provider_config::ProviderConfig;
use crate::logger::init_logger;
use crate::services::campaign_recipient_service::CampaignRecipientService;
use crate::services::campaign_service::CampaignService;
use crate::services::event_log_service::EventLogService;
use crate::services::execution_service::CampaignExecutionService;
use crate::services::gateway_service::ProviderGateway;
use crate::services::recipient_service::RecipientService;

mod app;
mod config;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

async fn setup_database() -> Pool<Sqlite> {
    // 1) Crear carpeta "data"
    std::fs::create_dir_all("data").expect("No se pudo crear directorio 'data'");

    // 2) Ruta final: ./data/campaigns.db
    let db_path = std::env::current_dir()
        .expect("No se pudo obtener el current_dir")
        .join("data")
        .join("campaigns.db");

    log::info!("Conectando a SQLite en {}", db_path.display());

    // 3) Conectarnos con SQLx (creando el archivo si no existe)
    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);

    Pool::<Sqlite>::connect_with(options)
        .await
        .expect("No se pudo conectar a la base de datos SQLite.")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    // Config de proveedores: falla rápido si falta algo
    let provider_config =
        ProviderConfig::from_env().expect("Configuración de proveedores incompleta");

    // Conectarnos a la DB
    let db_pool = setup_database().await;

    // CampaignService corre las migraciones del esquema completo
    let campaign_service = CampaignService::new(db_pool.clone());
    if let Err(e) = campaign_service.run_migrations().await {
        panic!("Fallo en migraciones: {:?}", e);
    }

    let event_log_service = EventLogService::new(db_pool.clone());
    let recipient_service = RecipientService::new(db_pool.clone(), event_log_service.clone());
    let campaign_recipient_service = CampaignRecipientService::new(db_pool.clone());

    // Gateway real hacia los proveedores, inyectado detrás del trait
    let gateway = Arc::new(ProviderGateway::new(provider_config));

    let execution_service = CampaignExecutionService::new(
        campaign_service.clone(),
        recipient_service.clone(),
        campaign_recipient_service.clone(),
        event_log_service.clone(),
        gateway,
    );

    // Levantar servidor
    log::info!("Levantando servidor en 0.0.0.0:5022");
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(campaign_service.clone()))
            .app_data(web::Data::new(recipient_service.clone()))
            .app_data(web::Data::new(campaign_recipient_service.clone()))
            .app_data(web::Data::new(event_log_service.clone()))
            .app_data(web::Data::new(execution_service.clone()))
            .configure(app::init_app)
    })
    .workers(1)
    .bind(("0.0.0.0", 5022))?
    .run()
    .await
}
