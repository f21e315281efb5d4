//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod campaign_recipient_service;
pub mod campaign_service;
pub mod event_log_service;
pub mod execution_service;
pub mod gateway_service;
pub mod recipient_service;
