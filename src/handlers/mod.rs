//! handlers/mod.rs
//! Módulo que agrupa los distintos handlers (campañas, destinatarios, log).

pub mod campaign_handler;
pub mod event_handler;
pub mod recipient_handler;
