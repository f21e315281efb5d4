//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod campaign_model;
pub mod campaign_recipient_model;
pub mod event_model;
pub mod message_model;
pub mod recipient_model;
