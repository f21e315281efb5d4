//! config/provider_config.rs
//! Endpoints de los gateways de proveedor (SMS / WhatsApp), leídos una sola
//! vez del entorno al arrancar. Se inyecta en el gateway en lugar de leer
//! variables dentro de cada envío.

use anyhow::{anyhow, Result};
use std::env;

use crate::models::campaign_model::DeliveryMethod;

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub sms_gateway_url: String,
    pub whatsapp_gateway_url: String,
}

impl ProviderConfig {
    /// Falla rápido si falta alguna variable, en vez de descubrirlo a mitad
    /// de una campaña.
    pub fn from_env() -> Result<Self> {
        let sms_gateway_url =
            env::var("SMS_GATEWAY_URL").map_err(|_| anyhow!("No se definió SMS_GATEWAY_URL"))?;
        let whatsapp_gateway_url = env::var("WHATSAPP_GATEWAY_URL")
            .map_err(|_| anyhow!("No se definió WHATSAPP_GATEWAY_URL"))?;

        Ok(ProviderConfig {
            sms_gateway_url,
            whatsapp_gateway_url,
        })
    }

    pub fn endpoint_for(&self, method: DeliveryMethod) -> &str {
        match method {
            DeliveryMethod::Sms => &self.sms_gateway_url,
            DeliveryMethod::Whatsapp => &self.whatsapp_gateway_url,
        }
    }
}
