//! config/mod.rs

pub mod provider_config;
