//! tests/mod.rs
//! Pruebas del servicio de campañas (motor, reintentos, carga de listas).

mod recipient_tests;
mod retry_tests;
mod support;
