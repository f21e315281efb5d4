//! tests/retry_tests.rs
//! Pruebas de la política de reintentos con reloj virtual de tokio.

use std::time::Duration;

use reqwest::StatusCode;
use tokio::time::Instant;

use crate::models::campaign_model::DeliveryMethod;
use crate::models::message_model::DeliveryErrorKind;
use crate::services::gateway_service::{classify_status, send_with_retry};
use crate::tests::support::StubGateway;

#[test]
fn test_classify_status() {
    assert_eq!(
        classify_status(StatusCode::BAD_REQUEST),
        DeliveryErrorKind::Permanent
    );
    assert_eq!(
        classify_status(StatusCode::NOT_FOUND),
        DeliveryErrorKind::Permanent
    );
    assert_eq!(
        classify_status(StatusCode::INTERNAL_SERVER_ERROR),
        DeliveryErrorKind::Transient
    );
    assert_eq!(
        classify_status(StatusCode::SERVICE_UNAVAILABLE),
        DeliveryErrorKind::Transient
    );
}

#[tokio::test(start_paused = true)]
async fn test_retry_succeeds_on_third_attempt() {
    // Falla dos veces, luego éxito: attempts=3 con backoff de 2s + 4s.
    let gateway = StubGateway::with_script(vec![
        StubGateway::transient("timeout"),
        StubGateway::transient("timeout"),
        StubGateway::ok(),
    ]);

    let start = Instant::now();
    let result = send_with_retry(&gateway, DeliveryMethod::Sms, "+18095550001", "Hola", 3).await;
    let elapsed = start.elapsed();

    assert!(result.success);
    assert_eq!(result.attempts, 3);
    assert_eq!(gateway.call_count(), 3);

    // Reloj virtual: 2^1 + 2^2 segundos entre intentos.
    assert!(
        elapsed >= Duration::from_secs(6) && elapsed < Duration::from_secs(7),
        "Backoff inesperado: {:?}",
        elapsed
    );
}

#[tokio::test(start_paused = true)]
async fn test_retry_exhausts_attempts() {
    // Siempre falla: devuelve el último resultado, nunca lanza.
    let gateway = StubGateway::with_script(vec![
        StubGateway::transient("provider down"),
        StubGateway::transient("provider down"),
        StubGateway::transient("provider down"),
    ]);

    let result =
        send_with_retry(&gateway, DeliveryMethod::Whatsapp, "+18095550001", "Hola", 3).await;

    assert!(!result.success);
    assert_eq!(result.attempts, 3);
    assert_eq!(result.error.as_deref(), Some("provider down"));
    assert_eq!(gateway.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_retry_stops_on_permanent_failure() {
    // Un rechazo 4xx no se reintenta.
    let gateway = StubGateway::with_script(vec![StubGateway::permanent("Invalid phone number")]);

    let start = Instant::now();
    let result = send_with_retry(&gateway, DeliveryMethod::Sms, "+18095550001", "Hola", 3).await;
    let elapsed = start.elapsed();

    assert!(!result.success);
    assert_eq!(result.attempts, 1);
    assert_eq!(gateway.call_count(), 1);
    assert!(elapsed < Duration::from_secs(1), "No debió haber backoff");
}

#[tokio::test(start_paused = true)]
async fn test_retry_returns_immediately_on_success() {
    let gateway = StubGateway::always_ok();

    let start = Instant::now();
    let result = send_with_retry(&gateway, DeliveryMethod::Sms, "+18095550001", "Hola", 3).await;
    let elapsed = start.elapsed();

    assert!(result.success);
    assert_eq!(result.attempts, 1);
    assert_eq!(result.message_id.as_deref(), Some("msg-123"));
    assert!(elapsed < Duration::from_secs(1));
}
