//! tests/recipient_tests.rs
//! Pruebas de normalización de teléfonos y del upsert de cargas de lista.

use crate::models::recipient_model::UploadRecipient;
use crate::services::recipient_service::normalize_telephone;
use crate::tests::support::{make_pool, make_services};

#[test]
fn test_normalize_telephone_valid() {
    assert_eq!(
        normalize_telephone("+1 809-555-0001").unwrap(),
        "+18095550001"
    );
    assert_eq!(normalize_telephone("(809) 555-0001").unwrap(), "8095550001");
    assert_eq!(normalize_telephone("18095550001").unwrap(), "18095550001");
}

#[test]
fn test_normalize_telephone_invalid() {
    // Letras, cero inicial, demasiado corto o vacío
    assert!(normalize_telephone("abc").is_err());
    assert!(normalize_telephone("0123456").is_err());
    assert!(normalize_telephone("12").is_err());
    assert!(normalize_telephone("+").is_err());
    assert!(normalize_telephone("").is_err());
}

fn row(name: &str, telephone: &str, email: &str) -> UploadRecipient {
    UploadRecipient {
        name: name.to_string(),
        telephone: telephone.to_string(),
        email: email.to_string(),
        interests: vec!["promos".to_string()],
    }
}

#[actix_rt::test]
async fn test_process_recipients_upsert() {
    let pool = make_pool().await;
    let services = make_services(&pool);

    let batch = vec![
        row("Ana", "+1 809-555-0001", "ana@example.com"),
        // Mismo teléfono normalizado: duplicado dentro del lote
        row("Ana bis", "+18095550001", "anabis@example.com"),
        row("Bruno", "no-es-telefono", "bruno@example.com"),
        row("Carla", "+18095550003", "email-invalido"),
    ];

    let result = services
        .recipient_service
        .process_recipients(&batch, "user-1")
        .await
        .unwrap();

    assert_eq!(result.created, 1);
    assert_eq!(result.updated, 0);
    assert_eq!(result.duplicates, 1);
    assert_eq!(result.processed, 1);
    assert_eq!(result.errors.len(), 2);
    assert!(!result.success);

    // Re-carga del mismo teléfono: actualiza en lugar de crear
    let second = vec![row("Ana María", "+18095550001", "ana.maria@example.com")];
    let result = services
        .recipient_service
        .process_recipients(&second, "user-1")
        .await
        .unwrap();

    assert_eq!(result.created, 0);
    assert_eq!(result.updated, 1);
    assert!(result.success);

    let stored = services
        .recipient_service
        .get_by_phone("+18095550001")
        .await
        .unwrap()
        .expect("El destinatario debió existir");
    assert_eq!(stored.name, "Ana María");
    assert_eq!(stored.email, "ana.maria@example.com");

    // La carga queda registrada en el log de actividad
    let events = services
        .event_log_service
        .list_events("user-1", 1, 10)
        .await
        .unwrap();
    assert!(events
        .items
        .iter()
        .any(|e| e.action == "recipients_uploaded"));
}
