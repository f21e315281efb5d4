use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::models::recipient_model::{ListRecipientsResponse, UploadRecipientsRequest};
use crate::services::recipient_service::RecipientService;

#[derive(Deserialize)]
pub struct ListQuery {
    limit: Option<i64>,
}

/// POST /api/recipients/upload
/// Recibe filas ya parseadas del archivo (el parseo CSV/Excel vive en el
/// front) y hace upsert por teléfono normalizado.
pub async fn upload_recipients_endpoint(
    recipient_service: web::Data<RecipientService>,
    body: web::Json<UploadRecipientsRequest>,
) -> HttpResponse {
    let req = body.into_inner();

    match recipient_service
        .process_recipients(&req.recipients, &req.user_id)
        .await
    {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": "Internal server error",
            "details": format!("{:?}", e)
        })),
    }
}

/// GET /api/recipients
pub async fn list_recipients_endpoint(
    recipient_service: web::Data<RecipientService>,
    query: web::Query<ListQuery>,
) -> HttpResponse {
    let limit = query.limit.unwrap_or(50);

    match recipient_service.list_recipients(limit).await {
        Ok(items) => HttpResponse::Ok().json(ListRecipientsResponse {
            total: items.len() as u64,
            items,
        }),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": "Internal server error",
            "details": format!("{:?}", e)
        })),
    }
}
