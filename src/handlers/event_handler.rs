use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::services::event_log_service::EventLogService;

#[derive(Deserialize)]
pub struct EventsQuery {
    user_id: String,
    page: Option<u64>,
    page_size: Option<u64>,
}

/// GET /api/events — log de actividad del usuario
pub async fn list_events_endpoint(
    event_log_service: web::Data<EventLogService>,
    query: web::Query<EventsQuery>,
) -> HttpResponse {
    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(25);

    match event_log_service
        .list_events(&query.user_id, page, page_size)
        .await
    {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": "Internal server error",
            "details": format!("{:?}", e)
        })),
    }
}
