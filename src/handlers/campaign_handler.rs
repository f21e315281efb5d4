use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::campaign_model::{CreateCampaignRequest, CreateCampaignResponse},
    services::{
        campaign_recipient_service::CampaignRecipientService, campaign_service::CampaignService,
        execution_service::CampaignExecutionService,
    },
};

#[derive(Deserialize)]
pub struct PaginationQuery {
    user_id: String,
    page: Option<u64>,
    page_size: Option<u64>,
}

#[derive(Deserialize)]
pub struct ExecuteQuery {
    async_send: Option<bool>,
}

/// POST /api/campaigns
pub async fn create_campaign_endpoint(
    campaign_service: web::Data<CampaignService>,
    campaign_recipient_service: web::Data<CampaignRecipientService>,
    body: web::Json<CreateCampaignRequest>,
) -> HttpResponse {
    let req = body.into_inner();

    let campaign_id = match campaign_service.create_campaign(&req).await {
        Ok(id) => id,
        Err(e) => {
            return HttpResponse::InternalServerError().json(json!({
                "error": "Campaign creation failed",
                "details": format!("{:?}", e)
            }))
        }
    };

    // Filas de entrega en pending para cada destinatario seleccionado
    if let Err(e) = campaign_recipient_service
        .add_recipients(&campaign_id, &req.recipient_ids)
        .await
    {
        return HttpResponse::InternalServerError().json(json!({
            "error": "Campaign recipients creation failed",
            "campaign_id": campaign_id,
            "details": format!("{:?}", e)
        }));
    }

    HttpResponse::Ok().json(CreateCampaignResponse {
        id: campaign_id,
        message: "Campaña creada".to_string(),
    })
}

/// GET /api/campaigns
pub async fn list_campaigns_endpoint(
    campaign_service: web::Data<CampaignService>,
    query: web::Query<PaginationQuery>,
) -> HttpResponse {
    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(15);

    match campaign_service
        .list_campaigns(&query.user_id, page, page_size)
        .await
    {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": "Internal server error",
            "details": format!("{:?}", e)
        })),
    }
}

/// GET /api/campaigns/{id}
pub async fn get_campaign_endpoint(
    campaign_service: web::Data<CampaignService>,
    path: web::Path<String>,
) -> HttpResponse {
    let campaign_id = path.into_inner();

    match campaign_service.get_campaign(&campaign_id).await {
        Ok(campaign) => HttpResponse::Ok().json(campaign),
        Err(e) => HttpResponse::NotFound().json(json!({
            "error": "Campaign not found",
            "details": format!("{:?}", e)
        })),
    }
}

/// POST /api/campaigns/{id}/execute
pub async fn execute_campaign_endpoint(
    campaign_service: web::Data<CampaignService>,
    execution_service: web::Data<CampaignExecutionService>,
    path: web::Path<String>,
    query: web::Query<ExecuteQuery>,
) -> HttpResponse {
    let campaign_id = path.into_inner();

    let campaign = match campaign_service.get_campaign(&campaign_id).await {
        Ok(c) => c,
        Err(e) => {
            return HttpResponse::NotFound().json(json!({
                "error": "Campaign not found",
                "details": format!("{:?}", e)
            }))
        }
    };

    // Asíncrono o síncrono
    if query.async_send.unwrap_or(false) {
        let service_clone = execution_service.clone();
        let campaign_clone = campaign.clone();

        tokio::spawn(async move {
            match service_clone.execute_campaign(&campaign_clone, None).await {
                Ok(result) => log::info!(
                    "Campaña asíncrona {} completada: ok={}, fallos={}",
                    campaign_id,
                    result.success_count,
                    result.failure_count
                ),
                Err(e) => log::error!(
                    "Campaña asíncrona {} falló: {} (parcial: ok={}, fallos={})",
                    campaign_id,
                    e,
                    e.partial.success_count,
                    e.partial.failure_count
                ),
            }
        });

        return HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Campaign queued for async execution"
        }));
    }

    match execution_service.execute_campaign(&campaign, None).await {
        Ok(result) => HttpResponse::Ok().json(json!({
            "success": true,
            "result": result
        })),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "success": false,
            "error": e.to_string(),
            "partial_result": e.partial
        })),
    }
}
