//! app.rs
use crate::handlers::{campaign_handler, event_handler, recipient_handler};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/campaigns")
                    .route(
                        "",
                        web::post().to(campaign_handler::create_campaign_endpoint),
                    )
                    .route("", web::get().to(campaign_handler::list_campaigns_endpoint))
                    .route(
                        "/{id}",
                        web::get().to(campaign_handler::get_campaign_endpoint),
                    )
                    .route(
                        "/{id}/execute",
                        web::post().to(campaign_handler::execute_campaign_endpoint),
                    ),
            )
            .service(
                web::scope("/recipients")
                    .route(
                        "/upload",
                        web::post().to(recipient_handler::upload_recipients_endpoint),
                    )
                    .route(
                        "",
                        web::get().to(recipient_handler::list_recipients_endpoint),
                    ),
            )
            .service(
                web::scope("/events")
                    .route("", web::get().to(event_handler::list_events_endpoint)),
            ),
    );
}
