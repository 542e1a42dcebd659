use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::{
    AppState,
    schemas::{
        common::{HealthStatus, InternalServerErrorResponse},
        health::HealthResponse,
    },
};

#[derive(Tags)]
enum ApiHealthTags {
    Health,
}

pub struct ApiHealth;

#[OpenApi()]
impl ApiHealth {
    /// Health
    ///
    /// Reports whether the screenshot browser is reachable.
    #[oai(path = "/health", method = "get", tag = "ApiHealthTags::Health")]
    async fn health(&self, state: Data<&Arc<AppState>>) -> HealthResponse {
        let rasterizer = state.rasterizer.clone();
        let healthy = match tokio::task::spawn_blocking(move || rasterizer.is_healthy()).await {
            Ok(healthy) => healthy,
            Err(e) => {
                return HealthResponse::Unavailable(Json(InternalServerErrorResponse::new(
                    "route.health",
                    "health",
                    "Health probe failed",
                    &e.to_string(),
                )));
            }
        };

        if !healthy {
            return HealthResponse::Unavailable(Json(InternalServerErrorResponse::new(
                "route.health",
                "health",
                "Browser unavailable",
                "browser did not answer",
            )));
        }

        HealthResponse::Ok(Json(HealthStatus {
            status: "healthy".to_string(),
            browser: healthy,
        }))
    }
}
