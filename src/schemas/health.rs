use poem_openapi::{ApiResponse, payload::Json};

use super::common::{HealthStatus, InternalServerErrorResponse};

#[derive(ApiResponse)]
pub enum HealthResponse {
    #[oai(status = 200)]
    Ok(Json<HealthStatus>),

    #[oai(status = 503)]
    Unavailable(Json<InternalServerErrorResponse>),
}
