use std::sync::Arc;

use poem::{
    EndpointExt, Route, get,
    middleware::{AddData, AddDataEndpoint, Cors, CorsEndpoint},
};
use poem_openapi::OpenApiService;

use crate::core::renderer::Rasterizer;
use crate::core::request::RequestDefaults;
use crate::core::template::DocumentCompiler;
use crate::settings::Config;

use crate::routes::{health::ApiHealth, image::render_image};

pub mod core;
pub mod routes;
pub mod schemas;
pub mod settings;

pub struct AppState {
    pub compiler: DocumentCompiler,
    pub rasterizer: Arc<dyn Rasterizer>,
    pub defaults: RequestDefaults,
    pub html_debug: bool,
}

pub fn init_openapi_route(
    app_state: Arc<AppState>,
    config: &Config,
) -> CorsEndpoint<AddDataEndpoint<Route, Arc<AppState>>> {
    let prefix = config.prefix.clone();
    let openapi_route =
        OpenApiService::new(ApiHealth, "OG Image API", "1.0").server(prefix.clone());

    let openapi_json_endpoint = openapi_route.spec_endpoint();
    let ui = openapi_route.swagger_ui();
    Route::new()
        .nest(prefix, openapi_route)
        .nest("/docs", ui)
        .at("/openapi.json", openapi_json_endpoint)
        .at("/", get(render_image))
        .at("/*path", get(render_image))
        .with(AddData::new(app_state))
        .with(Cors::new())
}
