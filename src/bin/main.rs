use std::sync::Arc;

use anyhow::Context;
use og_image_engine::core::assets::FontAssets;
use og_image_engine::core::renderer::ChromeRasterizer;
use og_image_engine::core::template::DocumentCompiler;
use og_image_engine::settings::{Config, get_config};
use og_image_engine::{AppState, init_openapi_route};
use poem::listener::TcpListener;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    match &config.log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "og-image.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt()
                .with_writer(non_blocking)
                .with_env_filter(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_thread_ids(true)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_config()?;
    let _guard = init_tracing(&config);

    tracing::info!("Initializing OG image service...");
    tracing::info!("run with config: {:?}", config);

    let fonts = Arc::new(FontAssets::load(&config.fonts_dir)?);
    let compiler = DocumentCompiler::new(fonts, &config.emoji_base_url);
    let rasterizer = Arc::new(
        ChromeRasterizer::new(config.jpeg_quality).context("failed to launch headless browser")?,
    );

    let app_state = Arc::new(AppState {
        compiler,
        rasterizer,
        defaults: config.request_defaults(),
        html_debug: config.html_debug,
    });

    tracing::info!("Rendering engine initialized successfully");

    let app = init_openapi_route(app_state, &config);
    tracing::info!("run server on {}:{}", config.host, config.port);
    poem::Server::new(TcpListener::bind(format!("{}:{}", config.host, config.port)))
        .run(app)
        .await
        .context("server stopped unexpectedly")
}
