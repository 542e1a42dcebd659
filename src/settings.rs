use std::env;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::core::emoji::DEFAULT_EMOJI_BASE_URL;
use crate::core::request::RequestDefaults;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_prefix() -> String {
    "/api".to_string()
}

fn default_fonts_dir() -> String {
    "assets/fonts".to_string()
}

fn default_emoji_base_url() -> String {
    DEFAULT_EMOJI_BASE_URL.to_string()
}

fn default_jpeg_quality() -> u32 {
    90
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_fonts_dir")]
    pub fonts_dir: String,
    #[serde(default = "default_emoji_base_url")]
    pub emoji_base_url: String,
    pub default_font_size: Option<String>,
    pub default_text_color: Option<String>,
    pub default_text_strong_color: Option<String>,
    pub default_overlay: Option<String>,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u32,
    /// Serve the compiled HTML instead of a screenshot.
    #[serde(default)]
    pub html_debug: bool,
    pub log_dir: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    pub fn request_defaults(&self) -> RequestDefaults {
        let base = RequestDefaults::default();
        RequestDefaults {
            font_size: self.default_font_size.clone().unwrap_or(base.font_size),
            text_color: self.default_text_color.clone().unwrap_or(base.text_color),
            text_strong_color: self
                .default_text_strong_color
                .clone()
                .unwrap_or(base.text_strong_color),
            overlay: self.default_overlay.clone().unwrap_or(base.overlay),
        }
    }
}

/// Reads the configuration from the environment, loading `.env` first unless `ENV` is `server`.
pub fn get_config() -> Result<Config> {
    let env_var = env::var("ENV").unwrap_or("file".to_string());
    if env_var == "file" {
        info!("using .env file as environment variable");
        let _ = dotenvy::dotenv();
    } else {
        info!("using server environment as environment variable");
    }
    envy::from_env::<Config>().context("invalid configuration in environment")
}
