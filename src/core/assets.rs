use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose};

pub const REGULAR_FONT_FILE: &str = "Inter-Regular.woff2";
pub const BOLD_FONT_FILE: &str = "Inter-Bold.woff2";
pub const MONO_FONT_FILE: &str = "Vera-Mono.woff2";

/// Base64 payloads of the embedded webfonts. Loaded once, shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontAssets {
    pub regular: String,
    pub bold: String,
    pub mono: String,
}

impl FontAssets {
    pub fn from_bytes(regular: &[u8], bold: &[u8], mono: &[u8]) -> Self {
        Self {
            regular: general_purpose::STANDARD.encode(regular),
            bold: general_purpose::STANDARD.encode(bold),
            mono: general_purpose::STANDARD.encode(mono),
        }
    }

    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let read = |name: &str| {
            let path = dir.join(name);
            fs::read(&path).with_context(|| format!("failed to read font {}", path.display()))
        };

        let regular = read(REGULAR_FONT_FILE)?;
        let bold = read(BOLD_FONT_FILE)?;
        let mono = read(MONO_FONT_FILE)?;

        tracing::info!(
            "loaded fonts from {} ({} + {} + {} bytes)",
            dir.display(),
            regular.len(),
            bold.len(),
            mono.len()
        );

        Ok(Self::from_bytes(&regular, &bold, &mono))
    }
}
