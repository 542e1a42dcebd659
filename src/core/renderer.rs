use anyhow::{Result, anyhow};
use base64::{Engine as _, engine::general_purpose};
use headless_chrome::Tab;
use headless_chrome::{Browser, LaunchOptions, protocol::cdp::Page};
use parking_lot::Mutex;
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use crate::core::request::FileType;
use crate::core::style::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// Turns a compiled document into image bytes.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, html: &str, file_type: FileType) -> Result<Vec<u8>>;

    fn is_healthy(&self) -> bool {
        true
    }
}

struct TabGuard {
    tab: Arc<Tab>,
}

impl TabGuard {
    fn new(tab: Arc<Tab>) -> Self {
        Self { tab }
    }

    fn as_ref(&self) -> &Arc<Tab> {
        &self.tab
    }
}

impl Drop for TabGuard {
    fn drop(&mut self) {
        if let Err(e) = self.tab.close(true) {
            tracing::warn!("Failed to close tab during cleanup: {}", e);
        } else {
            tracing::debug!("Tab closed successfully");
        }
    }
}

/// Screenshots documents with a shared headless Chrome instance.
pub struct ChromeRasterizer {
    browser: Mutex<Option<Browser>>,
    launch_options: LaunchOptions<'static>,
    jpeg_quality: u32,
}

impl ChromeRasterizer {
    pub fn new(jpeg_quality: u32) -> Result<Self> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some((CANVAS_WIDTH, CANVAS_HEIGHT)))
            .args(vec![
                OsStr::new("--no-sandbox"),
                OsStr::new("--disable-setuid-sandbox"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-extensions"),
                OsStr::new("--disable-sync"),
                OsStr::new("--hide-scrollbars"),
                OsStr::new("--mute-audio"),
                OsStr::new("--no-first-run"),
                OsStr::new("--disable-default-apps"),
            ])
            .build()
            .map_err(|_| anyhow!("Could not find Chrome/Chromium binary"))?;

        let browser = Browser::new(launch_options.clone())?;

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            launch_options,
            jpeg_quality: jpeg_quality.clamp(1, 100),
        })
    }

    fn get_or_create_browser(&self) -> Result<Browser> {
        let mut browser_lock = self.browser.lock();

        if let Some(ref browser) = *browser_lock {
            match browser.new_tab() {
                Ok(tab) => {
                    let _ = tab.close(true);
                    return Ok(browser.clone());
                }
                Err(_) => {
                    tracing::warn!("Browser health check failed, recreating");
                    *browser_lock = None;
                }
            }
        }

        tracing::warn!("Browser crashed or not available, creating new instance");
        let new_browser = Browser::new(self.launch_options.clone())?;
        *browser_lock = Some(new_browser.clone());

        Ok(new_browser)
    }

    fn wait_for_fonts(&self, tab: &Arc<Tab>) -> Result<()> {
        const MAX_ATTEMPTS: u32 = 50;
        const POLL_INTERVAL_MS: u64 = 100;

        for attempt in 0..MAX_ATTEMPTS {
            let ready = tab
                .evaluate("document.fonts.status === 'loaded'", false)?
                .value
                .and_then(|v| v.as_bool())
                .unwrap_or(false);

            if ready {
                tracing::debug!("Fonts ready after {} attempts", attempt);
                return Ok(());
            }

            std::thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
        }

        tracing::warn!("Fonts not ready after {} attempts, capturing anyway", MAX_ATTEMPTS);
        Ok(())
    }

    fn capture_screenshot(&self, tab: &Arc<Tab>, file_type: FileType) -> Result<Vec<u8>> {
        let bytes = match file_type {
            FileType::Png => tab.capture_screenshot(
                Page::CaptureScreenshotFormatOption::Png,
                None,
                None,
                true,
            )?,
            FileType::Jpeg => tab.capture_screenshot(
                Page::CaptureScreenshotFormatOption::Jpeg,
                Some(self.jpeg_quality),
                None,
                true,
            )?,
        };

        Ok(bytes)
    }
}

impl Rasterizer for ChromeRasterizer {
    fn rasterize(&self, html: &str, file_type: FileType) -> Result<Vec<u8>> {
        let browser = self.get_or_create_browser().or_else(|e| {
            tracing::warn!("First browser creation failed: {}, retrying...", e);
            *self.browser.lock() = None;
            self.get_or_create_browser()
        })?;
        let tab = browser.new_tab()?;
        let tab_guard = TabGuard::new(tab);
        let tab = tab_guard.as_ref();

        tab.set_bounds(headless_chrome::types::Bounds::Normal {
            left: Some(0),
            top: Some(0),
            width: Some(CANVAS_WIDTH as f64),
            height: Some(CANVAS_HEIGHT as f64),
        })?;

        let data_url = format!(
            "data:text/html;base64,{}",
            general_purpose::STANDARD.encode(html)
        );
        tab.navigate_to(&data_url)?;
        tab.wait_for_element_with_custom_timeout(".heading", Duration::from_secs(10))?;

        self.wait_for_fonts(tab)?;

        let bytes = self.capture_screenshot(tab, file_type)?;
        tracing::debug!("Captured {} screenshot, {} bytes", file_type.as_str(), bytes.len());

        Ok(bytes)
    }

    fn is_healthy(&self) -> bool {
        self.browser
            .lock()
            .as_ref()
            .is_some_and(|browser| browser.get_version().is_ok())
    }
}
