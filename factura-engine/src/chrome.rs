//! `headless_chrome` implementation of the engine contract.
//!
//! Launch flags target constrained environments (restricted sandboxes,
//! low-memory containers): sandbox off, GPU off, single process, no
//! /dev/shm reliance. Markup is loaded through a base64 `data:` URL so the
//! page needs no server, and blocked resource classes are translated to
//! `Network.setBlockedURLs` patterns before any content loads.

use std::ffi::OsStr;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use headless_chrome::protocol::cdp::Network;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};

use factura_core::{RenderProfile, ResourceClass};

use crate::backend::{EnginePage, RenderBackend};
use crate::error::{EngineError, Stage};

// A4 in inches, the `Page.printToPDF` unit.
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.69;
const MARGIN_IN: f64 = 0.4;

fn launch_err(e: impl fmt::Display) -> EngineError {
    EngineError::Launch {
        message: e.to_string(),
    }
}

/// URL patterns handed to `Network.setBlockedURLs` for each blocked class.
///
/// Both markup variants are self-contained, so these only matter when a
/// user-overridden template sneaks external references back in.
fn blocked_url_patterns(blocked: &[ResourceClass]) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for class in blocked {
        let patterns: &[&str] = match class {
            ResourceClass::Image => {
                &["*.png", "*.jpg", "*.jpeg", "*.gif", "*.webp", "*.svg", "*.ico"]
            }
            ResourceClass::Font => &[
                "*.woff",
                "*.woff2",
                "*.ttf",
                "*.otf",
                "*fonts.googleapis.com*",
                "*fonts.gstatic.com*",
            ],
            ResourceClass::Media => &["*.mp4", "*.webm", "*.ogg", "*.mp3", "*.wav"],
            ResourceClass::Stylesheet => &["*.css"],
            ResourceClass::Script => &["*.js", "*.mjs"],
        };
        urls.extend(patterns.iter().map(|p| (*p).to_string()));
    }
    urls
}

/// Chrome/Chromium launcher for render sessions.
#[derive(Debug, Clone, Default)]
pub struct ChromeBackend {
    /// Explicit browser binary; `None` lets `headless_chrome` auto-detect.
    pub browser_path: Option<PathBuf>,
}

impl ChromeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_browser_path(path: PathBuf) -> Self {
        ChromeBackend {
            browser_path: Some(path),
        }
    }
}

impl RenderBackend for ChromeBackend {
    fn launch(&self, profile: &RenderProfile) -> Result<Box<dyn EnginePage>, EngineError> {
        let mut builder = LaunchOptions::default_builder();
        builder
            .headless(true)
            .sandbox(false)
            .idle_browser_timeout(profile.launch_timeout())
            .args(vec![
                OsStr::new("--disable-gpu"),
                OsStr::new("--single-process"),
                OsStr::new("--no-zygote"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--hide-scrollbars"),
            ]);
        if let Some(path) = &self.browser_path {
            builder.path(Some(path.clone()));
        }
        let options = builder.build().map_err(launch_err)?;

        let browser = Browser::new(options).map_err(launch_err)?;
        let tab = browser.new_tab().map_err(launch_err)?;
        tab.set_default_timeout(profile.protocol_timeout());

        let urls = blocked_url_patterns(&profile.blocked);
        if !urls.is_empty() {
            tab.call_method(Network::Enable {
                max_total_buffer_size: None,
                max_resource_buffer_size: None,
                max_post_data_size: None,
            })
            .map_err(launch_err)?;
            tab.call_method(Network::SetBlockedUrLs { urls })
                .map_err(launch_err)?;
        }

        tracing::debug!(
            blocked = profile.blocked.len(),
            "chrome render session ready"
        );
        Ok(Box::new(ChromePage {
            browser: Some(browser),
            tab: Some(tab),
            profile: profile.clone(),
        }))
    }
}

/// One Chrome process + one tab. Teardown is tab first, then process (the
/// process dies when the `Browser` handle drops).
pub struct ChromePage {
    browser: Option<Browser>,
    tab: Option<Arc<Tab>>,
    profile: RenderProfile,
}

impl ChromePage {
    fn tab(&self, stage: Stage) -> Result<&Arc<Tab>, EngineError> {
        self.tab.as_ref().ok_or_else(|| EngineError::Protocol {
            stage,
            message: "page already closed".to_string(),
        })
    }
}

impl EnginePage for ChromePage {
    fn set_content(&mut self, markup: &str) -> Result<(), EngineError> {
        let url = format!("data:text/html;base64,{}", BASE64.encode(markup));
        let timeout = self.profile.content_load_timeout();
        let tab = self.tab(Stage::Navigate)?;
        tab.set_default_timeout(timeout);
        tab.navigate_to(&url)
            .and_then(|t| t.wait_until_navigated())
            .map(|_| ())
            .map_err(|e| EngineError::classify(Stage::Navigate, e.to_string()))
    }

    fn export_pdf(&mut self) -> Result<Vec<u8>, EngineError> {
        let timeout = self.profile.export_timeout();
        let tab = self.tab(Stage::Render)?;
        tab.set_default_timeout(timeout);
        let options = PrintToPdfOptions {
            print_background: Some(true),
            paper_width: Some(A4_WIDTH_IN),
            paper_height: Some(A4_HEIGHT_IN),
            margin_top: Some(MARGIN_IN),
            margin_bottom: Some(MARGIN_IN),
            margin_left: Some(MARGIN_IN),
            margin_right: Some(MARGIN_IN),
            ..Default::default()
        };
        tab.print_to_pdf(Some(options))
            .map_err(|e| EngineError::classify(Stage::Render, e.to_string()))
    }

    fn close(&mut self) -> Result<(), EngineError> {
        let mut first_failure = None;
        if let Some(tab) = self.tab.take() {
            if let Err(e) = tab.close(false) {
                first_failure = Some(EngineError::Protocol {
                    stage: Stage::Render,
                    message: format!("tab close failed: {e}"),
                });
            }
        }
        // Dropping the handle terminates the browser process.
        self.browser.take();
        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for ChromePage {
    fn drop(&mut self) {
        if self.tab.is_some() || self.browser.is_some() {
            let _ = self.close();
        }
    }
}
