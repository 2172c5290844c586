//! Chromium engine adapter
//!
//! Drives a headless Chromium over the DevTools protocol: markup travels as
//! a base64 data URL, file sources as `file://` URLs, and rendering is
//! `Page.printToPDF`. The browser process is shared; every document gets
//! its own tab.
//!
//! Chromium has no post-render object model to poke at, so the optional
//! `invoke` surface stays at its unsupported default, and `protection()`
//! returns nothing: PDF encryption is not a capability this engine has.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use serde_json::Value;

use crate::config::Config;
use crate::document::{OutputOptions, PaperSize, RenderWarning};
use crate::engine::{EngineFactory, RenderEngine};
use crate::error::{RenderError, Result};

fn engine_err(e: anyhow::Error) -> RenderError {
    RenderError::Engine(e.to_string())
}

/// One Chromium-backed document
pub struct ChromiumEngine {
    browser: Arc<Browser>,
    /// data: URL for loaded markup, file:// URL for file sources
    source_url: Option<String>,
    options: BTreeMap<String, Value>,
    metadata: Vec<(String, String)>,
    pdf: Option<Vec<u8>>,
}

impl ChromiumEngine {
    pub fn new(browser: Arc<Browser>) -> Self {
        Self {
            browser,
            source_url: None,
            options: BTreeMap::new(),
            metadata: Vec::new(),
            pdf: None,
        }
    }
}

impl RenderEngine for ChromiumEngine {
    fn load_html(&mut self, markup: &str, encoding: Option<&str>) -> Result<()> {
        self.source_url = Some(markup_data_url(markup, encoding));
        self.pdf = None;
        Ok(())
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        let abs = std::fs::canonicalize(path)?;
        self.source_url = Some(format!("file://{}", abs.display()));
        self.pdf = None;
        Ok(())
    }

    fn render(&mut self) -> Result<Vec<RenderWarning>> {
        let url = self
            .source_url
            .as_ref()
            .ok_or_else(|| RenderError::Engine("no document loaded".to_string()))?;

        let (pdf_options, warnings) = map_options(&self.options);
        if !self.metadata.is_empty() {
            tracing::debug!(
                "{} metadata entries are not embedded by the chromium engine",
                self.metadata.len()
            );
        }

        let tab = self.browser.new_tab().map_err(engine_err)?;
        let result = (|| {
            tab.navigate_to(url).map_err(engine_err)?;
            tab.wait_until_navigated().map_err(engine_err)?;
            tab.print_to_pdf(Some(pdf_options)).map_err(engine_err)
        })();
        let _ = tab.close(true);

        self.pdf = Some(result?);
        Ok(warnings)
    }

    fn output(&mut self, options: &OutputOptions) -> Result<Vec<u8>> {
        if !options.compress {
            // Chromium always emits compressed content streams.
            tracing::debug!("compress=false is ignored by the chromium engine");
        }
        self.pdf
            .clone()
            .ok_or_else(|| RenderError::Engine("document has not been rendered".to_string()))
    }

    fn set_option(&mut self, key: &str, value: Value) {
        self.options.insert(key.to_string(), value);
    }

    fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    fn set_metadata(&mut self, key: &str, value: &str) {
        self.metadata.push((key.to_string(), value.to_string()));
    }
}

/// Encode markup as a data URL Chromium can navigate to
fn markup_data_url(markup: &str, encoding: Option<&str>) -> String {
    format!(
        "data:text/html;charset={};base64,{}",
        encoding.unwrap_or("utf-8"),
        BASE64.encode(markup)
    )
}

/// Map the verbatim option map onto `Page.printToPDF` parameters
///
/// Keys the protocol cannot express become render warnings instead of
/// silent drops, so strict-mode callers notice them.
fn map_options(options: &BTreeMap<String, Value>) -> (PrintToPdfOptions, Vec<RenderWarning>) {
    let mut pdf = PrintToPdfOptions::default();
    let mut warnings = Vec::new();
    let warn_type = |key: &str, expected: &str| {
        RenderWarning::new(format!("option `{key}` expects {expected}; value ignored"))
    };

    for (key, value) in options {
        match key.as_str() {
            "paper_size" => match value {
                Value::String(name) => match PaperSize::from_name(name) {
                    Some(size) => {
                        let (w, h) = size.dimensions_inches();
                        pdf.paper_width = Some(w);
                        pdf.paper_height = Some(h);
                    }
                    None => warnings.push(RenderWarning::new(format!(
                        "unknown paper size `{name}`"
                    ))),
                },
                Value::Array(dims) if dims.len() == 2 => {
                    match (dims[0].as_f64(), dims[1].as_f64()) {
                        (Some(w), Some(h)) => {
                            pdf.paper_width = Some(w);
                            pdf.paper_height = Some(h);
                        }
                        _ => warnings.push(warn_type(key, "two numbers (inches)")),
                    }
                }
                _ => warnings.push(warn_type(key, "a size name or [width, height]")),
            },
            "orientation" => match value.as_str() {
                Some("landscape") => pdf.landscape = Some(true),
                Some("portrait") => pdf.landscape = Some(false),
                _ => warnings.push(warn_type(key, "\"portrait\" or \"landscape\"")),
            },
            "landscape" => match value.as_bool() {
                Some(v) => pdf.landscape = Some(v),
                None => warnings.push(warn_type(key, "a boolean")),
            },
            "margin" => match value.as_f64() {
                Some(v) => {
                    pdf.margin_top = Some(v);
                    pdf.margin_bottom = Some(v);
                    pdf.margin_left = Some(v);
                    pdf.margin_right = Some(v);
                }
                None => warnings.push(warn_type(key, "a number (inches)")),
            },
            "margin_top" | "margin_bottom" | "margin_left" | "margin_right" => {
                match value.as_f64() {
                    Some(v) => match key.as_str() {
                        "margin_top" => pdf.margin_top = Some(v),
                        "margin_bottom" => pdf.margin_bottom = Some(v),
                        "margin_left" => pdf.margin_left = Some(v),
                        _ => pdf.margin_right = Some(v),
                    },
                    None => warnings.push(warn_type(key, "a number (inches)")),
                }
            }
            "print_background" => match value.as_bool() {
                Some(v) => pdf.print_background = Some(v),
                None => warnings.push(warn_type(key, "a boolean")),
            },
            "scale" => match value.as_f64() {
                Some(v) => pdf.scale = Some(v),
                None => warnings.push(warn_type(key, "a number")),
            },
            "page_ranges" => match value.as_str() {
                Some(v) => pdf.page_ranges = Some(v.to_string()),
                None => warnings.push(warn_type(key, "a string")),
            },
            "header_template" => match value.as_str() {
                Some(v) => {
                    pdf.header_template = Some(v.to_string());
                    pdf.display_header_footer = Some(true);
                }
                None => warnings.push(warn_type(key, "a string")),
            },
            "footer_template" => match value.as_str() {
                Some(v) => {
                    pdf.footer_template = Some(v.to_string());
                    pdf.display_header_footer = Some(true);
                }
                None => warnings.push(warn_type(key, "a string")),
            },
            "display_header_footer" => match value.as_bool() {
                Some(v) => pdf.display_header_footer = Some(v),
                None => warnings.push(warn_type(key, "a boolean")),
            },
            "prefer_css_page_size" => match value.as_bool() {
                Some(v) => pdf.prefer_css_page_size = Some(v),
                None => warnings.push(warn_type(key, "a boolean")),
            },
            other => warnings.push(RenderWarning::new(format!(
                "unknown render option `{other}` ignored by the chromium engine"
            ))),
        }
    }

    (pdf, warnings)
}

/// Shared-browser factory: one Chromium process, one tab per document
///
/// The browser launches lazily on the first document so the server can
/// start (and the library can be linked) on hosts without Chromium.
pub struct ChromiumFactory {
    path: Option<PathBuf>,
    browser: Mutex<Option<Arc<Browser>>>,
}

impl ChromiumFactory {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            browser: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.render.chromium_path.clone())
    }

    fn browser(&self) -> Result<Arc<Browser>> {
        let mut guard = self
            .browser
            .lock()
            .map_err(|_| RenderError::Engine("browser handle poisoned".to_string()))?;

        if let Some(browser) = guard.as_ref() {
            return Ok(Arc::clone(browser));
        }

        tracing::info!("Launching headless chromium");
        let mut builder = LaunchOptions::default_builder();
        builder.headless(true);
        // Container-friendly: the server commonly runs as an unprivileged
        // single-purpose process.
        builder.sandbox(false);
        if let Some(path) = &self.path {
            builder.path(Some(path.clone()));
        }
        let launch_options = builder
            .build()
            .map_err(|e| RenderError::Engine(e.to_string()))?;

        let browser = Arc::new(Browser::new(launch_options).map_err(engine_err)?);
        *guard = Some(Arc::clone(&browser));
        Ok(browser)
    }
}

impl EngineFactory for ChromiumFactory {
    fn create(&self) -> Result<Box<dyn RenderEngine>> {
        Ok(Box::new(ChromiumEngine::new(self.browser()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_markup_data_url_defaults_to_utf8() {
        let url = markup_data_url("<p>hi</p>", None);
        assert!(url.starts_with("data:text/html;charset=utf-8;base64,"));
        let encoded = url.rsplit(',').next().unwrap();
        assert_eq!(BASE64.decode(encoded).unwrap(), b"<p>hi</p>");
    }

    #[test]
    fn test_markup_data_url_honors_encoding_hint() {
        let url = markup_data_url("<p>hi</p>", Some("iso-8859-1"));
        assert!(url.starts_with("data:text/html;charset=iso-8859-1;"));
    }

    #[test]
    fn test_map_options_named_paper_and_orientation() {
        let mut options = BTreeMap::new();
        options.insert("paper_size".to_string(), json!("letter"));
        options.insert("orientation".to_string(), json!("landscape"));

        let (pdf, warnings) = map_options(&options);
        assert_eq!(pdf.paper_width, Some(8.5));
        assert_eq!(pdf.paper_height, Some(11.0));
        assert_eq!(pdf.landscape, Some(true));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_map_options_custom_dimensions() {
        let mut options = BTreeMap::new();
        options.insert("paper_size".to_string(), json!([4.0, 6.0]));

        let (pdf, warnings) = map_options(&options);
        assert_eq!(pdf.paper_width, Some(4.0));
        assert_eq!(pdf.paper_height, Some(6.0));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_map_options_unknown_key_warns() {
        let mut options = BTreeMap::new();
        options.insert("is_remote_enabled".to_string(), json!(true));

        let (_, warnings) = map_options(&options);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("is_remote_enabled"));
    }

    #[test]
    fn test_map_options_uniform_margin() {
        let mut options = BTreeMap::new();
        options.insert("margin".to_string(), json!(0.5));

        let (pdf, warnings) = map_options(&options);
        assert_eq!(pdf.margin_top, Some(0.5));
        assert_eq!(pdf.margin_bottom, Some(0.5));
        assert_eq!(pdf.margin_left, Some(0.5));
        assert_eq!(pdf.margin_right, Some(0.5));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_map_options_header_enables_display() {
        let mut options = BTreeMap::new();
        options.insert("footer_template".to_string(), json!("<span>p</span>"));

        let (pdf, _) = map_options(&options);
        assert_eq!(pdf.display_header_footer, Some(true));
    }
}
