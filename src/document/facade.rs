//! Document facade
//!
//! `Document` orchestrates one rendering unit: it exclusively owns one
//! engine instance, preprocesses markup on the way in, tracks whether the
//! engine has rendered, and terminates in one of three sinks (raw bytes, a
//! storage disk, an HTTP response).
//!
//! # State machine
//!
//! ```text
//!   load_html / load_file / load_view        render / bytes / save / ...
//!  ─────────────────────────────────▶ Unrendered ────────────▶ Rendered
//!                 ▲                                                │
//!                 └────────────────── load_* ──────────────────────┘
//! ```
//!
//! Output operations render at most once; an explicit `render()` always
//! re-renders; any `load_*` discards the prior render. One document per
//! caller; there is no internal locking.

use std::path::Path;

use axum::response::Response;
use serde_json::Value;

use crate::config::Config;
use crate::document::types::{
    Orientation, OutputOptions, PaperSize, Permissions, RenderOptions,
};
use crate::engine::{Dispatch, RenderEngine};
use crate::error::{RenderError, Result};
use crate::response;
use crate::storage::DiskRegistry;
use crate::text::Preprocessor;
use crate::view::ViewRenderer;

pub struct Document {
    engine: Box<dyn RenderEngine>,
    preprocessor: Preprocessor,
    strict_warnings: bool,
    rendered: bool,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("strict_warnings", &self.strict_warnings)
            .field("rendered", &self.rendered)
            .finish_non_exhaustive()
    }
}

impl Document {
    pub fn new(engine: Box<dyn RenderEngine>) -> Self {
        Self {
            engine,
            preprocessor: Preprocessor::default(),
            strict_warnings: false,
            rendered: false,
        }
    }

    /// Seed preprocessing and warning policy from the application config
    pub fn with_config(engine: Box<dyn RenderEngine>, config: &Config) -> Self {
        Self {
            engine,
            preprocessor: Preprocessor::from_config(config),
            strict_warnings: config.render.strict_warnings,
            rendered: false,
        }
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    /// Treat engine warnings as fatal for this document
    pub fn set_strict_warnings(&mut self, strict: bool) -> &mut Self {
        self.strict_warnings = strict;
        self
    }

    pub fn set_preprocessor(&mut self, preprocessor: Preprocessor) -> &mut Self {
        self.preprocessor = preprocessor;
        self
    }

    /// Load a markup string, preprocessed, discarding any prior render
    pub fn load_html(&mut self, markup: &str) -> Result<&mut Self> {
        self.load_html_with_encoding(markup, None)
    }

    pub fn load_html_with_encoding(
        &mut self,
        markup: &str,
        encoding: Option<&str>,
    ) -> Result<&mut Self> {
        let processed = self.preprocessor.process(markup);
        self.engine.load_html(&processed, encoding)?;
        self.rendered = false;
        Ok(self)
    }

    /// Load markup from a file path
    ///
    /// The engine reads the file itself; the preprocessor only applies to
    /// in-memory markup.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        self.engine.load_file(path.as_ref())?;
        self.rendered = false;
        Ok(self)
    }

    /// Resolve a template through the view collaborator, then load it
    pub fn load_view(
        &mut self,
        views: &dyn ViewRenderer,
        name: &str,
        data: &Value,
        merge_data: &Value,
    ) -> Result<&mut Self> {
        let markup = views.render(name, data, merge_data)?;
        self.load_html(&markup)
    }

    /// Run full layout, unconditionally
    ///
    /// Warnings reported by the engine for this call are logged; in strict
    /// mode they are aggregated newline-joined in report order into a
    /// `RenderedWithWarnings` failure. A failed render leaves the document
    /// Unrendered.
    pub fn render(&mut self) -> Result<&mut Self> {
        self.rendered = false;
        let warnings = self.engine.render()?;
        if !warnings.is_empty() {
            if self.strict_warnings {
                let joined = warnings
                    .iter()
                    .map(|w| w.message.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                return Err(RenderError::RenderedWithWarnings(joined));
            }
            for warning in &warnings {
                tracing::warn!("Render warning: {}", warning.message);
            }
        }
        self.rendered = true;
        Ok(self)
    }

    fn render_if_needed(&mut self) -> Result<()> {
        if !self.rendered {
            self.render()?;
        }
        Ok(())
    }

    /// Serialize the document, rendering first when needed
    ///
    /// Safe to call repeatedly once rendered: the engine serializes fresh
    /// bytes each time without re-running layout.
    pub fn bytes(&mut self, options: &OutputOptions) -> Result<Vec<u8>> {
        self.render_if_needed()?;
        self.engine.output(options)
    }

    pub fn bytes_default(&mut self) -> Result<Vec<u8>> {
        self.bytes(&OutputOptions::default())
    }

    /// Set a named engine option, forwarded verbatim
    pub fn set_option(&mut self, key: &str, value: Value) -> &mut Self {
        self.engine.set_option(key, value);
        self
    }

    pub fn set_options(&mut self, options: RenderOptions) -> &mut Self {
        for (key, value) in options {
            self.engine.set_option(&key, value);
        }
        self
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.engine.option(key)
    }

    /// Convenience wrapper over the paper option keys
    pub fn paper(&mut self, size: PaperSize, orientation: Orientation) -> &mut Self {
        self.set_option("paper_size", Value::String(size.name().to_string()));
        self.set_option("orientation", Value::String(orientation.name().to_string()));
        self
    }

    /// Append a metadata entry (title, author, ...)
    pub fn add_info(&mut self, key: &str, value: &str) -> &mut Self {
        self.engine.set_metadata(key, value);
        self
    }

    /// Encrypt the rendered document
    ///
    /// Encryption applies to the engine's output layer, so a render is
    /// forced first. Engines without the protection capability fail with
    /// `UnsupportedCapability` and nothing else runs.
    pub fn encrypt(
        &mut self,
        user_password: &str,
        owner_password: &str,
        permissions: &Permissions,
    ) -> Result<&mut Self> {
        self.render()?;
        match self.engine.protection() {
            Some(protection) => {
                protection.encrypt(user_password, owner_password, permissions)?;
                Ok(self)
            }
            None => Err(RenderError::UnsupportedCapability("encryption")),
        }
    }

    /// Dispatch an optional engine method by name
    ///
    /// Operations the engine marks as self-chaining yield no value: the
    /// caller already holds this document and keeps chaining on it. Methods
    /// the engine does not know fail with `UnsupportedOperation`.
    pub fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Option<Value>> {
        match self.engine.invoke(method, args)? {
            Dispatch::Chain => Ok(None),
            Dispatch::Value(value) => Ok(Some(value)),
        }
    }

    /// Persist to a named disk (or the registry default)
    pub async fn save(
        &mut self,
        disks: &DiskRegistry,
        disk: Option<&str>,
        path: &str,
    ) -> Result<&mut Self> {
        let bytes = self.bytes_default()?;
        disks.put(disk, path, &bytes).await?;
        Ok(self)
    }

    /// Wrap the document in an attachment response
    pub fn download(&mut self, filename: &str) -> Result<Response> {
        Ok(response::download(self.bytes_default()?, filename))
    }

    /// Wrap the document in an inline response
    pub fn stream(&mut self, filename: &str) -> Result<Response> {
        Ok(response::stream(self.bytes_default()?, filename))
    }
}
