//! Test engines
//!
//! `CountingEngine` is an in-memory `RenderEngine` for unit and integration
//! tests: it counts render calls, scripts warnings, optionally exposes the
//! encryption capability, and records what reached it through a shared
//! `Recorder` handle that outlives the engine once it moves into a
//! `Document`.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::document::{OutputOptions, Permissions, RenderWarning};
use crate::engine::{Dispatch, Protection, RenderEngine};
use crate::error::{RenderError, Result};

/// Shared view into a `CountingEngine` that moved into a document
#[derive(Clone, Default)]
pub struct Recorder {
    renders: Arc<AtomicUsize>,
    loaded_markup: Arc<Mutex<Vec<String>>>,
    encryptions: Arc<Mutex<Vec<(String, String)>>>,
}

impl Recorder {
    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn last_markup(&self) -> Option<String> {
        self.loaded_markup
            .lock()
            .expect("recorder poisoned")
            .last()
            .cloned()
    }

    pub fn encryptions(&self) -> Vec<(String, String)> {
        self.encryptions.lock().expect("recorder poisoned").clone()
    }
}

struct FakeProtection {
    recorder: Recorder,
}

impl Protection for FakeProtection {
    fn encrypt(
        &mut self,
        user_password: &str,
        owner_password: &str,
        _permissions: &Permissions,
    ) -> Result<()> {
        self.recorder
            .encryptions
            .lock()
            .expect("recorder poisoned")
            .push((user_password.to_string(), owner_password.to_string()));
        Ok(())
    }
}

/// Render-counting fake engine
pub struct CountingEngine {
    recorder: Recorder,
    warnings: Vec<String>,
    protection: Option<FakeProtection>,
    source_loaded: bool,
    rendered: bool,
    options: BTreeMap<String, Value>,
    metadata: Vec<(String, String)>,
}

impl CountingEngine {
    pub fn new() -> Self {
        Self {
            recorder: Recorder::default(),
            warnings: Vec::new(),
            protection: None,
            source_loaded: false,
            rendered: false,
            options: BTreeMap::new(),
            metadata: Vec::new(),
        }
    }

    /// Script warnings reported by every render call, in order
    pub fn with_warnings<I, S>(mut self, warnings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.warnings = warnings.into_iter().map(Into::into).collect();
        self
    }

    /// Expose the encryption capability
    pub fn with_protection(mut self) -> Self {
        self.protection = Some(FakeProtection {
            recorder: self.recorder.clone(),
        });
        self
    }

    pub fn recorder(&self) -> Recorder {
        self.recorder.clone()
    }

    pub fn metadata(&self) -> &[(String, String)] {
        &self.metadata
    }
}

impl Default for CountingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderEngine for CountingEngine {
    fn load_html(&mut self, markup: &str, _encoding: Option<&str>) -> Result<()> {
        self.recorder
            .loaded_markup
            .lock()
            .expect("recorder poisoned")
            .push(markup.to_string());
        self.source_loaded = true;
        self.rendered = false;
        Ok(())
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        self.recorder
            .loaded_markup
            .lock()
            .expect("recorder poisoned")
            .push(format!("file:{}", path.display()));
        self.source_loaded = true;
        self.rendered = false;
        Ok(())
    }

    fn render(&mut self) -> Result<Vec<RenderWarning>> {
        if !self.source_loaded {
            return Err(RenderError::Engine("no document loaded".to_string()));
        }
        self.recorder.renders.fetch_add(1, Ordering::SeqCst);
        self.rendered = true;
        Ok(self
            .warnings
            .iter()
            .map(|message| RenderWarning::new(message.as_str()))
            .collect())
    }

    fn output(&mut self, _options: &OutputOptions) -> Result<Vec<u8>> {
        if !self.rendered {
            return Err(RenderError::Engine(
                "document has not been rendered".to_string(),
            ));
        }
        Ok(format!("%PDF-1.7 fake render #{}", self.recorder.render_count()).into_bytes())
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

    fn protection(&mut self) -> Option<&mut dyn Protection> {
        self.protection
            .as_mut()
            .map(|p| p as &mut dyn Protection)
    }

    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Dispatch> {
        match method {
            // Returns a value.
            "engine_version" => Ok(Dispatch::Value(Value::String("fake-1.0".to_string()))),
            // Echoes its first argument back.
            "echo" => Ok(Dispatch::Value(args.first().cloned().unwrap_or(Value::Null))),
            // Would return the engine itself: self-chaining.
            "set_base_host" => Ok(Dispatch::Chain),
            other => Err(RenderError::UnsupportedOperation(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_requires_a_source() {
        let mut engine = CountingEngine::new();
        assert!(matches!(engine.render(), Err(RenderError::Engine(_))));
    }

    #[test]
    fn test_recorder_counts_renders() {
        let mut engine = CountingEngine::new();
        let recorder = engine.recorder();
        engine.load_html("<p>x</p>", None).unwrap();
        engine.render().unwrap();
        engine.render().unwrap();
        assert_eq!(recorder.render_count(), 2);
    }

    #[test]
    fn test_output_before_render_fails() {
        let mut engine = CountingEngine::new();
        engine.load_html("<p>x</p>", None).unwrap();
        assert!(engine.output(&OutputOptions::default()).is_err());
    }
}
