//! Engine capability boundary
//!
//! `RenderEngine` is the narrow interface the facade drives: load markup,
//! render, serialize, plus the verbatim option and metadata maps. Everything
//! the underlying renderer does beyond that surface is reached through two
//! typed escape hatches:
//!
//! - `protection()` exposes the encryption capability when the engine's
//!   output layer supports it, and nothing otherwise
//! - `invoke()` dispatches optional engine methods by name; `Dispatch::Chain`
//!   marks operations that would return the engine itself, so callers keep
//!   their fluent chain without any runtime identity comparison
//!
//! Warnings are a render-call-scoped return value: each `render` reports the
//! warnings produced by that call and nothing else, so there is no shared
//! warning buffer anywhere.

pub mod chromium;
pub mod fake;

use std::path::Path;

use serde_json::Value;

use crate::document::{OutputOptions, Permissions, RenderWarning};
use crate::error::{RenderError, Result};

pub use chromium::{ChromiumEngine, ChromiumFactory};

/// Capability interface over an HTML-to-PDF renderer
///
/// One engine instance is exclusively owned by one `Document` for its
/// lifetime; implementations do not need internal locking.
pub trait RenderEngine: Send {
    /// Ingest a markup string, with an optional encoding hint
    fn load_html(&mut self, markup: &str, encoding: Option<&str>) -> Result<()>;

    /// Ingest markup from a file path
    fn load_file(&mut self, path: &Path) -> Result<()>;

    /// Run full layout. CPU-bound, synchronous, potentially expensive.
    ///
    /// Returns the warnings generated during this call, in report order.
    fn render(&mut self) -> Result<Vec<RenderWarning>>;

    /// Serialize the rendered document to bytes
    fn output(&mut self, options: &OutputOptions) -> Result<Vec<u8>>;

    /// Set a named option, forwarded verbatim
    fn set_option(&mut self, key: &str, value: Value);

    /// Read a named option back
    fn option(&self, key: &str) -> Option<&Value>;

    /// Append a metadata entry (title, author, ...)
    fn set_metadata(&mut self, key: &str, value: &str);

    /// Encryption capability, when the engine's output layer supports it
    fn protection(&mut self) -> Option<&mut dyn Protection> {
        None
    }

    /// Dispatch an optional engine method by name
    fn invoke(&mut self, method: &str, _args: &[Value]) -> Result<Dispatch> {
        Err(RenderError::UnsupportedOperation(method.to_string()))
    }
}

/// Result of an `invoke` dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The operation would have returned the engine itself; the caller
    /// keeps chaining on the facade instead
    Chain,
    /// The operation produced a value
    Value(Value),
}

/// Document encryption capability
pub trait Protection {
    fn encrypt(
        &mut self,
        user_password: &str,
        owner_password: &str,
        permissions: &Permissions,
    ) -> Result<()>;
}

/// Produces one fresh engine per document
///
/// Documents are request-scoped and single-caller, so every `Document`
/// gets its own engine instance.
pub trait EngineFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn RenderEngine>>;
}
