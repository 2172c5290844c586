//! Core document types
//!
//! Shared types crossing the facade/engine boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Named engine options, forwarded verbatim
///
/// No validation happens locally; invalid combinations surface as
/// engine-reported failures.
pub type RenderOptions = BTreeMap<String, Value>;

/// A non-fatal message reported by the engine for one render call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderWarning {
    pub message: String,
}

impl RenderWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Options for serializing rendered output
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Compress content streams where the engine supports it
    pub compress: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self { compress: true }
    }
}

/// Reader permissions attached when a document is encrypted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub print: bool,
    pub copy: bool,
    pub modify: bool,
    pub annotate: bool,
}

impl Permissions {
    pub fn all() -> Self {
        Self {
            print: true,
            copy: true,
            modify: true,
            annotate: true,
        }
    }
}

/// Well-known paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl PaperSize {
    /// Dimensions in inches, portrait
    pub fn dimensions_inches(&self) -> (f64, f64) {
        match self {
            Self::A3 => (11.69, 16.54),
            Self::A4 => (8.27, 11.69),
            Self::A5 => (5.83, 8.27),
            Self::Letter => (8.5, 11.0),
            Self::Legal => (8.5, 14.0),
            Self::Tabloid => (11.0, 17.0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::A3 => "a3",
            Self::A4 => "a4",
            Self::A5 => "a5",
            Self::Letter => "letter",
            Self::Legal => "legal",
            Self::Tabloid => "tabloid",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "a3" => Some(Self::A3),
            "a4" => Some(Self::A4),
            "a5" => Some(Self::A5),
            "letter" => Some(Self::Letter),
            "legal" => Some(Self::Legal),
            "tabloid" => Some(Self::Tabloid),
            _ => None,
        }
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }
}
