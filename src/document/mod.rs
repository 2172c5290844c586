//! Document rendering facade
//!
//! This module provides the stateful `Document` wrapper over a pluggable
//! rendering engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      Document                           │
//! │   (Unrendered/Rendered state, warning policy, sinks)    │
//! └─────────────────────────────────────────────────────────┘
//!          │                  │                  │
//!          ▼                  ▼                  ▼
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐
//! │ Preprocessor │   │ RenderEngine │   │   Output sinks   │
//! │ (entities +  │   │ (chromium,   │   │ (bytes, disks,   │
//! │  reshaping)  │   │  fakes, ...) │   │  HTTP responses) │
//! └──────────────┘   └──────────────┘   └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use pdfsmith::document::{Document, PaperSize, Orientation};
//!
//! let mut doc = Document::with_config(factory.create()?, &config);
//! doc.load_html("<h1>Invoice</h1>")?
//!     .paper(PaperSize::A4, Orientation::Portrait)
//!     .add_info("title", "Invoice 2024-001");
//! let response = doc.download("invoice.pdf")?;
//! ```

mod facade;
mod types;

pub use facade::Document;
pub use types::{
    Orientation, OutputOptions, PaperSize, Permissions, RenderOptions, RenderWarning,
};
