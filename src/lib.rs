//! pdfsmith
//!
//! An HTML-to-PDF rendering facade: a stateful `Document` wrapper over a
//! pluggable engine, markup preprocessing (currency entities, Arabic
//! presentation-form reshaping), and interchangeable output sinks (raw
//! bytes, storage disks, HTTP responses). The server binary in `main.rs`
//! exposes the facade over HTTP.
//!
//! # Modules
//!
//! - `document`: the rendering facade and its shared types
//! - `engine`: the engine capability boundary and the Chromium adapter
//! - `text`: markup preprocessing
//! - `view`: the template-rendering collaborator
//! - `storage`: named output disks (local filesystem, S3)
//! - `response`: HTTP delivery of rendered bytes

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod response;
pub mod routes;
pub mod state;
pub mod storage;
pub mod text;
pub mod view;
