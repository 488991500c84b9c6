// src/lib.rs
//! JSON layout documents on top of `trellis-layout`: loading, text
//! measurement and reports.

pub mod document;
pub mod report;

pub use document::{Document, DocumentNode, TextMeasurer};
pub use report::{render, OutputFormat};
