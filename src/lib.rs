//! pdftriage - PDF batch analysis and structured extraction system.
//!
//! A tool for analyzing collections of PDF documents in parallel and
//! converting their content into typed records via schema-driven
//! extraction, with an AI-backed primary path and a deterministic
//! pattern fallback.

pub mod batch;
pub mod cli;
pub mod config;
pub mod extract;
pub mod llm;
pub mod models;
pub mod pdf;
pub mod services;
