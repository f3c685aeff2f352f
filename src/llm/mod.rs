//! AI-backed field extraction client.

mod client;

pub use client::{LlmClient, LlmConfig, LlmError};
