//! OpenAI-compatible Chat Completions client

pub mod client;
pub mod types;

pub use client::OpenAiClient;
