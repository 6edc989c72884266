//! # askdb LLM SDK
//!
//! Provider-agnostic LLM client layer used by the askdb agents. Models a
//! conversation as role-tagged messages that can carry tool-call requests
//! (assistant) and tool results (tool), and exposes a single [`client::LlmClient`]
//! trait so the reasoning code never depends on a concrete provider.
//!
//! ## Example
//!
//! ```rust,no_run
//! use askdb_llm_sdk::client::LlmClient;
//! use askdb_llm_sdk::openai::OpenAiClient;
//! use askdb_llm_sdk::types::{CompletionRequest, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenAiClient::new("your-api-key")?;
//!     let request = CompletionRequest {
//!         messages: vec![Message::user("How many tables are in the database?")],
//!         max_tokens: 1024,
//!         model: client.model_name().to_string(),
//!         system: None,
//!         temperature: None,
//!         top_p: None,
//!         stop_sequences: None,
//!         tools: None,
//!         tool_choice: None,
//!         response_format: None,
//!     };
//!     let response = client.complete(request).await?;
//!     println!("{}", response.content);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod openai;
pub mod tools;
pub mod types;

pub use client::LlmClient;
pub use error::LlmError;
