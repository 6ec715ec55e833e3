//! `ollama-agent`: native async Rust client for a local Ollama server.
//!
//! # Architecture
//!
//! ```text
//! OllamaConfig
//!     │
//!     ▼
//! OllamaClient    ← start() / close() own the reqwest connection pool
//!     │              generate() → POST /api/generate (stream: false)
//!     ▼
//! ResponseStream  ← implements futures::Stream<Item = Result<String>>
//!                    background task decodes NDJSON + mpsc channel
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use ollama_agent::{OllamaClient, OllamaConfig};
//!
//! let client = OllamaClient::new(OllamaConfig::default());
//! client.start().await?;
//! if client.health().is_healthy {
//!     let mut stream = client.stream("Write a haiku about Rust.", &[], None).await?;
//!     while let Some(fragment) = stream.next().await {
//!         print!("{}", fragment?);
//!     }
//! }
//! client.close().await;
//! ```

pub mod client;
pub mod error;
pub mod prompt;
pub mod stream;
pub mod types;

pub use client::OllamaClient;
pub use error::OllamaError;
pub use stream::ResponseStream;
pub use types::{ChatTurn, HealthStatus, OllamaConfig};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, OllamaError>;
