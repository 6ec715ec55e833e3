use thiserror::Error;

#[derive(Debug, Error)]
pub enum OllamaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Ollama returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse Ollama response line: {source}\n  line: {line}")]
    Parse {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Ollama error: {0}")]
    Server(String),

    #[error("client not started: call start() first")]
    NotStarted,
}
