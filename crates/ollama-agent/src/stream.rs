use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use crate::types::GenerateChunk;
use crate::{OllamaError, Result};

/// Fragments buffered ahead of the consumer. Kept small so an idle consumer
/// applies backpressure to the HTTP body almost immediately.
const CHANNEL_CAPACITY: usize = 4;

// ─── ResponseStream ───────────────────────────────────────────────────────

/// An async stream of text fragments from a streaming `/api/generate` call.
///
/// Backed by a Tokio mpsc channel. A background task owns the HTTP response
/// body, decodes NDJSON lines and forwards each non-empty `response` fragment
/// until a `done: true` line arrives. Dropping `ResponseStream` closes the
/// receiver, which makes the background task exit on its next send and drop
/// the connection.
///
/// ```rust,ignore
/// use futures::StreamExt;
///
/// let mut stream = client.stream("say hello", &[], None).await?;
/// while let Some(fragment) = stream.next().await {
///     print!("{}", fragment?);
/// }
/// ```
pub struct ResponseStream {
    rx: mpsc::Receiver<Result<String>>,
}

impl ResponseStream {
    pub(crate) fn spawn(response: reqwest::Response) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut body = response.bytes_stream();
            let mut decoder = LineDecoder::default();

            'body: while let Some(bytes) = body.next().await {
                let bytes = match bytes {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx.send(Err(OllamaError::Http(e))).await;
                        return;
                    }
                };
                for line in decoder.push(&bytes) {
                    match forward_line(&tx, &line).await {
                        Flow::Continue => {}
                        Flow::Stop => break 'body,
                    }
                }
            }

            if let Some(line) = decoder.finish() {
                let _ = forward_line(&tx, &line).await;
            }
        });

        ResponseStream { rx }
    }

    /// Wrap a raw receiver. Lets callers and tests feed pre-built fragments.
    pub fn from_channel(rx: mpsc::Receiver<Result<String>>) -> Self {
        Self { rx }
    }
}

impl Stream for ResponseStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

enum Flow {
    Continue,
    Stop,
}

async fn forward_line(tx: &mpsc::Sender<Result<String>>, line: &str) -> Flow {
    let chunk = match parse_chunk(line) {
        Ok(c) => c,
        Err(e) => {
            let _ = tx.send(Err(e)).await;
            return Flow::Stop;
        }
    };
    if !chunk.response.is_empty() && tx.send(Ok(chunk.response)).await.is_err() {
        tracing::debug!("response stream receiver dropped; abandoning generation");
        return Flow::Stop;
    }
    if chunk.done {
        Flow::Stop
    } else {
        Flow::Continue
    }
}

/// Decode one NDJSON line, surfacing an in-band `error` field as an error.
pub(crate) fn parse_chunk(line: &str) -> Result<GenerateChunk> {
    let chunk: GenerateChunk = serde_json::from_str(line).map_err(|source| OllamaError::Parse {
        line: line.to_string(),
        source,
    })?;
    match chunk.error {
        Some(msg) => Err(OllamaError::Server(msg)),
        None => Ok(chunk),
    }
}

// ─── LineDecoder ──────────────────────────────────────────────────────────

/// Reassembles newline-delimited lines from arbitrarily split byte chunks.
#[derive(Debug, Default)]
pub(crate) struct LineDecoder {
    buf: Vec<u8>,
}

impl LineDecoder {
    /// Feed bytes, returning every complete non-blank line.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw).trim().to_string();
            if !line.is_empty() {
                lines.push(line);
            }
        }
        lines
    }

    /// The trailing line when the body did not end with a newline.
    pub(crate) fn finish(self) -> Option<String> {
        let line = String::from_utf8_lossy(&self.buf).trim().to_string();
        (!line.is_empty()).then_some(line)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoder_splits_complete_lines() {
        let mut d = LineDecoder::default();
        let lines = d.push(b"{\"a\":1}\n{\"b\":2}\n");
        assert_eq!(lines, vec!["{\"a\":1}", "{\"b\":2}"]);
        assert_eq!(d.finish(), None);
    }

    #[test]
    fn decoder_reassembles_split_lines() {
        let mut d = LineDecoder::default();
        assert!(d.push(b"{\"resp").is_empty());
        let lines = d.push(b"onse\":\"hi\"}\n{\"x");
        assert_eq!(lines, vec!["{\"response\":\"hi\"}"]);
        assert_eq!(d.finish(), Some("{\"x".to_string()));
    }

    #[test]
    fn decoder_skips_blank_lines() {
        let mut d = LineDecoder::default();
        let lines = d.push(b"\n  \n{}\r\n");
        assert_eq!(lines, vec!["{}"]);
    }

    #[test]
    fn decoder_keeps_multibyte_characters_split_across_chunks() {
        let text = "{\"response\":\"héllo\"}\n".as_bytes();
        let (a, b) = text.split_at(15);
        let mut d = LineDecoder::default();
        assert!(d.push(a).is_empty());
        assert_eq!(d.push(b), vec!["{\"response\":\"héllo\"}"]);
    }

    #[test]
    fn parse_chunk_reads_fragment() {
        let chunk = parse_chunk(r#"{"model":"m","response":"Hel","done":false}"#).unwrap();
        assert_eq!(chunk.response, "Hel");
        assert!(!chunk.done);
    }

    #[test]
    fn parse_chunk_surfaces_server_error() {
        let err = parse_chunk(r#"{"error":"model 'x' not found"}"#).unwrap_err();
        assert!(matches!(err, OllamaError::Server(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn parse_chunk_rejects_garbage() {
        let err = parse_chunk("not json").unwrap_err();
        assert!(matches!(err, OllamaError::Parse { .. }));
    }

    #[tokio::test]
    async fn from_channel_yields_fragments_in_order() {
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(async move {
            for f in ["a", "b", "c"] {
                tx.send(Ok(f.to_string())).await.unwrap();
            }
        });
        let stream = ResponseStream::from_channel(rx);
        let fragments: Vec<String> = stream.map(|f| f.unwrap()).collect().await;
        assert_eq!(fragments, vec!["a", "b", "c"]);
    }
}
