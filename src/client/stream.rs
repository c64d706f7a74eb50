//! Lectura del stream SSE de cambios
//!
//! `ChangeStream` mantiene abierta la respuesta de `/api/profile/stream`.
//! Soltarlo cierra la conexión y el servidor libera su suscripción.

use reqwest::Response;
use serde_json::Value;
use tracing::debug;

use super::ClientError;

/// Un evento recibido por el stream
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEvent {
    /// `insert`, `update` o `delete`
    pub kind: String,
    pub record: Value,
}

pub struct ChangeStream {
    response: Response,
    buffer: Vec<u8>,
}

impl ChangeStream {
    pub(crate) fn new(response: Response) -> Self {
        Self {
            response,
            buffer: Vec::new(),
        }
    }

    /// Siguiente evento; `None` cuando el servidor cierra el stream.
    /// Los keep-alive se descartan.
    pub async fn next_event(&mut self) -> Result<Option<StreamEvent>, ClientError> {
        loop {
            if let Some(end) = find_block_end(&self.buffer) {
                let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
                let block =
                    String::from_utf8(block).map_err(|e| ClientError::Decode(e.to_string()))?;
                if let Some(event) = parse_block(&block)? {
                    debug!("📡 Evento {} recibido", event.kind);
                    return Ok(Some(event));
                }
                continue;
            }

            match self.response.chunk().await? {
                Some(bytes) => self.buffer.extend_from_slice(&bytes),
                None => return Ok(None),
            }
        }
    }
}

fn find_block_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

fn parse_block(block: &str) -> Result<Option<StreamEvent>, ClientError> {
    let mut kind = None;
    let mut data = Vec::new();

    for line in block.lines() {
        if let Some(value) = line.strip_prefix("event:") {
            kind = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            data.push(value.strip_prefix(' ').unwrap_or(value));
        }
    }

    if data.is_empty() {
        return Ok(None);
    }

    let record = serde_json::from_str(&data.join("\n"))
        .map_err(|e| ClientError::Decode(e.to_string()))?;
    Ok(Some(StreamEvent {
        kind: kind.unwrap_or_else(|| "message".to_string()),
        record,
    }))
}
