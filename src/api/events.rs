/// Execution event stream (Server-Sent Events)
///
/// `GET /workflows/executions/:id/subscribe` answers with a
/// `text/event-stream` body. The parser is fed raw chunks as they arrive and
/// yields complete events; `ExecutionStream` turns them into typed execution
/// events and closes itself after a terminal event or a transport error.
/// There is no reconnect: a dropped stream needs a fresh subscription.

use crate::api::error::ApiError;
use crate::signing::types::SignatureRequest;
use serde_json::Value;
use std::collections::VecDeque;

pub const EVENT_SIGNATURE_REQUIRED: &str = "node:signature_required";
pub const EVENT_EXECUTION_COMPLETED: &str = "execution:completed";
pub const EVENT_EXECUTION_FAILED: &str = "execution:failed";
pub const EVENT_CLOSE: &str = "close";

/// Longest line the parser buffers while waiting for its newline
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// One dispatched SSE event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// `event:` field, "message" when absent
    pub event: String,
    /// `data:` lines joined with '\n'
    pub data: String,
    pub id: Option<String>,
}

/// Incremental `text/event-stream` parser
#[derive(Debug)]
pub struct SseParser {
    buffer: Vec<u8>,
    max_line: usize,
    event: Option<String>,
    data: Vec<String>,
    id: Option<String>,
}

impl Default for SseParser {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_line,
            event: None,
            data: Vec::new(),
            id: None,
        }
    }

    /// Feed a chunk; returns every event completed by it
    ///
    /// Fails once an unterminated line grows past the line limit.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>, ApiError> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }

        if self.buffer.len() > self.max_line {
            self.buffer.clear();
            return Err(ApiError::Decode(format!(
                "event stream line exceeds {} bytes",
                self.max_line
            )));
        }
        Ok(events)
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        if self.data.is_empty() && self.event.is_none() {
            return None;
        }
        let event = SseEvent {
            event: self.event.take().unwrap_or_else(|| "message".to_string()),
            data: std::mem::take(&mut self.data).join("\n"),
            id: self.id.take(),
        };
        Some(event)
    }
}

/// Typed execution event
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    /// A node paused until the Safe transaction it prepared is signed
    SignatureRequired(SignatureRequest),
    Completed(Value),
    Failed(Value),
    Close,
    /// Progress and any other named event, passed through untyped
    Other { event: String, data: Value },
}

impl ExecutionEvent {
    pub fn from_sse(sse: &SseEvent) -> Self {
        let data = if sse.data.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&sse.data).unwrap_or_else(|_| Value::String(sse.data.clone()))
        };

        match sse.event.as_str() {
            EVENT_SIGNATURE_REQUIRED => match serde_json::from_value(data.clone()) {
                Ok(request) => ExecutionEvent::SignatureRequired(request),
                Err(e) => {
                    tracing::warn!("⚠️ Malformed signature request event: {}", e);
                    ExecutionEvent::Other {
                        event: sse.event.clone(),
                        data,
                    }
                }
            },
            EVENT_EXECUTION_COMPLETED => ExecutionEvent::Completed(data),
            EVENT_EXECUTION_FAILED => ExecutionEvent::Failed(data),
            EVENT_CLOSE => ExecutionEvent::Close,
            _ => ExecutionEvent::Other {
                event: sse.event.clone(),
                data,
            },
        }
    }

    /// Whether the server sends nothing after this event
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionEvent::Completed(_) | ExecutionEvent::Failed(_) | ExecutionEvent::Close
        )
    }
}

/// Live subscription to one execution's events
#[derive(Debug)]
pub struct ExecutionStream {
    execution_id: String,
    response: Option<reqwest::Response>,
    parser: SseParser,
    pending: VecDeque<ExecutionEvent>,
}

impl ExecutionStream {
    pub(crate) fn new(execution_id: String, response: reqwest::Response) -> Self {
        Self {
            execution_id,
            response: Some(response),
            parser: SseParser::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub fn is_closed(&self) -> bool {
        self.response.is_none() && self.pending.is_empty()
    }

    /// Drop the connection; buffered events are discarded
    pub fn close(&mut self) {
        if self.response.take().is_some() {
            tracing::debug!("🔌 Closed event stream for execution {}", self.execution_id);
        }
        self.pending.clear();
    }

    /// Next event, or `Ok(None)` once the stream has ended
    ///
    /// A terminal event is returned and the connection is closed right
    /// after it. A transport error closes the stream and is returned once.
    pub async fn next_event(&mut self) -> Result<Option<ExecutionEvent>, ApiError> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                if event.is_terminal() {
                    self.close();
                }
                return Ok(Some(event));
            }

            let Some(response) = self.response.as_mut() else {
                return Ok(None);
            };

            match response.chunk().await {
                Ok(Some(bytes)) => match self.parser.feed(&bytes) {
                    Ok(events) => {
                        for sse in events {
                            self.pending.push_back(ExecutionEvent::from_sse(&sse));
                        }
                    }
                    Err(e) => {
                        tracing::warn!("⚠️ Event stream for execution {} closed: {}", self.execution_id, e);
                        self.close();
                        return Err(e);
                    }
                },
                Ok(None) => {
                    tracing::debug!("📭 Event stream for execution {} ended", self.execution_id);
                    self.response = None;
                }
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Event stream for execution {} dropped: {}",
                        self.execution_id,
                        e
                    );
                    self.close();
                    return Err(ApiError::Transport(e));
                }
            }
        }
    }
}
