/// Workflow Persistence Client
///
/// This module talks to the workflow backend. It handles:
/// - Validate, create, save, load, list and delete of workflows
/// - Execution start, status and the Server-Sent-Events stream
/// - Signature submission for paused Safe executions
/// - Error classification into user-facing messages

// Typed backend errors and the response envelope
pub mod error;

// Validation response classification and summaries
pub mod validation;

// SSE parser and execution event stream
pub mod events;

// reqwest-based client
pub mod client;

pub use client::{ExecutionDetail, ExecutionHandle, SavedWorkflow, SignResponse, WorkflowClient};
pub use error::{ApiError, ErrorCategory};
pub use events::{ExecutionEvent, ExecutionStream, SseEvent, SseParser};
pub use validation::{FieldError, ValidationReport};
