/// Backend error taxonomy
///
/// Every non-2xx response is mapped through `ApiError::from_parts`, so
/// save, execute and load all report failures the same way. Validate reads
/// its 400/422 bodies into a `ValidationReport` instead.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Backend error code for schema validation failures
pub const VALIDATION_ERROR_CODE: &str = "VALIDATION_ERROR";

/// Response envelope shared by every backend endpoint
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
}

/// `error` member of the envelope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// A list of `{field, message}` for schema errors, free-form for graph errors
    #[serde(default)]
    pub details: Value,
}

/// One entry of `error.details[]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl ErrorBody {
    /// `details` entries that look like field errors
    pub fn field_details(&self) -> Vec<ErrorDetail> {
        field_details(&self.details)
    }

    /// Message shown for this error, falling back to the raw body
    ///
    /// `VALIDATION_ERROR` bodies show their `details[].message` joined by "; ".
    pub fn display_message(&self, status: u16, body: &str) -> String {
        let message = self
            .message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback_message(status, body));
        if self.code.as_deref() == Some(VALIDATION_ERROR_CODE) {
            flatten_details(self).unwrap_or(message)
        } else {
            message
        }
    }
}

pub fn field_details(details: &Value) -> Vec<ErrorDetail> {
    details
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|d| serde_json::from_value(d.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Coarse bucket a caller can pick a message or retry policy from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Auth,
    RateLimited,
    Validation,
    NotFound,
    Unknown,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthorized,

    #[error("{message}")]
    RateLimited {
        retry_after: Option<u64>,
        message: String,
    },

    #[error("{message}")]
    Validation {
        code: String,
        message: String,
        details: Value,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("request failed with status {status}: {message}")]
    Http {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiError::Unauthorized => ErrorCategory::Auth,
            ApiError::RateLimited { .. } => ErrorCategory::RateLimited,
            ApiError::Validation { .. } => ErrorCategory::Validation,
            ApiError::NotFound(_) => ErrorCategory::NotFound,
            ApiError::Http { .. } | ApiError::Transport(_) | ApiError::Decode(_) => {
                ErrorCategory::Unknown
            }
        }
    }

    /// Map a failed response to an error
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        match response.text().await {
            Ok(body) => Self::from_parts(status, retry_after.as_deref(), &body),
            Err(e) => ApiError::Transport(e),
        }
    }

    /// Map status, `Retry-After` header and raw body to an error
    pub fn from_parts(status: u16, retry_after: Option<&str>, body: &str) -> Self {
        let error = serde_json::from_str::<Envelope<Value>>(body)
            .ok()
            .and_then(|e| e.error)
            .unwrap_or_default();
        let code = error.code.clone();
        let message = error.display_message(status, body);

        match status {
            401 | 403 => ApiError::Unauthorized,
            404 => ApiError::NotFound(message),
            429 => {
                let retry_after = retry_after.and_then(|v| v.trim().parse::<u64>().ok());
                ApiError::RateLimited {
                    retry_after,
                    message: rate_limit_message(retry_after),
                }
            }
            400 | 422 if code.is_some() => ApiError::Validation {
                code: code.unwrap_or_default(),
                message,
                details: error.details,
            },
            _ => ApiError::Http {
                status,
                code,
                message,
            },
        }
    }
}

fn fallback_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() || body.starts_with('{') {
        format!("HTTP {}", status)
    } else {
        body.to_string()
    }
}

fn rate_limit_message(retry_after: Option<u64>) -> String {
    match retry_after {
        Some(1) => "Too many requests. Please wait 1 second before trying again.".to_string(),
        Some(secs) => format!(
            "Too many requests. Please wait {} seconds before trying again.",
            secs
        ),
        None => "Too many requests. Please try again later.".to_string(),
    }
}

/// `details[].message` joined into one line
fn flatten_details(error: &ErrorBody) -> Option<String> {
    let messages: Vec<String> = error
        .field_details()
        .into_iter()
        .map(|d| d.message)
        .filter(|m| !m.is_empty())
        .collect();
    if messages.is_empty() {
        None
    } else {
        Some(messages.join("; "))
    }
}
